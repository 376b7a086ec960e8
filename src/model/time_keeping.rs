use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TimeKeeping {
    pub id: u64,
    #[schema(nullable = true)]
    pub user_id: Option<u64>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "08:30:00", value_type = Option<String>)]
    pub checkin_time: Option<NaiveTime>,
    #[schema(example = "17:30:00", value_type = Option<String>)]
    pub checkout_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct TimeKeepingQuery {
    /// Staff only: another user's ledger
    pub user_id: Option<u64>,
    #[param(value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
}
