use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

const TITLE_MAX: usize = 200;
const CONTENT_MAX: usize = 1000;

/// Kind of request. Stored and serialized as the two-letter code.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display,
    EnumString, EnumIter,
)]
pub enum FormType {
    #[default]
    #[serde(rename = "rp", alias = "report")]
    #[strum(to_string = "rp", serialize = "report")]
    Report,
    #[serde(rename = "le", alias = "leave-early")]
    #[strum(to_string = "le", serialize = "leave-early")]
    LeaveEarly,
    #[serde(rename = "lo", alias = "leave-out")]
    #[strum(to_string = "lo", serialize = "leave-out")]
    LeaveOut,
    #[serde(rename = "il", alias = "in-late")]
    #[strum(to_string = "il", serialize = "in-late")]
    InLate,
}

impl FormType {
    pub fn label(&self) -> &'static str {
        match self {
            FormType::Report => "Report",
            FormType::LeaveEarly => "Leave Early",
            FormType::LeaveOut => "Leave Out",
            FormType::InLate => "In Late",
        }
    }
}

/// Approval state. Only `Pending` has outgoing transitions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display,
    EnumString, EnumIter,
)]
pub enum FormStatus {
    #[default]
    #[serde(rename = "p", alias = "pending")]
    #[strum(to_string = "p", serialize = "pending")]
    Pending,
    #[serde(rename = "a", alias = "approved")]
    #[strum(to_string = "a", serialize = "approved")]
    Approved,
    #[serde(rename = "r", alias = "rejected")]
    #[strum(to_string = "r", serialize = "rejected")]
    Rejected,
    #[serde(rename = "f", alias = "forwarded")]
    #[strum(to_string = "f", serialize = "forwarded")]
    Forwarded,
    #[serde(rename = "c", alias = "canceled")]
    #[strum(to_string = "c", serialize = "canceled")]
    Canceled,
}

impl FormStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FormStatus::Pending => "pending",
            FormStatus::Approved => "approved",
            FormStatus::Rejected => "rejected",
            FormStatus::Forwarded => "forwarded",
            FormStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self != FormStatus::Pending
    }

    pub fn can_transition_to(&self, target: FormStatus) -> bool {
        *self == FormStatus::Pending && target != FormStatus::Pending
    }
}

/// Parses a stored or user supplied code, rejecting anything outside the
/// enumerated set.
pub fn parse_form_type(value: &str) -> AppResult<FormType> {
    value
        .parse()
        .map_err(|_| AppError::validation(format!("unknown form type '{value}'")))
}

pub fn parse_form_status(value: &str) -> AppResult<FormStatus> {
    value
        .parse()
        .map_err(|_| AppError::validation(format!("unknown form status '{value}'")))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Form {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Leave early on Friday")]
    pub title: String,
    #[schema(nullable = true)]
    pub sender_id: Option<u64>,
    #[schema(nullable = true)]
    pub recipient_id: Option<u64>,
    #[schema(nullable = true)]
    pub division_id: Option<u64>,
    pub content: String,
    #[schema(example = "le")]
    pub form_type: FormType,
    #[schema(example = "p")]
    pub status: FormStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date", value_type = Option<String>)]
    pub compensation_from: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub compensation_to: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub leave_from: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub leave_to: Option<NaiveDate>,
    #[schema(example = "08:30:00", value_type = Option<String>)]
    pub checkin_time: Option<NaiveTime>,
    #[schema(example = "17:30:00", value_type = Option<String>)]
    pub checkout_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewForm {
    #[schema(example = "Leave early on Friday")]
    pub title: String,
    #[schema(example = 2)]
    pub recipient_id: Option<u64>,
    #[schema(example = 1)]
    pub division_id: Option<u64>,
    #[serde(default)]
    pub content: String,
    #[schema(example = "le")]
    pub form_type: Option<FormType>,
    #[schema(format = "date", value_type = Option<String>)]
    pub compensation_from: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub compensation_to: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub leave_from: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub leave_to: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub checkin_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub checkout_time: Option<NaiveTime>,
}

impl NewForm {
    pub fn validate(&self) -> AppResult<()> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("title must not be empty"));
        }
        if title.chars().count() > TITLE_MAX {
            return Err(AppError::validation(format!(
                "title must be at most {TITLE_MAX} characters"
            )));
        }
        if self.content.chars().count() > CONTENT_MAX {
            return Err(AppError::validation(format!(
                "content must be at most {CONTENT_MAX} characters"
            )));
        }
        check_range("compensation", self.compensation_from, self.compensation_to)?;
        check_range("leave", self.leave_from, self.leave_to)?;
        Ok(())
    }
}

fn check_range(name: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> AppResult<()> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(AppError::validation(format!(
            "{name}_from cannot be after {name}_to"
        ))),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct FormFilter {
    /// Filter by sender
    pub sender_id: Option<u64>,
    /// Filter by recipient
    pub recipient_id: Option<u64>,
    /// Filter by division
    pub division_id: Option<u64>,
    pub status: Option<FormStatus>,
    pub form_type: Option<FormType>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct StatusChange {
    #[schema(example = "a")]
    pub status: FormStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn codes_round_trip_through_display_and_parse() {
        for ty in FormType::iter() {
            assert_eq!(parse_form_type(&ty.to_string()).unwrap(), ty);
        }
        for status in FormStatus::iter() {
            assert_eq!(parse_form_status(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn long_names_are_accepted() {
        assert_eq!(parse_form_type("leave-early").unwrap(), FormType::LeaveEarly);
        assert_eq!(parse_form_status("approved").unwrap(), FormStatus::Approved);
        let parsed: FormType = serde_json::from_str("\"in-late\"").unwrap();
        assert_eq!(parsed, FormType::InLate);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!(matches!(parse_form_type("xx"), Err(AppError::Validation(_))));
        assert!(matches!(parse_form_status("z"), Err(AppError::Validation(_))));
        assert!(serde_json::from_str::<FormStatus>("\"done\"").is_err());
    }

    #[test]
    fn only_pending_has_outgoing_transitions() {
        for from in FormStatus::iter() {
            for to in FormStatus::iter() {
                let expected = from == FormStatus::Pending && to != FormStatus::Pending;
                assert_eq!(from.can_transition_to(to), expected, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn defaults_match_a_fresh_form() {
        assert_eq!(FormType::default(), FormType::Report);
        assert_eq!(FormStatus::default(), FormStatus::Pending);
        assert_eq!(FormType::default().to_string(), "rp");
    }

    #[test]
    fn reversed_leave_range_is_rejected() {
        let form = NewForm {
            title: "Trip".into(),
            leave_from: NaiveDate::from_ymd_opt(2026, 3, 5),
            leave_to: NaiveDate::from_ymd_opt(2026, 3, 1),
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("leave_from"));
    }

    #[test]
    fn blank_title_is_rejected() {
        let form = NewForm {
            title: "   ".into(),
            ..Default::default()
        };
        assert!(form.validate().is_err());
    }
}
