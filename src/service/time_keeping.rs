use chrono::NaiveDateTime;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::model::time_keeping::TimeKeeping;
use crate::store::Store;

pub async fn check_in(store: &dyn Store, user_id: u64, at: NaiveDateTime) -> AppResult<TimeKeeping> {
    let record = store.insert_check_in(user_id, at.date(), at.time()).await?;
    info!(user_id, date = %record.date, "Checked in");
    Ok(record)
}

pub async fn check_out(store: &dyn Store, user_id: u64, at: NaiveDateTime) -> AppResult<TimeKeeping> {
    let date = at.date();
    let record = store
        .get_time_keeping(user_id, date)
        .await?
        .filter(|r| r.checkout_time.is_none())
        .ok_or(AppError::NotFound("active check-in for today"))?;

    if record.checkin_time.is_some_and(|t| at.time() < t) {
        return Err(AppError::validation("check-out cannot be before check-in"));
    }
    if !store.set_check_out(user_id, date, at.time()).await? {
        return Err(AppError::NotFound("active check-in for today"));
    }

    info!(user_id, %date, "Checked out");
    Ok(TimeKeeping {
        checkout_time: Some(at.time()),
        ..record
    })
}
