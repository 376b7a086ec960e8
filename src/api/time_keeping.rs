use actix_web::{HttpResponse, Responder, web};
use chrono::Local;

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::time_keeping::{TimeKeeping, TimeKeepingQuery};
use crate::service::time_keeping::{check_in, check_out};
use crate::store::Store;

/// Record today's arrival at the server's local time
#[utoipa::path(
    post,
    path = "/api/timekeeping/check-in",
    responses(
        (status = 201, description = "Checked in", body = TimeKeeping),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "TimeKeeping"
)]
pub async fn check_in_today(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> AppResult<impl Responder> {
    let now = Local::now().naive_local();
    let record = check_in(store.get_ref(), auth.user_id, now).await?;
    Ok(HttpResponse::Created().json(record))
}

#[utoipa::path(
    put,
    path = "/api/timekeeping/check-out",
    responses(
        (status = 200, description = "Checked out", body = TimeKeeping),
        (status = 400, description = "Check-out before check-in"),
        (status = 404, description = "No active check-in found for today")
    ),
    security(("bearer_auth" = [])),
    tag = "TimeKeeping"
)]
pub async fn check_out_today(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> AppResult<impl Responder> {
    let now = Local::now().naive_local();
    let record = check_out(store.get_ref(), auth.user_id, now).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// The caller's ledger ordered by date; staff may pass `user_id`
#[utoipa::path(
    get,
    path = "/api/timekeeping",
    params(TimeKeepingQuery),
    responses(
        (status = 200, description = "Time keeping records", body = [TimeKeeping]),
        (status = 400, description = "from is after to"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "TimeKeeping"
)]
pub async fn list_time_keeping(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<TimeKeepingQuery>,
) -> AppResult<impl Responder> {
    let query = query.into_inner();
    let user_id = match query.user_id {
        Some(id) if id != auth.user_id => {
            auth.require_staff()?;
            id
        }
        _ => auth.user_id,
    };
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(AppError::validation("from cannot be after to"));
        }
    }

    let rows = store.list_time_keeping(user_id, query.from, query.to).await?;
    Ok(HttpResponse::Ok().json(rows))
}
