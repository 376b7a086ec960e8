use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::notification::{Notification, NotificationQuery};
use crate::service::notifications::{list_for, mark_read};
use crate::store::Store;

/// The caller's notification feed, oldest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationQuery),
    responses((status = 200, description = "Notification feed", body = [Notification])),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn list_notifications(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<NotificationQuery>,
) -> AppResult<impl Responder> {
    let feed = list_for(store.get_ref(), auth.user_id, query.unread_only).await?;
    Ok(HttpResponse::Ok().json(feed))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses((status = 200, description = "Unread notifications", body = Object, example = json!({
        "unread": 3
    }))),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn unread_count(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> AppResult<impl Responder> {
    let unread = store.count_unread(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "unread": unread })))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = u64, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked as read"),
        (status = 404, description = "No such notification in the caller's feed")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn read_notification(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    mark_read(store.get_ref(), auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Marked as read" })))
}
