use crate::error::{AppError, AppResult};
use crate::model::notification::{NewNotification, Notification};
use crate::store::Store;

/// Column width of `notification_type` and `content`.
const FIELD_MAX: usize = 50;

fn clip(value: &str) -> String {
    value.chars().take(FIELD_MAX).collect()
}

pub async fn notify(
    store: &dyn Store,
    sender_id: Option<u64>,
    recipient_id: u64,
    form_id: Option<u64>,
    notification_type: &str,
    content: &str,
) -> AppResult<Notification> {
    store
        .insert_notification(NewNotification {
            sender_id,
            recipient_id,
            form_id,
            notification_type: clip(notification_type),
            content: clip(content),
        })
        .await
}

pub async fn list_for(
    store: &dyn Store,
    recipient_id: u64,
    unread_only: bool,
) -> AppResult<Vec<Notification>> {
    store.list_notifications(recipient_id, unread_only).await
}

/// Only the recipient may flip the flag; anyone else sees "not found".
pub async fn mark_read(store: &dyn Store, recipient_id: u64, id: u64) -> AppResult<()> {
    if store.mark_notification_read(id, recipient_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("notification"))
    }
}
