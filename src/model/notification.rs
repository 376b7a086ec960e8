use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(nullable = true)]
    pub sender_id: Option<u64>,
    #[schema(nullable = true)]
    pub recipient_id: Option<u64>,
    pub is_read: bool,
    #[schema(nullable = true)]
    pub form_id: Option<u64>,
    #[schema(example = "approved")]
    pub notification_type: String,
    #[schema(example = "Form 'Leave early' approved")]
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub sender_id: Option<u64>,
    pub recipient_id: u64,
    pub form_id: Option<u64>,
    pub notification_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct NotificationQuery {
    /// Only return unread notifications
    #[serde(default)]
    pub unread_only: bool,
}
