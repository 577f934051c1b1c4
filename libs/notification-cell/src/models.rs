use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::notification::Notification;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: i64,
    pub subject: String,
    pub body: String,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            subject: n.subject,
            body: n.body,
            sent: n.sent,
            created_at: n.created_at,
        }
    }
}

/// Subject and body of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub body: String,
}
