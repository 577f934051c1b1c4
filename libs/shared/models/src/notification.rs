use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record of an outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub body: String,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: i64,
    pub subject: String,
    pub body: String,
    pub sent: bool,
}
