use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub session_id: i64,
    pub patient_id: i64,
    pub message: String,
    pub rating: i32,
    pub symptoms: Option<String>,
    pub side_effects: Option<String>,
    pub improvement_level: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFeedback {
    pub session_id: i64,
    pub patient_id: i64,
    pub message: String,
    pub rating: i32,
    pub symptoms: Option<String>,
    pub side_effects: Option<String>,
    pub improvement_level: Option<i32>,
}
