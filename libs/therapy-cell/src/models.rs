use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use patient_cell::{PatientError, PatientProfileResponse};
use shared_models::error::AppError;
use shared_models::therapy::{Phase, SessionStatus};

// Plans

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanRequest {
    pub patient_id: i64,
    pub phase: Phase,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapyPlanResponse {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub practitioner_id: i64,
    pub practitioner_name: String,
    pub phase: Phase,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// Sessions

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSessionRequest {
    pub therapy_plan_id: i64,
    pub procedure_name: String,
    pub scheduled_date: NaiveDateTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapySessionResponse {
    pub id: i64,
    pub therapy_plan_id: i64,
    pub phase: Phase,
    pub procedure_name: String,
    pub scheduled_date: NaiveDateTime,
    pub notes: Option<String>,
    pub status: SessionStatus,
    pub practitioner_name: String,
    pub patient_name: String,
    pub feedback: Option<FeedbackResponse>,
}

// Feedback

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub session_id: i64,
    pub message: String,
    pub rating: i32,
    pub symptoms: Option<String>,
    pub side_effects: Option<String>,
    pub improvement_level: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub id: i64,
    pub session_id: i64,
    pub procedure_name: String,
    pub patient_name: String,
    pub message: String,
    pub rating: i32,
    pub symptoms: Option<String>,
    pub side_effects: Option<String>,
    pub improvement_level: Option<i32>,
    pub created_at: DateTime<Utc>,
}

// Reporting

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseProgress {
    pub phase: Phase,
    pub total: usize,
    pub completed: usize,
    pub percentage: f64,
    pub sessions: Vec<TherapySessionResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapyProgressResponse {
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub completion_percentage: f64,
    pub phases: Vec<PhaseProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_patients: usize,
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub upcoming_sessions: usize,
    pub pending_feedback: usize,
    pub upcoming_session_list: Vec<TherapySessionResponse>,
    pub recent_patients: Vec<PatientProfileResponse>,
}

#[derive(Debug, thiserror::Error)]
pub enum TherapyError {
    #[error("Therapy plan not found")]
    PlanNotFound,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Patient not found with ID: {0}")]
    PatientNotFound(i64),

    #[error("User not found with ID: {0}")]
    UserNotFound(i64),

    #[error("You can only {0} for your own therapy plans")]
    NotPlanOwner(&'static str),

    #[error("You can only submit feedback for your own sessions")]
    NotSessionPatient,

    #[error("Feedback already submitted for this session")]
    FeedbackAlreadySubmitted,

    #[error("Schedule Conflict: You already have a '{procedure}' session scheduled at {at}")]
    ScheduleConflict { procedure: String, at: String },

    #[error("Cannot change session status from {from} to {to}")]
    InvalidTransition { from: SessionStatus, to: SessionStatus },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Database(String),

    #[error(transparent)]
    Patient(#[from] PatientError),
}

impl From<TherapyError> for AppError {
    fn from(err: TherapyError) -> Self {
        match err {
            TherapyError::PlanNotFound
            | TherapyError::SessionNotFound
            | TherapyError::PatientNotFound(_)
            | TherapyError::UserNotFound(_) => AppError::NotFound(err.to_string()),
            TherapyError::NotPlanOwner(_) | TherapyError::NotSessionPatient => {
                AppError::Forbidden(err.to_string())
            }
            TherapyError::FeedbackAlreadySubmitted | TherapyError::ScheduleConflict { .. } => {
                AppError::Conflict(err.to_string())
            }
            TherapyError::InvalidTransition { .. } => AppError::BadRequest(err.to_string()),
            TherapyError::Validation(msg) => AppError::ValidationError(msg),
            TherapyError::Database(msg) => AppError::Database(msg),
            TherapyError::Patient(inner) => inner.into(),
        }
    }
}

impl From<AppError> for TherapyError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::ValidationError(msg) | AppError::BadRequest(msg) => {
                TherapyError::Validation(msg)
            }
            other => TherapyError::Database(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for TherapyError {
    fn from(err: anyhow::Error) -> Self {
        TherapyError::Database(err.to_string())
    }
}
