use serde::{Deserialize, Serialize};

use shared_models::error::AppError;
use shared_models::patient::{PatientProfile, PatientProfileChanges};
use shared_models::user::UserAccount;

/// Practitioner-initiated patient creation: a PATIENT account plus its profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    pub prakriti: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePatientRequest {
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    pub prakriti: Option<String>,
    pub notes: Option<String>,
}

impl From<UpdatePatientRequest> for PatientProfileChanges {
    fn from(req: UpdatePatientRequest) -> Self {
        Self {
            age: req.age,
            gender: req.gender,
            blood_group: req.blood_group,
            emergency_contact: req.emergency_contact,
            medical_history: req.medical_history,
            prakriti: req.prakriti,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfileResponse {
    /// Absent when the patient has no profile yet.
    pub id: Option<i64>,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub prakriti: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    pub notes: Option<String>,
    pub practitioner_id: Option<i64>,
    pub practitioner_name: String,
}

pub const UNASSIGNED: &str = "Unassigned";

impl PatientProfileResponse {
    pub fn build(user: &UserAccount, profile: Option<PatientProfile>, practitioner: Option<&UserAccount>) -> Self {
        let practitioner_name = practitioner
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNASSIGNED.to_string());

        match profile {
            Some(p) => Self {
                id: Some(p.id),
                user_id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                prakriti: p.prakriti,
                age: p.age,
                gender: p.gender,
                blood_group: p.blood_group,
                emergency_contact: p.emergency_contact,
                medical_history: p.medical_history,
                notes: p.notes,
                practitioner_id: p.practitioner_id,
                practitioner_name,
            },
            None => Self {
                id: None,
                user_id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                prakriti: None,
                age: None,
                gender: None,
                blood_group: None,
                emergency_contact: None,
                medical_history: None,
                notes: None,
                practitioner_id: None,
                practitioner_name,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Email is already registered")]
    EmailAlreadyExists { email: String },

    #[error("Patient is not assigned to you")]
    NotAssigned,

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    DatabaseError(String),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound | PatientError::UserNotFound => AppError::NotFound(err.to_string()),
            PatientError::EmailAlreadyExists { .. } => AppError::Conflict(err.to_string()),
            PatientError::NotAssigned => AppError::Forbidden(err.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::Internal(msg) => AppError::Internal(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

impl From<AppError> for PatientError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::ValidationError(msg) => PatientError::ValidationError(msg),
            other => PatientError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for PatientError {
    fn from(err: anyhow::Error) -> Self {
        PatientError::DatabaseError(err.to_string())
    }
}
