use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;
use shared_utils::state::AppState;

use crate::models::{CreatePatientRequest, PatientProfileResponse, UpdatePatientRequest};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<PatientProfileResponse>), AppError> {
    require_role(&user, Role::Practitioner)?;

    let service = PatientService::new(&state);
    let patient = service.create_patient(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(patient)))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<PatientProfileResponse>>, AppError> {
    require_role(&user, Role::Practitioner)?;

    let service = PatientService::new(&state);
    let patients = service.list_patients(user.id).await?;

    Ok(Json(patients))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(patient_user_id): Path<i64>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<PatientProfileResponse>, AppError> {
    require_role(&user, Role::Practitioner)?;

    let service = PatientService::new(&state);
    let patient = service.update_patient(user.id, patient_user_id, request).await?;

    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn get_my_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PatientProfileResponse>, AppError> {
    require_role(&user, Role::Patient)?;

    let service = PatientService::new(&state);
    let profile = service.my_profile(user.id).await?;

    Ok(Json(profile))
}
