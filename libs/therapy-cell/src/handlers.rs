use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_models::therapy::SessionStatus;
use shared_utils::extractor::require_role;
use shared_utils::state::AppState;

use crate::models::{
    CreatePlanRequest, DashboardResponse, FeedbackResponse, ScheduleSessionRequest, StatusQuery,
    SubmitFeedbackRequest, TherapyPlanResponse, TherapyProgressResponse, TherapySessionResponse,
};
use crate::services::{
    DashboardService, FeedbackService, PatientScope, PlanService, ProgressService, SchedulingService,
};

// Practitioner endpoints

#[axum::debug_handler]
pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<TherapyPlanResponse>), AppError> {
    require_role(&user, Role::Practitioner)?;

    let plan = PlanService::new(&state).create_plan(user.id, request).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

#[axum::debug_handler]
pub async fn list_plans(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<TherapyPlanResponse>>, AppError> {
    require_role(&user, Role::Practitioner)?;

    let plans = PlanService::new(&state).list_plans(user.id).await?;
    Ok(Json(plans))
}

#[axum::debug_handler]
pub async fn schedule_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ScheduleSessionRequest>,
) -> Result<(StatusCode, Json<TherapySessionResponse>), AppError> {
    require_role(&user, Role::Practitioner)?;

    let session = SchedulingService::new(&state).schedule_session(user.id, request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[axum::debug_handler]
pub async fn update_session_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<TherapySessionResponse>, AppError> {
    require_role(&user, Role::Practitioner)?;

    let status: SessionStatus = query.status.parse().map_err(AppError::BadRequest)?;
    let session = SchedulingService::new(&state)
        .update_status(user.id, session_id, status)
        .await?;
    Ok(Json(session))
}

#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>, AppError> {
    require_role(&user, Role::Practitioner)?;

    let scope = PatientScope::for_practitioner(state.config.dashboard_patient_scope, user.id);
    let dashboard = DashboardService::new(&state).dashboard(user.id, scope).await?;
    Ok(Json(dashboard))
}

#[axum::debug_handler]
pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<FeedbackResponse>>, AppError> {
    require_role(&user, Role::Practitioner)?;

    let feedback = FeedbackService::new(&state).list_for_practitioner(user.id).await?;
    Ok(Json(feedback))
}

// Patient endpoints

#[axum::debug_handler]
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), AppError> {
    require_role(&user, Role::Patient)?;

    let feedback = FeedbackService::new(&state).submit_feedback(user.id, request).await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

#[axum::debug_handler]
pub async fn get_my_sessions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<TherapySessionResponse>>, AppError> {
    require_role(&user, Role::Patient)?;

    let sessions = ProgressService::new(&state).my_sessions(user.id).await?;
    Ok(Json(sessions))
}

#[axum::debug_handler]
pub async fn get_therapy_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TherapyProgressResponse>, AppError> {
    require_role(&user, Role::Patient)?;

    let progress = ProgressService::new(&state).therapy_progress(user.id).await?;
    Ok(Json(progress))
}
