use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::state::AppState;

use crate::models::NotificationResponse;

#[axum::debug_handler]
pub async fn get_my_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = state
        .repos
        .notifications
        .find_by_user_id(user.id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(notifications.into_iter().map(NotificationResponse::from).collect()))
}
