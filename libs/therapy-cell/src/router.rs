use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::state::AppState;

use crate::handlers;

pub fn therapy_routes(state: Arc<AppState>) -> Router {
    let practitioner_routes = Router::new()
        .route("/therapy-plan", post(handlers::create_plan))
        .route("/therapy-plans", get(handlers::list_plans))
        .route("/session", post(handlers::schedule_session))
        .route("/session/{id}/status", put(handlers::update_session_status))
        .route("/dashboard", get(handlers::get_dashboard));

    let patient_routes = Router::new()
        .route("/my-sessions", get(handlers::get_my_sessions))
        .route("/therapy-progress", get(handlers::get_therapy_progress));

    Router::new()
        .merge(practitioner_routes)
        .merge(patient_routes)
        .route(
            "/feedback",
            get(handlers::list_feedback).post(handlers::submit_feedback),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
