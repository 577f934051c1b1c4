use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use auth_cell::router::auth_routes;
use notification_cell::router::notification_routes;
use patient_cell::router::patient_routes;
use shared_utils::state::AppState;
use therapy_cell::router::therapy_routes;

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "UP",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "AyurSutra Panchakarma API",
        "backend": state.config.database_backend.to_string(),
    }))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(patient_routes(state.clone()))
        .merge(therapy_routes(state.clone()))
        .merge(notification_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "AyurSutra API is running!" }))
        .route("/health", get(health))
        .with_state(state.clone())
        .nest("/auth", auth_routes(state))
        .nest("/api", api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use shared_utils::test_utils::{json_request, read_json, seed_practitioner, TestConfig};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_backend() {
        let state = TestConfig::default().to_state();

        let response = create_router(state)
            .oneshot(json_request("GET", "/health", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "UP");
        assert_eq!(body["backend"], "memory");
    }

    #[tokio::test]
    async fn test_cells_are_mounted() {
        let state = TestConfig::default().to_state();
        let doctor = seed_practitioner(&state, "Dr Rao").await;

        let register = create_router(state.clone())
            .oneshot(json_request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "name": "Meera",
                    "email": "meera@example.com",
                    "password": "secret",
                    "role": "PATIENT"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(register.status(), StatusCode::CREATED);

        for uri in ["/api/patients", "/api/dashboard", "/api/therapy-plans", "/api/notifications"] {
            let response = create_router(state.clone())
                .oneshot(json_request("GET", uri, Some(&doctor.bearer()), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }

        let anonymous = create_router(state)
            .oneshot(json_request("GET", "/api/dashboard", None, None))
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    }
}
