//! Fixtures shared by the cells' integration tests.

use std::sync::Arc;

use axum::{body::Body, http::Request};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use uuid::Uuid;

use shared_config::{AppConfig, DashboardPatientScope, DatabaseBackend};
use shared_database::Repositories;
use shared_models::auth::Role;
use shared_models::patient::NewPatientProfile;
use shared_models::therapy::{NewTherapyPlan, Phase, TherapyPlan};
use shared_models::user::{NewUser, UserAccount};

use crate::jwt::issue_token;
use crate::state::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

pub struct TestConfig {
    pub jwt_secret: String,
    pub conflict_window_minutes: i64,
    pub dashboard_patient_scope: DashboardPatientScope,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            conflict_window_minutes: 59,
            dashboard_patient_scope: DashboardPatientScope::Assigned,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            jwt_secret: self.jwt_secret.clone(),
            database_backend: DatabaseBackend::Memory,
            conflict_window_minutes: self.conflict_window_minutes,
            dashboard_patient_scope: self.dashboard_patient_scope,
            ..AppConfig::default()
        }
    }

    /// Fresh state over an empty in-memory store.
    pub fn to_state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(self.to_app_config(), Repositories::in_memory()))
    }
}

/// A stored user plus a valid token for it.
pub struct TestUser {
    pub account: UserAccount,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> i64 {
        self.account.id
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}

pub async fn seed_user(state: &AppState, name: &str, role: Role) -> TestUser {
    let account = state
        .repos
        .users
        .save(NewUser {
            name: name.to_string(),
            email: unique_email(&name.to_ascii_lowercase().replace(' ', ".")),
            password_hash: "not-a-real-hash".to_string(),
            role,
        })
        .await
        .expect("seed user");

    let token = issue_token(account.id, &account.email, role, &state.config.jwt_secret, 1)
        .expect("issue token");

    TestUser { account, token }
}

pub async fn seed_practitioner(state: &AppState, name: &str) -> TestUser {
    seed_user(state, name, Role::Practitioner).await
}

/// A patient user with a profile assigned to `practitioner_id`.
pub async fn seed_patient(state: &AppState, name: &str, practitioner_id: Option<i64>) -> TestUser {
    let patient = seed_user(state, name, Role::Patient).await;
    state
        .repos
        .profiles
        .save(NewPatientProfile {
            user_id: patient.id(),
            practitioner_id,
            prakriti: Some("Vata-Pitta".to_string()),
            ..NewPatientProfile::default()
        })
        .await
        .expect("seed profile");
    patient
}

pub async fn seed_plan(
    state: &AppState,
    patient_id: i64,
    practitioner_id: i64,
    phase: Phase,
) -> TherapyPlan {
    state
        .repos
        .plans
        .save(NewTherapyPlan {
            patient_id,
            practitioner_id,
            phase,
            description: Some(format!("{} course", phase)),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 8),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 28),
        })
        .await
        .expect("seed plan")
}

/// `2024-01-10` at the given clock time.
pub fn jan_10(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 10)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid time")
}

pub fn json_request(
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(bearer) = bearer {
        builder = builder.header("authorization", bearer);
    }
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    builder.body(body).expect("request")
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json body")
}
