use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use shared_models::therapy::Phase;
use shared_utils::state::AppState;
use shared_utils::test_utils::{
    json_request, read_json, seed_patient, seed_plan, seed_practitioner, TestConfig, TestUser,
};
use therapy_cell::router::therapy_routes;

async fn call(
    state: &Arc<AppState>,
    method: &str,
    uri: &str,
    user: &TestUser,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = therapy_routes(state.clone())
        .oneshot(json_request(method, uri, Some(&user.bearer()), body))
        .await
        .unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

async fn book(
    state: &Arc<AppState>,
    user: &TestUser,
    plan_id: i64,
    procedure: &str,
    at: &str,
) -> (StatusCode, Value) {
    let body = json!({
        "therapy_plan_id": plan_id,
        "procedure_name": procedure,
        "scheduled_date": at
    });
    call(state, "POST", "/session", user, Some(body)).await
}

#[tokio::test]
async fn test_scheduling_example_day() {
    let state = TestConfig::default().to_state();
    let doctor = seed_practitioner(&state, "Dr Rao").await;
    let meera = seed_patient(&state, "Meera", Some(doctor.id())).await;
    let plan = seed_plan(&state, meera.id(), doctor.id(), Phase::Purvakarma).await;

    let (status, first) = book(&state, &doctor, plan.id, "Abhyanga", "2024-01-10T10:00:00").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "SCHEDULED");
    assert_eq!(first["phase"], "PURVAKARMA");
    assert_eq!(first["patient_name"], "Meera");

    let (status, clash) = book(&state, &doctor, plan.id, "Swedana", "2024-01-10T10:45:00").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        clash["error"],
        "Schedule Conflict: You already have a 'Abhyanga' session scheduled at 2024-01-10 10:00"
    );

    let (status, _) = book(&state, &doctor, plan.id, "Swedana", "2024-01-10T12:00:00").await;
    assert_eq!(status, StatusCode::CREATED);

    let sessions = state.repos.sessions.find_by_plan_id(plan.id).await.unwrap();
    assert_eq!(sessions.len(), 2);
}

#[tokio::test]
async fn test_date_at_the_calendar_edge_is_a_bad_request() {
    let state = TestConfig::default().to_state();
    let doctor = seed_practitioner(&state, "Dr Rao").await;
    let meera = seed_patient(&state, "Meera", Some(doctor.id())).await;
    let plan = seed_plan(&state, meera.id(), doctor.id(), Phase::Purvakarma).await;

    let (status, body) =
        book(&state, &doctor, plan.id, "Abhyanga", "+262142-12-31T23:30:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Scheduled date is out of range");
    assert!(state.repos.sessions.find_by_plan_id(plan.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scheduling_and_completion_notify_twice_each() {
    let state = TestConfig::default().to_state();
    let doctor = seed_practitioner(&state, "Dr Rao").await;
    let meera = seed_patient(&state, "Meera", Some(doctor.id())).await;
    let plan = seed_plan(&state, meera.id(), doctor.id(), Phase::Pradhanakarma).await;

    let (_, session) = book(&state, &doctor, plan.id, "Virechana", "2024-01-10T09:00:00").await;
    let after_booking = state.repos.notifications.find_by_user_id(meera.id()).await.unwrap();
    assert_eq!(after_booking.len(), 2);

    let uri = format!("/session/{}/status?status=COMPLETED", session["id"]);
    let (status, updated) = call(&state, "PUT", &uri, &doctor, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "COMPLETED");

    let after_completion = state.repos.notifications.find_by_user_id(meera.id()).await.unwrap();
    assert_eq!(after_completion.len(), 4);
    let subjects: Vec<&str> = after_completion[..2].iter().map(|n| n.subject.as_str()).collect();
    assert!(subjects.contains(&"Recovery Tips after Virechana"));
    assert!(subjects.contains(&"Feedback Request: Virechana"));

    let back = uri.replace("COMPLETED", "SCHEDULED");
    let (status, _) = call(&state, "PUT", &back, &doctor, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_foreign_plan_is_forbidden_without_mutation() {
    let state = TestConfig::default().to_state();
    let rao = seed_practitioner(&state, "Dr Rao").await;
    let iyer = seed_practitioner(&state, "Dr Iyer").await;
    let meera = seed_patient(&state, "Meera", Some(rao.id())).await;
    let plan = seed_plan(&state, meera.id(), rao.id(), Phase::Purvakarma).await;

    let (status, _) = book(&state, &iyer, plan.id, "Abhyanga", "2024-01-10T10:00:00").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(state.repos.sessions.find_by_plan_id(plan.id).await.unwrap().is_empty());

    let (_, session) = book(&state, &rao, plan.id, "Abhyanga", "2024-01-10T10:00:00").await;
    let uri = format!("/session/{}/status?status=CANCELLED", session["id"]);
    let (status, _) = call(&state, "PUT", &uri, &iyer, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let stored = state.repos.sessions.find_by_plan_id(plan.id).await.unwrap();
    assert_eq!(stored[0].status.as_str(), "SCHEDULED");
}

#[tokio::test]
async fn test_patient_feedback_flow() {
    let state = TestConfig::default().to_state();
    let doctor = seed_practitioner(&state, "Dr Rao").await;
    let meera = seed_patient(&state, "Meera", Some(doctor.id())).await;
    let plan = seed_plan(&state, meera.id(), doctor.id(), Phase::Paschatkarma).await;
    let (_, session) = book(&state, &doctor, plan.id, "Rasayana", "2024-01-10T10:00:00").await;

    let review = json!({
        "session_id": session["id"],
        "message": "Much calmer",
        "rating": 5,
        "improvement_level": 8
    });
    let (status, stored) = call(&state, "POST", "/feedback", &meera, Some(review.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stored["procedure_name"], "Rasayana");

    let (status, _) = call(&state, "POST", "/feedback", &meera, Some(review)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, listed) = call(&state, "GET", "/feedback", &doctor, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, sessions) = call(&state, "GET", "/my-sessions", &meera, None).await;
    assert_eq!(sessions[0]["status"], "COMPLETED");
    assert_eq!(sessions[0]["feedback"]["rating"], 5);

    let (status, _) = call(&state, "GET", "/feedback", &meera, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_progress_and_dashboard_endpoints() {
    let state = TestConfig::default().to_state();
    let doctor = seed_practitioner(&state, "Dr Rao").await;
    let meera = seed_patient(&state, "Meera", Some(doctor.id())).await;
    let purva = seed_plan(&state, meera.id(), doctor.id(), Phase::Purvakarma).await;
    let pradhana = seed_plan(&state, meera.id(), doctor.id(), Phase::Pradhanakarma).await;

    let (_, first) = book(&state, &doctor, purva.id, "Snehapana", "2024-01-10T08:00:00").await;
    book(&state, &doctor, pradhana.id, "Vamana", "2024-01-10T11:00:00").await;
    let complete = format!("/session/{}/status?status=COMPLETED", first["id"]);
    call(&state, "PUT", &complete, &doctor, None).await;

    let (status, progress) = call(&state, "GET", "/therapy-progress", &meera, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["total_sessions"], 2);
    assert_eq!(progress["completed_sessions"], 1);
    assert_eq!(progress["completion_percentage"], 50.0);
    assert_eq!(progress["phases"][0]["phase"], "PURVAKARMA");
    assert_eq!(progress["phases"][0]["percentage"], 100.0);
    assert_eq!(progress["phases"][2]["total"], 0);

    let (status, board) = call(&state, "GET", "/dashboard", &doctor, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["total_sessions"], 2);
    assert_eq!(board["completed_sessions"], 1);
    assert_eq!(board["upcoming_sessions"], 1);
    assert_eq!(board["pending_feedback"], 1);
    assert_eq!(board["total_patients"], 1);

    let (status, plans) = call(&state, "GET", "/therapy-plans", &doctor, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plans[0]["id"], pradhana.id);
}

#[tokio::test]
async fn test_create_plan_endpoint() {
    let state = TestConfig::default().to_state();
    let doctor = seed_practitioner(&state, "Dr Rao").await;
    let meera = seed_patient(&state, "Meera", Some(doctor.id())).await;

    let (status, plan) = call(
        &state,
        "POST",
        "/therapy-plan",
        &doctor,
        Some(json!({
            "patient_id": meera.id(),
            "phase": "PRADHANAKARMA",
            "description": "Virechana course",
            "start_date": "2024-01-15",
            "end_date": "2024-01-21"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["phase"], "PRADHANAKARMA");
    assert_eq!(plan["practitioner_name"], "Dr Rao");

    let own_plan = json!({"patient_id": meera.id(), "phase": "PURVAKARMA"});
    let (status, _) = call(&state, "POST", "/therapy-plan", &meera, Some(own_plan)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
