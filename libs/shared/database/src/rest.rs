use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use shared_models::feedback::{Feedback, NewFeedback};
use shared_models::notification::{NewNotification, Notification};
use shared_models::patient::{NewPatientProfile, PatientProfile, PatientProfileChanges};
use shared_models::therapy::{
    NewTherapyPlan, NewTherapySession, SessionStatus, TherapyPlan, TherapySession,
};
use shared_models::user::{NewUser, UserAccount};

use crate::repository::{
    FeedbackRepository, NotificationRepository, PatientProfileRepository,
    TherapyPlanRepository, TherapySessionRepository, UserRepository,
};
use crate::supabase::SupabaseClient;

const USERS: &str = "users";
const PATIENT_PROFILES: &str = "patient_profiles";
const THERAPY_PLANS: &str = "therapy_plans";
const THERAPY_SESSIONS: &str = "therapy_sessions";
const FEEDBACKS: &str = "feedbacks";
const NOTIFICATIONS: &str = "notifications";

// Embeds the owning plan so sessions can be filtered by patient or practitioner.
const SESSIONS_WITH_PLAN: &str = "select=*,therapy_plans!inner(patient_id,practitioner_id)";

/// Repository implementations over Supabase's PostgREST API.
pub struct SupabaseRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &str) -> Result<Vec<T>> {
        let path = format!("/rest/v1/{}?{}", table, query);
        self.client.request(Method::GET, &path, None).await
    }

    async fn select_one<T: DeserializeOwned>(&self, table: &str, query: &str) -> Result<Option<T>> {
        Ok(self.select(table, query).await?.into_iter().next())
    }

    async fn insert<T: DeserializeOwned>(&self, table: &str, body: Value) -> Result<T> {
        let path = format!("/rest/v1/{}", table);
        let rows: Vec<T> = self.client.write_returning(Method::POST, &path, body).await?;
        debug!("Inserted row into {}", table);

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no rows", table))
    }

    async fn patch<T: DeserializeOwned>(&self, table: &str, id: i64, body: Value) -> Result<Option<T>> {
        let path = format!("/rest/v1/{}?id=eq.{}", table, id);
        let rows: Vec<T> = self.client.write_returning(Method::PATCH, &path, body).await?;
        Ok(rows.into_iter().next())
    }
}

fn to_row<B: Serialize>(value: &B) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn timestamp(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[async_trait]
impl UserRepository for SupabaseRepository {
    async fn save(&self, user: NewUser) -> Result<UserAccount> {
        let mut row = to_row(&user)?;
        row["created_at"] = json!(Utc::now());
        self.insert(USERS, row).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserAccount>> {
        self.select_one(USERS, &format!("id=eq.{}", id)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        self.select_one(USERS, &format!("email=eq.{}", urlencoding::encode(email))).await
    }
}

#[async_trait]
impl PatientProfileRepository for SupabaseRepository {
    async fn save(&self, profile: NewPatientProfile) -> Result<PatientProfile> {
        self.insert(PATIENT_PROFILES, to_row(&profile)?).await
    }

    async fn update(&self, id: i64, changes: PatientProfileChanges) -> Result<Option<PatientProfile>> {
        self.patch(PATIENT_PROFILES, id, to_row(&changes)?).await
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<PatientProfile>> {
        self.select_one(PATIENT_PROFILES, &format!("user_id=eq.{}", user_id)).await
    }

    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<PatientProfile>> {
        self.select(
            PATIENT_PROFILES,
            &format!("practitioner_id=eq.{}&order=id.asc", practitioner_id),
        )
        .await
    }

    async fn find_all(&self) -> Result<Vec<PatientProfile>> {
        self.select(PATIENT_PROFILES, "order=id.asc").await
    }
}

#[async_trait]
impl TherapyPlanRepository for SupabaseRepository {
    async fn save(&self, plan: NewTherapyPlan) -> Result<TherapyPlan> {
        self.insert(THERAPY_PLANS, to_row(&plan)?).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TherapyPlan>> {
        self.select_one(THERAPY_PLANS, &format!("id=eq.{}", id)).await
    }

    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<TherapyPlan>> {
        self.select(THERAPY_PLANS, &format!("patient_id=eq.{}&order=id.asc", patient_id)).await
    }

    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<TherapyPlan>> {
        self.select(
            THERAPY_PLANS,
            &format!("practitioner_id=eq.{}&order=id.asc", practitioner_id),
        )
        .await
    }
}

#[async_trait]
impl TherapySessionRepository for SupabaseRepository {
    async fn save(&self, session: NewTherapySession) -> Result<TherapySession> {
        self.insert(THERAPY_SESSIONS, to_row(&session)?).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TherapySession>> {
        self.select_one(THERAPY_SESSIONS, &format!("id=eq.{}", id)).await
    }

    async fn update_status(&self, id: i64, status: SessionStatus) -> Result<Option<TherapySession>> {
        self.patch(THERAPY_SESSIONS, id, json!({ "status": status })).await
    }

    async fn find_by_plan_id(&self, plan_id: i64) -> Result<Vec<TherapySession>> {
        self.select(
            THERAPY_SESSIONS,
            &format!("therapy_plan_id=eq.{}&order=scheduled_date.asc", plan_id),
        )
        .await
    }

    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<TherapySession>> {
        self.select(
            THERAPY_SESSIONS,
            &format!(
                "{}&therapy_plans.patient_id=eq.{}&order=scheduled_date.asc",
                SESSIONS_WITH_PLAN, patient_id
            ),
        )
        .await
    }

    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<TherapySession>> {
        self.select(
            THERAPY_SESSIONS,
            &format!(
                "{}&therapy_plans.practitioner_id=eq.{}&order=scheduled_date.asc",
                SESSIONS_WITH_PLAN, practitioner_id
            ),
        )
        .await
    }

    async fn find_by_practitioner_id_and_status(
        &self,
        practitioner_id: i64,
        status: SessionStatus,
    ) -> Result<Vec<TherapySession>> {
        self.select(
            THERAPY_SESSIONS,
            &format!(
                "{}&therapy_plans.practitioner_id=eq.{}&status=eq.{}&order=scheduled_date.asc",
                SESSIONS_WITH_PLAN, practitioner_id, status
            ),
        )
        .await
    }

    async fn find_by_practitioner_id_between(
        &self,
        practitioner_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<TherapySession>> {
        self.select(
            THERAPY_SESSIONS,
            &format!(
                "{}&therapy_plans.practitioner_id=eq.{}&scheduled_date=gte.{}&scheduled_date=lte.{}&order=scheduled_date.asc",
                SESSIONS_WITH_PLAN,
                practitioner_id,
                timestamp(&start),
                timestamp(&end)
            ),
        )
        .await
    }
}

#[async_trait]
impl FeedbackRepository for SupabaseRepository {
    async fn save(&self, feedback: NewFeedback) -> Result<Feedback> {
        let mut row = to_row(&feedback)?;
        row["created_at"] = json!(Utc::now());
        self.insert(FEEDBACKS, row).await
    }

    async fn find_by_session_id(&self, session_id: i64) -> Result<Option<Feedback>> {
        self.select_one(FEEDBACKS, &format!("session_id=eq.{}", session_id)).await
    }

    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<Feedback>> {
        self.select(
            FEEDBACKS,
            &format!("patient_id=eq.{}&order=created_at.desc", patient_id),
        )
        .await
    }

    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<Feedback>> {
        self.select(
            FEEDBACKS,
            &format!(
                "select=*,therapy_sessions!inner(therapy_plans!inner(practitioner_id))\
                 &therapy_sessions.therapy_plans.practitioner_id=eq.{}&order=created_at.desc",
                practitioner_id
            ),
        )
        .await
    }
}

#[async_trait]
impl NotificationRepository for SupabaseRepository {
    async fn save(&self, notification: NewNotification) -> Result<Notification> {
        let mut row = to_row(&notification)?;
        row["created_at"] = json!(Utc::now());
        self.insert(NOTIFICATIONS, row).await
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.select(
            NOTIFICATIONS,
            &format!("user_id=eq.{}&order=created_at.desc", user_id),
        )
        .await
    }
}
