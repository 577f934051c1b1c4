//! Storage seams. Every relationship is an id; joins happen inside the
//! implementations, never through object graphs.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

use shared_models::feedback::{Feedback, NewFeedback};
use shared_models::notification::{NewNotification, Notification};
use shared_models::patient::{NewPatientProfile, PatientProfile, PatientProfileChanges};
use shared_models::therapy::{
    NewTherapyPlan, NewTherapySession, SessionStatus, TherapyPlan, TherapySession,
};
use shared_models::user::{NewUser, UserAccount};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: NewUser) -> Result<UserAccount>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UserAccount>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>>;

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}

#[async_trait]
pub trait PatientProfileRepository: Send + Sync {
    async fn save(&self, profile: NewPatientProfile) -> Result<PatientProfile>;
    async fn update(&self, id: i64, changes: PatientProfileChanges) -> Result<Option<PatientProfile>>;
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<PatientProfile>>;
    /// Profiles assigned to a practitioner, ascending id.
    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<PatientProfile>>;
    /// Every profile, ascending id.
    async fn find_all(&self) -> Result<Vec<PatientProfile>>;
}

#[async_trait]
pub trait TherapyPlanRepository: Send + Sync {
    async fn save(&self, plan: NewTherapyPlan) -> Result<TherapyPlan>;
    async fn find_by_id(&self, id: i64) -> Result<Option<TherapyPlan>>;
    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<TherapyPlan>>;
    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<TherapyPlan>>;
}

/// Session listings are ordered by scheduled date ascending.
#[async_trait]
pub trait TherapySessionRepository: Send + Sync {
    async fn save(&self, session: NewTherapySession) -> Result<TherapySession>;
    async fn find_by_id(&self, id: i64) -> Result<Option<TherapySession>>;
    async fn update_status(&self, id: i64, status: SessionStatus) -> Result<Option<TherapySession>>;
    async fn find_by_plan_id(&self, plan_id: i64) -> Result<Vec<TherapySession>>;
    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<TherapySession>>;
    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<TherapySession>>;
    async fn find_by_practitioner_id_and_status(
        &self,
        practitioner_id: i64,
        status: SessionStatus,
    ) -> Result<Vec<TherapySession>>;
    /// Sessions under the practitioner's plans with `start <= scheduled_date <= end`.
    async fn find_by_practitioner_id_between(
        &self,
        practitioner_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<TherapySession>>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Fails if the session already has feedback.
    async fn save(&self, feedback: NewFeedback) -> Result<Feedback>;
    async fn find_by_session_id(&self, session_id: i64) -> Result<Option<Feedback>>;
    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<Feedback>>;
    /// Feedback on sessions under the practitioner's plans, newest first.
    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<Feedback>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn save(&self, notification: NewNotification) -> Result<Notification>;
    /// Newest first.
    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Notification>>;
}
