use std::collections::HashSet;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;
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

#[derive(Default)]
struct Tables {
    users: Vec<UserAccount>,
    profiles: Vec<PatientProfile>,
    plans: Vec<TherapyPlan>,
    sessions: Vec<TherapySession>,
    feedback: Vec<Feedback>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn plan_ids_where<F>(&self, predicate: F) -> HashSet<i64>
    where
        F: Fn(&TherapyPlan) -> bool,
    {
        self.plans.iter().filter(|p| predicate(p)).map(|p| p.id).collect()
    }

    fn sessions_under(&self, plan_ids: &HashSet<i64>) -> Vec<TherapySession> {
        let mut sessions: Vec<TherapySession> = self
            .sessions
            .iter()
            .filter(|s| plan_ids.contains(&s.therapy_plan_id))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.scheduled_date);
        sessions
    }
}

/// Process-local store. Rows are never deleted, so ids are row positions plus one.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn save(&self, user: NewUser) -> Result<UserAccount> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(anyhow!("duplicate key: users.email {}", user.email));
        }

        let account = UserAccount {
            id: next_id(tables.users.len()),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Some(Utc::now()),
        };
        tables.users.push(account.clone());
        debug!("Stored user {}", account.id);
        Ok(account)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserAccount>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }
}

#[async_trait]
impl PatientProfileRepository for InMemoryStore {
    async fn save(&self, profile: NewPatientProfile) -> Result<PatientProfile> {
        let mut tables = self.tables.write().await;
        if tables.profiles.iter().any(|p| p.user_id == profile.user_id) {
            return Err(anyhow!("duplicate key: patient_profiles.user_id {}", profile.user_id));
        }

        let stored = PatientProfile {
            id: next_id(tables.profiles.len()),
            user_id: profile.user_id,
            practitioner_id: profile.practitioner_id,
            age: profile.age,
            gender: profile.gender,
            blood_group: profile.blood_group,
            emergency_contact: profile.emergency_contact,
            medical_history: profile.medical_history,
            prakriti: profile.prakriti,
            notes: profile.notes,
        };
        tables.profiles.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, changes: PatientProfileChanges) -> Result<Option<PatientProfile>> {
        let mut tables = self.tables.write().await;
        Ok(tables.profiles.iter_mut().find(|p| p.id == id).map(|profile| {
            changes.apply_to(profile);
            profile.clone()
        }))
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<PatientProfile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<PatientProfile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| p.practitioner_id == Some(practitioner_id))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<PatientProfile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.clone())
    }
}

#[async_trait]
impl TherapyPlanRepository for InMemoryStore {
    async fn save(&self, plan: NewTherapyPlan) -> Result<TherapyPlan> {
        let mut tables = self.tables.write().await;
        let stored = TherapyPlan {
            id: next_id(tables.plans.len()),
            patient_id: plan.patient_id,
            practitioner_id: plan.practitioner_id,
            phase: plan.phase,
            description: plan.description,
            start_date: plan.start_date,
            end_date: plan.end_date,
        };
        tables.plans.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TherapyPlan>> {
        let tables = self.tables.read().await;
        Ok(tables.plans.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<TherapyPlan>> {
        let tables = self.tables.read().await;
        Ok(tables.plans.iter().filter(|p| p.patient_id == patient_id).cloned().collect())
    }

    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<TherapyPlan>> {
        let tables = self.tables.read().await;
        Ok(tables
            .plans
            .iter()
            .filter(|p| p.practitioner_id == practitioner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TherapySessionRepository for InMemoryStore {
    async fn save(&self, session: NewTherapySession) -> Result<TherapySession> {
        let mut tables = self.tables.write().await;
        if !tables.plans.iter().any(|p| p.id == session.therapy_plan_id) {
            return Err(anyhow!("foreign key violation: therapy_plans.id {}", session.therapy_plan_id));
        }

        let stored = TherapySession {
            id: next_id(tables.sessions.len()),
            therapy_plan_id: session.therapy_plan_id,
            procedure_name: session.procedure_name,
            scheduled_date: session.scheduled_date,
            notes: session.notes,
            status: session.status,
        };
        tables.sessions.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TherapySession>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn update_status(&self, id: i64, status: SessionStatus) -> Result<Option<TherapySession>> {
        let mut tables = self.tables.write().await;
        Ok(tables.sessions.iter_mut().find(|s| s.id == id).map(|session| {
            session.status = status;
            session.clone()
        }))
    }

    async fn find_by_plan_id(&self, plan_id: i64) -> Result<Vec<TherapySession>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions_under(&HashSet::from([plan_id])))
    }

    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<TherapySession>> {
        let tables = self.tables.read().await;
        let plan_ids = tables.plan_ids_where(|p| p.patient_id == patient_id);
        Ok(tables.sessions_under(&plan_ids))
    }

    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<TherapySession>> {
        let tables = self.tables.read().await;
        let plan_ids = tables.plan_ids_where(|p| p.practitioner_id == practitioner_id);
        Ok(tables.sessions_under(&plan_ids))
    }

    async fn find_by_practitioner_id_and_status(
        &self,
        practitioner_id: i64,
        status: SessionStatus,
    ) -> Result<Vec<TherapySession>> {
        let sessions = TherapySessionRepository::find_by_practitioner_id(self, practitioner_id).await?;
        Ok(sessions.into_iter().filter(|s| s.status == status).collect())
    }

    async fn find_by_practitioner_id_between(
        &self,
        practitioner_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<TherapySession>> {
        let sessions = TherapySessionRepository::find_by_practitioner_id(self, practitioner_id).await?;
        Ok(sessions
            .into_iter()
            .filter(|s| s.scheduled_date >= start && s.scheduled_date <= end)
            .collect())
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryStore {
    async fn save(&self, feedback: NewFeedback) -> Result<Feedback> {
        let mut tables = self.tables.write().await;
        if tables.feedback.iter().any(|f| f.session_id == feedback.session_id) {
            return Err(anyhow!("duplicate key: feedbacks.session_id {}", feedback.session_id));
        }

        let stored = Feedback {
            id: next_id(tables.feedback.len()),
            session_id: feedback.session_id,
            patient_id: feedback.patient_id,
            message: feedback.message,
            rating: feedback.rating,
            symptoms: feedback.symptoms,
            side_effects: feedback.side_effects,
            improvement_level: feedback.improvement_level,
            created_at: Utc::now(),
        };
        tables.feedback.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_session_id(&self, session_id: i64) -> Result<Option<Feedback>> {
        let tables = self.tables.read().await;
        Ok(tables.feedback.iter().find(|f| f.session_id == session_id).cloned())
    }

    async fn find_by_patient_id(&self, patient_id: i64) -> Result<Vec<Feedback>> {
        let tables = self.tables.read().await;
        Ok(tables.feedback.iter().filter(|f| f.patient_id == patient_id).cloned().collect())
    }

    async fn find_by_practitioner_id(&self, practitioner_id: i64) -> Result<Vec<Feedback>> {
        let tables = self.tables.read().await;
        let plan_ids = tables.plan_ids_where(|p| p.practitioner_id == practitioner_id);
        let session_ids: HashSet<i64> = tables
            .sessions
            .iter()
            .filter(|s| plan_ids.contains(&s.therapy_plan_id))
            .map(|s| s.id)
            .collect();

        let mut feedback: Vec<Feedback> = tables
            .feedback
            .iter()
            .filter(|f| session_ids.contains(&f.session_id))
            .cloned()
            .collect();
        feedback.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(feedback)
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn save(&self, notification: NewNotification) -> Result<Notification> {
        let mut tables = self.tables.write().await;
        let stored = Notification {
            id: next_id(tables.notifications.len()),
            user_id: notification.user_id,
            subject: notification.subject,
            body: notification.body,
            sent: notification.sent,
            created_at: Utc::now(),
        };
        tables.notifications.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared_models::auth::Role;
    use shared_models::therapy::Phase;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    async fn seed_plan(
        store: &InMemoryStore,
        patient_id: i64,
        practitioner_id: i64,
    ) -> TherapyPlan {
        TherapyPlanRepository::save(store, NewTherapyPlan {
            patient_id,
            practitioner_id,
            phase: Phase::Purvakarma,
            description: None,
            start_date: None,
            end_date: None,
        })
        .await
        .unwrap()
    }

    async fn seed_session(
        store: &InMemoryStore,
        plan_id: i64,
        when: NaiveDateTime,
    ) -> TherapySession {
        TherapySessionRepository::save(store, NewTherapySession {
            therapy_plan_id: plan_id,
            procedure_name: "Abhyanga".to_string(),
            scheduled_date: when,
            notes: None,
            status: SessionStatus::Scheduled,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_user_email_is_unique_case_insensitive() {
        let store = InMemoryStore::new();
        let new_user = |email: &str| NewUser {
            name: "Asha".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Patient,
        };

        let first = UserRepository::save(&store, new_user("asha@example.com")).await.unwrap();
        assert_eq!(first.id, 1);
        assert!(UserRepository::save(&store, new_user("ASHA@example.com")).await.is_err());
        assert!(store.exists_by_email("asha@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_sessions_are_scoped_through_plans_and_sorted() {
        let store = InMemoryStore::new();
        let mine = seed_plan(&store, 10, 1).await;
        let other = seed_plan(&store, 11, 2).await;

        seed_session(&store, mine.id, at(12, 0)).await;
        seed_session(&store, other.id, at(9, 0)).await;
        seed_session(&store, mine.id, at(8, 30)).await;

        let sessions = TherapySessionRepository::find_by_practitioner_id(&store, 1).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].scheduled_date < sessions[1].scheduled_date);

        let for_patient = TherapySessionRepository::find_by_patient_id(&store, 11).await.unwrap();
        assert_eq!(for_patient.len(), 1);
        assert_eq!(for_patient[0].scheduled_date, at(9, 0));
    }

    #[tokio::test]
    async fn test_range_query_is_inclusive() {
        let store = InMemoryStore::new();
        let plan = seed_plan(&store, 10, 1).await;
        seed_session(&store, plan.id, at(10, 0)).await;

        let hit = store.find_by_practitioner_id_between(1, at(9, 0), at(10, 0)).await.unwrap();
        assert_eq!(hit.len(), 1);

        let miss = store.find_by_practitioner_id_between(1, at(10, 1), at(11, 0)).await.unwrap();
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn test_second_feedback_for_session_is_rejected() {
        let store = InMemoryStore::new();
        let plan = seed_plan(&store, 10, 1).await;
        let session = seed_session(&store, plan.id, at(10, 0)).await;
        let feedback = || NewFeedback {
            session_id: session.id,
            patient_id: 10,
            message: "Felt lighter".to_string(),
            rating: 5,
            symptoms: None,
            side_effects: None,
            improvement_level: Some(7),
        };

        FeedbackRepository::save(&store, feedback()).await.unwrap();
        assert!(FeedbackRepository::save(&store, feedback()).await.is_err());
        assert_eq!(FeedbackRepository::find_by_patient_id(&store, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_session_requires_existing_plan() {
        let store = InMemoryStore::new();
        let result = TherapySessionRepository::save(&store, NewTherapySession {
            therapy_plan_id: 99,
            procedure_name: "Basti".to_string(),
            scheduled_date: at(10, 0),
            notes: None,
            status: SessionStatus::Scheduled,
        })
        .await;

        assert!(result.is_err());
    }
}
