use std::collections::HashMap;

use shared_database::Repositories;
use shared_models::feedback::Feedback;
use shared_models::therapy::{TherapyPlan, TherapySession};
use shared_models::user::UserAccount;

use crate::models::{FeedbackResponse, TherapyError, TherapyPlanResponse, TherapySessionResponse};

/// Resolves ids into the names and nested records the responses carry.
/// Plans and users are memoised for the lifetime of one request.
pub struct ResponseMapper {
    repos: Repositories,
    plans: HashMap<i64, TherapyPlan>,
    users: HashMap<i64, UserAccount>,
}

impl ResponseMapper {
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            plans: HashMap::new(),
            users: HashMap::new(),
        }
    }

    pub async fn user(&mut self, id: i64) -> Result<UserAccount, TherapyError> {
        if let Some(user) = self.users.get(&id) {
            return Ok(user.clone());
        }
        let user = self
            .repos
            .users
            .find_by_id(id)
            .await?
            .ok_or(TherapyError::UserNotFound(id))?;
        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub async fn plan(&mut self, id: i64) -> Result<TherapyPlan, TherapyError> {
        if let Some(plan) = self.plans.get(&id) {
            return Ok(plan.clone());
        }
        let plan = self
            .repos
            .plans
            .find_by_id(id)
            .await?
            .ok_or(TherapyError::PlanNotFound)?;
        self.plans.insert(id, plan.clone());
        Ok(plan)
    }

    pub async fn plan_response(
        &mut self,
        plan: TherapyPlan,
    ) -> Result<TherapyPlanResponse, TherapyError> {
        let patient = self.user(plan.patient_id).await?;
        let practitioner = self.user(plan.practitioner_id).await?;

        Ok(TherapyPlanResponse {
            id: plan.id,
            patient_id: plan.patient_id,
            patient_name: patient.name,
            practitioner_id: plan.practitioner_id,
            practitioner_name: practitioner.name,
            phase: plan.phase,
            description: plan.description,
            start_date: plan.start_date,
            end_date: plan.end_date,
        })
    }

    pub async fn session_response(
        &mut self,
        session: TherapySession,
    ) -> Result<TherapySessionResponse, TherapyError> {
        let plan = self.plan(session.therapy_plan_id).await?;
        let patient = self.user(plan.patient_id).await?;
        let practitioner = self.user(plan.practitioner_id).await?;

        let feedback = match self.repos.feedback.find_by_session_id(session.id).await? {
            Some(f) => Some(FeedbackResponse::from_parts(f, &session, &patient)),
            None => None,
        };

        Ok(TherapySessionResponse {
            id: session.id,
            therapy_plan_id: plan.id,
            phase: plan.phase,
            procedure_name: session.procedure_name,
            scheduled_date: session.scheduled_date,
            notes: session.notes,
            status: session.status,
            practitioner_name: practitioner.name,
            patient_name: patient.name,
            feedback,
        })
    }

    pub async fn session_responses(
        &mut self,
        sessions: Vec<TherapySession>,
    ) -> Result<Vec<TherapySessionResponse>, TherapyError> {
        let mut responses = Vec::with_capacity(sessions.len());
        for session in sessions {
            responses.push(self.session_response(session).await?);
        }
        Ok(responses)
    }

    pub async fn feedback_response(
        &mut self,
        feedback: Feedback,
    ) -> Result<FeedbackResponse, TherapyError> {
        let session = self
            .repos
            .sessions
            .find_by_id(feedback.session_id)
            .await?
            .ok_or(TherapyError::SessionNotFound)?;
        let patient = self.user(feedback.patient_id).await?;

        Ok(FeedbackResponse::from_parts(feedback, &session, &patient))
    }
}

impl FeedbackResponse {
    pub fn from_parts(feedback: Feedback, session: &TherapySession, patient: &UserAccount) -> Self {
        Self {
            id: feedback.id,
            session_id: feedback.session_id,
            procedure_name: session.procedure_name.clone(),
            patient_name: patient.name.clone(),
            message: feedback.message,
            rating: feedback.rating,
            symptoms: feedback.symptoms,
            side_effects: feedback.side_effects,
            improvement_level: feedback.improvement_level,
            created_at: feedback.created_at,
        }
    }
}
