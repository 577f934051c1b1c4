use tracing::{debug, info, warn};

use shared_database::Repositories;
use shared_models::feedback::NewFeedback;
use shared_models::therapy::SessionStatus;
use shared_utils::state::AppState;
use shared_utils::validation::{require_not_blank, require_range};

use crate::models::{FeedbackResponse, SubmitFeedbackRequest, TherapyError};
use crate::services::mapper::ResponseMapper;

pub struct FeedbackService {
    repos: Repositories,
}

impl FeedbackService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repos: state.repos.clone(),
        }
    }

    /// Records the patient's one feedback for a session and marks the session
    /// completed, whatever its prior status.
    pub async fn submit_feedback(
        &self,
        patient_id: i64,
        request: SubmitFeedbackRequest,
    ) -> Result<FeedbackResponse, TherapyError> {
        debug!(
            "Patient {} submitting feedback for session {}",
            patient_id, request.session_id
        );

        let session = self
            .repos
            .sessions
            .find_by_id(request.session_id)
            .await?
            .ok_or(TherapyError::SessionNotFound)?;

        let mut mapper = ResponseMapper::new(self.repos.clone());
        let plan = mapper.plan(session.therapy_plan_id).await?;

        if plan.patient_id != patient_id {
            warn!(
                "Patient {} tried to review session {} of patient {}",
                patient_id, session.id, plan.patient_id
            );
            return Err(TherapyError::NotSessionPatient);
        }

        if self.repos.feedback.find_by_session_id(session.id).await?.is_some() {
            warn!("Duplicate feedback for session {}", session.id);
            return Err(TherapyError::FeedbackAlreadySubmitted);
        }

        require_not_blank(&request.message, "Feedback message")?;
        require_range(request.rating, 1, 5, "Rating")?;
        if let Some(level) = request.improvement_level {
            require_range(level, 1, 10, "Improvement level")?;
        }

        let saved = self
            .repos
            .feedback
            .save(NewFeedback {
                session_id: session.id,
                patient_id,
                message: request.message.trim().to_string(),
                rating: request.rating,
                symptoms: request.symptoms,
                side_effects: request.side_effects,
                improvement_level: request.improvement_level,
            })
            .await;

        let feedback = match saved {
            Ok(feedback) => feedback,
            Err(e) => {
                // A concurrent submission for the same session won the insert.
                if self.repos.feedback.find_by_session_id(session.id).await?.is_some() {
                    warn!("Feedback insert for session {} lost a race: {}", session.id, e);
                    return Err(TherapyError::FeedbackAlreadySubmitted);
                }
                return Err(e.into());
            }
        };

        if session.status != SessionStatus::Completed {
            let completed = self
                .repos
                .sessions
                .update_status(session.id, SessionStatus::Completed)
                .await?;
            if completed.is_none() {
                warn!(
                    "Session {} vanished after feedback {} was stored; left without completion",
                    session.id, feedback.id
                );
                return Err(TherapyError::SessionNotFound);
            }
        }

        info!("Stored feedback {} for session {}", feedback.id, session.id);

        let patient = mapper.user(patient_id).await?;
        Ok(FeedbackResponse::from_parts(feedback, &session, &patient))
    }

    /// Feedback on the practitioner's sessions, newest first.
    pub async fn list_for_practitioner(
        &self,
        practitioner_id: i64,
    ) -> Result<Vec<FeedbackResponse>, TherapyError> {
        let records = self.repos.feedback.find_by_practitioner_id(practitioner_id).await?;

        let mut mapper = ResponseMapper::new(self.repos.clone());
        let mut responses = Vec::with_capacity(records.len());
        for feedback in records {
            responses.push(mapper.feedback_response(feedback).await?);
        }
        Ok(responses)
    }
}
