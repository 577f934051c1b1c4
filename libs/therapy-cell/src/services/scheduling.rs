use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use notification_cell::NotificationService;
use shared_database::Repositories;
use shared_models::therapy::{NewTherapySession, SessionStatus};
use shared_utils::state::AppState;
use shared_utils::validation::require_not_blank;

use crate::models::{ScheduleSessionRequest, TherapyError, TherapySessionResponse};
use crate::services::conflict::{conflict_error, ConflictWindow};
use crate::services::lifecycle;
use crate::services::mapper::ResponseMapper;

pub struct SchedulingService {
    repos: Repositories,
    notifications: NotificationService,
    window: ConflictWindow,
    guard: Arc<Mutex<()>>,
}

impl SchedulingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repos: state.repos.clone(),
            notifications: NotificationService::mock_email(state.repos.notifications.clone()),
            window: ConflictWindow::new(state.config.conflict_window_minutes),
            guard: state.scheduling_guard.clone(),
        }
    }

    /// Books a session under one of the caller's plans if the practitioner
    /// has nothing else inside the conflict window.
    pub async fn schedule_session(
        &self,
        practitioner_id: i64,
        request: ScheduleSessionRequest,
    ) -> Result<TherapySessionResponse, TherapyError> {
        require_not_blank(&request.procedure_name, "Procedure name")?;

        let plan = self
            .repos
            .plans
            .find_by_id(request.therapy_plan_id)
            .await?
            .ok_or(TherapyError::PlanNotFound)?;

        if plan.practitioner_id != practitioner_id {
            warn!(
                "Practitioner {} tried to schedule under plan {} owned by {}",
                practitioner_id, plan.id, plan.practitioner_id
            );
            return Err(TherapyError::NotPlanOwner("schedule sessions"));
        }

        let patient = self
            .repos
            .users
            .find_by_id(plan.patient_id)
            .await?
            .ok_or(TherapyError::PatientNotFound(plan.patient_id))?;

        let proposed = request.scheduled_date;
        debug!(
            "Checking {} for practitioner {} (+/- {} min)",
            proposed,
            practitioner_id,
            self.window.minutes()
        );
        let (start, end) = self.window.bounds(proposed)?;

        let session = {
            let _held = self.guard.lock().await;

            let nearby = self
                .repos
                .sessions
                .find_by_practitioner_id_between(practitioner_id, start, end)
                .await?;

            if let Some(existing) = self.window.first_conflict(proposed, &nearby)? {
                warn!(
                    "Schedule conflict for practitioner {}: session {} at {}",
                    practitioner_id, existing.id, existing.scheduled_date
                );
                return Err(conflict_error(existing));
            }

            self.repos
                .sessions
                .save(NewTherapySession {
                    therapy_plan_id: plan.id,
                    procedure_name: request.procedure_name.trim().to_string(),
                    scheduled_date: proposed,
                    notes: request.notes,
                    status: SessionStatus::Scheduled,
                })
                .await?
        };

        info!(
            "Scheduled session {} ({}) at {} under plan {}",
            session.id, session.procedure_name, session.scheduled_date, plan.id
        );

        self.notifications
            .send_session_reminder(&patient, &session.procedure_name, session.scheduled_date)
            .await;
        self.notifications
            .send_pre_procedure_instructions(&patient, &session.procedure_name)
            .await;

        let mut mapper = ResponseMapper::new(self.repos.clone());
        mapper.session_response(session).await
    }

    pub async fn update_status(
        &self,
        practitioner_id: i64,
        session_id: i64,
        requested: SessionStatus,
    ) -> Result<TherapySessionResponse, TherapyError> {
        let session = self
            .repos
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(TherapyError::SessionNotFound)?;

        let mut mapper = ResponseMapper::new(self.repos.clone());
        let plan = mapper.plan(session.therapy_plan_id).await?;

        if plan.practitioner_id != practitioner_id {
            warn!(
                "Practitioner {} tried to update session {} owned by {}",
                practitioner_id, session.id, plan.practitioner_id
            );
            return Err(TherapyError::NotPlanOwner("update sessions"));
        }

        let next = lifecycle::transition(session.status, requested)?;

        let updated = self
            .repos
            .sessions
            .update_status(session.id, next)
            .await?
            .ok_or(TherapyError::SessionNotFound)?;

        info!("Session {} moved {} -> {}", updated.id, session.status, updated.status);

        if lifecycle::notifies_patient(next) {
            let patient = mapper.user(plan.patient_id).await?;
            self.notifications
                .send_post_procedure_tips(&patient, &updated.procedure_name)
                .await;
            self.notifications
                .send_feedback_request(&patient, &updated.procedure_name)
                .await;
        }

        mapper.session_response(updated).await
    }
}
