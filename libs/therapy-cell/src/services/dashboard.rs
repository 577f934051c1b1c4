use std::collections::HashSet;

use tracing::debug;

use patient_cell::PatientService;
use shared_config::DashboardPatientScope;
use shared_database::Repositories;
use shared_models::therapy::SessionStatus;
use shared_utils::state::AppState;

use crate::models::{DashboardResponse, TherapyError};
use crate::services::mapper::ResponseMapper;

pub const RECENT_PATIENTS: usize = 5;

/// Which patient profiles count toward the dashboard's patient fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientScope {
    /// Every profile in the clinic.
    All,
    /// Profiles assigned to the given practitioner.
    AssignedTo(i64),
}

impl PatientScope {
    pub fn for_practitioner(configured: DashboardPatientScope, practitioner_id: i64) -> Self {
        match configured {
            DashboardPatientScope::All => PatientScope::All,
            DashboardPatientScope::Assigned => PatientScope::AssignedTo(practitioner_id),
        }
    }
}

pub struct DashboardService {
    repos: Repositories,
    patients: PatientService,
}

impl DashboardService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repos: state.repos.clone(),
            patients: PatientService::new(state),
        }
    }

    pub async fn dashboard(
        &self,
        practitioner_id: i64,
        scope: PatientScope,
    ) -> Result<DashboardResponse, TherapyError> {
        debug!("Building dashboard for practitioner {} ({:?})", practitioner_id, scope);

        let sessions = self.repos.sessions.find_by_practitioner_id(practitioner_id).await?;
        let upcoming = self
            .repos
            .sessions
            .find_by_practitioner_id_and_status(practitioner_id, SessionStatus::Scheduled)
            .await?;

        let reviewed: HashSet<i64> = self
            .repos
            .feedback
            .find_by_practitioner_id(practitioner_id)
            .await?
            .into_iter()
            .map(|f| f.session_id)
            .collect();

        let completed: Vec<i64> = sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Completed)
            .map(|s| s.id)
            .collect();
        let pending_feedback = completed.iter().filter(|id| !reviewed.contains(id)).count();

        let mut profiles = match scope {
            PatientScope::All => self.repos.profiles.find_all().await?,
            PatientScope::AssignedTo(id) => self.repos.profiles.find_by_practitioner_id(id).await?,
        };
        let total_patients = profiles.len();
        profiles.sort_by(|a, b| b.id.cmp(&a.id));
        profiles.truncate(RECENT_PATIENTS);
        let recent_patients = self.patients.to_responses(profiles).await?;

        let upcoming_sessions = upcoming.len();
        let mut mapper = ResponseMapper::new(self.repos.clone());
        let upcoming_session_list = mapper.session_responses(upcoming).await?;

        Ok(DashboardResponse {
            total_patients,
            total_sessions: sessions.len(),
            completed_sessions: completed.len(),
            upcoming_sessions,
            pending_feedback,
            upcoming_session_list,
            recent_patients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::feedback::NewFeedback;
    use shared_models::therapy::{NewTherapySession, Phase};
    use shared_utils::test_utils::{jan_10, seed_patient, seed_plan, seed_practitioner, TestConfig};

    #[test]
    fn test_scope_from_config() {
        assert_eq!(
            PatientScope::for_practitioner(DashboardPatientScope::Assigned, 4),
            PatientScope::AssignedTo(4)
        );
        assert_eq!(
            PatientScope::for_practitioner(DashboardPatientScope::All, 4),
            PatientScope::All
        );
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let state = TestConfig::default().to_state();
        let rao = seed_practitioner(&state, "Dr Rao").await;
        let iyer = seed_practitioner(&state, "Dr Iyer").await;
        let meera = seed_patient(&state, "Meera", Some(rao.id())).await;
        seed_patient(&state, "Ravi", Some(iyer.id())).await;
        let plan = seed_plan(&state, meera.id(), rao.id(), Phase::Pradhanakarma).await;

        let mut ids = Vec::new();
        for (hour, status) in [
            (8, SessionStatus::Completed),
            (10, SessionStatus::Completed),
            (12, SessionStatus::Scheduled),
            (14, SessionStatus::Cancelled),
        ] {
            let session = state
                .repos
                .sessions
                .save(NewTherapySession {
                    therapy_plan_id: plan.id,
                    procedure_name: "Basti".to_string(),
                    scheduled_date: jan_10(hour, 0),
                    notes: None,
                    status,
                })
                .await
                .unwrap();
            ids.push(session.id);
        }
        state
            .repos
            .feedback
            .save(NewFeedback {
                session_id: ids[0],
                patient_id: meera.id(),
                message: "Good".to_string(),
                rating: 5,
                symptoms: None,
                side_effects: None,
                improvement_level: None,
            })
            .await
            .unwrap();

        let service = DashboardService::new(&state);

        let assigned = service
            .dashboard(rao.id(), PatientScope::AssignedTo(rao.id()))
            .await
            .unwrap();
        assert_eq!(assigned.total_sessions, 4);
        assert_eq!(assigned.completed_sessions, 2);
        assert_eq!(assigned.upcoming_sessions, 1);
        assert_eq!(assigned.upcoming_session_list[0].id, ids[2]);
        assert_eq!(assigned.pending_feedback, 1);
        assert_eq!(assigned.total_patients, 1);
        assert_eq!(assigned.recent_patients[0].name, "Meera");

        let everyone = service.dashboard(rao.id(), PatientScope::All).await.unwrap();
        assert_eq!(everyone.total_patients, 2);
        assert_eq!(everyone.recent_patients[0].name, "Ravi");
        assert_eq!(everyone.total_sessions, 4);
    }

    #[tokio::test]
    async fn test_recent_patients_capped_at_five() {
        let state = TestConfig::default().to_state();
        let rao = seed_practitioner(&state, "Dr Rao").await;
        for i in 0..7 {
            seed_patient(&state, &format!("Patient {}", i), Some(rao.id())).await;
        }

        let service = DashboardService::new(&state);
        let board = service.dashboard(rao.id(), PatientScope::AssignedTo(rao.id())).await.unwrap();

        assert_eq!(board.total_patients, 7);
        assert_eq!(board.recent_patients.len(), RECENT_PATIENTS);
        assert_eq!(board.recent_patients[0].name, "Patient 6");
    }
}
