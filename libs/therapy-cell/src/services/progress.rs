use tracing::debug;

use shared_database::Repositories;
use shared_models::therapy::{Phase, SessionStatus};
use shared_utils::state::AppState;

use crate::models::{PhaseProgress, TherapyError, TherapyProgressResponse, TherapySessionResponse};
use crate::services::mapper::ResponseMapper;

pub struct ProgressService {
    repos: Repositories,
}

impl ProgressService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repos: state.repos.clone(),
        }
    }

    /// The patient's sessions across all plans, earliest first.
    pub async fn my_sessions(
        &self,
        patient_id: i64,
    ) -> Result<Vec<TherapySessionResponse>, TherapyError> {
        let sessions = self.repos.sessions.find_by_patient_id(patient_id).await?;

        let mut mapper = ResponseMapper::new(self.repos.clone());
        mapper.session_responses(sessions).await
    }

    pub async fn therapy_progress(
        &self,
        patient_id: i64,
    ) -> Result<TherapyProgressResponse, TherapyError> {
        debug!("Building therapy progress for patient {}", patient_id);

        let sessions = self.my_sessions(patient_id).await?;
        Ok(summarize(sessions))
    }
}

/// Percentage of `completed` in `total`, 0 for an empty set.
pub fn percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    completed as f64 / total as f64 * 100.0
}

/// Groups sessions by the phase of their plan. Every phase appears, in
/// treatment order, with its sessions earliest first.
pub fn summarize(sessions: Vec<TherapySessionResponse>) -> TherapyProgressResponse {
    let total_sessions = sessions.len();
    let completed_sessions = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .count();

    let mut phases: Vec<PhaseProgress> = Phase::ALL
        .iter()
        .map(|&phase| PhaseProgress {
            phase,
            total: 0,
            completed: 0,
            percentage: 0.0,
            sessions: Vec::new(),
        })
        .collect();

    for session in sessions {
        if let Some(bucket) = phases.iter_mut().find(|p| p.phase == session.phase) {
            bucket.sessions.push(session);
        }
    }

    for bucket in &mut phases {
        bucket.sessions.sort_by_key(|s| s.scheduled_date);
        bucket.total = bucket.sessions.len();
        bucket.completed = bucket
            .sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Completed)
            .count();
        bucket.percentage = percentage(bucket.completed, bucket.total);
    }

    TherapyProgressResponse {
        total_sessions,
        completed_sessions,
        completion_percentage: percentage(completed_sessions, total_sessions),
        phases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use shared_utils::test_utils::jan_10;

    fn session(
        id: i64,
        phase: Phase,
        status: SessionStatus,
        at: NaiveDateTime,
    ) -> TherapySessionResponse {
        TherapySessionResponse {
            id,
            therapy_plan_id: 1,
            phase,
            procedure_name: format!("Procedure {}", id),
            scheduled_date: at,
            notes: None,
            status,
            practitioner_name: "Dr Rao".to_string(),
            patient_name: "Meera".to_string(),
            feedback: None,
        }
    }

    #[test]
    fn test_empty_history_reports_every_phase_at_zero() {
        let report = summarize(Vec::new());

        assert_eq!(report.total_sessions, 0);
        assert_eq!(report.completion_percentage, 0.0);
        let phases: Vec<Phase> = report.phases.iter().map(|p| p.phase).collect();
        assert_eq!(phases, Phase::ALL.to_vec());
        assert!(report.phases.iter().all(|p| p.total == 0 && p.percentage == 0.0));
    }

    #[test]
    fn test_counts_per_phase_add_up() {
        let report = summarize(vec![
            session(1, Phase::Purvakarma, SessionStatus::Completed, jan_10(9, 0)),
            session(2, Phase::Purvakarma, SessionStatus::Scheduled, jan_10(8, 0)),
            session(3, Phase::Pradhanakarma, SessionStatus::Completed, jan_10(12, 0)),
            session(4, Phase::Purvakarma, SessionStatus::Cancelled, jan_10(15, 0)),
        ]);

        assert_eq!(report.total_sessions, 4);
        assert_eq!(report.completed_sessions, 2);
        assert_eq!(report.completion_percentage, 50.0);
        assert_eq!(report.phases.iter().map(|p| p.total).sum::<usize>(), report.total_sessions);

        let purva = &report.phases[0];
        assert_eq!(purva.total, 3);
        assert_eq!(purva.completed, 1);
        assert!((purva.percentage - 100.0 / 3.0).abs() < 1e-9);
        let order: Vec<i64> = purva.sessions.iter().map(|s| s.id).collect();
        assert_eq!(order, vec![2, 1, 4]);

        assert_eq!(report.phases[1].percentage, 100.0);
        assert_eq!(report.phases[2].total, 0);
    }

    #[test]
    fn test_percentage_bounds() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 3), 100.0);
        assert_eq!(percentage(1, 4), 25.0);
    }
}
