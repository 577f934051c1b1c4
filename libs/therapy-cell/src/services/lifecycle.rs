use shared_models::therapy::SessionStatus;

use crate::models::TherapyError;

/// Checks a practitioner-requested status change. A session leaves
/// `SCHEDULED` once and never returns to it.
pub fn transition(from: SessionStatus, to: SessionStatus) -> Result<SessionStatus, TherapyError> {
    match (from, to) {
        (SessionStatus::Scheduled, SessionStatus::Completed)
        | (SessionStatus::Scheduled, SessionStatus::Cancelled) => Ok(to),
        _ => Err(TherapyError::InvalidTransition { from, to }),
    }
}

/// Whether entering `to` triggers the recovery-tips and feedback-request messages.
pub fn notifies_patient(to: SessionStatus) -> bool {
    to == SessionStatus::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_scheduled_can_finish_either_way() {
        assert_eq!(
            transition(SessionStatus::Scheduled, SessionStatus::Completed).unwrap(),
            SessionStatus::Completed
        );
        assert_eq!(
            transition(SessionStatus::Scheduled, SessionStatus::Cancelled).unwrap(),
            SessionStatus::Cancelled
        );
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in [SessionStatus::Completed, SessionStatus::Cancelled] {
            for to in [
                SessionStatus::Scheduled,
                SessionStatus::Completed,
                SessionStatus::Cancelled,
            ] {
                assert_matches!(transition(from, to), Err(TherapyError::InvalidTransition { .. }));
            }
        }
        assert_matches!(
            transition(SessionStatus::Scheduled, SessionStatus::Scheduled),
            Err(TherapyError::InvalidTransition { .. })
        );
    }

    #[test]
    fn test_only_completion_notifies() {
        assert!(notifies_patient(SessionStatus::Completed));
        assert!(!notifies_patient(SessionStatus::Cancelled));
    }
}
