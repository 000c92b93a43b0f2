//! Game lifecycle guards.
//!
//! The session moves `Created → Started → Finished`; `reset` returns it to
//! the created-equivalent state from anywhere. These guards are pure checks
//! over the two lifecycle flags — the caller performs the actual state
//! writes (timestamps, leaderboard rebuild, team detachment).

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Plain-data view of the game session's lifecycle flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub has_started: bool,
    pub has_finished: bool,
}

/// Guard for `start`: a session may only be started once (until reset).
pub fn check_start(session: &SessionState) -> Result<(), GameError> {
    if session.has_started {
        return Err(GameError::AlreadyStarted);
    }
    Ok(())
}

/// Guard for `finish`: requires a started session, and a second finish is
/// rejected rather than silently overwriting the end time.
pub fn check_finish(session: &SessionState) -> Result<(), GameError> {
    if !session.has_started {
        return Err(GameError::GameNotStarted);
    }
    if session.has_finished {
        return Err(GameError::AlreadyFinished);
    }
    Ok(())
}

/// Guard for player submissions: the game must be running.
pub fn check_submission_open(session: &SessionState) -> Result<(), GameError> {
    if !session.has_started {
        return Err(GameError::GameNotStarted);
    }
    if session.has_finished {
        return Err(GameError::AlreadyFinished);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_only_once() {
        let fresh = SessionState::default();
        assert!(check_start(&fresh).is_ok());
        let started = SessionState {
            has_started: true,
            has_finished: false,
        };
        assert_eq!(check_start(&started), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn test_finish_requires_start_and_rejects_repeat() {
        let fresh = SessionState::default();
        assert_eq!(check_finish(&fresh), Err(GameError::GameNotStarted));

        let started = SessionState {
            has_started: true,
            has_finished: false,
        };
        assert!(check_finish(&started).is_ok());

        let finished = SessionState {
            has_started: true,
            has_finished: true,
        };
        assert_eq!(check_finish(&finished), Err(GameError::AlreadyFinished));
    }

    #[test]
    fn test_submissions_only_while_running() {
        let fresh = SessionState::default();
        assert_eq!(check_submission_open(&fresh), Err(GameError::GameNotStarted));

        let started = SessionState {
            has_started: true,
            has_finished: false,
        };
        assert!(check_submission_open(&started).is_ok());

        let finished = SessionState {
            has_started: true,
            has_finished: true,
        };
        assert_eq!(
            check_submission_open(&finished),
            Err(GameError::AlreadyFinished)
        );
    }
}
