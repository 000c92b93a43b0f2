//! Structured errors for game operations.
//!
//! Every fallible operation in this crate returns [`GameError`]. The server
//! module converts these to strings at the reducer boundary; nothing in the
//! engine panics on bad input.

use std::error::Error;
use std::fmt;

/// Coarse classification of a [`GameError`], used by callers that only care
/// whether a failure is retryable or indicates a broken deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input from the caller.
    Validation,
    /// The operation is valid but not in the current state (retry later or
    /// not at all).
    StateConflict,
    /// A referenced team, level, or question does not exist.
    NotFound,
    /// The stored leaderboard shape disagrees with the level catalog —
    /// start/reset were run in the wrong order.
    ConfigInconsistency,
}

/// All error conditions the progression engine and leaderboard can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A required input field was missing or empty.
    MissingInput {
        /// Name of the missing field.
        field: &'static str,
    },
    /// The team completed a question less than the cooldown ago.
    SubmissionTooFast {
        /// Seconds remaining before the next submission is accepted.
        wait_secs: i64,
    },
    /// The team already submitted the final level's code.
    AlreadyCompleted,
    /// The game has not been started (or the team has no allotted level).
    GameNotStarted,
    /// `start` was called on a session that already started.
    AlreadyStarted,
    /// `finish` was called on a session that already finished.
    AlreadyFinished,
    /// The team is blocked by an admin and cannot submit.
    TeamBlocked,
    /// The computed next level does not exist in the catalog — leaderboard
    /// and catalog are out of sync.
    NextLevelNotFound {
        /// The level number that could not be resolved.
        level: u32,
    },
    /// The level has no questions to allot.
    NoQuestionsAvailable {
        /// The level number that has an empty question set.
        level: u32,
    },
    /// No leaderboard exists — the game was never properly started.
    LeaderboardMissing,
    /// The leaderboard bucket count does not match the level catalog.
    LeaderboardSizeMismatch {
        /// Buckets actually present.
        buckets: usize,
        /// Buckets expected (`total_levels + 1`).
        expected: usize,
    },
    /// A bucket index outside the leaderboard was addressed.
    BucketOutOfRange {
        /// The requested level number.
        level: u32,
        /// Buckets present.
        buckets: usize,
    },
}

impl GameError {
    /// Classify this error into the coarse taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::MissingInput { .. } => ErrorKind::Validation,
            GameError::SubmissionTooFast { .. }
            | GameError::AlreadyCompleted
            | GameError::GameNotStarted
            | GameError::AlreadyStarted
            | GameError::AlreadyFinished
            | GameError::TeamBlocked => ErrorKind::StateConflict,
            GameError::NextLevelNotFound { .. } | GameError::NoQuestionsAvailable { .. } => {
                ErrorKind::NotFound
            }
            GameError::LeaderboardMissing
            | GameError::LeaderboardSizeMismatch { .. }
            | GameError::BucketOutOfRange { .. } => ErrorKind::ConfigInconsistency,
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::MissingInput { field } => {
                write!(f, "{} is required", field)
            }
            GameError::SubmissionTooFast { wait_secs } => {
                write!(
                    f,
                    "You cannot submit a new question so quickly. Please wait {} more seconds.",
                    wait_secs
                )
            }
            GameError::AlreadyCompleted => {
                write!(f, "Team has already completed and submitted the last level")
            }
            GameError::GameNotStarted => {
                write!(f, "The game has not been started yet")
            }
            GameError::AlreadyStarted => {
                write!(f, "The game has already been started")
            }
            GameError::AlreadyFinished => {
                write!(f, "The game has already been finished")
            }
            GameError::TeamBlocked => {
                write!(f, "Team is blocked and cannot submit")
            }
            GameError::NextLevelNotFound { level } => {
                write!(f, "Next level {} not found", level)
            }
            GameError::NoQuestionsAvailable { level } => {
                write!(f, "Level {} has no questions to allot", level)
            }
            GameError::LeaderboardMissing => {
                write!(f, "Leaderboard not found — game not properly started")
            }
            GameError::LeaderboardSizeMismatch { buckets, expected } => {
                write!(
                    f,
                    "Leaderboard has {} buckets but the level catalog requires {}",
                    buckets, expected
                )
            }
            GameError::BucketOutOfRange { level, buckets } => {
                write!(
                    f,
                    "Level {} is outside the leaderboard ({} buckets)",
                    level, buckets
                )
            }
        }
    }
}

impl Error for GameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            GameError::SubmissionTooFast { wait_secs: 12 }.kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            GameError::NextLevelNotFound { level: 4 }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            GameError::LeaderboardSizeMismatch {
                buckets: 3,
                expected: 5
            }
            .kind(),
            ErrorKind::ConfigInconsistency
        );
    }

    #[test]
    fn test_display_mentions_wait() {
        let msg = GameError::SubmissionTooFast { wait_secs: 42 }.to_string();
        assert!(msg.contains("42"));
    }
}
