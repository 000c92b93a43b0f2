//! Submission evaluation — the core progression state machine.
//!
//! [`evaluate_submission`] is a pure function: it takes a snapshot of one
//! team plus the current time and decides whether the team is held, advanced
//! one level, or marked complete. It mutates nothing; the caller applies the
//! returned [`Advance`] command (persist the team, append history, allot the
//! next question, move the leaderboard entry). The code-correctness check and
//! the team-leader capability check happen before this function is called.

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Minimum gap between two accepted submissions from the same team.
pub const SUBMISSION_COOLDOWN_SECS: i64 = 60;

const MICROS_PER_SEC: i64 = 1_000_000;
const MICROS_PER_MIN: f64 = 60.0 * 1_000_000.0;

/// Plain-data view of one team's progression state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TeamSnapshot {
    /// Level the team currently occupies, if the game allotted one.
    pub current_level: Option<u32>,
    /// When the team entered its current level (micros since Unix epoch).
    pub level_started_at_micros: Option<i64>,
    /// Completion time of the team's most recent history entry, if any.
    pub last_completed_at_micros: Option<i64>,
    /// Set once the team submits the final level's code.
    pub has_completed_all_levels: bool,
    /// Admin-set flag; blocked teams cannot submit.
    pub blocked: bool,
}

/// The command produced by a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Advance {
    /// More levels remain: move the team to `next_level` and allot it a
    /// fresh question from that level.
    NextLevel {
        /// The level the team just finished.
        completed_level: u32,
        /// The level the team moves to.
        next_level: u32,
        /// Time spent on the finished level, for the history record only.
        elapsed_minutes: f64,
    },
    /// The team finished the final level: move it to the terminal bucket
    /// and detach its current question.
    AllLevelsComplete {
        /// The final level the team just finished.
        completed_level: u32,
        /// The terminal bucket number (`total_levels + 1`).
        terminal_level: u32,
        /// Time spent on the final level.
        elapsed_minutes: f64,
    },
}

impl Advance {
    /// The bucket the team leaves.
    pub fn from_level(&self) -> u32 {
        match self {
            Advance::NextLevel {
                completed_level, ..
            }
            | Advance::AllLevelsComplete {
                completed_level, ..
            } => *completed_level,
        }
    }

    /// The bucket the team enters.
    pub fn to_level(&self) -> u32 {
        match self {
            Advance::NextLevel { next_level, .. } => *next_level,
            Advance::AllLevelsComplete { terminal_level, .. } => *terminal_level,
        }
    }

    /// Minutes spent on the level just completed.
    pub fn elapsed_minutes(&self) -> f64 {
        match self {
            Advance::NextLevel {
                elapsed_minutes, ..
            }
            | Advance::AllLevelsComplete {
                elapsed_minutes, ..
            } => *elapsed_minutes,
        }
    }
}

/// Decide the outcome of a correct-code submission for one team.
///
/// `total_levels` is the count of real levels (terminal bucket excluded),
/// derived by the caller from the leaderboard shape. Order of checks:
/// blocked, detached (no current level), spam throttle, then the
/// final-level / next-level branch.
pub fn evaluate_submission(
    team: &TeamSnapshot,
    now_micros: i64,
    total_levels: u32,
) -> Result<Advance, GameError> {
    if team.blocked {
        return Err(GameError::TeamBlocked);
    }

    let level_num = team.current_level.ok_or(GameError::GameNotStarted)?;

    // Anti-spam throttle: reject before touching any state.
    if let Some(last) = team.last_completed_at_micros {
        let delay_secs = (now_micros - last) / MICROS_PER_SEC;
        if delay_secs < SUBMISSION_COOLDOWN_SECS {
            return Err(GameError::SubmissionTooFast {
                wait_secs: SUBMISSION_COOLDOWN_SECS - delay_secs,
            });
        }
    }

    // History record only — no score is computed in this variant.
    let elapsed_minutes = team
        .level_started_at_micros
        .map(|started| (now_micros - started) as f64 / MICROS_PER_MIN)
        .unwrap_or(0.0);

    if level_num == total_levels {
        // Team is on the final real level.
        if team.has_completed_all_levels {
            return Err(GameError::AlreadyCompleted);
        }
        return Ok(Advance::AllLevelsComplete {
            completed_level: level_num,
            terminal_level: total_levels + 1,
            elapsed_minutes,
        });
    }

    let next_level = level_num + 1;
    if next_level > total_levels {
        // Only reachable when the team's level exceeds the catalog —
        // leaderboard and catalog have desynced.
        return Err(GameError::NextLevelNotFound { level: next_level });
    }

    Ok(Advance::NextLevel {
        completed_level: level_num,
        next_level,
        elapsed_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: i64 = 60 * MICROS_PER_SEC;

    fn team_on(level: u32) -> TeamSnapshot {
        TeamSnapshot {
            current_level: Some(level),
            level_started_at_micros: Some(0),
            last_completed_at_micros: None,
            has_completed_all_levels: false,
            blocked: false,
        }
    }

    #[test]
    fn test_advances_to_next_level() {
        let advance = evaluate_submission(&team_on(1), 5 * MIN, 3).unwrap();
        assert_eq!(
            advance,
            Advance::NextLevel {
                completed_level: 1,
                next_level: 2,
                elapsed_minutes: 5.0,
            }
        );
        assert_eq!(advance.from_level(), 1);
        assert_eq!(advance.to_level(), 2);
    }

    #[test]
    fn test_final_level_completes() {
        let advance = evaluate_submission(&team_on(3), 2 * MIN, 3).unwrap();
        assert_eq!(
            advance,
            Advance::AllLevelsComplete {
                completed_level: 3,
                terminal_level: 4,
                elapsed_minutes: 2.0,
            }
        );
        // Never lands past the terminal bucket.
        assert_eq!(advance.to_level(), 4);
    }

    #[test]
    fn test_already_completed_rejected() {
        let mut team = team_on(3);
        team.has_completed_all_levels = true;
        assert_eq!(
            evaluate_submission(&team, 2 * MIN, 3),
            Err(GameError::AlreadyCompleted)
        );
    }

    #[test]
    fn test_spam_throttle() {
        let mut team = team_on(2);
        team.last_completed_at_micros = Some(0);
        // 45 seconds after the last completion: rejected with the remainder.
        let result = evaluate_submission(&team, 45 * MICROS_PER_SEC, 3);
        assert_eq!(result, Err(GameError::SubmissionTooFast { wait_secs: 15 }));
        // Exactly at the cooldown boundary: accepted.
        assert!(evaluate_submission(&team, 60 * MICROS_PER_SEC, 3).is_ok());
    }

    #[test]
    fn test_throttle_checked_before_completion_branch() {
        // A too-fast submission on the final level must not complete the team.
        let mut team = team_on(3);
        team.last_completed_at_micros = Some(0);
        assert!(matches!(
            evaluate_submission(&team, 10 * MICROS_PER_SEC, 3),
            Err(GameError::SubmissionTooFast { .. })
        ));
    }

    #[test]
    fn test_detached_team_rejected() {
        let team = TeamSnapshot::default();
        assert_eq!(
            evaluate_submission(&team, MIN, 3),
            Err(GameError::GameNotStarted)
        );
    }

    #[test]
    fn test_blocked_team_rejected() {
        let mut team = team_on(1);
        team.blocked = true;
        assert_eq!(evaluate_submission(&team, MIN, 3), Err(GameError::TeamBlocked));
    }

    #[test]
    fn test_level_beyond_catalog_is_desync() {
        // Current level past the catalog: defensive consistency failure.
        assert_eq!(
            evaluate_submission(&team_on(5), MIN, 3),
            Err(GameError::NextLevelNotFound { level: 6 })
        );
    }

    #[test]
    fn test_elapsed_minutes_from_level_start() {
        let mut team = team_on(1);
        team.level_started_at_micros = Some(10 * MIN);
        let advance = evaluate_submission(&team, 25 * MIN, 3).unwrap();
        assert!((advance.elapsed_minutes() - 15.0).abs() < 1e-9);
    }
}
