//! Positional level-bucket leaderboard.
//!
//! The leaderboard is a fixed-size array of buckets created in dense level
//! order at game start: bucket `k` (1-indexed) holds every team currently on
//! level `k`, and one extra terminal bucket past the real levels holds teams
//! that finished everything. Bucket lookup is direct index access
//! (`buckets[level - 1]`), never a search. Intra-bucket order is arrival
//! order — first to solve, first in the list — which is the entire ranking:
//! no score field exists.

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Default size of the "best teams" projection.
pub const TOP_TEAMS_COUNT: usize = 10;

/// One leaderboard slot: every team currently occupying a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBucket {
    /// 1-indexed level number (`total_levels + 1` for the terminal bucket).
    pub level: u32,
    /// Team ids in arrival order.
    pub team_ids: Vec<u64>,
}

/// The full leaderboard: `total_levels + 1` buckets.
///
/// Invariant: a team id appears in at most one bucket. Both mutating
/// operations ([`add_team`](Leaderboard::add_team) and
/// [`move_team`](Leaderboard::move_team)) are idempotent so a retried call
/// cannot duplicate an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub buckets: Vec<LevelBucket>,
}

impl Leaderboard {
    /// Build a fresh leaderboard for a catalog of `total_levels` levels:
    /// one empty bucket per level plus the terminal completion bucket.
    pub fn with_levels(total_levels: u32) -> Self {
        let buckets = (1..=total_levels + 1)
            .map(|level| LevelBucket {
                level,
                team_ids: Vec::new(),
            })
            .collect();
        Self { buckets }
    }

    /// Number of real levels (excludes the terminal bucket).
    pub fn total_levels(&self) -> u32 {
        (self.buckets.len().saturating_sub(1)) as u32
    }

    /// Level number of the terminal "all levels completed" bucket.
    pub fn terminal_level(&self) -> u32 {
        self.buckets.len() as u32
    }

    /// True if no buckets exist (game reset or never started).
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn bucket_mut(&mut self, level: u32) -> Result<&mut LevelBucket, GameError> {
        let buckets = self.buckets.len();
        if level == 0 || level as usize > buckets {
            return Err(GameError::BucketOutOfRange { level, buckets });
        }
        Ok(&mut self.buckets[(level - 1) as usize])
    }

    /// Insert a team into the bucket for `level` if it is not already there.
    ///
    /// Used at game start. Returns `true` when the team was appended,
    /// `false` when it was already present (idempotent insertion).
    pub fn add_team(&mut self, team_id: u64, level: u32) -> Result<bool, GameError> {
        let bucket = self.bucket_mut(level)?;
        if bucket.team_ids.contains(&team_id) {
            return Ok(false);
        }
        bucket.team_ids.push(team_id);
        Ok(true)
    }

    /// Move a team from the bucket for `from` to the bucket for `to`.
    ///
    /// Removal is idempotent (absence in `from` is not an error) and the
    /// insertion is guarded on not-already-present, so calling this twice
    /// leaves the leaderboard identical to calling it once.
    pub fn move_team(&mut self, team_id: u64, from: u32, to: u32) -> Result<(), GameError> {
        {
            let source = self.bucket_mut(from)?;
            source.team_ids.retain(|id| *id != team_id);
        }
        let dest = self.bucket_mut(to)?;
        if !dest.team_ids.contains(&team_id) {
            dest.team_ids.push(team_id);
        }
        Ok(())
    }

    /// Level number of the bucket holding `team_id`, if any.
    pub fn bucket_of(&self, team_id: u64) -> Option<u32> {
        self.buckets
            .iter()
            .find(|b| b.team_ids.contains(&team_id))
            .map(|b| b.level)
    }

    /// Total number of team entries across all buckets.
    pub fn team_count(&self) -> usize {
        self.buckets.iter().map(|b| b.team_ids.len()).sum()
    }

    /// "Best progress, earliest arrival" projection: walk buckets from the
    /// terminal bucket backward to level 1, taking teams in arrival order,
    /// stopping once `n` have been collected.
    pub fn top_teams(&self, n: usize) -> Vec<u64> {
        let mut top = Vec::with_capacity(n.min(self.team_count()));
        for bucket in self.buckets.iter().rev() {
            for &team_id in &bucket.team_ids {
                if top.len() >= n {
                    return top;
                }
                top.push(team_id);
            }
        }
        top
    }

    /// Diagnostic: verify the bucket count matches the level catalog.
    ///
    /// A mismatch means start/reset were run in the wrong order after the
    /// catalog changed; it is surfaced, never silently patched.
    pub fn check_consistency(&self, total_levels: u32) -> Result<(), GameError> {
        if self.buckets.is_empty() {
            return Err(GameError::LeaderboardMissing);
        }
        let expected = (total_levels + 1) as usize;
        if self.buckets.len() != expected {
            return Err(GameError::LeaderboardSizeMismatch {
                buckets: self.buckets.len(),
                expected,
            });
        }
        Ok(())
    }

    /// Repair operation: rebuild buckets from per-team state.
    ///
    /// `entries` yields `(team_id, current_level, completed_all)` per team,
    /// in the order the rebuilt buckets should list them. Teams with no
    /// current level and no completion are left out entirely. A crash
    /// between a team save and a leaderboard save leaves the two stores
    /// disagreeing; this reconstructs the leaderboard from the team store,
    /// which is written first and therefore authoritative.
    pub fn rebuild<I>(total_levels: u32, entries: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = (u64, Option<u32>, bool)>,
    {
        let mut board = Self::with_levels(total_levels);
        let terminal = board.terminal_level();
        for (team_id, current_level, completed_all) in entries {
            if completed_all {
                board.add_team(team_id, terminal)?;
            } else if let Some(level) = current_level {
                board.add_team(team_id, level)?;
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_levels_bucket_count() {
        let board = Leaderboard::with_levels(3);
        assert_eq!(board.buckets.len(), 4);
        assert_eq!(board.total_levels(), 3);
        assert_eq!(board.terminal_level(), 4);
        for (i, bucket) in board.buckets.iter().enumerate() {
            assert_eq!(bucket.level, (i + 1) as u32);
            assert!(bucket.team_ids.is_empty());
        }
    }

    #[test]
    fn test_add_team_idempotent() {
        let mut board = Leaderboard::with_levels(3);
        assert!(board.add_team(7, 1).unwrap());
        assert!(!board.add_team(7, 1).unwrap());
        assert_eq!(board.buckets[0].team_ids, vec![7]);
    }

    #[test]
    fn test_add_team_out_of_range() {
        let mut board = Leaderboard::with_levels(3);
        assert_eq!(
            board.add_team(7, 5),
            Err(GameError::BucketOutOfRange {
                level: 5,
                buckets: 4
            })
        );
        assert_eq!(
            board.add_team(7, 0),
            Err(GameError::BucketOutOfRange {
                level: 0,
                buckets: 4
            })
        );
    }

    #[test]
    fn test_move_team_idempotent() {
        let mut board = Leaderboard::with_levels(3);
        board.add_team(7, 1).unwrap();
        board.move_team(7, 1, 2).unwrap();
        let once = board.clone();
        board.move_team(7, 1, 2).unwrap();
        assert_eq!(board, once);
        assert_eq!(board.bucket_of(7), Some(2));
        assert_eq!(board.team_count(), 1);
    }

    #[test]
    fn test_move_preserves_arrival_order() {
        let mut board = Leaderboard::with_levels(2);
        board.add_team(1, 1).unwrap();
        board.add_team(2, 1).unwrap();
        board.add_team(3, 1).unwrap();
        // Team 2 solves first, then team 1.
        board.move_team(2, 1, 2).unwrap();
        board.move_team(1, 1, 2).unwrap();
        assert_eq!(board.buckets[1].team_ids, vec![2, 1]);
        assert_eq!(board.buckets[0].team_ids, vec![3]);
    }

    #[test]
    fn test_add_then_move_same_bucket_is_noop_on_count() {
        let mut board = Leaderboard::with_levels(3);
        board.add_team(9, 2).unwrap();
        board.move_team(9, 2, 2).unwrap();
        assert_eq!(board.team_count(), 1);
        assert_eq!(board.bucket_of(9), Some(2));
    }

    #[test]
    fn test_move_absent_team_is_not_an_error() {
        let mut board = Leaderboard::with_levels(3);
        board.move_team(42, 1, 2).unwrap();
        assert_eq!(board.bucket_of(42), Some(2));
    }

    #[test]
    fn test_top_teams_walks_from_terminal_bucket() {
        let mut board = Leaderboard::with_levels(3);
        board.add_team(1, 1).unwrap();
        board.add_team(2, 2).unwrap();
        board.add_team(3, 2).unwrap();
        board.add_team(4, 4).unwrap(); // finished everything
        assert_eq!(board.top_teams(3), vec![4, 2, 3]);
        assert_eq!(board.top_teams(10), vec![4, 2, 3, 1]);
        assert_eq!(board.top_teams(0), Vec::<u64>::new());
    }

    #[test]
    fn test_check_consistency() {
        let board = Leaderboard::with_levels(3);
        assert!(board.check_consistency(3).is_ok());
        assert_eq!(
            board.check_consistency(5),
            Err(GameError::LeaderboardSizeMismatch {
                buckets: 4,
                expected: 6
            })
        );
        let empty = Leaderboard::default();
        assert_eq!(empty.check_consistency(3), Err(GameError::LeaderboardMissing));
    }

    #[test]
    fn test_rebuild_from_team_state() {
        let teams = vec![
            (1, Some(2), false),
            (2, None, true),
            (3, Some(1), false),
            (4, None, false), // detached team: left out
        ];
        let board = Leaderboard::rebuild(3, teams).unwrap();
        assert_eq!(board.bucket_of(1), Some(2));
        assert_eq!(board.bucket_of(2), Some(4));
        assert_eq!(board.bucket_of(3), Some(1));
        assert_eq!(board.bucket_of(4), None);
        assert_eq!(board.team_count(), 3);
    }

    #[test]
    fn test_team_in_at_most_one_bucket_after_many_moves() {
        let mut board = Leaderboard::with_levels(4);
        board.add_team(1, 1).unwrap();
        for level in 1..4 {
            board.move_team(1, level, level + 1).unwrap();
            let holding: Vec<u32> = board
                .buckets
                .iter()
                .filter(|b| b.team_ids.contains(&1))
                .map(|b| b.level)
                .collect();
            assert_eq!(holding, vec![level + 1]);
        }
    }
}
