//! Question allotment — random assignment from a level's question set.
//!
//! Randomness is drawn at the boundary: callers pass the drawn value in as
//! plain data so allotment stays deterministic under test. Repeats are
//! allowed — a re-allotment may return a previously served question, and the
//! caller decides whether that matters.

use crate::error::GameError;

/// Pick one question uniformly from `question_ids`.
///
/// `pick` should be drawn uniformly from `0..question_ids.len()` by the
/// caller's RNG; any value is accepted and reduced into range. Fails with
/// [`GameError::NoQuestionsAvailable`] when the level has no questions —
/// callers must treat that as fatal to level entry, since the team cannot be
/// given a task.
pub fn allot_question(question_ids: &[u64], pick: usize, level: u32) -> Result<u64, GameError> {
    if question_ids.is_empty() {
        return Err(GameError::NoQuestionsAvailable { level });
    }
    Ok(question_ids[pick % question_ids.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allot_from_empty_level_fails() {
        assert_eq!(
            allot_question(&[], 0, 2),
            Err(GameError::NoQuestionsAvailable { level: 2 })
        );
    }

    #[test]
    fn test_allot_single_question() {
        for pick in 0..5 {
            assert_eq!(allot_question(&[99], pick, 1), Ok(99));
        }
    }

    #[test]
    fn test_allot_reduces_pick_into_range() {
        let ids = [10, 20, 30];
        assert_eq!(allot_question(&ids, 0, 1), Ok(10));
        assert_eq!(allot_question(&ids, 2, 1), Ok(30));
        assert_eq!(allot_question(&ids, 4, 1), Ok(20));
    }

    #[test]
    fn test_every_question_reachable() {
        let ids = [7, 8, 9];
        let served: Vec<u64> = (0..3)
            .map(|pick| allot_question(&ids, pick, 1).unwrap())
            .collect();
        assert_eq!(served, vec![7, 8, 9]);
    }
}
