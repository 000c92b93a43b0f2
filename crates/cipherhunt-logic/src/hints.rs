//! Hint visibility and unlock eligibility.
//!
//! Hints start hidden and are revealed by an admin; players only ever see
//! revealed hints, in authored order. Each hint carries an unlock delay —
//! the minimum time a team must have spent on the level before the hint may
//! be released. All reveal flags are cleared on game reset.

use serde::{Deserialize, Serialize};

/// One hint as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintView {
    /// Position within the question's hint list.
    pub ord: u32,
    pub text: String,
    pub revealed: bool,
    /// Minutes on the level before this hint may be released.
    pub unlock_minutes: u32,
}

/// Filter to the hints a player may see, preserving authored order.
pub fn visible(hints: &[HintView]) -> Vec<&HintView> {
    hints.iter().filter(|h| h.revealed).collect()
}

/// Whether a hint's unlock delay has elapsed for a team that entered its
/// level at `level_started_at_micros`.
pub fn unlock_elapsed(hint: &HintView, level_started_at_micros: i64, now_micros: i64) -> bool {
    let elapsed_minutes = (now_micros - level_started_at_micros) / 60_000_000;
    elapsed_minutes >= i64::from(hint.unlock_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint(ord: u32, revealed: bool) -> HintView {
        HintView {
            ord,
            text: format!("hint {}", ord),
            revealed,
            unlock_minutes: 5,
        }
    }

    #[test]
    fn test_visible_filters_hidden() {
        let hints = vec![hint(0, true), hint(1, false), hint(2, true)];
        let seen: Vec<u32> = visible(&hints).iter().map(|h| h.ord).collect();
        assert_eq!(seen, vec![0, 2]);
    }

    #[test]
    fn test_unlock_elapsed_boundary() {
        let h = hint(0, false);
        let start = 0;
        assert!(!unlock_elapsed(&h, start, 4 * 60_000_000));
        assert!(unlock_elapsed(&h, start, 5 * 60_000_000));
    }
}
