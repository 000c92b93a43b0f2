//! SpacetimeDB table definitions for the treasure hunt.
//!
//! Tables mirror the plain-data types in cipherhunt-logic but live in
//! SpacetimeDB for persistence and client sync. The secret code per
//! question stays in a private table; clients subscribe to the public
//! card copy that omits it.

use spacetimedb::{table, Identity, Timestamp};

// ============================================================================
// GAME SESSION
// ============================================================================

/// Game session singleton (id always 0)
#[table(name = game_session, public)]
#[derive(Clone)]
pub struct GameSession {
    #[primary_key]
    pub id: u32,
    pub has_started: bool,
    pub has_finished: bool,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

// ============================================================================
// CATALOG
// ============================================================================

/// One level of the hunt. Numbers are dense: 1..N with no gaps.
#[table(name = level, public)]
#[derive(Clone)]
pub struct Level {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    #[unique]
    pub number: u32,
}

/// Full question row, secret code included. Private — never replicated.
#[table(name = question)]
#[derive(Clone)]
pub struct Question {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub level_number: u32,
    pub title: String,
    pub description: String,
    pub correct_code: String,
}

/// Client-visible copy of a question, without the secret code.
/// Shares its id with the private row.
#[table(name = question_card, public)]
#[derive(Clone)]
pub struct QuestionCard {
    #[primary_key]
    pub id: u64,
    pub level_number: u32,
    pub title: String,
    pub description: String,
}

/// Hint for a question. Private — the text must not leak before release.
#[table(name = hint)]
#[derive(Clone)]
pub struct Hint {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub question_id: u64,
    /// Position within the question's hint list.
    pub ord: u32,
    pub text: String,
    pub revealed: bool,
    /// Minutes a team must have spent on the level before release.
    pub unlock_minutes: u32,
}

/// Public copy inserted when a hint is released. Cleared on reset.
#[table(name = revealed_hint, public)]
#[derive(Clone)]
pub struct RevealedHint {
    #[primary_key]
    pub hint_id: u64,
    pub question_id: u64,
    pub ord: u32,
    pub text: String,
}

// ============================================================================
// TEAMS
// ============================================================================

/// Competing team. The leader is the only identity allowed to submit codes.
#[table(name = team, public)]
#[derive(Clone)]
pub struct Team {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    #[unique]
    pub name: String,
    #[unique]
    pub leader: Identity,
    /// None iff no level has been allotted (before start / after reset).
    pub current_level: Option<u32>,
    pub current_question_id: Option<u64>,
    pub level_started_at: Option<Timestamp>,
    pub last_completed_at: Option<Timestamp>,
    pub has_completed_all_levels: bool,
    /// Admin-set; blocked teams cannot submit.
    pub blocked: bool,
}

/// Append-only completion history; completed_at is monotone per team.
#[table(name = completed_question, public)]
#[derive(Clone)]
pub struct CompletedQuestion {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub team_id: u64,
    pub level_number: u32,
    pub question_id: u64,
    pub started_at: Option<Timestamp>,
    pub completed_at: Timestamp,
    pub elapsed_minutes: f64,
}

// ============================================================================
// LEADERBOARD
// ============================================================================

/// One positional leaderboard bucket. Bucket `k` holds teams on level `k`;
/// bucket `total_levels + 1` is the terminal all-levels-completed bucket.
#[table(name = leaderboard_bucket, public)]
#[derive(Clone)]
pub struct LeaderboardBucket {
    #[primary_key]
    pub level: u32,
    /// Team ids in arrival order.
    pub team_ids: Vec<u64>,
}
