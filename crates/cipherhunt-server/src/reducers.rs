//! Reducers for catalog setup, team management, and game progression.
//!
//! Each reducer body runs as one SpacetimeDB transaction, so a leaderboard
//! read-modify-write inside a reducer is atomic and two submissions from the
//! same team serialize. All decision logic lives in cipherhunt-logic; the
//! reducers translate rows to plain snapshots, call in, and apply the
//! returned command.

use crate::tables::*;
use cipherhunt_logic::allotment::allot_question;
use cipherhunt_logic::error::GameError;
use cipherhunt_logic::hints::{unlock_elapsed, HintView};
use cipherhunt_logic::leaderboard::{Leaderboard, LevelBucket};
use cipherhunt_logic::progression::{evaluate_submission, Advance, TeamSnapshot};
use cipherhunt_logic::session::{check_finish, check_start, check_submission_open, SessionState};
use spacetimedb::rand::Rng;
use spacetimedb::{reducer, ReducerContext, Table};

// ============================================================================
// HELPERS
// ============================================================================

fn session(ctx: &ReducerContext) -> Result<GameSession, String> {
    ctx.db
        .game_session()
        .id()
        .find(0)
        .ok_or("Game session not initialized".to_string())
}

fn session_state(session: &GameSession) -> SessionState {
    SessionState {
        has_started: session.has_started,
        has_finished: session.has_finished,
    }
}

fn total_levels(ctx: &ReducerContext) -> u32 {
    ctx.db.level().count() as u32
}

fn snapshot(team: &Team) -> TeamSnapshot {
    TeamSnapshot {
        current_level: team.current_level,
        level_started_at_micros: team
            .level_started_at
            .map(|t| t.to_micros_since_unix_epoch()),
        last_completed_at_micros: team
            .last_completed_at
            .map(|t| t.to_micros_since_unix_epoch()),
        has_completed_all_levels: team.has_completed_all_levels,
        blocked: team.blocked,
    }
}

fn question_ids_for_level(ctx: &ReducerContext, level_number: u32) -> Vec<u64> {
    ctx.db
        .question()
        .iter()
        .filter(|q| q.level_number == level_number)
        .map(|q| q.id)
        .collect()
}

fn load_leaderboard(ctx: &ReducerContext) -> Leaderboard {
    let mut buckets: Vec<LevelBucket> = ctx
        .db
        .leaderboard_bucket()
        .iter()
        .map(|row| LevelBucket {
            level: row.level,
            team_ids: row.team_ids,
        })
        .collect();
    buckets.sort_by_key(|b| b.level);
    Leaderboard { buckets }
}

fn store_leaderboard(ctx: &ReducerContext, board: &Leaderboard) {
    let stale: Vec<u32> = ctx.db.leaderboard_bucket().iter().map(|b| b.level).collect();
    for level in stale {
        ctx.db.leaderboard_bucket().level().delete(level);
    }
    for bucket in &board.buckets {
        ctx.db.leaderboard_bucket().insert(LeaderboardBucket {
            level: bucket.level,
            team_ids: bucket.team_ids.clone(),
        });
    }
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[reducer(init)]
pub fn init(ctx: &ReducerContext) {
    log::info!("Initializing game module");
    ctx.db.game_session().insert(GameSession {
        id: 0,
        has_started: false,
        has_finished: false,
        start_time: None,
        end_time: None,
    });
}

/// Launch the game: rebuild the leaderboard for the current catalog, then
/// put every team on level 1 with a randomly allotted question.
#[reducer]
pub fn start_game(ctx: &ReducerContext) -> Result<(), String> {
    let mut sess = session(ctx)?;
    check_start(&session_state(&sess)).map_err(|e| e.to_string())?;

    let total = total_levels(ctx);
    if total == 0 {
        return Err("Cannot start: no levels defined".to_string());
    }

    sess.has_started = true;
    sess.has_finished = false;
    sess.start_time = Some(ctx.timestamp);
    sess.end_time = None;
    ctx.db.game_session().id().update(sess);

    // Bucket array always rebuilt from the current catalog, so a start after
    // adding levels (without a reset in between) gets the right shape.
    let mut board = Leaderboard::with_levels(total);

    let first_level_questions = question_ids_for_level(ctx, 1);
    let teams: Vec<Team> = ctx.db.team().iter().collect();
    let mut launched = 0u32;
    for mut team in teams {
        // One team failing to launch must not strand the rest.
        let pick = ctx.rng().gen_range(0..first_level_questions.len().max(1));
        let question_id = match allot_question(&first_level_questions, pick, 1) {
            Ok(id) => id,
            Err(e) => {
                log::error!("Team {} not started: {}", team.name, e);
                continue;
            }
        };
        team.current_level = Some(1);
        team.current_question_id = Some(question_id);
        team.level_started_at = Some(ctx.timestamp);
        team.last_completed_at = None;
        team.has_completed_all_levels = false;
        let team_id = team.id;
        ctx.db.team().id().update(team);
        if let Err(e) = board.add_team(team_id, 1) {
            log::error!("Team {} not placed on the leaderboard: {}", team_id, e);
            continue;
        }
        launched += 1;
    }

    store_leaderboard(ctx, &board);
    log::info!("Game started: {} levels, {} teams launched", total, launched);
    Ok(())
}

/// End the game. A second finish is rejected rather than overwriting the
/// recorded end time.
#[reducer]
pub fn finish_game(ctx: &ReducerContext) -> Result<(), String> {
    let mut sess = session(ctx)?;
    check_finish(&session_state(&sess)).map_err(|e| e.to_string())?;
    sess.has_finished = true;
    sess.end_time = Some(ctx.timestamp);
    ctx.db.game_session().id().update(sess);
    log::info!("Game finished");
    Ok(())
}

/// Unconditional reset: detach every team, hide every hint, clear the
/// session and history, and drop all leaderboard buckets. The catalog
/// (levels, questions) survives.
#[reducer]
pub fn reset_game(ctx: &ReducerContext) -> Result<(), String> {
    let teams: Vec<Team> = ctx.db.team().iter().collect();
    for mut team in teams {
        team.current_level = None;
        team.current_question_id = None;
        team.level_started_at = None;
        team.last_completed_at = None;
        team.has_completed_all_levels = false;
        ctx.db.team().id().update(team);
    }

    let revealed: Vec<Hint> = ctx.db.hint().iter().filter(|h| h.revealed).collect();
    for mut hint in revealed {
        hint.revealed = false;
        ctx.db.hint().id().update(hint);
    }
    let released: Vec<u64> = ctx.db.revealed_hint().iter().map(|h| h.hint_id).collect();
    for hint_id in released {
        ctx.db.revealed_hint().hint_id().delete(hint_id);
    }

    let history: Vec<u64> = ctx.db.completed_question().iter().map(|c| c.id).collect();
    for id in history {
        ctx.db.completed_question().id().delete(id);
    }

    let buckets: Vec<u32> = ctx.db.leaderboard_bucket().iter().map(|b| b.level).collect();
    for level in buckets {
        ctx.db.leaderboard_bucket().level().delete(level);
    }

    let mut sess = session(ctx)?;
    sess.has_started = false;
    sess.has_finished = false;
    sess.start_time = None;
    sess.end_time = None;
    ctx.db.game_session().id().update(sess);

    log::info!("Game reset");
    Ok(())
}

// ============================================================================
// CATALOG
// ============================================================================

/// Add the next level. Numbers must stay dense (1..N, no gaps), so the only
/// accepted number is one past the current count.
#[reducer]
pub fn add_level(ctx: &ReducerContext, number: u32) -> Result<(), String> {
    let expected = total_levels(ctx) + 1;
    if number != expected {
        return Err(format!(
            "Level numbers must be dense: expected {}, got {}",
            expected, number
        ));
    }
    ctx.db.level().insert(Level { id: 0, number });
    log::info!("Added level {}", number);
    Ok(())
}

#[reducer]
pub fn add_question(
    ctx: &ReducerContext,
    level_number: u32,
    title: String,
    description: String,
    correct_code: String,
) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err(GameError::MissingInput { field: "title" }.to_string());
    }
    if correct_code.trim().is_empty() {
        return Err(GameError::MissingInput {
            field: "correct_code",
        }
        .to_string());
    }
    if ctx.db.level().number().find(level_number).is_none() {
        return Err(format!("Level {} does not exist", level_number));
    }

    let question = ctx.db.question().insert(Question {
        id: 0,
        level_number,
        title: title.clone(),
        description: description.clone(),
        correct_code,
    });
    // Public copy without the secret code, under the same id.
    ctx.db.question_card().insert(QuestionCard {
        id: question.id,
        level_number,
        title,
        description,
    });
    log::info!("Added question {} to level {}", question.id, level_number);
    Ok(())
}

#[reducer]
pub fn add_hint(
    ctx: &ReducerContext,
    question_id: u64,
    text: String,
    unlock_minutes: u32,
) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err(GameError::MissingInput { field: "text" }.to_string());
    }
    if ctx.db.question().id().find(question_id).is_none() {
        return Err(format!("Question {} does not exist", question_id));
    }
    let ord = ctx
        .db
        .hint()
        .iter()
        .filter(|h| h.question_id == question_id)
        .count() as u32;
    ctx.db.hint().insert(Hint {
        id: 0,
        question_id,
        ord,
        text,
        revealed: false,
        unlock_minutes,
    });
    Ok(())
}

/// Release a hint to all teams. Idempotent. While the game is running, the
/// hint's unlock delay must have elapsed for at least one team on the
/// question's level before release.
#[reducer]
pub fn release_hint(ctx: &ReducerContext, hint_id: u64) -> Result<(), String> {
    let mut hint = ctx
        .db
        .hint()
        .id()
        .find(hint_id)
        .ok_or(format!("Hint {} does not exist", hint_id))?;
    if hint.revealed {
        return Ok(());
    }

    let sess = session(ctx)?;
    if sess.has_started && !sess.has_finished {
        let question = ctx
            .db
            .question()
            .id()
            .find(hint.question_id)
            .ok_or("Hint's question no longer exists".to_string())?;
        let view = HintView {
            ord: hint.ord,
            text: hint.text.clone(),
            revealed: hint.revealed,
            unlock_minutes: hint.unlock_minutes,
        };
        let now_micros = ctx.timestamp.to_micros_since_unix_epoch();
        let on_level: Vec<Team> = ctx
            .db
            .team()
            .iter()
            .filter(|t| t.current_level == Some(question.level_number))
            .collect();
        let unlocked = on_level.is_empty()
            || on_level.iter().any(|t| {
                t.level_started_at
                    .map(|s| unlock_elapsed(&view, s.to_micros_since_unix_epoch(), now_micros))
                    .unwrap_or(false)
            });
        if !unlocked {
            return Err(format!(
                "Hint unlocks after {} minutes on the level",
                hint.unlock_minutes
            ));
        }
    }

    hint.revealed = true;
    ctx.db.hint().id().update(hint.clone());
    ctx.db.revealed_hint().insert(RevealedHint {
        hint_id: hint.id,
        question_id: hint.question_id,
        ord: hint.ord,
        text: hint.text,
    });
    log::info!("Released hint {}", hint_id);
    Ok(())
}

// ============================================================================
// TEAMS
// ============================================================================

/// Register a team; the caller becomes its leader. Teams registered after
/// the game starts stay detached until the next start.
#[reducer]
pub fn create_team(ctx: &ReducerContext, name: String) -> Result<(), String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(GameError::MissingInput { field: "name" }.to_string());
    }
    if ctx.db.team().name().find(&name).is_some() {
        return Err(format!("Team name '{}' is taken", name));
    }
    if ctx.db.team().leader().find(ctx.sender).is_some() {
        return Err("You already lead a team".to_string());
    }
    let team = ctx.db.team().insert(Team {
        id: 0,
        name,
        leader: ctx.sender,
        current_level: None,
        current_question_id: None,
        level_started_at: None,
        last_completed_at: None,
        has_completed_all_levels: false,
        blocked: false,
    });
    log::info!("Team {} created ({})", team.name, team.id);
    Ok(())
}

#[reducer]
pub fn block_team(ctx: &ReducerContext, team_id: u64) -> Result<(), String> {
    set_blocked(ctx, team_id, true)
}

#[reducer]
pub fn unblock_team(ctx: &ReducerContext, team_id: u64) -> Result<(), String> {
    set_blocked(ctx, team_id, false)
}

fn set_blocked(ctx: &ReducerContext, team_id: u64, blocked: bool) -> Result<(), String> {
    let mut team = ctx
        .db
        .team()
        .id()
        .find(team_id)
        .ok_or(format!("Team {} does not exist", team_id))?;
    team.blocked = blocked;
    ctx.db.team().id().update(team);
    log::info!("Team {} blocked = {}", team_id, blocked);
    Ok(())
}

// ============================================================================
// PROGRESSION
// ============================================================================

/// Submit the secret code for the sender's team. Comparison is trimmed and
/// case-insensitive. On success the team advances one level (or completes),
/// a history row is appended, and the leaderboard entry moves buckets.
#[reducer]
pub fn submit_question_code(ctx: &ReducerContext, code: String) -> Result<(), String> {
    let sess = session(ctx)?;
    check_submission_open(&session_state(&sess)).map_err(|e| e.to_string())?;

    if code.trim().is_empty() {
        return Err(GameError::MissingInput { field: "code" }.to_string());
    }

    let team = ctx
        .db
        .team()
        .leader()
        .find(ctx.sender)
        .ok_or("Only a team leader can submit a code".to_string())?;

    let question_id = team
        .current_question_id
        .ok_or("No question allotted to your team".to_string())?;
    let question = ctx
        .db
        .question()
        .id()
        .find(question_id)
        .ok_or("Allotted question no longer exists".to_string())?;

    if question.correct_code.trim().to_lowercase() != code.trim().to_lowercase() {
        return Err("Incorrect code".to_string());
    }

    // The final-level number comes from the board shape, not the catalog:
    // a level added mid-game must not advance anyone past the terminal
    // bucket. A board that no longer matches the catalog is surfaced here.
    let board = load_leaderboard(ctx);
    board
        .check_consistency(total_levels(ctx))
        .map_err(|e| e.to_string())?;

    let now_micros = ctx.timestamp.to_micros_since_unix_epoch();
    let advance = evaluate_submission(&snapshot(&team), now_micros, board.total_levels())
        .map_err(|e| e.to_string())?;

    apply_advance(ctx, team, question_id, advance, board)
}

/// Persist the outcome of a successful submission: history first, then the
/// team row, then the leaderboard move. The team row is authoritative; a
/// failed board write is logged and repairable via `rebuild_leaderboard`.
fn apply_advance(
    ctx: &ReducerContext,
    mut team: Team,
    question_id: u64,
    advance: Advance,
    mut board: Leaderboard,
) -> Result<(), String> {
    ctx.db.completed_question().insert(CompletedQuestion {
        id: 0,
        team_id: team.id,
        level_number: advance.from_level(),
        question_id,
        started_at: team.level_started_at,
        completed_at: ctx.timestamp,
        elapsed_minutes: advance.elapsed_minutes(),
    });

    team.last_completed_at = Some(ctx.timestamp);
    match advance {
        Advance::NextLevel { next_level, .. } => {
            let pool = question_ids_for_level(ctx, next_level);
            let pick = ctx.rng().gen_range(0..pool.len().max(1));
            let next_question = allot_question(&pool, pick, next_level).map_err(|e| e.to_string())?;
            team.current_level = Some(next_level);
            team.current_question_id = Some(next_question);
            team.level_started_at = Some(ctx.timestamp);
            log::info!("Team {} advanced to level {}", team.name, next_level);
        }
        Advance::AllLevelsComplete { .. } => {
            team.has_completed_all_levels = true;
            team.current_question_id = None;
            team.level_started_at = None;
            log::info!("Team {} completed all levels", team.name);
        }
    }
    let team_id = team.id;
    ctx.db.team().id().update(team);

    match board.move_team(team_id, advance.from_level(), advance.to_level()) {
        Ok(()) => store_leaderboard(ctx, &board),
        Err(e) => log::error!("Leaderboard move for team {} skipped: {}", team_id, e),
    }
    Ok(())
}

/// Repair reducer: reconstruct all buckets from the team rows. Used when a
/// crash landed between a team save and the matching leaderboard save.
#[reducer]
pub fn rebuild_leaderboard(ctx: &ReducerContext) -> Result<(), String> {
    let total = total_levels(ctx);
    let mut teams: Vec<Team> = ctx.db.team().iter().collect();
    teams.sort_by_key(|t| t.id);
    let entries = teams
        .iter()
        .map(|t| (t.id, t.current_level, t.has_completed_all_levels));
    let board = Leaderboard::rebuild(total, entries).map_err(|e| e.to_string())?;
    store_leaderboard(ctx, &board);
    log::info!(
        "Leaderboard rebuilt: {} teams across {} buckets",
        board.team_count(),
        board.buckets.len()
    );
    Ok(())
}
