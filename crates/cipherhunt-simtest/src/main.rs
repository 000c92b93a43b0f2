//! CipherHunt Headless Scenario Harness
//!
//! Validates the pure game logic without SpacetimeDB.
//! Runs entirely in-process — no DB, no networking.
//!
//! Usage:
//!   cargo run -p cipherhunt-simtest
//!   cargo run -p cipherhunt-simtest -- --verbose

use cipherhunt_logic::allotment::allot_question;
use cipherhunt_logic::error::{ErrorKind, GameError};
use cipherhunt_logic::hints::{unlock_elapsed, visible, HintView};
use cipherhunt_logic::leaderboard::{Leaderboard, TOP_TEAMS_COUNT};
use cipherhunt_logic::progression::{
    evaluate_submission, Advance, TeamSnapshot, SUBMISSION_COOLDOWN_SECS,
};
use cipherhunt_logic::session::{check_finish, check_start, check_submission_open, SessionState};
use serde::Deserialize;

const MICROS_PER_MIN: i64 = 60_000_000;

// ── Catalog manifest (same JSON the server embeds) ──────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/catalog_seed.json");

#[derive(Debug, Deserialize)]
struct LevelSeed {
    level: u32,
    questions: Vec<QuestionSeed>,
}

#[derive(Debug, Deserialize)]
struct QuestionSeed {
    title: String,
    #[allow(dead_code)]
    description: String,
    correct_code: String,
    #[serde(default)]
    hints: Vec<HintSeed>,
}

#[derive(Debug, Deserialize)]
struct HintSeed {
    #[allow(dead_code)]
    text: String,
    unlock_minutes: u32,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== CipherHunt Scenario Harness ===\n");

    let mut results = Vec::new();

    // 0. Seed catalog manifest validation
    results.extend(validate_catalog_seed(verbose));

    // 1. Leaderboard bucket mechanics
    results.extend(validate_leaderboard(verbose));

    // 2. Progression state machine sweep
    results.extend(validate_progression(verbose));

    // 3. Session lifecycle guards
    results.extend(validate_session(verbose));

    // 4. Question allotment distribution
    results.extend(validate_allotment(verbose));

    // 5. Hint visibility and unlock timing
    results.extend(validate_hints(verbose));

    // 6. Full tournament simulation
    results.extend(validate_tournament(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 0. Catalog seed ─────────────────────────────────────────────────────

fn validate_catalog_seed(verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog Seed ---");
    let mut results = Vec::new();

    let seeds: Vec<LevelSeed> = match serde_json::from_str(CATALOG_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "seed_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    // Level numbers dense from 1.
    let dense = seeds
        .iter()
        .enumerate()
        .all(|(idx, s)| s.level == (idx + 1) as u32);
    results.push(TestResult {
        name: "seed_levels_dense".into(),
        passed: dense && !seeds.is_empty(),
        detail: format!("{} levels", seeds.len()),
    });

    // Every level playable: at least one question, no empty titles/codes.
    let unplayable = seeds
        .iter()
        .filter(|s| s.questions.is_empty())
        .count();
    let bad_fields = seeds
        .iter()
        .flat_map(|s| &s.questions)
        .filter(|q| q.title.trim().is_empty() || q.correct_code.trim().is_empty())
        .count();
    results.push(TestResult {
        name: "seed_levels_playable".into(),
        passed: unplayable == 0 && bad_fields == 0,
        detail: format!(
            "{} empty levels, {} questions with empty title/code",
            unplayable, bad_fields
        ),
    });

    // Hint unlock delays increase within each question.
    let disordered = seeds
        .iter()
        .flat_map(|s| &s.questions)
        .filter(|q| {
            q.hints
                .windows(2)
                .any(|w| w[0].unlock_minutes >= w[1].unlock_minutes)
        })
        .count();
    results.push(TestResult {
        name: "seed_hint_delays_increase".into(),
        passed: disordered == 0,
        detail: format!("{} questions with non-increasing hint delays", disordered),
    });

    if verbose {
        for seed in &seeds {
            println!("  level {}: {} questions", seed.level, seed.questions.len());
        }
    }
    results
}

// ── 1. Leaderboard ──────────────────────────────────────────────────────

fn validate_leaderboard(verbose: bool) -> Vec<TestResult> {
    println!("--- Leaderboard ---");
    let mut results = Vec::new();

    let mut board = Leaderboard::with_levels(5);
    results.push(TestResult {
        name: "bucket_count".into(),
        passed: board.buckets.len() == 6 && board.terminal_level() == 6,
        detail: format!("{} buckets for 5 levels", board.buckets.len()),
    });

    // Place 12 teams on level 1 and churn them through moves.
    for team_id in 1..=12u64 {
        board.add_team(team_id, 1).unwrap();
    }
    for team_id in 1..=12u64 {
        let hops = (team_id % 5) as u32;
        for level in 1..=hops {
            board.move_team(team_id, level, level + 1).unwrap();
        }
    }

    // Every team in exactly one bucket after the churn.
    let mut multi = 0;
    for team_id in 1..=12u64 {
        let holding = board
            .buckets
            .iter()
            .filter(|b| b.team_ids.contains(&team_id))
            .count();
        if holding != 1 {
            multi += 1;
        }
    }
    results.push(TestResult {
        name: "one_bucket_per_team".into(),
        passed: multi == 0 && board.team_count() == 12,
        detail: format!("{} teams misplaced, {} entries total", multi, board.team_count()),
    });

    // Double move changes nothing.
    let before = board.clone();
    board.move_team(3, 3, 4).unwrap();
    board.move_team(3, 3, 4).unwrap();
    let mut after_double = before.clone();
    after_double.move_team(3, 3, 4).unwrap();
    results.push(TestResult {
        name: "move_idempotent".into(),
        passed: board == after_double,
        detail: "second identical move is a no-op".into(),
    });

    // Top-teams projection walks from the back and respects the cap.
    let top = board.top_teams(TOP_TEAMS_COUNT);
    let ranks: Vec<Option<u32>> = top.iter().map(|id| board.bucket_of(*id)).collect();
    let descending = ranks.windows(2).all(|w| w[0] >= w[1]);
    results.push(TestResult {
        name: "top_teams_ordering".into(),
        passed: top.len() == TOP_TEAMS_COUNT && descending,
        detail: format!("top {:?}", top),
    });

    results.push(TestResult {
        name: "consistency_check".into(),
        passed: board.check_consistency(5).is_ok()
            && board.check_consistency(4)
                == Err(GameError::LeaderboardSizeMismatch {
                    buckets: 6,
                    expected: 5,
                }),
        detail: "shape verified against catalog size".into(),
    });

    if verbose {
        println!(
            "  board snapshot: {}",
            serde_json::to_string(&board).unwrap_or_default()
        );
    }
    results
}

// ── 2. Progression ──────────────────────────────────────────────────────

fn validate_progression(_verbose: bool) -> Vec<TestResult> {
    println!("--- Progression ---");
    let mut results = Vec::new();

    let team = TeamSnapshot {
        current_level: Some(2),
        level_started_at_micros: Some(0),
        last_completed_at_micros: None,
        has_completed_all_levels: false,
        blocked: false,
    };

    let advance = evaluate_submission(&team, 7 * MICROS_PER_MIN, 5);
    results.push(TestResult {
        name: "mid_level_advance".into(),
        passed: matches!(
            advance,
            Ok(Advance::NextLevel {
                completed_level: 2,
                next_level: 3,
                ..
            })
        ),
        detail: format!("{:?}", advance),
    });

    // Throttle sweep: every second under the cooldown is rejected, the
    // boundary second is accepted.
    let mut throttled = team;
    throttled.last_completed_at_micros = Some(0);
    let mut wrong = 0;
    for secs in 0..SUBMISSION_COOLDOWN_SECS {
        match evaluate_submission(&throttled, secs * 1_000_000, 5) {
            Err(GameError::SubmissionTooFast { wait_secs })
                if wait_secs == SUBMISSION_COOLDOWN_SECS - secs => {}
            _ => wrong += 1,
        }
    }
    let boundary_ok =
        evaluate_submission(&throttled, SUBMISSION_COOLDOWN_SECS * 1_000_000, 5).is_ok();
    results.push(TestResult {
        name: "throttle_sweep".into(),
        passed: wrong == 0 && boundary_ok,
        detail: format!("{} wrong rejections in 0..60s, boundary ok: {}", wrong, boundary_ok),
    });

    // Final level completes into the terminal bucket, never beyond.
    let mut last = team;
    last.current_level = Some(5);
    let done = evaluate_submission(&last, 3 * MICROS_PER_MIN, 5);
    results.push(TestResult {
        name: "final_level_terminal".into(),
        passed: matches!(
            done,
            Ok(Advance::AllLevelsComplete {
                terminal_level: 6,
                ..
            })
        ),
        detail: format!("{:?}", done),
    });

    let mut finished = last;
    finished.has_completed_all_levels = true;
    results.push(TestResult {
        name: "repeat_after_completion".into(),
        passed: evaluate_submission(&finished, 3 * MICROS_PER_MIN, 5)
            == Err(GameError::AlreadyCompleted),
        detail: "second final-level submission rejected".into(),
    });

    let mut blocked = team;
    blocked.blocked = true;
    results.push(TestResult {
        name: "blocked_team".into(),
        passed: evaluate_submission(&blocked, MICROS_PER_MIN, 5) == Err(GameError::TeamBlocked),
        detail: "blocked teams cannot advance".into(),
    });

    // Error taxonomy spot checks.
    let kinds_ok = GameError::TeamBlocked.kind() == ErrorKind::StateConflict
        && GameError::NoQuestionsAvailable { level: 2 }.kind() == ErrorKind::NotFound
        && GameError::LeaderboardMissing.kind() == ErrorKind::ConfigInconsistency;
    results.push(TestResult {
        name: "error_kinds".into(),
        passed: kinds_ok,
        detail: "taxonomy matches variant semantics".into(),
    });

    results
}

// ── 3. Session lifecycle ────────────────────────────────────────────────

fn validate_session(_verbose: bool) -> Vec<TestResult> {
    println!("--- Session ---");
    let mut results = Vec::new();

    let mut session = SessionState::default();
    let fresh_ok = check_start(&session).is_ok()
        && check_finish(&session) == Err(GameError::GameNotStarted)
        && check_submission_open(&session) == Err(GameError::GameNotStarted);

    session.has_started = true;
    let running_ok = check_start(&session) == Err(GameError::AlreadyStarted)
        && check_finish(&session).is_ok()
        && check_submission_open(&session).is_ok();

    session.has_finished = true;
    let finished_ok = check_finish(&session) == Err(GameError::AlreadyFinished)
        && check_submission_open(&session) == Err(GameError::AlreadyFinished);

    results.push(TestResult {
        name: "lifecycle_guards".into(),
        passed: fresh_ok && running_ok && finished_ok,
        detail: format!(
            "fresh {}, running {}, finished {}",
            fresh_ok, running_ok, finished_ok
        ),
    });
    results
}

// ── 4. Allotment ────────────────────────────────────────────────────────

fn validate_allotment(verbose: bool) -> Vec<TestResult> {
    println!("--- Allotment ---");
    let mut results = Vec::new();

    let pool: Vec<u64> = (100..107).collect();

    // Sweep picks over several multiples of the pool size: every question
    // must be served, nothing outside the pool.
    let mut served = vec![0u32; pool.len()];
    for pick in 0..pool.len() * 4 {
        let id = allot_question(&pool, pick, 3).unwrap();
        let idx = pool.iter().position(|q| *q == id).unwrap();
        served[idx] += 1;
    }
    let uniform = served.iter().all(|&count| count == 4);
    results.push(TestResult {
        name: "allotment_uniform_over_picks".into(),
        passed: uniform,
        detail: format!("serve counts {:?}", served),
    });

    results.push(TestResult {
        name: "empty_level_fatal".into(),
        passed: allot_question(&[], 0, 4) == Err(GameError::NoQuestionsAvailable { level: 4 }),
        detail: "level with no questions refuses entry".into(),
    });

    if verbose {
        println!("  pool {:?} served {:?}", pool, served);
    }
    results
}

// ── 5. Hints ────────────────────────────────────────────────────────────

fn validate_hints(_verbose: bool) -> Vec<TestResult> {
    println!("--- Hints ---");
    let mut results = Vec::new();

    let hints: Vec<HintView> = (0..4)
        .map(|ord| HintView {
            ord,
            text: format!("hint {}", ord),
            revealed: ord % 2 == 0,
            unlock_minutes: 10 * (ord + 1),
        })
        .collect();

    let seen: Vec<u32> = visible(&hints).iter().map(|h| h.ord).collect();
    results.push(TestResult {
        name: "hidden_hints_filtered".into(),
        passed: seen == vec![0, 2],
        detail: format!("visible ords {:?}", seen),
    });

    let level_start = 100 * MICROS_PER_MIN;
    let at_9 = unlock_elapsed(&hints[0], level_start, level_start + 9 * MICROS_PER_MIN);
    let at_10 = unlock_elapsed(&hints[0], level_start, level_start + 10 * MICROS_PER_MIN);
    results.push(TestResult {
        name: "unlock_boundary".into(),
        passed: !at_9 && at_10,
        detail: format!("9min: {}, 10min: {}", at_9, at_10),
    });
    results
}

// ── 6. Tournament simulation ────────────────────────────────────────────
//
// Drives 8 teams through a 6-level hunt the way the server does: evaluate,
// then apply team fields and the leaderboard move. Teams solve at staggered
// speeds; the bucket invariant is checked after every accepted submission.

fn validate_tournament(verbose: bool) -> Vec<TestResult> {
    println!("--- Tournament ---");
    let mut results = Vec::new();

    const TOTAL_LEVELS: u32 = 6;
    const TEAMS: u64 = 8;

    let mut board = Leaderboard::with_levels(TOTAL_LEVELS);
    let mut teams: Vec<(u64, TeamSnapshot)> = (1..=TEAMS)
        .map(|id| {
            let snapshot = TeamSnapshot {
                current_level: Some(1),
                level_started_at_micros: Some(0),
                last_completed_at_micros: None,
                has_completed_all_levels: false,
                blocked: false,
            };
            (id, snapshot)
        })
        .collect();
    for (id, _) in &teams {
        board.add_team(*id, 1).unwrap();
    }

    // Team k solves a level every (2 + k) minutes; run 4 hours of clock.
    let mut invariant_failures = 0;
    let mut accepted = 0;
    let mut completions = 0;
    for minute in 1..=240i64 {
        let now = minute * MICROS_PER_MIN;
        for idx in 0..teams.len() {
            let (id, snapshot) = teams[idx];
            if minute % (2 + id as i64) != 0 {
                continue;
            }
            let advance = match evaluate_submission(&snapshot, now, TOTAL_LEVELS) {
                Ok(a) => a,
                Err(_) => continue,
            };
            let team = &mut teams[idx].1;
            team.last_completed_at_micros = Some(now);
            match advance {
                Advance::NextLevel { next_level, .. } => {
                    team.current_level = Some(next_level);
                    team.level_started_at_micros = Some(now);
                }
                Advance::AllLevelsComplete { .. } => {
                    team.has_completed_all_levels = true;
                    team.level_started_at_micros = None;
                    completions += 1;
                }
            }
            board
                .move_team(id, advance.from_level(), advance.to_level())
                .unwrap();
            accepted += 1;

            for (check_id, check) in &teams {
                let expected = if check.has_completed_all_levels {
                    Some(board.terminal_level())
                } else {
                    check.current_level
                };
                if board.bucket_of(*check_id) != expected {
                    invariant_failures += 1;
                }
            }
        }
    }

    results.push(TestResult {
        name: "tournament_invariant".into(),
        passed: invariant_failures == 0,
        detail: format!(
            "{} accepted submissions, {} invariant failures",
            accepted, invariant_failures
        ),
    });

    // Every team has 4 hours at its pace; all should have finished.
    results.push(TestResult {
        name: "tournament_completions".into(),
        passed: completions == TEAMS as u32,
        detail: format!("{}/{} teams completed all levels", completions, TEAMS),
    });

    // Faster teams rank higher; ties impossible at distinct paces.
    let top = board.top_teams(TOP_TEAMS_COUNT);
    results.push(TestResult {
        name: "tournament_ranking".into(),
        passed: top.len() == TEAMS as usize && top[0] == 1,
        detail: format!("final ranking {:?}", top),
    });

    // The board must match a from-scratch rebuild off the team state.
    let rebuilt = Leaderboard::rebuild(
        TOTAL_LEVELS,
        teams
            .iter()
            .map(|(id, s)| (*id, s.current_level, s.has_completed_all_levels)),
    )
    .unwrap();
    let same_membership = teams
        .iter()
        .all(|(id, _)| rebuilt.bucket_of(*id) == board.bucket_of(*id));
    results.push(TestResult {
        name: "tournament_rebuild_agrees".into(),
        passed: same_membership,
        detail: "rebuild from team state places every team identically".into(),
    });

    if verbose {
        println!(
            "  final board: {}",
            serde_json::to_string(&board).unwrap_or_default()
        );
    }
    results
}
