//! Pure game logic for CipherHunt.
//!
//! This crate contains all progression and leaderboard logic that is
//! independent of any database or runtime. Functions take plain data and
//! return results or commands for the caller to apply, making them
//! unit-testable and portable across SpacetimeDB (WASM) and native CLI tools.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`allotment`] | Random question assignment for a level's question set |
//! | [`error`] | Structured error taxonomy for every game operation |
//! | [`hints`] | Hint visibility and time-based unlock eligibility |
//! | [`leaderboard`] | Positional level-bucket leaderboard and projections |
//! | [`progression`] | Submission evaluation — advance, complete, or reject |
//! | [`session`] | Game lifecycle guards (start / finish / reset) |

pub mod allotment;
pub mod error;
pub mod hints;
pub mod leaderboard;
pub mod progression;
pub mod session;
