//! CipherHunt Server - SpacetimeDB Module
//!
//! Treasure-hunt competition backend running as a SpacetimeDB module.
//! All game-progression rules run here as reducers; clients subscribe to
//! the public tables and stay thin.

mod reducers;
mod seed;
mod tables;

pub use reducers::*;
pub use seed::*;
pub use tables::*;
