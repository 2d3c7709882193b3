//! Authoritative server-side rules engine for Gambit Chess: chess legality,
//! hidden-allocation duels over Battle Points, tactical retreats, and the
//! tactic detector that distinguishes newly created tactics from
//! pre-existing ones for reward purposes.
//!
//! [`engine::GameEngine`] is the entry point; everything else is a layer
//! it orchestrates.

pub mod chess;
pub mod config;
pub mod duel;
pub mod economy;
pub mod engine;
pub mod error;
pub mod retreat;
pub mod snapshot;
pub mod tactics;

shadow_rs::shadow!(build);

/// Crate version plus build metadata (git commit, build timestamp),
/// assembled at compile time by `build.rs`.
#[must_use]
pub fn version() -> &'static str {
    build::VERSION
}
