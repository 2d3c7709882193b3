//! Engine configuration: a plain, `Copy` struct with defaults
//! matching the documented defaults; `GameEngine::initialize` accepts an
//! optional override, defaulting via [`EngineConfig::default`].

use crate::chess::core::PieceKind;

/// Tunable rules of the Battle Points economy and duel/retreat mechanics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Starting `bp` per player.
    pub initial_bp_pool: u32,
    /// Upper clamp on `bp`.
    pub bp_max: u32,
    /// Hard cap on a single duel allocation.
    pub max_bp_allocation: u32,
    /// Base regeneration credited to the mover's pending bucket per
    /// half-move.
    pub base_bp_regen: u32,
    /// Bonus credited per newly-created tactic.
    pub bp_bonus_per_new_tactic: u32,
    /// Bonus credited for placing the opponent in a check that did not
    /// already exist before the move.
    pub bp_bonus_check: u32,
}

impl EngineConfig {
    /// Per-piece-type duel allocation capacity: its classical value.
    #[must_use]
    pub fn duel_capacity(kind: PieceKind) -> u32 {
        kind.classical_value()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_bp_pool: 39,
            bp_max: 39,
            max_bp_allocation: 10,
            base_bp_regen: 1,
            bp_bonus_per_new_tactic: 1,
            bp_bonus_check: 1,
        }
    }
}
