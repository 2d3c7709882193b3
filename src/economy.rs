//! The Battle Points economy: a per-color pool and a pending regeneration
//! buffer credited on turn switch.

use std::collections::HashMap;

use crate::chess::core::Color;

/// Per-color BP pool plus the buffer accumulated during the half-move that
/// just ran, committed once that side's turn fully completes.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BpEconomy {
    bp: HashMap<ColorKey, u32>,
    pending: HashMap<ColorKey, u32>,
    bp_max: u32,
}

/// `Color` isn't `Hash`-derived against a `HashMap` key type concern here —
/// it already derives `Hash`; this alias just documents the map's key.
type ColorKey = Color;

impl BpEconomy {
    #[must_use]
    pub fn new(initial_pool: u32, bp_max: u32) -> Self {
        let mut bp = HashMap::new();
        bp.insert(Color::White, initial_pool.min(bp_max));
        bp.insert(Color::Black, initial_pool.min(bp_max));
        let mut pending = HashMap::new();
        pending.insert(Color::White, 0);
        pending.insert(Color::Black, 0);
        Self { bp, pending, bp_max }
    }

    #[must_use]
    pub fn bp(&self, color: Color) -> u32 {
        self.bp[&color]
    }

    #[must_use]
    pub fn bp_max(&self) -> u32 {
        self.bp_max
    }

    /// Adds (or, if negative, spends) BP, clamped to `[0, bp_max]`.
    pub fn add(&mut self, color: Color, delta: i64) {
        let current = i64::from(self.bp[&color]);
        let updated = (current + delta).clamp(0, i64::from(self.bp_max));
        self.bp.insert(color, updated as u32);
    }

    /// Spends `amount` unconditionally; callers must have already checked
    /// `bp(color) >= amount`.
    pub fn spend(&mut self, color: Color, amount: u32) {
        self.add(color, -i64::from(amount));
    }

    pub fn add_pending_regen(&mut self, color: Color, delta: u32) {
        *self.pending.get_mut(&color).expect("initialized for both colors") += delta;
    }

    /// Moves `color`'s pending bucket into `bp` and zeroes it.
    pub fn commit_pending_regen(&mut self, color: Color) {
        let amount = self.pending.insert(color, 0).unwrap_or(0);
        self.add(color, i64::from(amount));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_clamps_at_bounds() {
        let mut economy = BpEconomy::new(39, 39);
        economy.add(Color::White, 10);
        assert_eq!(economy.bp(Color::White), 39);
        economy.spend(Color::White, 100);
        assert_eq!(economy.bp(Color::White), 0);
    }

    #[test]
    fn pending_regen_only_applies_on_commit() {
        let mut economy = BpEconomy::new(20, 39);
        economy.add_pending_regen(Color::White, 3);
        assert_eq!(economy.bp(Color::White), 20);
        economy.commit_pending_regen(Color::White);
        assert_eq!(economy.bp(Color::White), 23);
    }
}
