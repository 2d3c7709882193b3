//! The hidden-allocation duel resolver: every attempted capture is decided
//! by both sides privately committing a Battle Points bid, resolved only
//! once both bids are in.

use crate::chess::core::{Color, PieceId, PieceKind, Square};
use crate::config::EngineConfig;
use crate::error::{GambitError, GambitResult};

/// Outcome of a resolved duel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DuelOutcome {
    AttackerWins,
    DefenderWins,
}

/// A capture attempt awaiting both sides' allocations. The defender stays
/// on its square and the attacker stays on its origin square until this
/// resolves.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PendingDuel {
    pub attacker: PieceId,
    pub defender: PieceId,
    pub attacker_color: Color,
    pub from: Square,
    pub to: Square,
    pub attacker_kind: PieceKind,
    pub defender_kind: PieceKind,
    /// Promotion choice carried through from the original move submission,
    /// applied only if the attacker ends up winning.
    pub promotion: Option<PieceKind>,
    attacker_allocation: Option<u32>,
    defender_allocation: Option<u32>,
}

impl PendingDuel {
    #[must_use]
    pub fn new(
        attacker: PieceId,
        defender: PieceId,
        attacker_color: Color,
        from: Square,
        to: Square,
        attacker_kind: PieceKind,
        defender_kind: PieceKind,
    ) -> Self {
        Self {
            attacker,
            defender,
            attacker_color,
            from,
            to,
            attacker_kind,
            defender_kind,
            promotion: None,
            attacker_allocation: None,
            defender_allocation: None,
        }
    }

    #[must_use]
    pub fn defender_color(&self) -> Color {
        self.attacker_color.opposite()
    }

    #[must_use]
    pub fn allocation_of(&self, color: Color) -> Option<u32> {
        if color == self.attacker_color {
            self.attacker_allocation
        } else {
            self.defender_allocation
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.attacker_allocation.is_some() && self.defender_allocation.is_some()
    }

    /// The BP cost of allocating `amount` for a piece with capacity
    /// `capacity` (its classical value): linear up to capacity, doubled
    /// marginal cost above it.
    #[must_use]
    pub fn allocation_cost(amount: u32, capacity: u32) -> u32 {
        if amount <= capacity {
            amount
        } else {
            capacity + 2 * (amount - capacity)
        }
    }

    /// Records `color`'s allocation after validating it against the cap,
    /// the piece's capacity-derived cost, and the side's available BP.
    /// Returns the BP cost actually charged.
    pub fn submit_allocation(
        &mut self,
        color: Color,
        amount: u32,
        max_bp_allocation: u32,
        available_bp: u32,
    ) -> GambitResult<u32> {
        let is_attacker = color == self.attacker_color;
        let slot = if is_attacker {
            &mut self.attacker_allocation
        } else {
            &mut self.defender_allocation
        };
        if slot.is_some() {
            return Err(GambitError::AlreadyAllocated);
        }
        if amount > max_bp_allocation {
            return Err(GambitError::InvalidBpAllocation);
        }
        let capacity = if is_attacker {
            EngineConfig::duel_capacity(self.attacker_kind)
        } else {
            EngineConfig::duel_capacity(self.defender_kind)
        };
        let cost = Self::allocation_cost(amount, capacity);
        if cost > available_bp {
            return Err(GambitError::InvalidBpAllocation);
        }
        *slot = Some(amount);
        Ok(cost)
    }

    /// Resolves the duel once both sides have allocated. Returns
    /// `(outcome, attacker_cost, defender_cost)`.
    ///
    /// # Panics
    /// Panics if called before [`Self::is_ready`] — this is an internal
    /// invariant violation, not a caller-recoverable error.
    #[must_use]
    pub fn resolve(&self) -> (DuelOutcome, u32, u32) {
        let attacker_allocation = self.attacker_allocation.expect("duel not ready");
        let defender_allocation = self.defender_allocation.expect("duel not ready");
        let outcome = if attacker_allocation > defender_allocation {
            DuelOutcome::AttackerWins
        } else {
            DuelOutcome::DefenderWins
        };
        let attacker_cost =
            Self::allocation_cost(attacker_allocation, EngineConfig::duel_capacity(self.attacker_kind));
        let defender_cost =
            Self::allocation_cost(defender_allocation, EngineConfig::duel_capacity(self.defender_kind));
        (outcome, attacker_cost, defender_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::core::Square;

    fn sample_duel() -> PendingDuel {
        PendingDuel::new(
            1,
            2,
            Color::White,
            Square::new(3, 3).unwrap(),
            Square::new(3, 4).unwrap(),
            PieceKind::Rook,
            PieceKind::Pawn,
        )
    }

    #[test]
    fn cost_is_linear_within_capacity_and_doubled_above() {
        assert_eq!(PendingDuel::allocation_cost(3, 5), 3);
        assert_eq!(PendingDuel::allocation_cost(5, 5), 5);
        assert_eq!(PendingDuel::allocation_cost(7, 5), 5 + 2 * 2);
    }

    #[test]
    fn higher_allocation_wins() {
        let mut duel = sample_duel();
        duel.submit_allocation(Color::White, 6, 10, 39).unwrap();
        duel.submit_allocation(Color::Black, 4, 10, 39).unwrap();
        let (outcome, attacker_cost, defender_cost) = duel.resolve();
        assert_eq!(outcome, DuelOutcome::AttackerWins);
        assert_eq!(attacker_cost, 5 + 2 * (6 - 5));
        assert_eq!(defender_cost, 1 + 2 * (4 - 1));
    }

    #[test]
    fn tie_favors_defender() {
        let mut duel = sample_duel();
        duel.submit_allocation(Color::White, 4, 10, 39).unwrap();
        duel.submit_allocation(Color::Black, 4, 10, 39).unwrap();
        assert_eq!(duel.resolve().0, DuelOutcome::DefenderWins);
    }

    #[test]
    fn double_allocation_rejected() {
        let mut duel = sample_duel();
        duel.submit_allocation(Color::White, 4, 10, 39).unwrap();
        assert!(matches!(
            duel.submit_allocation(Color::White, 2, 10, 39),
            Err(GambitError::AlreadyAllocated)
        ));
    }

    #[test]
    fn allocation_above_available_bp_rejected() {
        let mut duel = sample_duel();
        assert!(matches!(
            duel.submit_allocation(Color::White, 8, 10, 5),
            Err(GambitError::InvalidBpAllocation)
        ));
    }
}
