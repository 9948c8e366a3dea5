//! Battle resolution: effective stats, per-round comparison, and the two
//! match aggregation modes.
//!
//! Everything here is pure data in, data out; the orchestrating state applies
//! the results.

use super::catalog::ModCatalog;
use super::types::{BattleSlot, Card, CardId, ModStages, RoundResult, StatWeights, Winner};

/// Base stat plus the cumulative tuning bonus for the slot's mod, if the card
/// is tuned by its side.
pub fn effective_stat(
    card: &Card,
    stages: Option<&ModStages>,
    slot: BattleSlot,
    catalog: &ModCatalog,
) -> u64 {
    let base = u64::from(slot.base_stat(card));
    let bonus = stages
        .map(|s| catalog.cumulative_bonus(slot.mod_kind(), s.get(slot.mod_kind())))
        .unwrap_or(0);
    base + u64::from(bonus)
}

/// One side's card and effective value for a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCard {
    pub card_id: CardId,
    pub value: u64,
}

/// One side's full best-of-3 layout, values already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideCards {
    pub power: SlotCard,
    pub torque: SlotCard,
    pub speed: SlotCard,
}

impl SideCards {
    fn slot(&self, slot: BattleSlot) -> SlotCard {
        match slot {
            BattleSlot::Power => self.power,
            BattleSlot::Torque => self.torque,
            BattleSlot::Speed => self.speed,
        }
    }
}

/// Higher effective value wins the round; equal values draw. No category
/// weighting in this mode.
pub fn resolve_round(slot: BattleSlot, challenger: SlotCard, opponent: SlotCard) -> RoundResult {
    let winner = if challenger.value > opponent.value {
        Winner::Challenger
    } else if opponent.value > challenger.value {
        Winner::Opponent
    } else {
        Winner::Draw
    };
    RoundResult {
        slot,
        challenger_card: challenger.card_id,
        challenger_value: challenger.value,
        opponent_card: opponent.card_id,
        opponent_value: opponent.value,
        winner,
    }
}

/// Resolve all three rounds and aggregate by majority: strictly more round
/// wins takes the match, anything else is a draw.
pub fn resolve_best_of_three(
    challenger: &SideCards,
    opponent: &SideCards,
) -> (Vec<RoundResult>, Winner) {
    let rounds: Vec<RoundResult> = BattleSlot::all()
        .iter()
        .map(|&slot| resolve_round(slot, challenger.slot(slot), opponent.slot(slot)))
        .collect();
    let challenger_wins = rounds
        .iter()
        .filter(|r| r.winner == Winner::Challenger)
        .count();
    let opponent_wins = rounds
        .iter()
        .filter(|r| r.winner == Winner::Opponent)
        .count();
    let winner = if challenger_wins > opponent_wins {
        Winner::Challenger
    } else if opponent_wins > challenger_wins {
        Winner::Opponent
    } else {
        Winner::Draw
    };
    (rounds, winner)
}

/// One side's effective stat triple for aggregate scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideStats {
    pub power: u64,
    pub torque: u64,
    pub speed: u64,
}

pub fn aggregate_score(weights: StatWeights, stats: SideStats) -> u64 {
    u64::from(weights.power) * stats.power
        + u64::from(weights.torque) * stats.torque
        + u64::from(weights.speed) * stats.speed
}

/// Weighted aggregate mode: one score per side, higher wins, equal draws.
pub fn resolve_aggregate(
    weights: StatWeights,
    challenger: SideStats,
    opponent: SideStats,
) -> (u64, u64, Winner) {
    let challenger_score = aggregate_score(weights, challenger);
    let opponent_score = aggregate_score(weights, opponent);
    let winner = if challenger_score > opponent_score {
        Winner::Challenger
    } else if opponent_score > challenger_score {
        Winner::Opponent
    } else {
        Winner::Draw
    };
    (challenger_score, opponent_score, winner)
}
