//! Slot assignment: mapping dealt cards onto the three category slots.
//!
//! The tap-to-place client flow is a UI convenience; the server treats an
//! assignment as plain data and re-validates on every submission.

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::error::EngineError;
use super::types::{BattleSlot, CardId, CompleteAssignment};

/// A possibly partial slot layout, as a client builds it up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct SlotAssignment {
    pub power: Option<CardId>,
    pub torque: Option<CardId>,
    pub speed: Option<CardId>,
}

impl SlotAssignment {
    pub fn get(&self, slot: BattleSlot) -> Option<CardId> {
        match slot {
            BattleSlot::Power => self.power,
            BattleSlot::Torque => self.torque,
            BattleSlot::Speed => self.speed,
        }
    }

    fn slot_mut(&mut self, slot: BattleSlot) -> &mut Option<CardId> {
        match slot {
            BattleSlot::Power => &mut self.power,
            BattleSlot::Torque => &mut self.torque,
            BattleSlot::Speed => &mut self.speed,
        }
    }

    /// Place a card into a slot. A card occupies at most one slot at a time,
    /// so it is first removed from wherever else it sits.
    pub fn assign(&mut self, card_id: CardId, slot: BattleSlot) {
        for s in BattleSlot::all() {
            if self.get(s) == Some(card_id) {
                *self.slot_mut(s) = None;
            }
        }
        *self.slot_mut(slot) = Some(card_id);
    }

    pub fn clear(&mut self, slot: BattleSlot) {
        *self.slot_mut(slot) = None;
    }

    /// Checks that all three slots are filled with distinct cards.
    pub fn validate(&self) -> Result<CompleteAssignment, EngineError> {
        let mut missing = Vec::new();
        for slot in BattleSlot::all() {
            if self.get(slot).is_none() {
                missing.push(format!("{slot:?}"));
            }
        }
        if !missing.is_empty() {
            return Err(EngineError::IncompleteAssignment(format!(
                "unfilled slot(s): {}",
                missing.join(", ")
            )));
        }
        let (power, torque, speed) = (
            self.power.unwrap_or_default(),
            self.torque.unwrap_or_default(),
            self.speed.unwrap_or_default(),
        );
        if power == torque || power == speed || torque == speed {
            return Err(EngineError::IncompleteAssignment(
                "a card occupies more than one slot".to_string(),
            ));
        }
        Ok(CompleteAssignment {
            power,
            torque,
            speed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_moves_a_card_between_slots() {
        let mut a = SlotAssignment::default();
        a.assign(7, BattleSlot::Power);
        a.assign(7, BattleSlot::Torque);
        assert_eq!(a.power, None);
        assert_eq!(a.torque, Some(7));
    }

    #[test]
    fn validate_rejects_unfilled_and_duplicated_slots() {
        let mut a = SlotAssignment::default();
        a.assign(1, BattleSlot::Power);
        a.assign(2, BattleSlot::Torque);
        assert!(matches!(
            a.validate(),
            Err(EngineError::IncompleteAssignment(_))
        ));

        let dup = SlotAssignment {
            power: Some(1),
            torque: Some(1),
            speed: Some(2),
        };
        assert!(matches!(
            dup.validate(),
            Err(EngineError::IncompleteAssignment(_))
        ));
    }

    #[test]
    fn validate_accepts_three_distinct_cards() {
        let a = SlotAssignment {
            power: Some(1),
            torque: Some(2),
            speed: Some(3),
        };
        let complete = a.validate().expect("complete assignment");
        assert_eq!(complete.card_ids(), [1, 2, 3]);
    }
}
