//! The tuning ledger: per-user, per-card upgrade state.
//!
//! Investment is fully refundable: `xp_invested` tracks exactly the stage
//! costs paid, and removal hands that amount back to the caller to credit.
//! The ledger never touches XP balances itself.

use std::collections::HashMap;

use super::catalog::ModCatalog;
use super::error::EngineError;
use super::types::{CardId, ModKind, TunedCar, TunedCarId, UserId};

#[derive(Debug, Clone, Default)]
pub struct TuningLedger {
    cars: HashMap<TunedCarId, TunedCar>,
    next_id: TunedCarId,
}

impl TuningLedger {
    pub fn new() -> Self {
        TuningLedger::default()
    }

    pub fn get(&self, id: TunedCarId) -> Option<&TunedCar> {
        self.cars.get(&id)
    }

    pub fn for_user(&self, user_id: UserId) -> Vec<&TunedCar> {
        let mut cars: Vec<&TunedCar> =
            self.cars.values().filter(|c| c.user_id == user_id).collect();
        cars.sort_by_key(|c| c.id);
        cars
    }

    /// The user's tuned car for a specific card, if any.
    pub fn find(&self, user_id: UserId, card_id: CardId) -> Option<&TunedCar> {
        self.cars
            .values()
            .find(|c| c.user_id == user_id && c.card_id == card_id)
    }

    /// Total XP the user currently has locked into tuning.
    pub fn invested_by(&self, user_id: UserId) -> u32 {
        self.cars
            .values()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.xp_invested)
            .sum()
    }

    /// Enroll a card. At most one tuned car per (user, card).
    pub fn add_car(&mut self, user_id: UserId, card_id: CardId) -> Result<TunedCarId, EngineError> {
        if self.find(user_id, card_id).is_some() {
            return Err(EngineError::AlreadyTuned(card_id));
        }
        self.next_id += 1;
        let id = self.next_id;
        self.cars.insert(
            id,
            TunedCar {
                id,
                user_id,
                card_id,
                stages: Default::default(),
                xp_invested: 0,
            },
        );
        Ok(id)
    }

    /// Delete a tuned car and return the XP to refund.
    pub fn remove_car(&mut self, id: TunedCarId) -> Result<TunedCar, EngineError> {
        self.cars
            .remove(&id)
            .ok_or_else(|| EngineError::NotFound(format!("tuned car {id}")))
    }

    /// Drop a user's tuned car for a card, if present, returning it.
    /// Used when a wagered card is transferred away.
    pub fn remove_for_card(&mut self, user_id: UserId, card_id: CardId) -> Option<TunedCar> {
        let id = self.find(user_id, card_id)?.id;
        self.cars.remove(&id)
    }

    /// Buy the next stage of one mod. The available balance is supplied by the
    /// caller; the check and the stage commit happen in one call so the caller
    /// can hold its serialization boundary around both.
    pub fn upgrade(
        &mut self,
        id: TunedCarId,
        kind: ModKind,
        available_xp: u32,
        catalog: &ModCatalog,
    ) -> Result<u32, EngineError> {
        let car = self
            .cars
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("tuned car {id}")))?;
        let current = car.stages.get(kind);
        let cost = catalog
            .upgrade_cost(kind, current)
            .ok_or(EngineError::MaxStageReached)?;
        if available_xp < cost {
            return Err(EngineError::InsufficientXp {
                required: cost,
                available: available_xp,
            });
        }
        *car.stages.get_mut(kind) += 1;
        car.xp_invested += cost;
        Ok(cost)
    }
}
