//! The orchestrating store: players, cards, tuned cars, committed deals and
//! challenges, all behind one lock.
//!
//! Every public operation is a short, independent unit of work. Methods take
//! `now` from the caller wherever time matters, so tests can replay any
//! schedule. Expiry is applied lazily on the read and accept paths; nothing
//! here runs on a timer.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Lcg64Xsh32;

use crate::config::BalanceConfig;

use super::catalog::ModCatalog;
use super::dealer;
use super::error::EngineError;
use super::event_log::{EventLog, EventPayload};
use super::rate_limit;
use super::resolve::{self, SideCards, SideStats, SlotCard};
use super::rewards::{self, Settlement};
use super::types::{
    BattleSlot, Card, CardId, CardSpec, Challenge, ChallengeDraft, ChallengeId, ChallengeOutcome,
    ChallengeStake, ChallengeStatus, ChallengeView, CounterStake, DealtHand, ModKind,
    OutcomeDetail, PlayerAccount, RewardChoice, RewardMode, StakeDraft, TunedCar, TunedCarId,
    UserId, Winner,
};
use super::tuning::TuningLedger;

pub struct GameState {
    pub config: BalanceConfig,
    pub catalog: ModCatalog,
    pub event_log: Arc<EventLog>,
    players: HashMap<UserId, PlayerAccount>,
    cards: HashMap<CardId, Card>,
    tuning: TuningLedger,
    challenges: HashMap<ChallengeId, Challenge>,
    dealt_hands: HashMap<UserId, DealtHand>,
    rng: Lcg64Xsh32,
    next_user_id: UserId,
    next_card_id: CardId,
    next_challenge_id: ChallengeId,
}

impl GameState {
    pub fn new() -> Self {
        Self::with_config(BalanceConfig::default())
    }

    pub fn with_config(config: BalanceConfig) -> Self {
        let catalog = ModCatalog::new(config.mods);
        GameState {
            config,
            catalog,
            event_log: Arc::new(EventLog::new()),
            players: HashMap::new(),
            cards: HashMap::new(),
            tuning: TuningLedger::new(),
            challenges: HashMap::new(),
            dealt_hands: HashMap::new(),
            rng: Lcg64Xsh32::from_entropy(),
            next_user_id: 0,
            next_card_id: 0,
            next_challenge_id: 0,
        }
    }

    /// Reseed the engine RNG for deterministic replays.
    pub fn set_seed(&mut self, seed: u64, now: DateTime<Utc>) {
        let mut seed_bytes: [u8; 16] = [0u8; 16];
        seed_bytes[0..8].copy_from_slice(&seed.to_le_bytes());
        seed_bytes[8..16].copy_from_slice(&seed.to_le_bytes());
        self.rng = Lcg64Xsh32::from_seed(seed_bytes);
        self.event_log.append(now, EventPayload::SeedSet { seed });
    }

    // ---- Players and cards ----

    pub fn add_player(&mut self, name: &str, earned_xp: u32) -> UserId {
        self.next_user_id += 1;
        let id = self.next_user_id;
        self.players.insert(
            id,
            PlayerAccount {
                id,
                name: name.to_string(),
                earned_xp,
                cards: Vec::new(),
            },
        );
        id
    }

    pub fn add_card(&mut self, owner_id: UserId, spec: CardSpec) -> Result<CardId, EngineError> {
        self.next_card_id += 1;
        let id = self.next_card_id;
        let owner = self
            .players
            .get_mut(&owner_id)
            .ok_or_else(|| EngineError::NotFound(format!("player {owner_id}")))?;
        owner.cards.push(id);
        self.cards.insert(
            id,
            Card {
                id,
                name: spec.name,
                kind: spec.kind,
                power: spec.power,
                torque: spec.torque,
                top_speed: spec.top_speed,
                rarity: spec.rarity,
            },
        );
        Ok(id)
    }

    pub fn player(&self, id: UserId) -> Result<&PlayerAccount, EngineError> {
        self.players
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(format!("player {id}")))
    }

    pub fn card(&self, id: CardId) -> Result<&Card, EngineError> {
        self.cards
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(format!("card {id}")))
    }

    /// The user's owned cards, resolved to full card rows.
    pub fn cards_of(&self, user_id: UserId) -> Result<Vec<Card>, EngineError> {
        let player = self.player(user_id)?;
        Ok(player
            .cards
            .iter()
            .filter_map(|id| self.cards.get(id))
            .cloned()
            .collect())
    }

    /// Battle-eligible (vehicle) card ids owned by the user, in id order.
    pub fn eligible_cards(&self, user_id: UserId) -> Result<Vec<CardId>, EngineError> {
        let player = self.player(user_id)?;
        let mut ids: Vec<CardId> = player
            .cards
            .iter()
            .copied()
            .filter(|id| self.cards.get(id).map(|c| c.is_vehicle()).unwrap_or(false))
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    // ---- XP balance ----

    /// Earned XP minus the sum invested across the user's tuned cars.
    /// Recomputed on every read, never cached.
    pub fn available_xp(&self, user_id: UserId) -> Result<u32, EngineError> {
        let earned = self.player(user_id)?.earned_xp;
        Ok(earned.saturating_sub(self.tuning.invested_by(user_id)))
    }

    /// Total XP the user currently has locked into tuning.
    pub fn invested_xp(&self, user_id: UserId) -> Result<u32, EngineError> {
        self.player(user_id)?;
        Ok(self.tuning.invested_by(user_id))
    }

    pub fn credit_xp(
        &mut self,
        user_id: UserId,
        amount: u32,
        now: DateTime<Utc>,
    ) -> Result<u32, EngineError> {
        let player = self
            .players
            .get_mut(&user_id)
            .ok_or_else(|| EngineError::NotFound(format!("player {user_id}")))?;
        player.earned_xp += amount;
        let earned = player.earned_xp;
        self.event_log
            .append(now, EventPayload::XpCredited { user_id, amount });
        Ok(earned)
    }

    // ---- Dealing ----

    /// Deal a fresh hand and commit it before it is revealed. A retried read
    /// goes through [`GameState::committed_hand`] and sees the same set; only
    /// another call here re-rolls.
    pub fn deal_hand(&mut self, user_id: UserId, now: DateTime<Utc>) -> Result<DealtHand, EngineError> {
        let eligible = self.eligible_cards(user_id)?;
        let card_ids = dealer::deal(&eligible, self.config.deal_size, &mut self.rng)?;
        let hand = DealtHand {
            user_id,
            card_ids: card_ids.clone(),
            dealt_at: now,
        };
        self.dealt_hands.insert(user_id, hand.clone());
        self.event_log
            .append(now, EventPayload::CardsDealt { user_id, card_ids });
        Ok(hand)
    }

    pub fn committed_hand(&self, user_id: UserId) -> Result<&DealtHand, EngineError> {
        self.dealt_hands
            .get(&user_id)
            .ok_or_else(|| EngineError::NotFound(format!("dealt hand for player {user_id}")))
    }

    // ---- Tuning ----

    pub fn tuned_car(&self, id: TunedCarId) -> Result<&TunedCar, EngineError> {
        self.tuning
            .get(id)
            .ok_or_else(|| EngineError::NotFound(format!("tuned car {id}")))
    }

    pub fn tuned_cars_of(&self, user_id: UserId) -> Vec<TunedCar> {
        self.tuning
            .for_user(user_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn enroll_tuned_car(
        &mut self,
        user_id: UserId,
        card_id: CardId,
        now: DateTime<Utc>,
    ) -> Result<TunedCar, EngineError> {
        self.check_owned_vehicle(user_id, card_id)?;
        let id = self.tuning.add_car(user_id, card_id)?;
        self.event_log.append(
            now,
            EventPayload::TunedCarAdded {
                tuned_car_id: id,
                user_id,
                card_id,
            },
        );
        Ok(self.tuned_car(id)?.clone())
    }

    /// Delete a tuned car and report the refunded XP. The refund needs no
    /// balance write: available XP is earned minus invested, so dropping the
    /// row restores exactly `xp_invested`.
    pub fn remove_tuned_car(
        &mut self,
        id: TunedCarId,
        now: DateTime<Utc>,
    ) -> Result<u32, EngineError> {
        let removed = self.tuning.remove_car(id)?;
        self.event_log.append(
            now,
            EventPayload::TunedCarRemoved {
                tuned_car_id: removed.id,
                user_id: removed.user_id,
                refunded_xp: removed.xp_invested,
            },
        );
        Ok(removed.xp_invested)
    }

    /// Buy the next stage of one mod. The balance read and the stage commit
    /// both happen under the state lock, so two upgrades for the same user
    /// cannot both pass against the same available XP.
    pub fn upgrade_mod(
        &mut self,
        id: TunedCarId,
        kind: ModKind,
        now: DateTime<Utc>,
    ) -> Result<TunedCar, EngineError> {
        let user_id = self.tuned_car(id)?.user_id;
        let available = self.available_xp(user_id)?;
        let cost = self.tuning.upgrade(id, kind, available, &self.catalog)?;
        let car = self.tuned_car(id)?.clone();
        debug!(
            "tuned car {} upgraded {:?} to stage {} for {} XP",
            id,
            kind,
            car.stages.get(kind),
            cost
        );
        self.event_log.append(
            now,
            EventPayload::StageUpgraded {
                tuned_car_id: id,
                mod_kind: kind,
                stage: car.stages.get(kind),
                cost,
            },
        );
        Ok(car)
    }

    // ---- Challenges ----

    pub fn challenge(&self, id: ChallengeId, now: DateTime<Utc>) -> Result<ChallengeView, EngineError> {
        self.challenges
            .get(&id)
            .map(|c| c.view(now))
            .ok_or_else(|| EngineError::NotFound(format!("challenge {id}")))
    }

    /// All challenges, or only those a user is party to, in id order.
    pub fn challenges_of(&self, user_id: Option<UserId>, now: DateTime<Utc>) -> Vec<ChallengeView> {
        let mut views: Vec<ChallengeView> = self
            .challenges
            .values()
            .filter(|c| user_id.map(|u| c.involves(u)).unwrap_or(true))
            .map(|c| c.view(now))
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }

    pub fn create_challenge(
        &mut self,
        draft: ChallengeDraft,
        now: DateTime<Utc>,
    ) -> Result<ChallengeView, EngineError> {
        self.player(draft.challenger_id)?;
        if let Some(opponent_id) = draft.opponent_id {
            if opponent_id == draft.challenger_id {
                return Err(EngineError::SelfChallenge);
            }
            self.player(opponent_id)?;
        }

        let created: Vec<DateTime<Utc>> = self
            .challenges
            .values()
            .filter(|c| c.challenger_id == draft.challenger_id)
            .map(|c| c.created_at)
            .collect();
        let in_window = rate_limit::recent_count(created.iter(), now, self.config.rate_window_days);
        rate_limit::check_creation_allowed(in_window, self.config.challenge_cap)?;

        let expires_at = draft
            .expires_at
            .unwrap_or_else(|| now + Duration::hours(self.config.default_challenge_ttl_hours));
        if expires_at <= now {
            return Err(EngineError::InvalidExpiry);
        }

        let stake = match &draft.stake {
            StakeDraft::BestOfThree { assignment } => {
                if draft.opponent_id.is_none() {
                    return Err(EngineError::OpponentRequired);
                }
                let complete = assignment.validate()?;
                for card_id in complete.card_ids() {
                    self.check_owned_vehicle(draft.challenger_id, card_id)?;
                    self.check_dealt(draft.challenger_id, card_id)?;
                }
                ChallengeStake::BestOfThree {
                    assignment: complete,
                }
            }
            StakeDraft::Aggregate { category, card_id } => {
                self.check_owned_vehicle(draft.challenger_id, *card_id)?;
                ChallengeStake::Aggregate {
                    category: *category,
                    card_id: *card_id,
                }
            }
        };

        // Reward amounts are captured at creation so later balance changes
        // never alter a pending challenge's payout.
        let reward_mode = match draft.reward {
            RewardChoice::Xp => RewardMode::Xp {
                win: self.config.rewards.win,
                lose: self.config.rewards.lose,
                draw: self.config.rewards.draw,
            },
            RewardChoice::CardWager => RewardMode::CardWager,
        };

        self.next_challenge_id += 1;
        let id = self.next_challenge_id;
        let challenge = Challenge {
            id,
            challenger_id: draft.challenger_id,
            opponent_id: draft.opponent_id,
            status: ChallengeStatus::Pending,
            stake,
            counter_stake: None,
            reward_mode,
            created_at: now,
            expires_at,
            outcome: None,
        };
        let view = challenge.view(now);
        self.challenges.insert(id, challenge);
        self.event_log.append(
            now,
            EventPayload::ChallengeCreated {
                challenge_id: id,
                challenger_id: draft.challenger_id,
                opponent_id: draft.opponent_id,
            },
        );
        if let Some(opponent_id) = draft.opponent_id {
            self.notify(
                opponent_id,
                "challenge_received",
                format!("challenge {id} from player {}", draft.challenger_id),
                now,
            );
        }
        Ok(view)
    }

    /// Resolve a pending challenge with the acceptor's counter-side.
    ///
    /// The status flip is checked against the stored row right before the
    /// write, so of two racing accepts exactly one completes and the other
    /// gets `AlreadyResolved`.
    pub fn accept_challenge(
        &mut self,
        id: ChallengeId,
        counter: CounterStake,
        now: DateTime<Utc>,
    ) -> Result<ChallengeView, EngineError> {
        let snapshot = self
            .challenges
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("challenge {id}")))?;
        match snapshot.effective_status(now) {
            ChallengeStatus::Pending => {}
            ChallengeStatus::Expired => {
                self.mark_expired(id);
                return Err(EngineError::ChallengeExpired);
            }
            ChallengeStatus::Completed | ChallengeStatus::Declined => {
                return Err(EngineError::AlreadyResolved)
            }
        }

        let acceptor = counter.user_id;
        self.player(acceptor)?;
        match snapshot.opponent_id {
            Some(opponent_id) if opponent_id != acceptor => {
                return Err(EngineError::NotChallengeParty)
            }
            None if acceptor == snapshot.challenger_id => {
                return Err(EngineError::NotChallengeParty)
            }
            _ => {}
        }

        // A card may have been traded or repossessed since creation; never
        // resolve against a stake its side no longer owns.
        for card_id in snapshot.stake.staked_cards() {
            if !self.player(snapshot.challenger_id)?.owns(card_id) {
                return Err(EngineError::CardNoLongerOwned(card_id));
            }
        }

        let (counter_stake, winner, detail) = match &snapshot.stake {
            ChallengeStake::BestOfThree { assignment } => {
                let raw = counter.assignment.ok_or_else(|| {
                    EngineError::IncompleteAssignment(
                        "the counter side must supply a slot assignment".to_string(),
                    )
                })?;
                let complete = raw.validate()?;
                for card_id in complete.card_ids() {
                    self.check_owned_vehicle(acceptor, card_id)?;
                    self.check_dealt(acceptor, card_id)?;
                }
                let challenger_side = self.side_cards(snapshot.challenger_id, assignment)?;
                let opponent_side = self.side_cards(acceptor, &complete)?;
                let (rounds, winner) = resolve::resolve_best_of_three(&challenger_side, &opponent_side);
                (
                    ChallengeStake::BestOfThree {
                        assignment: complete,
                    },
                    winner,
                    OutcomeDetail::Rounds { rounds },
                )
            }
            ChallengeStake::Aggregate { category, card_id } => {
                let counter_card = counter.card_id.ok_or_else(|| {
                    EngineError::IncompleteAssignment(
                        "the counter side must supply a chosen card".to_string(),
                    )
                })?;
                self.check_owned_vehicle(acceptor, counter_card)?;
                let challenger_stats = self.side_stats(snapshot.challenger_id, *card_id)?;
                let opponent_stats = self.side_stats(acceptor, counter_card)?;
                let (challenger_score, opponent_score, winner) =
                    resolve::resolve_aggregate(category.weights(), challenger_stats, opponent_stats);
                (
                    ChallengeStake::Aggregate {
                        category: *category,
                        card_id: counter_card,
                    },
                    winner,
                    OutcomeDetail::Scores {
                        challenger_score,
                        opponent_score,
                    },
                )
            }
        };

        let winner_id = match winner {
            Winner::Challenger => Some(snapshot.challenger_id),
            Winner::Opponent => Some(acceptor),
            Winner::Draw => None,
        };
        let settlement = rewards::settle(
            &snapshot.reward_mode,
            &self.config.rewards,
            winner,
            snapshot.challenger_id,
            acceptor,
            &snapshot.stake.staked_cards(),
            &counter_stake.staked_cards(),
        );

        let consumed_hands = matches!(snapshot.stake, ChallengeStake::BestOfThree { .. });
        {
            let stored = self
                .challenges
                .get_mut(&id)
                .ok_or_else(|| EngineError::NotFound(format!("challenge {id}")))?;
            if stored.status != ChallengeStatus::Pending {
                return Err(EngineError::AlreadyResolved);
            }
            stored.status = ChallengeStatus::Completed;
            stored.opponent_id = Some(acceptor);
            stored.counter_stake = Some(counter_stake);
            stored.outcome = Some(ChallengeOutcome { winner_id, detail });
        }
        self.apply_settlement(&settlement, now);
        if consumed_hands {
            self.dealt_hands.remove(&snapshot.challenger_id);
            self.dealt_hands.remove(&acceptor);
        }
        info!("challenge {} completed, winner {:?}", id, winner_id);
        self.event_log.append(
            now,
            EventPayload::ChallengeCompleted {
                challenge_id: id,
                winner_id,
            },
        );
        self.notify(
            snapshot.challenger_id,
            "challenge_resolved",
            format!("challenge {id} resolved"),
            now,
        );
        self.notify(
            acceptor,
            "challenge_resolved",
            format!("challenge {id} resolved"),
            now,
        );
        self.challenge(id, now)
    }

    /// Refuse a pending challenge. Targeted challenges are declined by the
    /// challenged party; an open challenge is cancelled by its challenger,
    /// modeled as a self-decline.
    pub fn decline_challenge(
        &mut self,
        id: ChallengeId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<ChallengeView, EngineError> {
        let snapshot = self
            .challenges
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("challenge {id}")))?;
        match snapshot.effective_status(now) {
            ChallengeStatus::Pending => {}
            ChallengeStatus::Expired => {
                self.mark_expired(id);
                return Err(EngineError::ChallengeExpired);
            }
            ChallengeStatus::Completed | ChallengeStatus::Declined => {
                return Err(EngineError::AlreadyResolved)
            }
        }
        let allowed = match snapshot.opponent_id {
            Some(opponent_id) => user_id == opponent_id,
            None => user_id == snapshot.challenger_id,
        };
        if !allowed {
            return Err(EngineError::NotChallengeParty);
        }
        if let Some(stored) = self.challenges.get_mut(&id) {
            stored.status = ChallengeStatus::Declined;
        }
        self.event_log.append(
            now,
            EventPayload::ChallengeDeclined {
                challenge_id: id,
                declined_by: user_id,
            },
        );
        if user_id != snapshot.challenger_id {
            self.notify(
                snapshot.challenger_id,
                "challenge_declined",
                format!("challenge {id} was declined"),
                now,
            );
        }
        self.challenge(id, now)
    }

    /// Fire-and-forget notification sink; delivery is a collaborator concern.
    pub fn notify(&self, user_id: UserId, template: &str, detail: String, now: DateTime<Utc>) {
        info!("notify player {}: {} ({})", user_id, template, detail);
        self.event_log.append(
            now,
            EventPayload::Notified {
                user_id,
                template: template.to_string(),
                detail,
            },
        );
    }

    // ---- Internals ----

    fn mark_expired(&mut self, id: ChallengeId) {
        if let Some(stored) = self.challenges.get_mut(&id) {
            if stored.status == ChallengeStatus::Pending {
                stored.status = ChallengeStatus::Expired;
            }
        }
    }

    fn check_owned_vehicle(&self, user_id: UserId, card_id: CardId) -> Result<(), EngineError> {
        let card = self.card(card_id)?;
        if !card.is_vehicle() {
            return Err(EngineError::CardNotEligible(card_id));
        }
        if !self.player(user_id)?.owns(card_id) {
            return Err(EngineError::CardNoLongerOwned(card_id));
        }
        Ok(())
    }

    fn check_dealt(&self, user_id: UserId, card_id: CardId) -> Result<(), EngineError> {
        if !self.committed_hand(user_id)?.contains(card_id) {
            return Err(EngineError::CardNotDealt(card_id));
        }
        Ok(())
    }

    fn slot_card(
        &self,
        user_id: UserId,
        card_id: CardId,
        slot: BattleSlot,
    ) -> Result<SlotCard, EngineError> {
        let card = self.card(card_id)?;
        let stages = self.tuning.find(user_id, card_id).map(|c| &c.stages);
        Ok(SlotCard {
            card_id,
            value: resolve::effective_stat(card, stages, slot, &self.catalog),
        })
    }

    fn side_cards(
        &self,
        user_id: UserId,
        assignment: &super::types::CompleteAssignment,
    ) -> Result<SideCards, EngineError> {
        Ok(SideCards {
            power: self.slot_card(user_id, assignment.power, BattleSlot::Power)?,
            torque: self.slot_card(user_id, assignment.torque, BattleSlot::Torque)?,
            speed: self.slot_card(user_id, assignment.speed, BattleSlot::Speed)?,
        })
    }

    fn side_stats(&self, user_id: UserId, card_id: CardId) -> Result<SideStats, EngineError> {
        Ok(SideStats {
            power: self.slot_card(user_id, card_id, BattleSlot::Power)?.value,
            torque: self.slot_card(user_id, card_id, BattleSlot::Torque)?.value,
            speed: self.slot_card(user_id, card_id, BattleSlot::Speed)?.value,
        })
    }

    fn apply_settlement(&mut self, settlement: &Settlement, now: DateTime<Utc>) {
        for credit in &settlement.credits {
            let _ = self.credit_xp(credit.user_id, credit.amount, now);
        }
        for transfer in &settlement.transfers {
            // A transferred card cannot stay enrolled under its old owner;
            // the row is dropped, which also releases its invested XP.
            if let Some(tuned) = self.tuning.remove_for_card(transfer.from, transfer.card_id) {
                self.event_log.append(
                    now,
                    EventPayload::TunedCarRemoved {
                        tuned_car_id: tuned.id,
                        user_id: transfer.from,
                        refunded_xp: tuned.xp_invested,
                    },
                );
            }
            if let Some(from) = self.players.get_mut(&transfer.from) {
                from.cards.retain(|c| *c != transfer.card_id);
            }
            if let Some(to) = self.players.get_mut(&transfer.to) {
                to.cards.push(transfer.card_id);
            }
            self.event_log.append(
                now,
                EventPayload::CardTransferred {
                    card_id: transfer.card_id,
                    from_user_id: transfer.from,
                    to_user_id: transfer.to,
                },
            );
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
