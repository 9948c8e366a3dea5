use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::assignment::SlotAssignment;

pub type UserId = u64;
pub type CardId = u64;
pub type TunedCarId = u64;
pub type ChallengeId = u64;

/// The three upgradeable stat channels of the tuning mini-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum ModKind {
    Engine,
    Turbo,
    WeightReduction,
}

impl ModKind {
    pub fn all() -> [ModKind; 3] {
        [ModKind::Engine, ModKind::Turbo, ModKind::WeightReduction]
    }

    /// The battle slot this mod's bonus feeds into.
    pub fn slot(&self) -> BattleSlot {
        match self {
            ModKind::Engine => BattleSlot::Power,
            ModKind::Turbo => BattleSlot::Torque,
            ModKind::WeightReduction => BattleSlot::Speed,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ModKind::Engine => "engine",
            ModKind::Turbo => "turbo",
            ModKind::WeightReduction => "weight-reduction",
        }
    }

    /// Parse the URL path form of a mod name.
    pub fn parse_slug(s: &str) -> Option<ModKind> {
        match s {
            "engine" => Some(ModKind::Engine),
            "turbo" => Some(ModKind::Turbo),
            "weight-reduction" => Some(ModKind::WeightReduction),
            _ => None,
        }
    }
}

/// One of the three battle category slots each side fills in best-of-3 mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum BattleSlot {
    Power,
    Torque,
    Speed,
}

impl BattleSlot {
    pub fn all() -> [BattleSlot; 3] {
        [BattleSlot::Power, BattleSlot::Torque, BattleSlot::Speed]
    }

    /// The mod whose cumulative bonus applies in this slot.
    pub fn mod_kind(&self) -> ModKind {
        match self {
            BattleSlot::Power => ModKind::Engine,
            BattleSlot::Torque => ModKind::Turbo,
            BattleSlot::Speed => ModKind::WeightReduction,
        }
    }

    pub fn base_stat(&self, card: &Card) -> u32 {
        match self {
            BattleSlot::Power => card.power,
            BattleSlot::Torque => card.torque,
            BattleSlot::Speed => card.top_speed,
        }
    }
}

/// What kind of collectible a card is. Only vehicles enter battles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum CardKind {
    Vehicle,
    Collectible,
}

/// Informational only; the engine never branches on rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// A collection card. Read-only to the engine; stats are the battle base values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
    pub power: u32,
    pub torque: u32,
    pub top_speed: u32,
    pub rarity: Rarity,
}

impl Card {
    pub fn is_vehicle(&self) -> bool {
        self.kind == CardKind::Vehicle
    }
}

/// Card fields as supplied at registration; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct CardSpec {
    pub name: String,
    pub kind: CardKind,
    pub power: u32,
    pub torque: u32,
    pub top_speed: u32,
    pub rarity: Rarity,
}

/// A player account as the engine sees it: earned XP plus owned cards.
/// How XP is earned (missions, purchases) is outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PlayerAccount {
    pub id: UserId,
    pub name: String,
    pub earned_xp: u32,
    pub cards: Vec<CardId>,
}

impl PlayerAccount {
    pub fn owns(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }
}

/// Current stage (0..=3) of each mod on a tuned car.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ModStages {
    pub engine: u8,
    pub turbo: u8,
    pub weight_reduction: u8,
}

impl ModStages {
    pub fn get(&self, kind: ModKind) -> u8 {
        match kind {
            ModKind::Engine => self.engine,
            ModKind::Turbo => self.turbo,
            ModKind::WeightReduction => self.weight_reduction,
        }
    }

    pub fn get_mut(&mut self, kind: ModKind) -> &mut u8 {
        match kind {
            ModKind::Engine => &mut self.engine,
            ModKind::Turbo => &mut self.turbo,
            ModKind::WeightReduction => &mut self.weight_reduction,
        }
    }
}

/// A card enrolled in the tuning mini-game.
///
/// Invariant: `xp_invested` equals the sum of the per-stage costs paid for the
/// current stages, so removal can refund exactly that amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct TunedCar {
    pub id: TunedCarId,
    pub user_id: UserId,
    pub card_id: CardId,
    pub stages: ModStages,
    pub xp_invested: u32,
}

/// A server-committed random hand. Stored before it is revealed, so repeated
/// reads return the same set and a client cannot re-roll by retrying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct DealtHand {
    pub user_id: UserId,
    pub card_ids: Vec<CardId>,
    pub dealt_at: DateTime<Utc>,
}

impl DealtHand {
    pub fn contains(&self, card_id: CardId) -> bool {
        self.card_ids.contains(&card_id)
    }
}

/// Which side of a contest came out ahead. Used both for single rounds and
/// for the overall match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum Winner {
    Challenger,
    Opponent,
    Draw,
}

/// Outcome of one best-of-3 round, with the effective values that decided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct RoundResult {
    pub slot: BattleSlot,
    pub challenger_card: CardId,
    pub challenger_value: u64,
    pub opponent_card: CardId,
    pub opponent_value: u64,
    pub winner: Winner,
}

/// Fixed per-category weight triple for aggregate scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct StatWeights {
    pub power: u32,
    pub torque: u32,
    pub speed: u32,
}

/// Battle category presets for the aggregate (single-card) mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum BattleCategory {
    Total,
    Power,
    Torque,
    Speed,
    Drag,
    Circuit,
}

impl BattleCategory {
    pub fn weights(&self) -> StatWeights {
        let (power, torque, speed) = match self {
            BattleCategory::Total => (1, 1, 1),
            BattleCategory::Power => (1, 0, 0),
            BattleCategory::Torque => (0, 1, 0),
            BattleCategory::Speed => (0, 0, 1),
            BattleCategory::Drag => (3, 2, 1),
            BattleCategory::Circuit => (1, 2, 2),
        };
        StatWeights {
            power,
            torque,
            speed,
        }
    }
}

/// How a completed challenge pays out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "reward_mode")]
pub enum RewardMode {
    /// Fixed XP credits, captured from config at creation time.
    Xp { win: u32, lose: u32, draw: u32 },
    /// The loser's staked cards transfer to the winner; no consolation credit.
    CardWager,
}

/// Reward mode requested by the challenge creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum RewardChoice {
    Xp,
    CardWager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum ChallengeStatus {
    Pending,
    Completed,
    Declined,
    Expired,
}

/// A validated, submittable slot layout: three filled slots, three distinct cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct CompleteAssignment {
    pub power: CardId,
    pub torque: CardId,
    pub speed: CardId,
}

impl CompleteAssignment {
    pub fn card_for(&self, slot: BattleSlot) -> CardId {
        match slot {
            BattleSlot::Power => self.power,
            BattleSlot::Torque => self.torque,
            BattleSlot::Speed => self.speed,
        }
    }

    pub fn card_ids(&self) -> [CardId; 3] {
        [self.power, self.torque, self.speed]
    }
}

/// What one side puts on the line, by battle mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "mode")]
pub enum ChallengeStake {
    /// Best-of-3 over the three category slots, one dealt card per slot.
    BestOfThree { assignment: CompleteAssignment },
    /// Single card scored by the category's weight triple.
    Aggregate {
        category: BattleCategory,
        card_id: CardId,
    },
}

impl ChallengeStake {
    /// All cards this stake references (and wagers, in card-wager mode).
    pub fn staked_cards(&self) -> Vec<CardId> {
        match self {
            ChallengeStake::BestOfThree { assignment } => assignment.card_ids().to_vec(),
            ChallengeStake::Aggregate { card_id, .. } => vec![*card_id],
        }
    }
}

/// Mode-specific resolution record of a completed challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "kind")]
pub enum OutcomeDetail {
    Rounds { rounds: Vec<RoundResult> },
    Scores {
        challenger_score: u64,
        opponent_score: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ChallengeOutcome {
    /// `None` means the match was a draw.
    pub winner_id: Option<UserId>,
    pub detail: OutcomeDetail,
}

/// A proposed or resolved 1v1 contest.
///
/// Lifecycle: created `Pending`; mutated exactly once more to `Completed` or
/// `Declined`, or lapses to `Expired` once `expires_at` passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Challenge {
    pub id: ChallengeId,
    pub challenger_id: UserId,
    /// `None` while an open challenge waits for any taker.
    pub opponent_id: Option<UserId>,
    pub status: ChallengeStatus,
    pub stake: ChallengeStake,
    /// The acceptor's side, recorded at acceptance.
    pub counter_stake: Option<ChallengeStake>,
    pub reward_mode: RewardMode,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub outcome: Option<ChallengeOutcome>,
}

impl Challenge {
    /// A pending challenge whose deadline has passed is expired even before
    /// any caller has written the status back.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ChallengeStatus::Pending && now >= self.expires_at
    }

    pub fn effective_status(&self, now: DateTime<Utc>) -> ChallengeStatus {
        if self.is_expired(now) {
            ChallengeStatus::Expired
        } else {
            self.status
        }
    }

    pub fn involves(&self, user_id: UserId) -> bool {
        self.challenger_id == user_id || self.opponent_id == Some(user_id)
    }

    /// Read-path projection with expiry surfaced.
    pub fn view(&self, now: DateTime<Utc>) -> ChallengeView {
        ChallengeView {
            id: self.id,
            challenger_id: self.challenger_id,
            opponent_id: self.opponent_id,
            status: self.effective_status(now),
            stake: self.stake.clone(),
            counter_stake: self.counter_stake.clone(),
            reward_mode: self.reward_mode.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            outcome: self.outcome.clone(),
        }
    }
}

/// What clients see. Identical to [`Challenge`] except that the status is the
/// effective one at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ChallengeView {
    pub id: ChallengeId,
    pub challenger_id: UserId,
    pub opponent_id: Option<UserId>,
    pub status: ChallengeStatus,
    pub stake: ChallengeStake,
    pub counter_stake: Option<ChallengeStake>,
    pub reward_mode: RewardMode,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub outcome: Option<ChallengeOutcome>,
}

/// Creation payload for a new challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ChallengeDraft {
    pub challenger_id: UserId,
    pub opponent_id: Option<UserId>,
    /// Defaults to creation time plus the configured TTL.
    pub expires_at: Option<DateTime<Utc>>,
    pub stake: StakeDraft,
    pub reward: RewardChoice,
}

/// The challenger's proposed side, before server-side validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "mode")]
pub enum StakeDraft {
    BestOfThree { assignment: SlotAssignment },
    Aggregate {
        category: BattleCategory,
        card_id: CardId,
    },
}

/// The acceptor's counter-side. Exactly one of the two fields applies,
/// matching the challenge's mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct CounterStake {
    pub user_id: UserId,
    pub assignment: Option<SlotAssignment>,
    pub card_id: Option<CardId>,
}
