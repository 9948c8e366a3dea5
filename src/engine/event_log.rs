//! Append-only audit log of engine mutations and outbound notifications.
//!
//! Thread-safe in-memory structure: a mutex-guarded vec plus an atomic
//! sequence counter, so entries carry strictly increasing, gap-free sequence
//! numbers even under concurrent append.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use super::types::{CardId, ChallengeId, ModKind, TunedCarId, UserId};

/// Everything the engine records about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "type")]
pub enum EventPayload {
    SeedSet {
        seed: u64,
    },
    CardsDealt {
        user_id: UserId,
        card_ids: Vec<CardId>,
    },
    ChallengeCreated {
        challenge_id: ChallengeId,
        challenger_id: UserId,
        opponent_id: Option<UserId>,
    },
    ChallengeCompleted {
        challenge_id: ChallengeId,
        winner_id: Option<UserId>,
    },
    ChallengeDeclined {
        challenge_id: ChallengeId,
        declined_by: UserId,
    },
    TunedCarAdded {
        tuned_car_id: TunedCarId,
        user_id: UserId,
        card_id: CardId,
    },
    TunedCarRemoved {
        tuned_car_id: TunedCarId,
        user_id: UserId,
        refunded_xp: u32,
    },
    StageUpgraded {
        tuned_car_id: TunedCarId,
        mod_kind: ModKind,
        stage: u8,
        cost: u32,
    },
    XpCredited {
        user_id: UserId,
        amount: u32,
    },
    CardTransferred {
        card_id: CardId,
        from_user_id: UserId,
        to_user_id: UserId,
    },
    Notified {
        user_id: UserId,
        template: String,
        detail: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct EventEntry {
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Default)]
pub struct EventLog {
    entries: Mutex<Vec<EventEntry>>,
    seq: AtomicU64,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    /// Append one entry and return it with its assigned sequence number.
    pub fn append(&self, at: DateTime<Utc>, payload: EventPayload) -> EventEntry {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = EventEntry { seq, at, payload };
        match self.entries.lock() {
            Ok(mut g) => g.push(entry.clone()),
            Err(poisoned) => poisoned.into_inner().push(entry.clone()),
        }
        entry
    }

    /// Snapshot of all entries, in append order.
    pub fn entries(&self) -> Vec<EventEntry> {
        match self.entries.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
