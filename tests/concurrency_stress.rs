// Threaded tests for the single-writer-wins disciplines: double accept,
// upgrade vs. balance read, and event log append.
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{DateTime, TimeZone, Utc};
use motor_duel::engine::error::EngineError;
use motor_duel::engine::event_log::{EventLog, EventPayload};
use motor_duel::engine::types::{
    BattleCategory, CardKind, CardSpec, ChallengeDraft, CounterStake, ModKind, Rarity,
    RewardChoice, StakeDraft,
};
use motor_duel::engine::GameState;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0)
        .single()
        .expect("valid date")
}

fn vehicle(name: &str, stat: u32) -> CardSpec {
    CardSpec {
        name: name.to_string(),
        kind: CardKind::Vehicle,
        power: stat,
        torque: stat,
        top_speed: stat,
        rarity: Rarity::Common,
    }
}

#[test]
fn only_one_of_two_racing_accepts_completes() {
    let mut gs = GameState::new();
    let a = gs.add_player("a", 0);
    let b = gs.add_player("b", 0);
    let card_a = gs.add_card(a, vehicle("a-car", 100)).expect("owner exists");
    let card_b = gs.add_card(b, vehicle("b-car", 120)).expect("owner exists");
    let challenge = gs
        .create_challenge(
            ChallengeDraft {
                challenger_id: a,
                opponent_id: Some(b),
                expires_at: None,
                stake: StakeDraft::Aggregate {
                    category: BattleCategory::Total,
                    card_id: card_a,
                },
                reward: RewardChoice::Xp,
            },
            t0(),
        )
        .expect("valid draft");

    let shared = Arc::new(Mutex::new(gs));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let shared = Arc::clone(&shared);
        let id = challenge.id;
        handles.push(thread::spawn(move || {
            let mut gs = shared.lock().expect("state lock");
            gs.accept_challenge(
                id,
                CounterStake {
                    user_id: b,
                    assignment: None,
                    card_id: Some(card_b),
                },
                t0(),
            )
        }));
    }
    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    let completed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(completed, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(EngineError::AlreadyResolved))));
    // The winner was credited exactly once.
    let gs = shared.lock().expect("state lock");
    assert_eq!(gs.player(b).expect("exists").earned_xp, 30);
}

#[test]
fn concurrent_upgrades_cannot_overspend_a_shared_balance() {
    let mut gs = GameState::new();
    // 60 XP covers exactly one engine stage, not two.
    let user = gs.add_player("a", 60);
    let c1 = gs.add_card(user, vehicle("v1", 1)).expect("owner exists");
    let c2 = gs.add_card(user, vehicle("v2", 1)).expect("owner exists");
    let t1 = gs.enroll_tuned_car(user, c1, t0()).expect("owned vehicle");
    let t2 = gs.enroll_tuned_car(user, c2, t0()).expect("owned vehicle");

    let shared = Arc::new(Mutex::new(gs));
    let mut handles = Vec::new();
    for id in [t1.id, t2.id] {
        let shared = Arc::clone(&shared);
        handles.push(thread::spawn(move || {
            let mut gs = shared.lock().expect("state lock");
            gs.upgrade_mod(id, ModKind::Engine, t0())
        }));
    }
    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(EngineError::InsufficientXp { .. }))));
    let gs = shared.lock().expect("state lock");
    assert_eq!(gs.available_xp(user).expect("exists"), 0);
}

#[test]
fn event_log_sequences_stay_gap_free_under_contention() {
    let log = Arc::new(EventLog::new());
    let threads = 16usize;
    let per_thread = 1000usize;
    let mut handles = Vec::new();
    for i in 0..threads {
        let log = Arc::clone(&log);
        handles.push(thread::spawn(move || {
            for j in 0..per_thread {
                log.append(
                    Utc::now(),
                    EventPayload::XpCredited {
                        user_id: i as u64,
                        amount: j as u32,
                    },
                );
            }
        }));
    }
    for h in handles {
        h.join().expect("thread panicked");
    }
    let entries = log.entries();
    assert_eq!(entries.len(), threads * per_thread);
    let mut seqs: Vec<u64> = entries.iter().map(|e| e.seq).collect();
    seqs.sort_unstable();
    for (idx, seq) in seqs.iter().enumerate() {
        assert_eq!(*seq as usize, idx + 1);
    }
}
