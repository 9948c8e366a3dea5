//! Card dealing: uniform sampling without replacement from the eligible pool.
//!
//! Dealing always happens server-side against the engine RNG, and the caller
//! commits the hand to storage before revealing it, so a retried request reads
//! the stored hand instead of re-rolling.

use rand::RngCore;
use rand_pcg::Lcg64Xsh32;

use super::error::EngineError;
use super::types::CardId;

/// Draw `count` distinct cards uniformly at random from `eligible`.
pub fn deal(
    eligible: &[CardId],
    count: usize,
    rng: &mut Lcg64Xsh32,
) -> Result<Vec<CardId>, EngineError> {
    if eligible.len() < count {
        return Err(EngineError::InsufficientCards {
            requested: count,
            available: eligible.len(),
        });
    }
    let mut pool = eligible.to_vec();
    let mut hand = Vec::with_capacity(count);
    for _ in 0..count {
        let pick = (rng.next_u64() as usize) % pool.len();
        hand.push(pool.swap_remove(pick));
    }
    Ok(hand)
}
