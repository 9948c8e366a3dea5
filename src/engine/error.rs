//! Typed failure taxonomy for the engine.
//!
//! Every variant is a business-rule rejection the caller can recover from,
//! never a crash. The API layer owns the HTTP mapping; engine code only
//! decides which rule was broken.

use thiserror::Error;

use super::types::CardId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("dealing requested {requested} cards but only {available} are eligible")]
    InsufficientCards { requested: usize, available: usize },
    #[error("slot assignment is not submittable: {0}")]
    IncompleteAssignment(String),
    #[error("card {0} is already being tuned")]
    AlreadyTuned(CardId),
    #[error("{0} not found")]
    NotFound(String),
    #[error("all tuning stages for this mod are already installed")]
    MaxStageReached,
    #[error("upgrade costs {required} XP but only {available} is available")]
    InsufficientXp { required: u32, available: u32 },
    #[error("challenge creation cap of {cap} inside the trailing window reached")]
    RateLimited { cap: usize },
    #[error("challenge has expired")]
    ChallengeExpired,
    #[error("challenge is already resolved")]
    AlreadyResolved,
    #[error("card {0} is no longer owned by the submitting player")]
    CardNoLongerOwned(CardId),
    #[error("card {0} is not part of the committed deal")]
    CardNotDealt(CardId),
    #[error("card {0} is not a vehicle card")]
    CardNotEligible(CardId),
    #[error("caller is not a party to this challenge")]
    NotChallengeParty,
    #[error("this challenge mode requires a fixed opponent")]
    OpponentRequired,
    #[error("a player cannot challenge themselves")]
    SelfChallenge,
    #[error("expiry timestamp must lie in the future")]
    InvalidExpiry,
}

impl EngineError {
    /// Stable machine-readable code, carried in every error response body.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InsufficientCards { .. } => "INSUFFICIENT_CARDS",
            EngineError::IncompleteAssignment(_) => "INCOMPLETE_ASSIGNMENT",
            EngineError::AlreadyTuned(_) => "ALREADY_TUNED",
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::MaxStageReached => "MAX_STAGE_REACHED",
            EngineError::InsufficientXp { .. } => "INSUFFICIENT_XP",
            EngineError::RateLimited { .. } => "RATE_LIMITED",
            EngineError::ChallengeExpired => "CHALLENGE_EXPIRED",
            EngineError::AlreadyResolved => "ALREADY_RESOLVED",
            EngineError::CardNoLongerOwned(_) => "CARD_NO_LONGER_OWNED",
            EngineError::CardNotDealt(_) => "CARD_NOT_DEALT",
            EngineError::CardNotEligible(_) => "CARD_NOT_ELIGIBLE",
            EngineError::NotChallengeParty => "NOT_CHALLENGE_PARTY",
            EngineError::OpponentRequired => "OPPONENT_REQUIRED",
            EngineError::SelfChallenge => "SELF_CHALLENGE",
            EngineError::InvalidExpiry => "INVALID_EXPIRY",
        }
    }
}
