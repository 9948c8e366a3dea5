//! Sliding-window limiter on challenge creation.
//!
//! The window trails "now" by a configured number of days; it is not aligned
//! to calendar weeks. Every created challenge counts, whatever its eventual
//! status.

use chrono::{DateTime, Duration, Utc};

use super::error::EngineError;

/// How many of `created` fall strictly inside the trailing window ending at `now`.
pub fn recent_count<'a, I>(created: I, now: DateTime<Utc>, window_days: i64) -> usize
where
    I: IntoIterator<Item = &'a DateTime<Utc>>,
{
    let cutoff = now - Duration::days(window_days);
    created.into_iter().filter(|t| **t > cutoff).count()
}

pub fn check_creation_allowed(count_in_window: usize, cap: usize) -> Result<(), EngineError> {
    if count_in_window >= cap {
        return Err(EngineError::RateLimited { cap });
    }
    Ok(())
}
