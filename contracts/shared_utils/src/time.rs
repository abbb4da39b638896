//! Time utilities for timestamp and duration calculations

use soroban_sdk::Env;

/// Time utility functions for working with timestamps and durations
pub struct TimeUtils;

impl TimeUtils {
    /// Get the current ledger timestamp
    pub fn now(e: &Env) -> u64 {
        e.ledger().timestamp()
    }

    /// Deadline `duration_seconds` after `start`, saturating at `u64::MAX`
    pub fn deadline(start: u64, duration_seconds: u64) -> u64 {
        start.saturating_add(duration_seconds)
    }

    /// Check if an expiration has passed at `now`
    ///
    /// An expiration is still valid during its own second: only
    /// `expiration < now` counts as expired.
    pub fn is_expired_at(now: u64, expiration: u64) -> bool {
        expiration < now
    }

    /// Check if an expiration has passed at the current ledger time
    pub fn is_expired(e: &Env, expiration: u64) -> bool {
        Self::is_expired_at(Self::now(e), expiration)
    }
}
