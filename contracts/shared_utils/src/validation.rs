//! Validation utilities for common input validation patterns
//!
//! Each check hands back the caller's own error value so contracts can keep
//! returning their `#[contracterror]` enums with `?`.

use super::math::BPS_DENOMINATOR;

/// Validation utility functions
pub struct Validation;

impl Validation {
    /// Validate that an amount is greater than zero
    ///
    /// # Arguments
    /// * `amount` - The amount to validate
    /// * `err` - Error returned when `amount <= 0`
    pub fn positive<E>(amount: i128, err: E) -> Result<(), E> {
        if amount <= 0 {
            return Err(err);
        }
        Ok(())
    }

    /// Validate that a duration is greater than zero
    pub fn non_zero_duration<E>(seconds: u64, err: E) -> Result<(), E> {
        if seconds == 0 {
            return Err(err);
        }
        Ok(())
    }

    /// Validate that an amount is at least `min`
    pub fn at_least<E>(amount: i128, min: i128, err: E) -> Result<(), E> {
        if amount < min {
            return Err(err);
        }
        Ok(())
    }

    /// Validate a fee expressed in basis points (0-10000)
    pub fn fee_bps<E>(bps: u32, err: E) -> Result<(), E> {
        if bps > BPS_DENOMINATOR {
            return Err(err);
        }
        Ok(())
    }

    /// Validate that a timestamp lies strictly after `now`
    pub fn in_future<E>(timestamp: u64, now: u64, err: E) -> Result<(), E> {
        if timestamp <= now {
            return Err(err);
        }
        Ok(())
    }
}
