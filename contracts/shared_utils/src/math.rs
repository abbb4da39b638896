//! Math utilities for safe arithmetic operations and fee calculations

/// Basis points in 100%
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Safe math operations to prevent overflow/underflow
pub struct SafeMath;

impl SafeMath {
    /// Safely subtract two i128 values, panicking on underflow
    pub fn sub(a: i128, b: i128) -> i128 {
        a.checked_sub(b).expect("Math: subtraction underflow")
    }

    /// Safely multiply two i128 values, panicking on overflow
    pub fn mul(a: i128, b: i128) -> i128 {
        a.checked_mul(b).expect("Math: multiplication overflow")
    }

    /// Safely divide two i128 values, panicking on division by zero
    pub fn div(a: i128, b: i128) -> i128 {
        if b == 0 {
            panic!("Math: division by zero");
        }
        a.checked_div(b).expect("Math: division overflow")
    }

    /// Calculate a basis-point share: (value * bps) / 10000, rounded down
    ///
    /// # Arguments
    /// * `value` - The base value
    /// * `bps` - The share in basis points (0-10000)
    pub fn bps_of(value: i128, bps: u32) -> i128 {
        if bps > BPS_DENOMINATOR {
            panic!("Math: basis points must be <= 10000");
        }
        Self::div(Self::mul(value, bps as i128), BPS_DENOMINATOR as i128)
    }

    /// Split a sale amount into (seller proceeds, marketplace fee)
    ///
    /// The fee is rounded down, so the seller receives any remainder.
    pub fn split_fee(amount: i128, fee_bps: u32) -> (i128, i128) {
        let fee = Self::bps_of(amount, fee_bps);
        (Self::sub(amount, fee), fee)
    }
}
