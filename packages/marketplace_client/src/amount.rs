//! Decimal amount parsing for payment-token values.

use crate::error::{ClientError, ClientResult};

/// Decimals of a Stellar asset contract
pub const DEFAULT_DECIMALS: u32 = 7;

/// Parse a human amount such as `"1.5"` into integer token units.
///
/// Rejects empty text, signs, more fractional digits than `decimals`, and
/// anything that overflows `i128`.
pub fn parse_amount(text: &str, decimals: u32) -> ClientResult<i128> {
    let text = text.trim();
    let invalid = || ClientError::validation(format!("invalid amount: \"{text}\""));

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > decimals as usize {
        return Err(ClientError::validation(format!(
            "amount \"{text}\" has more than {decimals} decimal places"
        )));
    }

    let scale = 10i128.checked_pow(decimals).ok_or_else(invalid)?;
    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<i128>().map_err(|_| invalid())?
    };
    let padded = format!("{fraction:0<width$}", width = decimals as usize);
    let fraction_units = if padded.is_empty() {
        0
    } else {
        padded.parse::<i128>().map_err(|_| invalid())?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|units| units.checked_add(fraction_units))
        .ok_or_else(invalid)
}

/// Render integer token units as a decimal string without trailing zeros
pub fn format_amount(units: i128, decimals: u32) -> String {
    let scale = 10i128.pow(decimals);
    let sign = if units < 0 { "-" } else { "" };
    let units = units.unsigned_abs();
    let scale = scale as u128;
    let whole = units / scale;
    let fraction = units % scale;
    if fraction == 0 {
        return format!("{sign}{whole}");
    }
    let fraction = format!("{fraction:0>width$}", width = decimals as usize);
    format!("{sign}{whole}.{}", fraction.trim_end_matches('0'))
}
