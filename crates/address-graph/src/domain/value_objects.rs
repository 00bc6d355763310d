//! # Domain Value Objects
//!
//! Monetary units and identifiers shared across the graph.
//!
//! Upstream services report values as decimal coin amounts (`0.05`). The graph
//! stores them as integer smallest units (`5_000_000`), exact to 8 decimal
//! places.

use super::errors::AmountError;

/// Smallest units per coin.
pub const COIN: u64 = 100_000_000;

/// Decimal places carried by one smallest unit.
pub const COIN_DECIMALS: usize = 8;

/// Largest amount any single value can carry: 21 million coins.
pub const MAX_MONEY: u64 = 21_000_000 * COIN;

/// Convert a decimal coin amount into integer smallest units.
///
/// Accepts plain decimals (`"0.05"`, `".1"`, `"1."`) and exponent notation
/// (`"1e-8"`), which is how JSON floats are rendered once parsed. Digits
/// beyond the 8th decimal place round half-up, so the result equals
/// `round(value * 1e8)` without any binary floating point step.
///
/// # Errors
///
/// Negative, empty or non-numeric inputs, and amounts above [`MAX_MONEY`].
pub fn coins_to_units(text: &str) -> Result<u64, AmountError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AmountError::Empty);
    }
    if text.starts_with('-') {
        return Err(AmountError::Negative(text.to_string()));
    }
    let unsigned = text.strip_prefix('+').unwrap_or(text);
    let invalid = || AmountError::Invalid(text.to_string());
    let out_of_range = || AmountError::OutOfRange(text.to_string());

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => {
            let exponent = unsigned[pos + 1..].parse::<i32>().map_err(|_| invalid())?;
            (&unsigned[..pos], exponent)
        }
        None => (unsigned, 0),
    };

    let (whole, fractional) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fractional.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fractional.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    // Decimal point position inside `digits` once the value is scaled by 10^8.
    let digits: Vec<u64> = whole
        .bytes()
        .chain(fractional.bytes())
        .map(|b| u64::from(b - b'0'))
        .collect();
    let point = whole.len() as i64 + i64::from(exponent) + COIN_DECIMALS as i64;

    let mut units: u64 = 0;
    let mut round_up = false;
    for (position, digit) in digits.iter().enumerate() {
        let position = position as i64;
        if position < point {
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add(*digit))
                .ok_or_else(out_of_range)?;
        } else if position == point {
            round_up = *digit >= 5;
            break;
        }
    }

    if units != 0 {
        let zeros = point - digits.len() as i64;
        for _ in 0..zeros.max(0) {
            units = units.checked_mul(10).ok_or_else(out_of_range)?;
        }
    }

    if round_up {
        units = units.checked_add(1).ok_or_else(out_of_range)?;
    }
    if units > MAX_MONEY {
        return Err(out_of_range());
    }
    Ok(units)
}

/// Render integer units as a decimal coin amount with 8 places.
pub fn units_to_coins(units: u64) -> String {
    format!("{}.{:08}", units / COIN, units % COIN)
}
