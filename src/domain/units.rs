//! Conversion of human-readable amounts into smallest-unit integers.

use super::errors::{DomainError, DomainResult};
use ethers_core::types::U256;
use ethers_core::utils::{ParseUnits, parse_units};

/// Largest number of decimal digits a 256-bit unsigned integer can hold.
const MAX_U256_DIGITS: usize = 77;

/// Converts a decimal amount string into the currency's smallest unit.
///
/// Fractional digits beyond `decimals` round half-up on the first dropped
/// digit, carrying into the integer part. Anything that is not a plain
/// non-negative decimal number (signs, exponents, separators, whitespace)
/// is rejected.
///
/// # Examples
///
/// ```
/// use rn_create_request::domain::to_smallest_unit;
///
/// assert_eq!(to_smallest_unit("1.5", 6).unwrap(), "1500000");
/// assert_eq!(to_smallest_unit("0.000001", 6).unwrap(), "1");
/// assert_eq!(to_smallest_unit("1.2345675", 6).unwrap(), "1234568");
/// assert!(to_smallest_unit("abc", 6).is_err());
/// ```
pub fn to_smallest_unit(amount: &str, decimals: u32) -> DomainResult<String> {
    let (integer, fraction) = split_decimal(amount)?;

    let significant = integer.trim_start_matches('0').len();
    if significant + decimals as usize > MAX_U256_DIGITS {
        return Err(DomainError::InvalidAmount(format!("{} is too large", amount)));
    }
    if fraction.is_empty() && integer.is_empty() {
        return Err(DomainError::InvalidAmount(format!("{} is not a number", amount)));
    }

    let scale = decimals as usize;
    let kept = &fraction[..fraction.len().min(scale)];
    let round_up = fraction.as_bytes().get(scale).is_some_and(|digit| *digit >= b'5');
    let integer = if integer.is_empty() { "0" } else { integer };

    match parse_units(format!("{}.{}", integer, kept), decimals) {
        Ok(ParseUnits::U256(value)) if round_up => Ok((value + U256::one()).to_string()),
        Ok(ParseUnits::U256(value)) => Ok(value.to_string()),
        Ok(ParseUnits::I256(_)) => Err(DomainError::InvalidAmount(format!("{} is negative", amount))),
        Err(e) => Err(DomainError::InvalidAmount(format!("{}: {}", amount, e))),
    }
}

fn split_decimal(amount: &str) -> DomainResult<(&str, &str)> {
    if amount.is_empty() {
        return Err(DomainError::InvalidAmount("amount is empty".to_string()));
    }
    let (integer, fraction) = match amount.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (amount, ""),
    };
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(integer) || !is_digits(fraction) {
        return Err(DomainError::InvalidAmount(format!("{} is not a number", amount)));
    }
    Ok((integer, fraction))
}
