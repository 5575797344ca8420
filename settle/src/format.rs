//! Decimal parsing and display helpers
//!
//! Contract records carry decimals as strings; these helpers turn user or wire
//! text into `Decimal` and render settlement figures for display.

use crate::engine::rounding::MAX_SCALE;
use crate::error::{Result, SettleError};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::str::FromStr;

/// Default number of fractional digits used when writing decimals back to contract records
pub const DEFAULT_DECIMAL_PRECISION: u32 = 6;
/// Parties longer than this are shortened by `format_party_id`
pub const DEFAULT_PARTY_DISPLAY_LEN: usize = 12;

/// Parses a decimal string, accepting plain and scientific notation
///
/// # Arguments
/// * `input` - Text to parse, surrounding whitespace is ignored
///
/// # Returns
/// * `Ok(Decimal)` - The parsed value
/// * `Err(SettleError::InvalidArgument)` - For `NaN` and infinities
/// * `Err(SettleError::Parse)` - For anything else that is not a decimal
pub fn parse_decimal(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SettleError::Parse {
            input: input.to_string(),
            reason: "empty input".to_string(),
        });
    }

    let unsigned = trimmed.trim_start_matches(['+', '-']).to_ascii_lowercase();
    if unsigned == "nan" || unsigned.starts_with("inf") {
        return Err(SettleError::invalid(format!(
            "{} is not a finite number",
            trimmed
        )));
    }

    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(trimmed)
    };
    parsed.map_err(|e| SettleError::Parse {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Converts a float into a decimal, rejecting `NaN`, infinities and out-of-range values
pub fn decimal_from_f64(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(SettleError::invalid(format!(
            "{} is not a finite number",
            value
        )));
    }
    Decimal::from_f64(value)
        .ok_or_else(|| SettleError::invalid(format!("{} is outside the decimal range", value)))
}

/// Renders `value` with exactly `precision` fractional digits, rounding half away from zero
pub fn format_decimal(value: Decimal, precision: u32) -> String {
    let precision = precision.min(MAX_SCALE);
    let mut rounded = value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(precision);
    rounded.to_string()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Renders an amount with thousands separators and a fixed number of decimals, e.g. `63,225.0050`
pub fn format_amount(value: Decimal, decimals: u32) -> String {
    let fixed = format_decimal(value, decimals);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    match digits.split_once('.') {
        Some((int_part, frac_part)) => {
            format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
        }
        None => format!("{}{}", sign, group_thousands(digits)),
    }
}

/// `format_amount` followed by the currency symbol, when one is given
pub fn format_currency(value: Decimal, currency: &str, decimals: u32) -> String {
    let formatted = format_amount(value, decimals);
    if currency.is_empty() {
        formatted
    } else {
        format!("{} {}", formatted, currency)
    }
}

/// Fee rate as a percentage with two decimals, e.g. `0.005` -> `0.50%`
pub fn format_fee_rate(rate: Decimal) -> String {
    let percent = rate.checked_mul(dec!(100)).unwrap_or(Decimal::MAX);
    format!("{}%", format_decimal(percent, 2))
}

/// Shortens long party identifiers to `first6...last4`
pub fn format_party_id(party: &str, max_len: usize) -> String {
    let count = party.chars().count();
    if count <= max_len {
        return party.to_string();
    }
    let head: String = party.chars().take(6).collect();
    let tail: String = party.chars().skip(count.saturating_sub(4)).collect();
    format!("{}...{}", head, tail)
}
