//! Scale-aware Rounding
//!
//! Settlement amounts are rounded the same way the on-chain contract rounds them:
//! shift by `10^scale`, take the ceiling, shift back. Every positive remainder is
//! rounded up, so negative values move toward zero.

use crate::error::{Result, SettleError};
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest number of fractional digits a `Decimal` can carry
pub const MAX_SCALE: u32 = 28;

/// Converts a signed scale (as read from user input) into a supported one
///
/// # Arguments
/// * `scale` - Number of decimal places requested
///
/// # Returns
/// * `Ok(u32)` - The scale if it lies in `0..=MAX_SCALE`
/// * `Err(SettleError::InvalidArgument)` - If the scale is negative or too large
pub fn checked_scale(scale: i64) -> Result<u32> {
    if scale < 0 {
        return Err(SettleError::invalid(format!(
            "scale {} must not be negative",
            scale
        )));
    }
    let scale = u32::try_from(scale)
        .map_err(|_| SettleError::invalid(format!("scale {} is too large", scale)))?;
    ensure_scale(scale)?;
    Ok(scale)
}

pub(crate) fn ensure_scale(scale: u32) -> Result<()> {
    if scale > MAX_SCALE {
        return Err(SettleError::invalid(format!(
            "scale {} exceeds the supported maximum of {}",
            scale, MAX_SCALE
        )));
    }
    Ok(())
}

/// Checks that a per-side fee rate lies in `[0, 1)`
pub fn ensure_fee_rate(fee_rate: Decimal) -> Result<()> {
    if fee_rate < Decimal::ZERO || fee_rate >= Decimal::ONE {
        return Err(SettleError::invalid(format!(
            "fee rate {} outside [0, 1)",
            fee_rate
        )));
    }
    Ok(())
}

/// Rounds `value` up (toward positive infinity) to `scale` decimal places
///
/// The result is padded to `scale` fractional digits, so `round_to(2, 200)`
/// renders as `200.00`. Padding stops where the 96-bit mantissa runs out:
/// `round_to(28, 12345678901.5)` keeps only 18 fractional digits. The value is
/// exact either way.
///
/// # Arguments
/// * `scale` - Number of decimal places to keep
/// * `value` - Value to round
///
/// # Returns
/// * `Ok(Decimal)` - The ceiling of `value` at the given scale
/// * `Err(SettleError::InvalidArgument)` - If the scale is unsupported
pub fn round_to(scale: u32, value: Decimal) -> Result<Decimal> {
    ensure_scale(scale)?;
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::ToPositiveInfinity);
    rounded.rescale(scale);
    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rust_decimal_macros::dec;

    fn pow10(scale: u32) -> Decimal {
        Decimal::from(10_u64.pow(scale))
    }

    #[test]
    fn test_round_up_positive() {
        assert_eq!(round_to(2, dec!(99.667)).unwrap(), dec!(99.67));
        assert_eq!(round_to(2, dec!(0.666)).unwrap(), dec!(0.67));
        assert_eq!(round_to(2, dec!(1.001)).unwrap(), dec!(1.01));
        assert_eq!(round_to(6, dec!(62908.875)).unwrap(), dec!(62908.875));
    }

    #[test]
    fn test_round_negative_toward_zero() {
        assert_eq!(round_to(2, dec!(-1.005)).unwrap(), dec!(-1.00));
        assert_eq!(round_to(0, dec!(-0.5)).unwrap(), dec!(0));
    }

    #[test]
    fn test_result_carries_scale() {
        assert_eq!(round_to(2, dec!(200)).unwrap().to_string(), "200.00");
        assert_eq!(round_to(2, dec!(0)).unwrap().to_string(), "0.00");
        assert_eq!(round_to(0, dec!(3.2)).unwrap().to_string(), "4");
    }

    #[test]
    fn test_scale_bounds() {
        assert!(round_to(MAX_SCALE, dec!(1.5)).is_ok());
        assert!(matches!(
            round_to(MAX_SCALE + 1, dec!(1.5)),
            Err(SettleError::InvalidArgument(_))
        ));
        assert_eq!(checked_scale(18).unwrap(), 18);
        assert!(matches!(
            checked_scale(-1),
            Err(SettleError::InvalidArgument(_))
        ));
        assert!(checked_scale(i64::MAX).is_err());
    }

    #[test]
    fn test_padding_limited_by_mantissa() {
        let value = dec!(12345678901.5);
        let rounded = round_to(MAX_SCALE, value).unwrap();
        assert_eq!(rounded, value);
        assert!(rounded.scale() < MAX_SCALE);
        assert_eq!(rounded.scale(), 18);
        assert_eq!(round_to(18, value).unwrap().scale(), 18);
    }

    #[test]
    fn test_fee_rate_bounds() {
        assert!(ensure_fee_rate(dec!(0)).is_ok());
        assert!(ensure_fee_rate(dec!(0.005)).is_ok());
        assert!(ensure_fee_rate(dec!(0.999999)).is_ok());
        assert!(matches!(
            ensure_fee_rate(dec!(1)),
            Err(SettleError::InvalidArgument(_))
        ));
        assert!(matches!(
            ensure_fee_rate(dec!(-0.001)),
            Err(SettleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_ceiling_property() {
        let mut rng = StdRng::seed_from_u64(0x5e771e);
        for _ in 0..2000 {
            let value = Decimal::new(rng.gen_range(-1_000_000_000..1_000_000_000), rng.gen_range(0..=9));
            let scale = rng.gen_range(0..=18);
            let rounded = round_to(scale, value).unwrap();
            assert!(rounded >= value, "{} rounded to {} below input", value, rounded);
            assert!((rounded * pow10(scale)).fract().is_zero());
            // never more than one unit away
            assert!(rounded - value < Decimal::ONE / pow10(scale));
        }
    }

    #[test]
    fn test_scale_zero_is_ceil() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let value = Decimal::new(rng.gen_range(-10_000_000..10_000_000), rng.gen_range(0..=4));
            assert_eq!(round_to(0, value).unwrap(), value.ceil());
        }
    }
}
