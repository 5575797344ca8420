//! Trade Amount Calculator
//!
//! Derives the maker/taker cash flows of a two-party swap where each side pays
//! `fee_rate` of the notional. The maker's net receipt and the combined fee are
//! rounded independently at the payment token's scale; the taker's cost is built
//! from those two rounded figures and is not rounded again.

use crate::engine::rounding::{ensure_fee_rate, ensure_scale, round_to, MAX_SCALE};
use crate::error::{Result, SettleError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const TWO: Decimal = dec!(2);

/// Settlement breakdown for one prospective trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeAmounts {
    /// `actual_amount * unit_price`, unrounded
    pub base_cost: Decimal,
    /// `base_cost * fee_rate`, unrounded
    pub fee_per_side: Decimal,
    /// What the maker receives after their fee, rounded up at the payment scale
    pub maker_receive_amount: Decimal,
    /// Both sides' fees, rounded up at the payment scale
    pub total_fee_amount: Decimal,
    /// `maker_receive_amount + total_fee_amount / 2`, one digit finer than the payment scale
    pub taker_total_cost: Decimal,
}

impl TradeAmounts {
    /// Half of the rounded fee total, the share charged to the taker
    pub fn taker_fee(&self) -> Decimal {
        half_of(self.total_fee_amount, self.total_fee_amount.scale()).unwrap_or_default()
    }
}

/// Halves a value rounded at `scale`, expressed at `scale + 1` digits where the halving is exact
fn half_of(value: Decimal, scale: u32) -> Option<Decimal> {
    let mut half = value.checked_div(TWO)?;
    half.rescale((scale + 1).min(MAX_SCALE));
    Some(half)
}

fn validate_inputs(
    actual_amount: Decimal,
    unit_price: Decimal,
    fee_rate: Decimal,
    payment_token_scale: u32,
) -> Result<()> {
    if actual_amount < Decimal::ZERO {
        return Err(SettleError::invalid(format!(
            "actual amount {} must not be negative",
            actual_amount
        )));
    }
    if unit_price <= Decimal::ZERO {
        return Err(SettleError::invalid(format!(
            "unit price {} must be positive",
            unit_price
        )));
    }
    ensure_fee_rate(fee_rate)?;
    ensure_scale(payment_token_scale)
}

/// Computes the full settlement breakdown of a trade
///
/// # Arguments
/// * `actual_amount` - Quantity of the locked asset being traded
/// * `unit_price` - Price of one locked unit in the payment asset
/// * `fee_rate` - Fraction of the notional charged to each side
/// * `payment_token_scale` - Decimal places supported by the payment asset
///
/// # Returns
/// * `Ok(TradeAmounts)` - All five settlement figures
/// * `Err(SettleError)` - If an input is out of domain or the arithmetic overflows
pub fn calculate_trade_amounts(
    actual_amount: Decimal,
    unit_price: Decimal,
    fee_rate: Decimal,
    payment_token_scale: u32,
) -> Result<TradeAmounts> {
    validate_inputs(actual_amount, unit_price, fee_rate, payment_token_scale)?;

    let base_cost = actual_amount
        .checked_mul(unit_price)
        .ok_or(SettleError::Overflow("base cost"))?;
    let fee_per_side = base_cost
        .checked_mul(fee_rate)
        .ok_or(SettleError::Overflow("fee per side"))?;

    let maker_receive_raw = base_cost
        .checked_sub(fee_per_side)
        .ok_or(SettleError::Overflow("maker receive amount"))?;
    let maker_receive_amount = round_to(payment_token_scale, maker_receive_raw)?;

    let total_fee_raw = fee_per_side
        .checked_mul(TWO)
        .ok_or(SettleError::Overflow("total fee amount"))?;
    let total_fee_amount = round_to(payment_token_scale, total_fee_raw)?;

    let taker_total_cost = half_of(total_fee_amount, payment_token_scale)
        .and_then(|taker_fee| maker_receive_amount.checked_add(taker_fee))
        .ok_or(SettleError::Overflow("taker total cost"))?;

    log::debug!(
        "trade amounts: amount {} price {} fee rate {} scale {} -> maker {} fee {} taker {}",
        actual_amount,
        unit_price,
        fee_rate,
        payment_token_scale,
        maker_receive_amount,
        total_fee_amount,
        taker_total_cost
    );

    Ok(TradeAmounts {
        base_cost,
        fee_per_side,
        maker_receive_amount,
        total_fee_amount,
        taker_total_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rust_decimal_macros::dec;

    #[test]
    fn test_rounding_kicks_in() {
        let amounts = calculate_trade_amounts(dec!(1), dec!(100), dec!(0.00333), 2).unwrap();
        assert_eq!(amounts.base_cost, dec!(100));
        assert_eq!(amounts.fee_per_side, dec!(0.333));
        assert_eq!(amounts.maker_receive_amount, dec!(99.67));
        assert_eq!(amounts.total_fee_amount, dec!(0.67));
        assert_eq!(amounts.taker_fee(), dec!(0.335));
        assert_eq!(amounts.taker_total_cost, dec!(100.005));
    }

    #[test]
    fn test_taker_cost_scale() {
        let large = calculate_trade_amounts(dec!(1.5), dec!(42150.00), dec!(0.005), 6).unwrap();
        assert_eq!(large.taker_total_cost.scale(), 7);
        assert_eq!(large.taker_total_cost.to_string(), "63225.0000000");

        let free = calculate_trade_amounts(dec!(2), dec!(100), dec!(0), 2).unwrap();
        assert_eq!(free.taker_total_cost.scale(), 3);
        assert_eq!(free.taker_total_cost.to_string(), "200.000");

        let rounded = calculate_trade_amounts(dec!(1), dec!(100), dec!(0.00333), 2).unwrap();
        assert_eq!(rounded.taker_total_cost.scale(), 3);
        assert_eq!(rounded.taker_total_cost.to_string(), "100.005");
        assert_eq!(rounded.taker_fee().to_string(), "0.335");

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let amount = Decimal::new(rng.gen_range(1..1_000_000), rng.gen_range(0..=6));
            let price = Decimal::new(rng.gen_range(1..1_000_000), rng.gen_range(0..=4));
            let fee_rate = Decimal::new(rng.gen_range(0..100_000), 6);
            let scale = rng.gen_range(0..=12);
            let amounts = calculate_trade_amounts(amount, price, fee_rate, scale).unwrap();
            assert_eq!(amounts.taker_total_cost.scale(), scale + 1);
        }
    }

    #[test]
    fn test_zero_fee() {
        let amounts = calculate_trade_amounts(dec!(2), dec!(100), dec!(0), 2).unwrap();
        assert_eq!(amounts.base_cost, dec!(200));
        assert_eq!(amounts.fee_per_side, dec!(0));
        assert_eq!(amounts.maker_receive_amount.to_string(), "200.00");
        assert_eq!(amounts.total_fee_amount.to_string(), "0.00");
        assert_eq!(amounts.taker_total_cost, amounts.maker_receive_amount);
    }

    #[test]
    fn test_zero_amount() {
        let amounts = calculate_trade_amounts(dec!(0), dec!(5), dec!(0.005), 6).unwrap();
        assert!(amounts.base_cost.is_zero());
        assert!(amounts.taker_total_cost.is_zero());
    }

    #[test]
    fn test_rejects_out_of_domain() {
        let bad = [
            (dec!(-1), dec!(100), dec!(0.005), 6),
            (dec!(1), dec!(0), dec!(0.005), 6),
            (dec!(1), dec!(-3), dec!(0.005), 6),
            (dec!(1), dec!(100), dec!(-0.001), 6),
            (dec!(1), dec!(100), dec!(1), 6),
            (dec!(1), dec!(100), dec!(0.005), 29),
        ];
        for (amount, price, fee_rate, scale) in bad {
            assert!(
                matches!(
                    calculate_trade_amounts(amount, price, fee_rate, scale),
                    Err(SettleError::InvalidArgument(_))
                ),
                "{} {} {} {} accepted",
                amount,
                price,
                fee_rate,
                scale
            );
        }
    }

    #[test]
    fn test_overflow_is_reported() {
        let result = calculate_trade_amounts(Decimal::MAX, dec!(2), dec!(0.005), 2);
        assert_eq!(result, Err(SettleError::Overflow("base cost")));
    }

    #[test]
    fn test_cost_ordering() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let amount = Decimal::new(rng.gen_range(1..1_000_000), rng.gen_range(0..=6));
            let price = Decimal::new(rng.gen_range(1..1_000_000), rng.gen_range(0..=4));
            let scale = rng.gen_range(0..=18);

            let fee_rate = Decimal::new(rng.gen_range(1..100_000), 6);
            let amounts = calculate_trade_amounts(amount, price, fee_rate, scale).unwrap();
            assert!(amounts.taker_total_cost > amounts.maker_receive_amount);

            let free = calculate_trade_amounts(amount, price, Decimal::ZERO, scale).unwrap();
            assert_eq!(free.taker_total_cost, free.maker_receive_amount);
            assert!(free.total_fee_amount.is_zero());
        }
    }

    #[test]
    fn test_fee_monotonicity() {
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..1000 {
            let amount = Decimal::new(rng.gen_range(1..1_000_000), rng.gen_range(0..=3));
            let price = Decimal::new(rng.gen_range(1..1_000_000), rng.gen_range(0..=2));
            let scale = rng.gen_range(0..=8);
            let low = Decimal::new(rng.gen_range(0..50_000), 6);
            let high = low + Decimal::new(rng.gen_range(1..50_000), 6);

            let a = calculate_trade_amounts(amount, price, low, scale).unwrap();
            let b = calculate_trade_amounts(amount, price, high, scale).unwrap();
            assert!(b.maker_receive_amount <= a.maker_receive_amount);
            assert!(b.total_fee_amount >= a.total_fee_amount);

            // once the raw fees differ by more than one unit the change must show
            let unit = Decimal::ONE / Decimal::from(10_u64.pow(scale));
            if b.fee_per_side - a.fee_per_side > unit {
                assert!(b.maker_receive_amount < a.maker_receive_amount);
                assert!(b.total_fee_amount > a.total_fee_amount);
            }
        }
    }
}
