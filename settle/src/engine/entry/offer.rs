//! Offer Types and Structures
//!
//! An offer locks an amount of one instrument and asks for another at a fixed
//! unit price. Takers quote against it to learn what they would pay.

use crate::engine::calculator::{calculate_trade_amounts, TradeAmounts};
use crate::engine::entry::InstrumentId;
use crate::error::{Result, SettleError};
use crate::metrics;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;

/// A listed OTC offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtcOffer {
    /// Maker who listed the offer
    pub creator: String,
    pub validator: String,
    pub cleaner: String,
    /// Fee rate charged to each side, fixed when the offer was created
    pub fee_rate: Decimal,
    pub public_party: String,
    /// Asset the maker locked
    pub locked_instrument: InstrumentId,
    /// Asset the maker wants in return
    pub requested_instrument: InstrumentId,
    /// Quantity of the locked asset still available
    pub locked_amount: Decimal,
    /// Decimal places of the requested (payment) instrument
    pub payment_token_scale: u32,
    /// Price of one locked unit in the requested instrument
    pub unit_price: Decimal,
    /// Expiry, unix seconds
    pub valid_until: u64,
    pub description: String,
}

impl OtcOffer {
    /// Prices a trade of `actual_amount` locked units against this offer
    ///
    /// # Arguments
    /// * `actual_amount` - Quantity the taker wants to receive
    ///
    /// # Returns
    /// * `Ok(TradeAmounts)` - Settlement breakdown at the offer's price, fee and scale
    /// * `Err(SettleError::InvalidArgument)` - If the amount exceeds what is locked
    pub fn quote(&self, actual_amount: Decimal) -> Result<TradeAmounts> {
        if actual_amount > self.locked_amount {
            return Err(SettleError::invalid(format!(
                "amount {} exceeds locked amount {}",
                actual_amount, self.locked_amount
            )));
        }
        metrics::record_quote(|| {
            calculate_trade_amounts(
                actual_amount,
                self.unit_price,
                self.fee_rate,
                self.payment_token_scale,
            )
        })
    }

    /// Returns true once `now` has reached `valid_until`
    pub fn is_expired(&self, now: u64) -> bool {
        self.valid_until <= now
    }

    /// Human readable time left: `Expired`, `2d 3h` beyond a day, otherwise `5h 12m`
    pub fn time_remaining(&self, now: u64) -> String {
        if self.is_expired(now) {
            return "Expired".to_string();
        }
        let remaining = self.valid_until - now;
        let hours = remaining / SECS_PER_HOUR;
        let minutes = (remaining % SECS_PER_HOUR) / SECS_PER_MINUTE;

        if hours > 24 {
            return format!("{}d {}h", hours / 24, hours % 24);
        }
        format!("{}h {}m", hours, minutes)
    }
}
