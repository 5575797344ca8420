//! Market Service
//!
//! The service record holds the operator's current fee rate and the parties
//! every offer is shared with. New offers are opened through it so they pick up
//! the fee rate in force at creation time.

use crate::engine::entry::{Holding, InstrumentId, OtcOffer};
use crate::engine::rounding::{ensure_fee_rate, ensure_scale};
use crate::error::{Result, SettleError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market-wide settings and factory for offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtcMarketService {
    pub operator: String,
    pub validator: String,
    pub cleaner: String,
    /// Fee rate applied to offers created from now on
    pub current_fee_rate: Decimal,
    pub public_party: String,
}

/// Arguments for opening an offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferArgs {
    /// Maker opening the offer, must own the locked asset
    pub user: String,
    pub locked_asset: Holding,
    pub locked_instrument: InstrumentId,
    pub requested_instrument: InstrumentId,
    pub unit_price: Decimal,
    pub payment_token_scale: u32,
    pub description: String,
    /// Expiry, unix seconds
    pub valid_until: u64,
}

impl OtcMarketService {
    /// Creates a service record, validating the fee rate
    pub fn new(
        operator: String,
        validator: String,
        cleaner: String,
        current_fee_rate: Decimal,
        public_party: String,
    ) -> Result<Self> {
        ensure_fee_rate(current_fee_rate)?;
        Ok(Self {
            operator,
            validator,
            cleaner,
            current_fee_rate,
            public_party,
        })
    }

    /// Opens an offer at the service's current fee rate
    ///
    /// # Arguments
    /// * `args` - Offer parameters supplied by the maker
    /// * `now` - Current time, unix seconds
    ///
    /// # Returns
    /// * `Ok(OtcOffer)` - The new offer
    /// * `Err(SettleError::InvalidArgument)` - If the holding, price, scale or expiry is unusable
    pub fn open_offer(&self, args: CreateOfferArgs, now: u64) -> Result<OtcOffer> {
        if args.locked_asset.owner != args.user {
            return Err(SettleError::invalid(format!(
                "holding owned by {} cannot be locked by {}",
                args.locked_asset.owner, args.user
            )));
        }
        if args.locked_asset.instrument_id != args.locked_instrument {
            return Err(SettleError::invalid(format!(
                "holding instrument {} does not match locked instrument {}",
                args.locked_asset.instrument_id.id, args.locked_instrument.id
            )));
        }
        if args.locked_asset.amount <= Decimal::ZERO {
            return Err(SettleError::invalid("locked amount must be positive"));
        }
        if args.unit_price <= Decimal::ZERO {
            return Err(SettleError::invalid(format!(
                "unit price {} must be positive",
                args.unit_price
            )));
        }
        ensure_scale(args.payment_token_scale)?;
        if args.valid_until <= now {
            return Err(SettleError::invalid("offer would already be expired"));
        }

        log::info!(
            "opening offer by {}: {} {} at {} {}",
            args.user,
            args.locked_asset.amount,
            args.locked_instrument.symbol(),
            args.unit_price,
            args.requested_instrument.symbol()
        );

        Ok(OtcOffer {
            creator: args.user,
            validator: self.validator.clone(),
            cleaner: self.cleaner.clone(),
            fee_rate: self.current_fee_rate,
            public_party: self.public_party.clone(),
            locked_instrument: args.locked_instrument,
            requested_instrument: args.requested_instrument,
            locked_amount: args.locked_asset.amount,
            payment_token_scale: args.payment_token_scale,
            unit_price: args.unit_price,
            valid_until: args.valid_until,
            description: args.description,
        })
    }

    /// Replaces the fee rate and parties for future offers
    pub fn update_settings(
        &mut self,
        new_fee_rate: Decimal,
        new_validator: String,
        new_cleaner: String,
        new_public_party: String,
    ) -> Result<()> {
        ensure_fee_rate(new_fee_rate)?;
        self.current_fee_rate = new_fee_rate;
        self.validator = new_validator;
        self.cleaner = new_cleaner;
        self.public_party = new_public_party;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn service() -> OtcMarketService {
        OtcMarketService::new(
            "operator".to_string(),
            "validator".to_string(),
            "cleaner".to_string(),
            dec!(0.005),
            "public".to_string(),
        )
        .unwrap()
    }

    fn args() -> CreateOfferArgs {
        let btc = InstrumentId::new("dso", "splice:BTC");
        CreateOfferArgs {
            user: "alice".to_string(),
            locked_asset: Holding::new(btc.clone(), "alice", dec!(1.5)),
            locked_instrument: btc,
            requested_instrument: InstrumentId::new("dso", "splice:USDC"),
            unit_price: dec!(42150),
            payment_token_scale: 6,
            description: "BTC for USDC".to_string(),
            valid_until: 1_000,
        }
    }

    #[test]
    fn test_open_offer() {
        let offer = service().open_offer(args(), 10).unwrap();
        assert_eq!(offer.creator, "alice");
        assert_eq!(offer.fee_rate, dec!(0.005));
        assert_eq!(offer.validator, "validator");
        assert_eq!(offer.locked_amount, dec!(1.5));
        assert_eq!(offer.payment_token_scale, 6);
    }

    #[test]
    fn test_open_offer_rejections() {
        let service = service();

        let mut bad = args();
        bad.user = "mallory".to_string();
        assert!(service.open_offer(bad, 10).is_err());

        let mut bad = args();
        bad.locked_instrument = InstrumentId::new("dso", "splice:ETH");
        assert!(service.open_offer(bad, 10).is_err());

        let mut bad = args();
        bad.unit_price = dec!(0);
        assert!(service.open_offer(bad, 10).is_err());

        let mut bad = args();
        bad.payment_token_scale = 40;
        assert!(service.open_offer(bad, 10).is_err());

        assert!(service.open_offer(args(), 1_000).is_err());
    }

    #[test]
    fn test_update_settings() {
        let mut service = service();
        let before = service.open_offer(args(), 10).unwrap();

        service
            .update_settings(
                dec!(0.003),
                "validator2".to_string(),
                "cleaner2".to_string(),
                "public2".to_string(),
            )
            .unwrap();
        let after = service.open_offer(args(), 10).unwrap();
        assert_eq!(before.fee_rate, dec!(0.005));
        assert_eq!(after.fee_rate, dec!(0.003));
        assert_eq!(after.cleaner, "cleaner2");

        assert!(service
            .update_settings(
                dec!(1),
                "v".to_string(),
                "c".to_string(),
                "p".to_string()
            )
            .is_err());
        assert_eq!(service.current_fee_rate, dec!(0.003));
    }

    #[test]
    fn test_new_rejects_bad_fee_rate() {
        assert!(OtcMarketService::new(
            "o".to_string(),
            "v".to_string(),
            "c".to_string(),
            dec!(-0.1),
            "p".to_string()
        )
        .is_err());
    }
}
