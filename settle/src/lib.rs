//! Fixed-point settlement arithmetic for an OTC digital-asset market.
//!
//! The core entry points are [`round_to`] and [`calculate_trade_amounts`];
//! [`OtcOffer::quote`] prices a trade against a listed offer.

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod metrics;

pub use config::RuntimeConfig;
pub use engine::entry::{CreateOfferArgs, Holding, InstrumentId, OtcMarketService, OtcOffer};
pub use engine::{calculate_trade_amounts, checked_scale, round_to, TradeAmounts, MAX_SCALE};
pub use error::{Result, SettleError};
