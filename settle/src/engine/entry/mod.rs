pub mod instrument;
pub mod offer;
pub mod service;

pub use instrument::{Holding, InstrumentId};
pub use offer::OtcOffer;
pub use service::{CreateOfferArgs, OtcMarketService};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in unix seconds
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
