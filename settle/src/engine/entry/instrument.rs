//! Instrument and Holding Types
//!
//! An instrument is identified by its registry admin and an id such as
//! `"splice:usdc"`. A holding is an amount of one instrument owned by a party.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies a token on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct InstrumentId {
    /// Party administering the instrument registry
    pub admin: String,
    /// Registry-local identifier, segments separated by `:`
    pub id: String,
}

impl InstrumentId {
    pub fn new(admin: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            admin: admin.into(),
            id: id.into(),
        }
    }

    /// Short display symbol: the last `:` segment of the id, or `Token` when empty
    pub fn symbol(&self) -> &str {
        match self.id.rsplit(':').next() {
            Some(last) if !last.is_empty() => last,
            _ => "Token",
        }
    }
}

/// An amount of one instrument owned by a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub instrument_id: InstrumentId,
    pub owner: String,
    pub amount: Decimal,
}

impl Holding {
    pub fn new(instrument_id: InstrumentId, owner: impl Into<String>, amount: Decimal) -> Self {
        Self {
            instrument_id,
            owner: owner.into(),
            amount,
        }
    }
}
