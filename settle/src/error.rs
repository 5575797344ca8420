//! Error types shared by the calculator, the market records and the config layer.

use thiserror::Error;

/// Every failure the crate can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettleError {
    /// Input outside the economic domain, a non-finite number or an unsupported scale
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Decimal arithmetic left the representable range
    #[error("decimal overflow while computing {0}")]
    Overflow(&'static str),
    /// Text that is not a decimal number
    #[error("cannot parse {input:?} as a decimal: {reason}")]
    Parse { input: String, reason: String },
    /// Unreadable or malformed runtime configuration
    #[error("config error: {0}")]
    Config(String),
    /// Symbol missing from the instrument registry
    #[error("unknown instrument {0}")]
    UnknownInstrument(String),
}

impl SettleError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SettleError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SettleError>;
