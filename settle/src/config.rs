use crate::engine::entry::{InstrumentId, OtcMarketService};
use crate::engine::rounding::{ensure_fee_rate, MAX_SCALE};
use crate::error::{Result, SettleError};
use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const ENV_LEDGER_HOST: &str = "OTC_LEDGER_HOST";
pub const ENV_LEDGER_PORT: &str = "OTC_LEDGER_PORT";
pub const ENV_PUBLIC_PARTY: &str = "OTC_PUBLIC_PARTY";
pub const ENV_OPERATOR_PARTY: &str = "OTC_OPERATOR_PARTY";
pub const ENV_VALIDATOR_PARTY: &str = "OTC_VALIDATOR_PARTY";
pub const ENV_CLEANER_PARTY: &str = "OTC_CLEANER_PARTY";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LedgerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            host: String::new(),
            port: 443,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PartiesConfig {
    pub public_party: String,
    pub operator: String,
    pub validator: String,
    pub cleaner: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ContractsConfig {
    pub service_template_id: String,
    pub offer_template_id: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SettingsConfig {
    pub default_validity_hours: u64,
    pub refresh_interval_ms: u64,
    pub default_fee_rate: Decimal,
    pub default_payment_token_scale: u32,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        SettingsConfig {
            default_validity_hours: 24,
            refresh_interval_ms: 5000,
            default_fee_rate: dec!(0.005),
            default_payment_token_scale: 6,
        }
    }
}

impl SettingsConfig {
    /// Expiry for an offer opened at `now` with the default validity
    pub fn valid_until(&self, now: u64) -> u64 {
        now.saturating_add(self.default_validity_hours.saturating_mul(3600))
    }
}

/// One entry of the instrument registry
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct InstrumentConfig {
    pub symbol: String,
    pub admin: String,
    pub id: String,
    /// Decimal places the instrument supports on the ledger
    pub scale: u32,
}

impl InstrumentConfig {
    pub fn instrument_id(&self) -> InstrumentId {
        InstrumentId::new(self.admin.clone(), self.id.clone())
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    pub ledger: LedgerConfig,
    pub parties: PartiesConfig,
    pub contracts: ContractsConfig,
    pub settings: SettingsConfig,
    pub instruments: Vec<InstrumentConfig>,
}

impl FromStr for RuntimeConfig {
    type Err = SettleError;

    fn from_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| SettleError::Config(e.to_string()))
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        RuntimeConfig::default()
    }

    /// Reads the config file, falling back to defaults when it does not exist
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => contents.parse(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "runtime config file {} not found, using defaults",
                    path.display()
                );
                Ok(RuntimeConfig::new())
            }
            Err(e) => Err(SettleError::Config(format!(
                "reading {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// `from_toml` followed by overrides from the process environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = RuntimeConfig::from_toml(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Replaces ledger and party settings with values found through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(host) = non_empty(ENV_LEDGER_HOST) {
            self.ledger.host = host;
        }
        if let Some(port) = non_empty(ENV_LEDGER_PORT) {
            match port.parse() {
                Ok(port) => self.ledger.port = port,
                Err(e) => warn!("ignoring {}={:?}: {}", ENV_LEDGER_PORT, port, e),
            }
        }
        if let Some(party) = non_empty(ENV_PUBLIC_PARTY) {
            self.parties.public_party = party;
        }
        if let Some(party) = non_empty(ENV_OPERATOR_PARTY) {
            self.parties.operator = party;
        }
        if let Some(party) = non_empty(ENV_VALIDATOR_PARTY) {
            self.parties.validator = party;
        }
        if let Some(party) = non_empty(ENV_CLEANER_PARTY) {
            self.parties.cleaner = party;
        }
    }

    /// Full ledger URL, empty when no host is configured
    pub fn ledger_url(&self) -> String {
        let LedgerConfig { host, port } = &self.ledger;
        if host.is_empty() {
            warn!("ledger host not configured");
            return String::new();
        }
        if *port == 443 {
            format!("https://{}", host)
        } else {
            format!("https://{}:{}", host, port)
        }
    }

    pub fn validate(&self) -> ConfigReport {
        let mut errors = Vec::new();

        if self.ledger.host.is_empty() {
            errors.push("Ledger host is not configured".to_string());
        }
        if self.parties.public_party.is_empty() {
            errors.push("Public Party ID is not configured".to_string());
        }
        if ensure_fee_rate(self.settings.default_fee_rate).is_err() {
            errors.push(format!(
                "Default fee rate {} is outside [0, 1)",
                self.settings.default_fee_rate
            ));
        }
        if self.settings.default_payment_token_scale > MAX_SCALE {
            errors.push(format!(
                "Default payment token scale {} exceeds {}",
                self.settings.default_payment_token_scale, MAX_SCALE
            ));
        }
        for instrument in &self.instruments {
            if instrument.scale > MAX_SCALE {
                errors.push(format!(
                    "Instrument {} scale {} exceeds {}",
                    instrument.symbol, instrument.scale, MAX_SCALE
                ));
            }
        }

        ConfigReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Looks up an instrument by symbol, case-insensitively
    pub fn instrument(&self, symbol: &str) -> Result<&InstrumentConfig> {
        self.instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| SettleError::UnknownInstrument(symbol.to_string()))
    }

    /// Market service record built from the configured parties and default fee rate
    pub fn market_service(&self) -> Result<OtcMarketService> {
        OtcMarketService::new(
            self.parties.operator.clone(),
            self.parties.validator.clone(),
            self.parties.cleaner.clone(),
            self.settings.default_fee_rate,
            self.parties.public_party.clone(),
        )
    }
}
