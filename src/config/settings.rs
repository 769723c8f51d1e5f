use crate::utils::error::{ControlError, Result};
use crate::utils::validation::{validate_finite, validate_range, validate_url, Validate};
use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PRICE_API_URL: &str = "https://www.frankenergie.nl/graphql";
/// EUR/kWh added to the market price when feeding in.
pub const DEFAULT_FEED_IN_FEE: f64 = -0.012705;
pub const DEFAULT_MARKET_TIMEZONE: Tz = chrono_tz::Europe::Amsterdam;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Immutable settings for one control cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSettings {
    pub price_api_url: String,
    pub feed_in_fee: f64,
    /// When set, cycles before this instant are skipped entirely.
    pub contract_start: Option<DateTime<FixedOffset>>,
    /// Timezone whose calendar day is requested from the price API.
    pub market_timezone: Tz,
    pub request_timeout: Duration,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            feed_in_fee: DEFAULT_FEED_IN_FEE,
            contract_start: None,
            market_timezone: DEFAULT_MARKET_TIMEZONE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ControlSettings {
    /// Returns a copy with every field present in `overrides` replaced.
    pub fn with_overrides(&self, overrides: &SettingsOverrides) -> Result<Self> {
        let mut settings = self.clone();

        if let Some(url) = &overrides.price_api_url {
            settings.price_api_url = url.clone();
        }
        if let Some(fee) = overrides.feed_in_fee {
            settings.feed_in_fee = fee;
        }
        if let Some(start) = &overrides.contract_start {
            settings.contract_start = Some(parse_contract_start("contract_start", start)?);
        }
        if let Some(tz) = &overrides.market_timezone {
            settings.market_timezone = parse_timezone("market_timezone", tz)?;
        }
        if let Some(secs) = overrides.request_timeout_seconds {
            settings.request_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}

impl Validate for ControlSettings {
    fn validate(&self) -> Result<()> {
        validate_url("price_api_url", &self.price_api_url)?;
        validate_finite("feed_in_fee", self.feed_in_fee)?;
        validate_range(
            "request_timeout_seconds",
            self.request_timeout.as_secs(),
            1,
            300,
        )?;
        Ok(())
    }
}

/// Partial settings as read from a TOML file, the environment or the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsOverrides {
    pub price_api_url: Option<String>,
    pub feed_in_fee: Option<f64>,
    pub contract_start: Option<String>,
    pub market_timezone: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

impl SettingsOverrides {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| ControlError::ConfigError {
                message: format!(
                    "cannot read settings file {}: {}",
                    path.as_ref().display(),
                    e
                ),
            })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ControlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Reads the optional override variables through `lookup` (usually `std::env::var`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let feed_in_fee = match lookup("FEED_IN_FEE") {
            Some(raw) => Some(raw.trim().parse::<f64>().map_err(|e| {
                ControlError::InvalidConfigValueError {
                    field: "FEED_IN_FEE".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };
        let request_timeout_seconds = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                ControlError::InvalidConfigValueError {
                    field: "REQUEST_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            price_api_url: lookup("PRICE_API_URL"),
            feed_in_fee,
            contract_start: lookup("CONTRACT_START"),
            market_timezone: lookup("MARKET_TIMEZONE"),
            request_timeout_seconds,
        })
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: SettingsOverrides) -> SettingsOverrides {
        SettingsOverrides {
            price_api_url: other.price_api_url.or(self.price_api_url),
            feed_in_fee: other.feed_in_fee.or(self.feed_in_fee),
            contract_start: other.contract_start.or(self.contract_start),
            market_timezone: other.market_timezone.or(self.market_timezone),
            request_timeout_seconds: other
                .request_timeout_seconds
                .or(self.request_timeout_seconds),
        }
    }
}

pub fn parse_contract_start(field_name: &str, value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim()).map_err(|e| ControlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!("expected an RFC3339 timestamp: {}", e),
    })
}

pub fn parse_timezone(field_name: &str, value: &str) -> Result<Tz> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|e| ControlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("expected an IANA timezone name: {}", e),
        })
}
