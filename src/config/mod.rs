#[cfg(feature = "cli")]
pub mod cli;
pub mod lambda;
pub mod settings;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::{ControlError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_topic_segment, Validate};
#[cfg(feature = "cli")]
use chrono::{DateTime, Utc};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use settings::{ControlSettings, SettingsOverrides};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "solar-curtail")]
#[command(about = "Switch solar production off while the feed-in price is negative")]
pub struct CliArgs {
    /// Device identifier; the command goes to `<device-id>/command/switch:0`
    #[arg(long, env = "SHELLY_CLIENT_ID")]
    pub device_id: String,

    /// Directory receiving the local outbox instead of the message broker
    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// TOML settings file
    #[arg(long)]
    pub settings: Option<String>,

    #[arg(long)]
    pub price_api_url: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub feed_in_fee: Option<f64>,

    /// RFC3339 instant before which cycles are skipped
    #[arg(long)]
    pub contract_start: Option<String>,

    /// IANA timezone of the price market
    #[arg(long)]
    pub market_timezone: Option<String>,

    /// Evaluate as if it were this RFC3339 instant
    #[arg(long)]
    pub at: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliArgs {
    /// Layers defaults, the settings file and flags into a resolved config.
    pub fn into_config(self) -> Result<CliConfig> {
        let file = match &self.settings {
            Some(path) => SettingsOverrides::from_file(path)?,
            None => SettingsOverrides::default(),
        };
        let flags = SettingsOverrides {
            price_api_url: self.price_api_url,
            feed_in_fee: self.feed_in_fee,
            contract_start: self.contract_start,
            market_timezone: self.market_timezone,
            request_timeout_seconds: None,
        };
        let settings = ControlSettings::default().with_overrides(&file.merge(flags))?;

        let at = match &self.at {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw.trim())
                    .map_err(|e| ControlError::InvalidConfigValueError {
                        field: "at".to_string(),
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(CliConfig {
            device_id: self.device_id,
            output_path: self.output_path,
            settings,
            at,
        })
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub device_id: String,
    pub output_path: String,
    pub settings: ControlSettings,
    pub at: Option<DateTime<Utc>>,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn settings(&self) -> &ControlSettings {
        &self.settings
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_topic_segment("device_id", &self.device_id)?;
        validate_non_empty_string("output_path", &self.output_path)?;
        self.settings.validate()
    }
}
