pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalPublisher, CliArgs, CliConfig};

#[cfg(feature = "lambda")]
pub use config::lambda::IotDataPublisher;

pub use config::lambda::LambdaConfig;
pub use config::settings::ControlSettings;
pub use core::{engine::ControlEngine, market_prices::MarketPriceClient};
pub use domain::model::{Decision, PriceInterval, RunOutcome, SwitchCommand};
pub use utils::error::{ControlError, Result};
