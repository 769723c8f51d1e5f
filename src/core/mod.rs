pub mod decision;
pub mod engine;
pub mod market_prices;
pub mod matcher;

pub use crate::domain::model::{
    command_topic, CommandPayload, Decision, PriceInterval, RunOutcome, SwitchCommand,
};
pub use crate::domain::ports::{CommandPublisher, ConfigProvider, PriceSource};
pub use crate::utils::error::Result;
