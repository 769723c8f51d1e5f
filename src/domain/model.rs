use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

/// One bucket of the day-ahead price curve.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub price: f64,
    pub unit: String,
}

impl PriceInterval {
    /// Half-open `[start, end)`, except an instant equal to `start` always matches.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        (self.start <= now && now < self.end) || now == self.start
    }
}

/// Literal switch command understood by the device firmware.
///
/// `On` closes the relay that disconnects the inverter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchCommand {
    On,
    Off,
}

impl SwitchCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchCommand::On => "on",
            SwitchCommand::Off => "off",
        }
    }

    pub fn disables_solar(&self) -> bool {
        matches!(self, SwitchCommand::On)
    }
}

impl fmt::Display for SwitchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub command: SwitchCommand,
    pub market_price: f64,
    pub effective_price: f64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Wire payload published to the device topic (format version 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandPayload {
    pub command: SwitchCommand,
    pub timestamp: String,
    pub reason: String,
}

impl From<&Decision> for CommandPayload {
    fn from(decision: &Decision) -> Self {
        Self {
            command: decision.command,
            timestamp: decision
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            reason: decision.reason.clone(),
        }
    }
}

pub fn command_topic(device_id: &str) -> String {
    format!("{}/command/switch:0", device_id)
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Skipped {
        contract_start: DateTime<FixedOffset>,
    },
    Published {
        decision: Decision,
        topic: String,
        interval: PriceInterval,
    },
}
