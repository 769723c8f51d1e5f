use crate::config::settings::ControlSettings;
use crate::core::{Decision, SwitchCommand};
use chrono::{DateTime, Utc};

/// Classifies the fee-adjusted price: negative turns solar production off.
pub fn decide(market_price: f64, settings: &ControlSettings, now: DateTime<Utc>) -> Decision {
    let effective_price = market_price + settings.feed_in_fee;

    let (command, reason) = if effective_price < 0.0 {
        (
            SwitchCommand::On,
            format!(
                "Effective price (€{:.5}/kWh) < 0 - disabling solar production",
                effective_price
            ),
        )
    } else {
        (
            SwitchCommand::Off,
            format!(
                "Effective price (€{:.5}/kWh) >= 0 - solar production profitable",
                effective_price
            ),
        )
    };

    Decision {
        command,
        market_price,
        effective_price,
        reason,
        timestamp: now,
    }
}

/// True when no contract start is configured or it has been reached.
pub fn is_contract_effective(settings: &ControlSettings, now: DateTime<Utc>) -> bool {
    match settings.contract_start {
        Some(start) => now >= start,
        None => true,
    }
}
