use crate::core::decision::{decide, is_contract_effective};
use crate::core::matcher::find_current_interval;
use crate::core::{
    command_topic, CommandPayload, CommandPublisher, ConfigProvider, PriceSource, RunOutcome,
};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

/// Runs one control cycle: gate, fetch, match, decide, publish.
pub struct ControlEngine<P: PriceSource, B: CommandPublisher, C: ConfigProvider> {
    prices: P,
    publisher: B,
    config: C,
}

impl<P: PriceSource, B: CommandPublisher, C: ConfigProvider> ControlEngine<P, B, C> {
    pub fn new(prices: P, publisher: B, config: C) -> Self {
        Self {
            prices,
            publisher,
            config,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunOutcome> {
        let settings = self.config.settings();

        if let Some(contract_start) = settings.contract_start {
            tracing::info!(
                "Contract start: {}, current time: {}",
                contract_start.to_rfc3339(),
                now.to_rfc3339()
            );
            if !is_contract_effective(settings, now) {
                tracing::info!("Energy contract not yet effective, skipping solar control");
                return Ok(RunOutcome::Skipped { contract_start });
            }
        }

        let market_date = now.with_timezone(&settings.market_timezone).date_naive();
        tracing::info!(
            "Fetching market prices for {} ({})",
            market_date,
            settings.market_timezone.name()
        );
        let intervals = self.prices.fetch_prices(market_date).await.map_err(|e| {
            tracing::error!("Error fetching market prices for {}: {}", market_date, e);
            e
        })?;
        tracing::info!("Received {} price intervals", intervals.len());

        let interval = find_current_interval(&intervals, now).map_err(|e| {
            tracing::error!("Error finding current price: {}", e);
            e
        })?;
        tracing::info!(
            "Matched price period {} - {}",
            interval.start.to_rfc3339(),
            interval.end.to_rfc3339()
        );

        let decision = decide(interval.price, settings, now);
        tracing::info!(
            "Market price: €{:.5}/{}, effective price: €{:.5}, disable solar: {}",
            decision.market_price,
            interval.unit,
            decision.effective_price,
            decision.command.disables_solar()
        );

        let topic = command_topic(self.config.device_id());
        let payload = serde_json::to_vec(&CommandPayload::from(&decision))?;
        self.publisher
            .publish(&topic, &payload)
            .await
            .map_err(|e| {
                tracing::error!("Error publishing command {}: {}", decision.command, e);
                e
            })?;
        tracing::info!("Published command '{}' to {}", decision.command, topic);

        Ok(RunOutcome::Published {
            decision,
            topic,
            interval: interval.clone(),
        })
    }
}
