use crate::config::settings::ControlSettings;
use crate::domain::model::PriceInterval;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Outbound message channel to the device.
pub trait CommandPublisher: Send + Sync {
    fn publish(
        &self,
        topic: &str,
        payload: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn device_id(&self) -> &str;
    fn settings(&self) -> &ControlSettings;
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Price curve for one market-local calendar day, in response order.
    async fn fetch_prices(&self, date: NaiveDate) -> Result<Vec<PriceInterval>>;
}
