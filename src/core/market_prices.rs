use crate::config::settings::ControlSettings;
use crate::core::{PriceInterval, PriceSource};
use crate::utils::error::{ControlError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const MARKET_PRICES_QUERY: &str = r#"query MarketPrices($date: String!) {
  marketPrices(date: $date) {
    electricityPrices {
      from
      till
      marketPrice
      perUnit
    }
  }
}"#;

const OPERATION_NAME: &str = "MarketPrices";

/// Longest slice of an error body carried into log lines.
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: MarketPricesVariables,
    operation_name: &'a str,
}

#[derive(Debug, Serialize)]
struct MarketPricesVariables {
    date: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<MarketPricesData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketPricesData {
    market_prices: Option<MarketPrices>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketPrices {
    electricity_prices: Vec<ElectricityPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElectricityPrice {
    from: Option<String>,
    till: Option<String>,
    market_price: f64,
    #[serde(default)]
    per_unit: Option<String>,
}

/// GraphQL client for the day-ahead market price curve.
pub struct MarketPriceClient {
    client: Client,
    endpoint: String,
}

impl MarketPriceClient {
    pub fn new(settings: &ControlSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| ControlError::ConfigError {
                message: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: settings.price_api_url.clone(),
        })
    }

    pub async fn fetch_market_prices(&self, date: NaiveDate) -> Result<Vec<PriceInterval>> {
        let request = GraphQlRequest {
            query: MARKET_PRICES_QUERY,
            variables: MarketPricesVariables {
                date: date.format("%Y-%m-%d").to_string(),
            },
            operation_name: OPERATION_NAME,
        };

        tracing::debug!("Requesting market prices for {} from {}", date, self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Price API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ControlError::UpstreamError {
                message: format!(
                    "API returned status {}: {}",
                    status,
                    truncate(&body, ERROR_BODY_LIMIT)
                ),
                status: Some(status.as_u16()),
            });
        }

        let body = response.text().await?;
        parse_market_prices(&body).map_err(|err| match err {
            ControlError::UpstreamError { message, .. } => ControlError::UpstreamError {
                message,
                status: Some(status.as_u16()),
            },
            other => other,
        })
    }
}

#[async_trait]
impl PriceSource for MarketPriceClient {
    async fn fetch_prices(&self, date: NaiveDate) -> Result<Vec<PriceInterval>> {
        self.fetch_market_prices(date).await
    }
}

/// Decodes a GraphQL response body into intervals, keeping response order.
///
/// Entries with unparseable timestamps are dropped with a warning.
fn parse_market_prices(body: &str) -> Result<Vec<PriceInterval>> {
    let response: GraphQlResponse =
        serde_json::from_str(body).map_err(|e| ControlError::UpstreamError {
            message: format!(
                "malformed response body ({}): {}",
                e,
                truncate(body, ERROR_BODY_LIMIT)
            ),
            status: None,
        })?;

    if let Some(first) = response.errors.as_ref().and_then(|errors| errors.first()) {
        return Err(ControlError::UpstreamError {
            message: format!("GraphQL error: {}", first.message),
            status: None,
        });
    }

    let prices = response
        .data
        .and_then(|data| data.market_prices)
        .ok_or_else(|| ControlError::UpstreamError {
            message: "response contains no marketPrices data".to_string(),
            status: None,
        })?;

    let mut intervals = Vec::with_capacity(prices.electricity_prices.len());
    for entry in prices.electricity_prices {
        let from = entry.from.as_deref().and_then(parse_timestamp);
        let till = entry.till.as_deref().and_then(parse_timestamp);
        let (start, end) = match (from, till) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                tracing::warn!(
                    "Skipping price entry with invalid timestamps: {} - {}",
                    entry.from.as_deref().unwrap_or("null"),
                    entry.till.as_deref().unwrap_or("null")
                );
                continue;
            }
        };
        intervals.push(PriceInterval {
            start,
            end,
            price: entry.market_price,
            unit: entry.per_unit.unwrap_or_default(),
        });
    }

    Ok(intervals)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(limit).collect();
        cut.push_str("...");
        cut
    }
}
