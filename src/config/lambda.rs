use crate::config::settings::{ControlSettings, SettingsOverrides};
use crate::core::ConfigProvider;
use crate::domain::model::RunOutcome;
use crate::utils::error::{ControlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_required_field, validate_topic_segment, Validate,
};
use serde::Serialize;
use std::env;
use std::fmt;

#[cfg(feature = "lambda")]
use crate::core::CommandPublisher;
#[cfg(feature = "lambda")]
use aws_sdk_iotdataplane::error::DisplayErrorContext;
#[cfg(feature = "lambda")]
use aws_sdk_iotdataplane::primitives::Blob;
#[cfg(feature = "lambda")]
use aws_sdk_iotdataplane::Client as IotDataClient;

/// Configuration of the scheduled function, read from its environment.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub device_id: String,
    pub iot_endpoint: String,
    pub settings: ControlSettings,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Required variables are checked first so a misconfigured function
    /// fails before it touches the network.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let device_id = validate_required_field("SHELLY_CLIENT_ID", &non_empty("SHELLY_CLIENT_ID"))?
            .trim()
            .to_string();
        let iot_endpoint = validate_required_field("IOT_ENDPOINT", &non_empty("IOT_ENDPOINT"))?
            .trim()
            .to_string();

        let file = match non_empty("SETTINGS_FILE") {
            Some(path) => SettingsOverrides::from_file(path)?,
            None => SettingsOverrides::default(),
        };
        let env_overrides = SettingsOverrides::from_lookup(non_empty)?;
        let settings = ControlSettings::default().with_overrides(&file.merge(env_overrides))?;

        Ok(Self {
            device_id,
            iot_endpoint,
            settings,
        })
    }

    /// Data-plane endpoint URL; a bare host name gets an `https://` scheme.
    pub fn iot_endpoint_url(&self) -> String {
        if self.iot_endpoint.contains("://") {
            self.iot_endpoint.clone()
        } else {
            format!("https://{}", self.iot_endpoint)
        }
    }
}

impl ConfigProvider for LambdaConfig {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn settings(&self) -> &ControlSettings {
        &self.settings
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        validate_topic_segment("SHELLY_CLIENT_ID", &self.device_id)?;
        validate_non_empty_string("IOT_ENDPOINT", &self.iot_endpoint)?;
        self.settings.validate()?;

        tracing::info!("Lambda configuration validation passed");
        Ok(())
    }
}

/// JSON body returned by the function for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LambdaResponse {
    pub message: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl From<&RunOutcome> for LambdaResponse {
    fn from(outcome: &RunOutcome) -> Self {
        match outcome {
            RunOutcome::Skipped { contract_start } => Self {
                message: format!(
                    "Energy contract effective from {}; solar control skipped",
                    contract_start.to_rfc3339()
                ),
                outcome: "skipped",
                command: None,
                effective_price: None,
                topic: None,
            },
            RunOutcome::Published {
                decision, topic, ..
            } => Self {
                message: decision.reason.clone(),
                outcome: "published",
                command: Some(decision.command.to_string()),
                effective_price: Some(decision.effective_price),
                topic: Some(topic.clone()),
            },
        }
    }
}

/// Wraps a failed data-plane call; `detail` should carry the full source chain.
pub fn publish_error(topic: &str, detail: impl fmt::Display) -> ControlError {
    ControlError::PublishError {
        topic: topic.to_string(),
        message: detail.to_string(),
    }
}

/// Publishes through the AWS IoT Data Plane HTTPS API.
#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct IotDataPublisher {
    client: IotDataClient,
}

#[cfg(feature = "lambda")]
impl IotDataPublisher {
    pub fn new(client: IotDataClient) -> Self {
        Self { client }
    }

    pub async fn from_config(config: &LambdaConfig) -> Self {
        let shared = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let iot_config = aws_sdk_iotdataplane::config::Builder::from(&shared)
            .endpoint_url(config.iot_endpoint_url())
            .build();
        Self::new(IotDataClient::from_conf(iot_config))
    }
}

#[cfg(feature = "lambda")]
impl CommandPublisher for IotDataPublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        self.client
            .publish()
            .topic(topic)
            .payload(Blob::new(payload.to_vec()))
            .send()
            .await
            .map_err(|e| publish_error(topic, DisplayErrorContext(&e)))?;
        Ok(())
    }
}
