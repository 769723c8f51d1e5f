use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Price API request failed: {message}")]
    UpstreamError {
        message: String,
        status: Option<u16>,
    },

    #[error("No price interval covers {now} ({searched} intervals searched{})", describe_window(.window))]
    NoMatchError {
        now: DateTime<Utc>,
        searched: usize,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    },

    #[error("Failed to publish to {topic}: {message}")]
    PublishError { topic: String, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn describe_window(window: &Option<(DateTime<Utc>, DateTime<Utc>)>) -> String {
    match window {
        Some((start, end)) => format!(", covering {} - {}", start.to_rfc3339(), end.to_rfc3339()),
        None => String::new(),
    }
}

impl From<reqwest::Error> for ControlError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_decode() {
            format!("malformed response body: {}", err)
        } else {
            err.to_string()
        };
        ControlError::UpstreamError {
            message,
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Upstream,
    DataQuality,
    Delivery,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ControlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ControlError::ConfigError { .. }
            | ControlError::MissingConfigError { .. }
            | ControlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ControlError::UpstreamError { .. } => ErrorCategory::Upstream,
            ControlError::NoMatchError { .. } => ErrorCategory::DataQuality,
            ControlError::PublishError { .. } => ErrorCategory::Delivery,
            ControlError::SerializationError(_) | ControlError::IoError(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Medium errors are expected to clear by the next hourly run.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Upstream | ErrorCategory::Delivery => ErrorSeverity::Medium,
            ErrorCategory::DataQuality => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ControlError::MissingConfigError { field } => {
                format!("Set {} in the environment or on the command line", field)
            }
            ControlError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of {}", field)
            }
            ControlError::ConfigError { .. } => "Check the settings file syntax".to_string(),
            ControlError::UpstreamError {
                status: Some(status),
                ..
            } if *status >= 500 => {
                "The price API is having trouble; the next hourly run will retry".to_string()
            }
            ControlError::UpstreamError { status: Some(_), .. } => {
                "Check the price API URL and query; the API rejected the request".to_string()
            }
            ControlError::UpstreamError { status: None, .. } => {
                "Check network connectivity to the price API".to_string()
            }
            ControlError::NoMatchError { .. } => {
                "The price feed does not cover the current hour; check the market timezone setting"
                    .to_string()
            }
            ControlError::PublishError { .. } => {
                "Check the IoT endpoint and the publish permission for the device topic".to_string()
            }
            ControlError::SerializationError(_) | ControlError::IoError(_) => {
                "Inspect the logs for the failing operation".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Upstream => format!("Could not fetch electricity prices: {}", self),
            ErrorCategory::DataQuality => format!("Price data incomplete: {}", self),
            ErrorCategory::Delivery => format!("Could not send the switch command: {}", self),
            ErrorCategory::Internal => format!("Internal error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;
