//! Error types for the Resend mailer.

use std::fmt;
use thiserror::Error;

/// Required credential or sender address missing, or a setting that cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConfigurationError {
    pub message: String,
}

impl ConfigurationError {
    pub const CODE: &'static str = "CONFIGURATION";
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        Self::new(format!("Could not load settings: {}", err))
    }
}

/// Network failure reaching the provider (connect, DNS, timeout...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Resend API error: {message}")]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub const CODE: &'static str = "TRANSPORT";
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            timed_out: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

/// What the provider told us about a failed request.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    /// The error body was JSON.
    Json(serde_json::Value),
    /// Non-JSON error body, rendered as "<status> <body>".
    Status { status: u16, body: String },
    Message(String),
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetail::Json(value) => write!(f, "{}", value),
            ErrorDetail::Status { status, body } => write!(f, "{} {}", status, body),
            ErrorDetail::Message(message) => f.write_str(message),
        }
    }
}

/// Provider answered, but not with a usable success.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Resend API error: {detail}")]
pub struct ProviderError {
    pub status: u16,
    pub detail: ErrorDetail,
}

impl ProviderError {
    pub const CODE: &'static str = "PROVIDER";
    pub fn new(status: u16, detail: ErrorDetail) -> Self {
        Self { status, detail }
    }
}

/// Any failure of a send operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeliveryError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl DeliveryError {
    pub fn code(&self) -> &'static str {
        match self {
            DeliveryError::Configuration(_) => ConfigurationError::CODE,
            DeliveryError::Transport(_) => TransportError::CODE,
            DeliveryError::Provider(_) => ProviderError::CODE,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, DeliveryError::Configuration(_))
    }
}
