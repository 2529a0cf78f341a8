//! resend-mailer — Send emails through the Resend REST API (Rust).
//!
//! Messages are translated into Resend's JSON payload, posted one at a time
//! over blocking HTTP, and the outcome is classified. Batches either stop at
//! the first failure (strict mode) or log and skip failures (silent mode).

pub mod backend;
pub mod batch;
pub mod config;
pub mod errors;
pub mod logger;
pub mod message;
pub mod transport;

// Re-exports
pub use backend::{classify, DeliveryHooks, DispatchOutcome, ResendBackend, Sent};
pub use batch::{BatchReport, DeliveryResult};
pub use crate::config::{AdapterConfig, ResendOptions, Settings, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
pub use errors::{ConfigurationError, DeliveryError, ErrorDetail, ProviderError, TransportError};
pub use logger::{LogLevel, Logger};
pub use message::{normalize, Alternative, Body, OutgoingMessage, Payload, Recipients, Subtype};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
