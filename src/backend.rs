//! Resend REST API backend: one HTTP request per message.

use crate::config::{AdapterConfig, ResendOptions, Settings};
use crate::errors::{ConfigurationError, DeliveryError, ErrorDetail, ProviderError};
use crate::logger::Logger;
use crate::message::{normalize, OutgoingMessage};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport};

pub(crate) const MISSING_CREDENTIALS: &str = "RESEND_API_KEY and EMAIL_FROM must be set to send emails";

/// Result of a successful dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Sent {
    /// Provider message id; absent if the response did not carry one.
    pub id: Option<String>,
}

/// Outcome of one send attempt.
pub type DispatchOutcome = Result<Sent, DeliveryError>;

type SentHook = Box<dyn Fn(&OutgoingMessage, Option<&str>) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&OutgoingMessage, &DeliveryError) + Send + Sync>;

/// Callbacks run after every dispatch attempt.
#[derive(Default)]
pub struct DeliveryHooks {
    pub on_sent: Option<SentHook>,
    pub on_error: Option<ErrorHook>,
}

impl std::fmt::Debug for DeliveryHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DeliveryHooks")
    }
}

/// Sends [`OutgoingMessage`]s through the Resend API.
#[derive(Debug)]
pub struct ResendBackend<T = HttpTransport> {
    pub(crate) config: AdapterConfig,
    transport: T,
    pub(crate) logger: Logger,
    hooks: DeliveryHooks,
}

impl ResendBackend<HttpTransport> {
    pub fn new(config: AdapterConfig) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }

    /// Resolves the configuration from `settings` and builds an HTTP backend.
    pub fn from_settings(settings: &Settings, fail_silently: bool) -> Result<Self, ConfigurationError> {
        Ok(Self::new(AdapterConfig::from_settings(settings, fail_silently)?))
    }

    pub fn from_options(options: ResendOptions, fail_silently: bool) -> Result<Self, ConfigurationError> {
        Ok(Self::new(AdapterConfig::new(options, fail_silently)?))
    }
}

impl<T: Transport> ResendBackend<T> {
    pub fn with_transport(config: AdapterConfig, transport: T) -> Self {
        let logger = config.logger();
        Self {
            config,
            transport,
            logger,
            hooks: DeliveryHooks::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: DeliveryHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends one message and reports the provider id.
    ///
    /// Fails with a configuration error, without touching the network, when
    /// the config is degraded.
    pub fn send_message(&self, message: &OutgoingMessage) -> DispatchOutcome {
        let outcome = self.dispatch(message);
        match outcome {
            Ok(ref sent) => {
                if let Some(ref f) = self.hooks.on_sent {
                    f(message, sent.id.as_deref());
                }
            }
            Err(ref err) => {
                if let Some(ref f) = self.hooks.on_error {
                    f(message, err);
                }
            }
        }
        outcome
    }

    fn dispatch(&self, message: &OutgoingMessage) -> DispatchOutcome {
        let (api_key, default_from) = match (self.config.api_key(), self.config.from_email()) {
            (Some(api_key), Some(from)) => (api_key, from),
            _ => return Err(ConfigurationError::new(MISSING_CREDENTIALS).into()),
        };

        let payload = normalize(message, message.effective_from(default_from));
        self.logger.info(&format!(
            "Sending email via Resend API: from={}, to={:?}, subject={}",
            payload.from, payload.to, payload.subject
        ));
        self.logger.debug(&format!(
            "Payload: {}",
            serde_json::to_string(&payload).unwrap_or_default()
        ));

        let request = HttpRequest {
            url: self.config.api_url(),
            api_key,
            payload: &payload,
            timeout: self.config.timeout(),
        };
        let response = self.transport.post_json(request).map_err(|err| {
            self.logger.error(&err.to_string());
            err
        })?;

        match classify(response) {
            Ok(sent) => {
                self.logger.info(&format!(
                    "Email sent successfully via Resend: id={}",
                    sent.id.as_deref().unwrap_or("None")
                ));
                Ok(sent)
            }
            Err(err) => {
                self.logger.error(&err.to_string());
                Err(err.into())
            }
        }
    }
}

/// Turns a raw provider response into a [`Sent`] or a [`ProviderError`].
pub fn classify(response: HttpResponse) -> Result<Sent, ProviderError> {
    let parsed = serde_json::from_str::<serde_json::Value>(&response.body);
    if response.is_success() {
        return match parsed {
            Ok(value) => Ok(Sent {
                id: value.get("id").and_then(|id| id.as_str()).map(str::to_owned),
            }),
            Err(err) => Err(ProviderError::new(
                response.status,
                ErrorDetail::Message(format!("invalid JSON in success response: {}", err)),
            )),
        };
    }
    let detail = match parsed {
        Ok(value) => ErrorDetail::Json(value),
        Err(_) => ErrorDetail::Status {
            status: response.status,
            body: response.body,
        },
    };
    Err(ProviderError::new(response.status, detail))
}
