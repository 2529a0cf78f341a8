//! Settings lookup and adapter configuration.
//!
//! Values are read once, validated, and frozen into an [`AdapterConfig`] that
//! the backend owns. Nothing here reads global state after construction.

use crate::errors::ConfigurationError;
use crate::logger::{LogLevel, Logger, PREFIX};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.resend.com/emails";
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

pub const KEY_API_KEY: &str = "RESEND_API_KEY";
pub const KEY_API_URL: &str = "RESEND_API_URL";
pub const KEY_FROM_EMAIL: &str = "EMAIL_FROM";
pub const KEY_TIMEOUT: &str = "EMAIL_TIMEOUT";
pub const KEY_LOG_LEVEL: &str = "RESEND_LOG_LEVEL";

// Only variables under these prefixes are read from the environment.
const ENV_PREFIXES: [&str; 2] = ["RESEND", "EMAIL"];

/// A snapshot of key/value settings. Keys are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from an optional flat TOML file merged with the
    /// `RESEND_*` and `EMAIL_*` environment variables. The environment wins
    /// over the file, and a missing file is not an error.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        for prefix in ENV_PREFIXES {
            builder = builder.add_source(config::Environment::with_prefix(prefix).keep_prefix(true));
        }
        let values: HashMap<String, String> = builder.build()?.try_deserialize()?;
        Ok(Self::from_pairs(values))
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }
}

/// Options to create a backend.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct ResendOptions {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ResendOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            from_email: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: LogLevel::Info,
        }
    }
}

impl fmt::Debug for ResendOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResendOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("from_email", &self.from_email)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ResendOptions {
    /// Reads the recognised keys from `settings`.
    ///
    /// A malformed timeout or log level is an error unless `fail_silently`
    /// is set, in which case the default is used and a warning is logged.
    pub fn from_settings(settings: &Settings, fail_silently: bool) -> Result<Self, ConfigurationError> {
        let mut options = Self {
            api_key: settings.non_empty(KEY_API_KEY),
            from_email: settings.non_empty(KEY_FROM_EMAIL),
            ..Self::default()
        };
        if let Some(url) = settings.non_empty(KEY_API_URL) {
            options.api_url = url;
        }

        let logger = Logger::new(LogLevel::Info, PREFIX);
        if let Some(raw) = settings.non_empty(KEY_LOG_LEVEL) {
            match raw.parse::<LogLevel>() {
                Ok(level) => options.log_level = level,
                Err(err) => {
                    lenient(fail_silently, &logger, format!("{} is invalid: {}", KEY_LOG_LEVEL, err))?
                }
            }
        }
        let logger = Logger::new(options.log_level, PREFIX);
        if let Some(raw) = settings.non_empty(KEY_TIMEOUT) {
            match raw.parse::<f64>() {
                Ok(secs) => options.timeout_secs = secs,
                Err(_) => lenient(
                    fail_silently,
                    &logger,
                    format!("{} must be a number of seconds, got `{}`", KEY_TIMEOUT, raw),
                )?,
            }
        }
        Ok(options)
    }
}

/// Logs `message` and carries on in silent mode, fails otherwise.
fn lenient(fail_silently: bool, logger: &Logger, message: String) -> Result<(), ConfigurationError> {
    if !fail_silently {
        return Err(ConfigurationError::new(message));
    }
    logger.warn(&format!("{}, using the default", message));
    Ok(())
}

/// Validated, immutable configuration shared by every dispatch.
#[derive(Clone)]
pub struct AdapterConfig {
    api_key: Option<String>,
    from_email: Option<String>,
    api_url: String,
    timeout: Duration,
    fail_silently: bool,
    log_level: LogLevel,
}

impl AdapterConfig {
    /// Validates `options`.
    ///
    /// In strict mode a missing API key or sender address is an error. In
    /// silent mode the config is built anyway, marked degraded, and every
    /// later send yields nothing.
    pub fn new(options: ResendOptions, fail_silently: bool) -> Result<Self, ConfigurationError> {
        let logger = Logger::new(options.log_level, PREFIX);
        let api_key = options.api_key.filter(|k| !k.trim().is_empty());
        let from_email = options.from_email.filter(|f| !f.trim().is_empty());

        for (key, missing) in [(KEY_API_KEY, api_key.is_none()), (KEY_FROM_EMAIL, from_email.is_none())] {
            if !missing {
                continue;
            }
            if !fail_silently {
                return Err(ConfigurationError::new(format!(
                    "{} setting is required for ResendBackend",
                    key
                )));
            }
            logger.warn(&format!("{} not set, email sending will fail", key));
        }

        let timeout = match positive_duration(options.timeout_secs) {
            Some(timeout) => timeout,
            None => {
                lenient(
                    fail_silently,
                    &logger,
                    format!("timeout must be a positive number of seconds, got {}", options.timeout_secs),
                )?;
                Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS)
            }
        };

        Ok(Self {
            api_key,
            from_email,
            api_url: options.api_url,
            timeout,
            fail_silently,
            log_level: options.log_level,
        })
    }

    pub fn from_settings(settings: &Settings, fail_silently: bool) -> Result<Self, ConfigurationError> {
        let options = ResendOptions::from_settings(settings, fail_silently)?;
        Self::new(options, fail_silently)
    }

    /// True when a required value is missing (only possible in silent mode).
    pub fn is_degraded(&self) -> bool {
        self.api_key.is_none() || self.from_email.is_none()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fail_silently(&self) -> bool {
        self.fail_silently
    }

    pub fn from_email(&self) -> Option<&str> {
        self.from_email.as_deref()
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub(crate) fn logger(&self) -> Logger {
        Logger::new(self.log_level, PREFIX)
    }

    // Degraded and strict at once cannot be built through `new`.
    #[cfg(test)]
    pub(crate) fn strict(mut self) -> Self {
        self.fail_silently = false;
        self
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("from_email", &self.from_email)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("fail_silently", &self.fail_silently)
            .finish()
    }
}

fn positive_duration(secs: f64) -> Option<Duration> {
    if secs.is_nan() || secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}
