//! Levelled logger with a message prefix, forwarding to the `log` facade.

const TARGET: &str = "resend_mailer";

/// Prefix used by the backend's log lines.
pub const PREFIX: &str = "[ResendBackend] ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    None = 4,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "none" | "off" => Ok(LogLevel::None),
            other => Err(format!("unknown log level `{}`", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Logger {
    level: LogLevel,
    prefix: String,
}

impl Logger {
    pub fn new(level: LogLevel, prefix: impl Into<String>) -> Self {
        Self {
            level,
            prefix: prefix.into(),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn debug(&self, message: &str) {
        if self.level <= LogLevel::Debug {
            log::debug!(target: TARGET, "{}{}", self.prefix, message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.level <= LogLevel::Info {
            log::info!(target: TARGET, "{}{}", self.prefix, message);
        }
    }

    pub fn warn(&self, message: &str) {
        if self.level <= LogLevel::Warn {
            log::warn!(target: TARGET, "{}{}", self.prefix, message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.level <= LogLevel::Error {
            log::error!(target: TARGET, "{}{}", self.prefix, message);
        }
    }
}

/// Process-wide `log` sink that keeps every record, for asserting on log output.
#[cfg(test)]
pub(crate) mod capture {
    use std::sync::{Mutex, Once};

    static RECORDS: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());
    static INSTALL: Once = Once::new();
    static COLLECTOR: Collector = Collector;

    struct Collector;

    impl log::Log for Collector {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if let Ok(mut records) = RECORDS.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    pub fn install() {
        INSTALL.call_once(|| {
            let _ = log::set_logger(&COLLECTOR);
            log::set_max_level(log::LevelFilter::Trace);
        });
    }

    /// True if a record at `level` containing `needle` was logged by any test.
    /// Tests run in parallel, so needles should be unique to the caller.
    pub fn logged(level: log::Level, needle: &str) -> bool {
        RECORDS
            .lock()
            .unwrap()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}
