//! Structured Logging with Sensitive Data Redaction
//!
//! Safe logging for a crate that handles key material: private keys are
//! always fully redacted, account addresses and signatures are shortened to
//! prefix and suffix. Debug logging is off unless enabled explicitly.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag to enable/disable debug logging
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable debug logging
pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

/// Disable debug logging
pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the log entry (auto-redacts sensitive data)
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value_str = value.to_string();
        let redacted = redact_if_sensitive(key, &value_str);
        self.fields.push((key, redacted));
        self
    }

    /// Log the entry
    pub fn log(self) {
        // Skip debug logs if not enabled
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }

        let fields_str = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");

        if fields_str.is_empty() {
            eprintln!("[{}] {} [{}] {}", timestamp, self.level, self.module, self.message);
        } else {
            eprintln!(
                "[{}] {} [{}] {} | {}",
                timestamp, self.level, self.module, self.message, fields_str
            );
        }
    }
}

/// Redact a value if the key suggests it's sensitive
fn redact_if_sensitive(key: &str, value: &str) -> String {
    let key_lower = key.to_lowercase();

    // Keys that must always be fully redacted
    let fully_redacted_keys = ["private_key", "secret", "seed", "key_material"];
    for sensitive_key in &fully_redacted_keys {
        if key_lower.contains(sensitive_key) {
            return redact_value(value);
        }
    }

    // Long identifiers are shown as prefix...suffix
    let shortened_keys = ["address", "sender", "recipient", "account", "signature", "public_key"];
    for short_key in &shortened_keys {
        if key_lower.contains(short_key) {
            return shorten(value);
        }
    }

    value.to_string()
}

/// Fully redact a sensitive value
fn redact_value(value: &str) -> String {
    if value.is_empty() {
        return "[EMPTY]".to_string();
    }
    if value.len() <= 4 {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED:{}chars]", value.len())
    }
}

/// Shorten an identifier to its first 6 and last 4 characters
fn shorten(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }
    if trimmed.len() <= 13 {
        return trimmed.to_string();
    }
    format!("{}...{}", &trimmed[..6], &trimmed[trimmed.len() - 4..])
}

/// Convenience macro for debug logging
#[macro_export]
macro_rules! log_debug {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for info logging
#[macro_export]
macro_rules! log_info {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for error logging
#[macro_export]
macro_rules! log_error {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_value() {
        assert_eq!(redact_value(""), "[EMPTY]");
        assert_eq!(redact_value("abc"), "[REDACTED]");
        assert_eq!(redact_value("secret_key_12345"), "[REDACTED:16chars]");
    }

    #[test]
    fn test_shorten() {
        let address = "3kBx2h5Y2veb4hZgAJWPrr8RyQESKm5TjzF3ti1QQ4VkyVjpLomy";
        let shortened = shorten(address);
        assert!(shortened.starts_with("3kBx2h"));
        assert!(shortened.ends_with("Lomy"));
        assert!(shortened.contains("..."));

        assert_eq!(shorten("short"), "short");
    }

    #[test]
    fn test_redact_if_sensitive() {
        assert!(redact_if_sensitive("private_key", "secret123").contains("REDACTED"));
        assert!(redact_if_sensitive("sender_address", &"ab".repeat(20)).contains("..."));
        assert_eq!(redact_if_sensitive("amount", "100"), "100");
    }

    #[test]
    fn test_log_entry_redacts_fields() {
        let entry = LogEntry::new(LogLevel::Info, "test", "message")
            .field("amount", "100")
            .field("private_key", "secret-material");

        let pk_field = entry.fields.iter().find(|(k, _)| *k == "private_key").unwrap();
        assert!(pk_field.1.contains("REDACTED"));
        let amount_field = entry.fields.iter().find(|(k, _)| *k == "amount").unwrap();
        assert_eq!(amount_field.1, "100");
    }
}
