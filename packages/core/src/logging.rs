//! Logging Context
//!
//! `McpLogger` is constructed once at bootstrap and handed to every component
//! that logs (sanitizer, dispatcher, session manager, gateway service). It
//! applies the configured verbosity threshold and redacts credentials from
//! structured context before emitting `tracing` events under the
//! `content_mcp` target.

use crate::config::LogLevel;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Replacement text for redacted values
pub const REDACTED: &str = "[REDACTED]";

/// Key fragments that mark a context value as sensitive (matched case-insensitively)
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "token",
    "jwt",
    "api_key",
    "secret",
    "authorization",
    "auth",
    "credentials",
    "key",
];

macro_rules! emit {
    ($mac:ident, $message:expr, $context:expr) => {
        match $context {
            Some(context) => tracing::$mac!(target: "content_mcp", context = %context, "{}", $message),
            None => tracing::$mac!(target: "content_mcp", "{}", $message),
        }
    };
}

/// Explicit logging context shared by gateway components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct McpLogger {
    level: LogLevel,
}

impl McpLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        self.level.allows(level)
    }

    pub fn error(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Error, message, context);
    }

    pub fn warn(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Warn, message, context);
    }

    pub fn info(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Info, message, context);
    }

    pub fn debug(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Debug, message, context);
    }

    pub fn trace(&self, message: &str, context: Option<Value>) {
        self.log(LogLevel::Trace, message, context);
    }

    /// Log the outcome of one tool call with redacted arguments
    pub fn log_tool_execution(
        &self,
        tool: &str,
        args: &Value,
        duration: Duration,
        success: bool,
        error: Option<&str>,
    ) {
        let mut context = json!({
            "toolName": tool,
            "args": args,
            "duration": duration.as_millis() as u64,
            "success": success,
        });

        if success {
            self.info(&format!("Tool executed: {}", tool), Some(context));
        } else {
            if let Some(message) = error {
                context["error"] = Value::String(message.to_string());
            }
            self.error(&format!("Tool failed: {}", tool), Some(context));
        }
    }

    fn log(&self, level: LogLevel, message: &str, context: Option<Value>) {
        if !self.enabled(level) {
            return;
        }

        let context = context.map(|value| redact(&value));
        match level {
            LogLevel::Error => emit!(error, message, context),
            LogLevel::Warn => emit!(warn, message, context),
            LogLevel::Info => emit!(info, message, context),
            LogLevel::Debug => emit!(debug, message, context),
            LogLevel::Trace => emit!(trace, message, context),
        }
    }
}

/// Replace values under sensitive keys with `[REDACTED]`, recursively
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let redacted: Map<String, Value> = map
                .iter()
                .map(|(key, value)| {
                    if is_sensitive(key) {
                        (key.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (key.clone(), redact(value))
                    }
                })
                .collect();
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|sensitive| key.contains(sensitive))
}

/// Install a global `tracing` subscriber for binaries
///
/// `RUST_LOG` takes precedence; otherwise gateway targets log at `level`.
/// Output goes to stderr so stdout stays free for the stdio transport.
/// Calling this twice is harmless.
pub fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("content_mcp={},tower_http=info", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
