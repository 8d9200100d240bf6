//! Logging setup
//!
//! Logs go to stderr and optionally to a daily rotated file. Standard output
//! is reserved for the generated curl config, so nothing here writes to it.

use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "secret",
    "token",
    "identity",
    "signature",
    "mmsauth",
    "string",
    "authorization",
];

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level
    pub level: Level,

    /// Log to file
    pub file_path: Option<PathBuf>,

    /// Log to stderr
    pub stderr: bool,

    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            file_path: None,
            stderr: true,
            json: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(log_file) = std::env::var("EZLO_LOG_FILE") {
            config.file_path = Some(PathBuf::from(log_file));
        }

        if let Ok(log_stderr) = std::env::var("EZLO_LOG_STDERR") {
            config.stderr = log_stderr.to_lowercase() != "false";
        }

        if let Ok(format) = std::env::var("EZLO_LOG_FORMAT") {
            config.json = format.eq_ignore_ascii_case("json");
        }

        config
    }

    /// Verbose request/response logging
    pub fn debug(mut self) -> Self {
        self.level = Level::DEBUG;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        if self.level >= Level::DEBUG {
            // --debug wins over RUST_LOG
            let level = self.level.as_str().to_lowercase();
            EnvFilter::new(format!(
                "{level},ezlo_curl_config={level},reqwest={level},hyper=info,rustls=info"
            ))
        } else {
            EnvFilter::builder()
                .with_default_directive(self.level.into())
                .from_env_lossy()
        }
    }
}

/// Initialize logging with the given configuration
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = config.env_filter();

    let stderr_layer = config.stderr.then(|| {
        let layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
        if config.json {
            layer.json().boxed()
        } else {
            layer.compact().boxed()
        }
    });

    let file_layer = match &config.file_path {
        Some(file_path) => {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let file_appender = tracing_appender::rolling::daily(
                file_path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| std::path::Path::new(".")),
                file_path
                    .file_name()
                    .unwrap_or_else(|| std::ffi::OsStr::new("ezlo-curl-config.log")),
            );

            let layer = fmt::layer().with_writer(file_appender).with_ansi(false);
            Some(if config.json {
                layer.json().boxed()
            } else {
                layer.boxed()
            })
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer);

    // Also bridges `log` records, which is how reqwest reports connections
    subscriber.try_init()?;
    Ok(())
}

/// Copy of a JSON value with sensitive fields masked and long values cut
pub fn sanitize_json(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, value) in map {
                if is_sensitive_field(key) && !value.is_object() {
                    sanitized.insert(key.clone(), serde_json::Value::String("***".to_string()));
                } else {
                    sanitized.insert(key.clone(), sanitize_json(value));
                }
            }
            serde_json::Value::Object(sanitized)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(sanitize_json).collect())
        }
        serde_json::Value::String(s) if s.len() > 256 => serde_json::Value::String(format!(
            "{}... ({} bytes)",
            s.chars().take(64).collect::<String>(),
            s.len()
        )),
        _ => value.clone(),
    }
}

/// Check if a field name indicates sensitive data
fn is_sensitive_field(field: &str) -> bool {
    let field_lower = field.to_lowercase();
    SENSITIVE_FIELDS.iter().any(|s| field_lower.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_sensitive_fields() {
        let body = json!({
            "Identity": "eyJFeHBpcmVz",
            "IdentitySignature": "FtASRZZZ",
            "Server_Account": "vera-us-oem-account11.mios.com"
        });

        let sanitized = sanitize_json(&body);

        assert_eq!(sanitized["Identity"], "***");
        assert_eq!(sanitized["IdentitySignature"], "***");
        assert_eq!(sanitized["Server_Account"], "vera-us-oem-account11.mios.com");
    }

    #[test]
    fn test_sanitize_nested_key_records() {
        let body = json!({
            "data": {
                "keys": {
                    "k1": {
                        "meta": { "entity": { "id": "45006642", "uuid": "u-1" } },
                        "data": { "string": "hub-secret" }
                    }
                }
            }
        });

        let sanitized = sanitize_json(&body);
        let record = &sanitized["data"]["keys"]["k1"];
        assert_eq!(record["meta"]["entity"]["id"], "45006642");
        assert_eq!(record["data"]["string"], "***");
    }

    #[test]
    fn test_long_strings_are_shortened() {
        let body = json!({ "blob": "x".repeat(1000) });
        let sanitized = sanitize_json(&body);
        let text = sanitized["blob"].as_str().unwrap();
        assert!(text.ends_with("(1000 bytes)"));
        assert!(text.len() < 100);
    }

    #[test]
    fn test_debug_raises_level() {
        let config = LogConfig::default().debug();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.stderr);
    }
}
