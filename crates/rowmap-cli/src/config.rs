//! Configuration loading from file and environment variables.

use rowmap_db::DbRuntimeSettings;
use serde::Deserialize;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "rowmap_mapper=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_db_path() -> String {
    "rowmap.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    DbRuntimeSettings::default().busy_timeout_ms
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl DatabaseConfig {
    /// Connection tunables for [`rowmap_db::Database::open`].
    pub fn runtime_settings(&self) -> DbRuntimeSettings {
        DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `ROWMAP_DB_PATH` overrides `database.path`
/// - `ROWMAP_BUSY_TIMEOUT_MS` overrides `database.busy_timeout_ms`
/// - `ROWMAP_LOG_LEVEL` overrides `logging.level`
/// - `ROWMAP_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(db_path) = var("ROWMAP_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(timeout) = var("ROWMAP_BUSY_TIMEOUT_MS") {
        match timeout.parse::<u64>() {
            Ok(parsed) => config.database.busy_timeout_ms = parsed,
            Err(e) => tracing::warn!(
                value = %timeout,
                error = %e,
                "ignoring invalid ROWMAP_BUSY_TIMEOUT_MS"
            ),
        }
    }
    if let Some(level) = var("ROWMAP_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("ROWMAP_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("absent.toml");

        let config = load_config(path.to_str()).expect("missing file is not an error");
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("rowmap.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/tmp/app.db\"\n\n[logging]\njson = true\n",
        )
        .expect("should write config");

        let config = load_config(path.to_str()).expect("should parse");
        assert_eq!(config.database.path, "/tmp/app.db");
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("rowmap.toml");
        std::fs::write(&path, "[database\n").expect("should write config");

        let err = load_config(path.to_str()).expect_err("should fail to parse");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_apply_and_ignore_bad_numbers() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ROWMAP_DB_PATH", ":memory:"),
            ("ROWMAP_BUSY_TIMEOUT_MS", "soon"),
            ("ROWMAP_LOG_LEVEL", "debug"),
            ("ROWMAP_LOG_JSON", "1"),
        ]);

        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, ":memory:");
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn bad_busy_timeout_is_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let mut config = Config::default();
        tracing::subscriber::with_default(subscriber, || {
            apply_env_overrides(&mut config, |key| {
                (key == "ROWMAP_BUSY_TIMEOUT_MS").then(|| "soon".to_string())
            });
        });

        assert_eq!(config.database.busy_timeout_ms, 5_000);
        let output = String::from_utf8(logs.0.lock().expect("log buffer lock").clone())
            .expect("logs should be utf-8");
        assert!(output.contains("WARN"));
        assert!(output.contains("ignoring invalid ROWMAP_BUSY_TIMEOUT_MS"));
        assert!(output.contains("soon"));
    }
}
