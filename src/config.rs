//! Application configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env is
//! loaded first) > default.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Session Configuration ====================

/// Study session expiration time in hours
pub const SESSION_EXPIRY_HOURS: i64 = 4;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Cookie holding the study session id
pub const SESSION_COOKIE: &str = "study_session";

// ==================== Study Configuration ====================

/// Cards per round
pub const DEFAULT_ROUND_LENGTH: usize = crate::srs::DEFAULT_ROUND_LENGTH;

/// Upper bound on a requested round length
pub const MAX_ROUND_LENGTH: usize = 100;

/// Maximum length of an improvement request
pub const MAX_IMPROVEMENT_REQUEST_LEN: usize = 2000;

// ==================== config.toml ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    server: Option<ServerSection>,
    database: Option<DatabaseSection>,
    study: Option<StudySection>,
    decks: Option<DecksSection>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StudySection {
    round_length: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct DecksSection {
    dir: Option<String>,
    unlock_codes: Option<String>,
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_addr: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub round_length: usize,
    pub decks_dir: PathBuf,
    pub unlock_codes_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_addr: SERVER_ADDR.to_string(),
            port: SERVER_PORT,
            database_path: PathBuf::from(paths::db_path()),
            round_length: DEFAULT_ROUND_LENGTH,
            decks_dir: PathBuf::from(paths::decks_dir()),
            unlock_codes_path: PathBuf::from(paths::unlock_codes_path()),
        }
    }
}

impl AppConfig {
    /// Load from `config.toml` in the working directory and the environment.
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = match std::fs::read_to_string("config.toml") {
            Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                Ok(file) => {
                    tracing::info!("Using config.toml");
                    file
                }
                Err(e) => {
                    tracing::warn!("Ignoring invalid config.toml: {}", e);
                    ConfigFile::default()
                }
            },
            Err(_) => ConfigFile::default(),
        };

        let config = Self::resolve(file, |key| std::env::var(key).ok());
        tracing::info!("Using database path: {}", config.database_path.display());
        config
    }

    /// Parse a config.toml document, without consulting the environment.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let file = toml::from_str::<ConfigFile>(contents)?;
        Ok(Self::resolve(file, |_| None))
    }

    fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let server_addr = file
            .server
            .as_ref()
            .and_then(|s| s.addr.clone())
            .unwrap_or(defaults.server_addr);

        let port = file
            .server
            .as_ref()
            .and_then(|s| s.port)
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(defaults.port);

        let database_path = file
            .database
            .and_then(|d| d.path)
            .or_else(|| env("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let round_length = file
            .study
            .and_then(|s| s.round_length)
            .or_else(|| env("ROUND_LENGTH").and_then(|n| n.parse().ok()))
            .unwrap_or(defaults.round_length)
            .min(MAX_ROUND_LENGTH);

        let decks = file.decks.unwrap_or(DecksSection {
            dir: None,
            unlock_codes: None,
        });
        let decks_dir = decks
            .dir
            .or_else(|| env("DECKS_DIR"))
            .map(PathBuf::from)
            .unwrap_or(defaults.decks_dir);
        let unlock_codes_path = decks
            .unlock_codes
            .map(PathBuf::from)
            .unwrap_or(defaults.unlock_codes_path);

        Self {
            server_addr,
            port,
            database_path,
            round_length,
            decks_dir,
            unlock_codes_path,
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::resolve(ConfigFile::default(), |_| None);
        assert_eq!(config.port, SERVER_PORT);
        assert_eq!(config.round_length, 7);
        assert!(config.database_path.ends_with("smart_decks.db"));
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_from_toml() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 8080

            [database]
            path = "/tmp/decks.db"

            [study]
            round_length = 10

            [decks]
            dir = "content/decks"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("/tmp/decks.db"));
        assert_eq!(config.round_length, 10);
        assert_eq!(config.decks_dir, PathBuf::from("content/decks"));
    }

    #[test]
    fn test_config_file_wins_over_env() {
        let env: HashMap<&str, &str> = HashMap::from([("PORT", "9000"), ("ROUND_LENGTH", "12")]);
        let file: ConfigFile = toml::from_str("[server]\nport = 8080\n").unwrap();
        let config = AppConfig::resolve(file, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.port, 8080);
        assert_eq!(config.round_length, 12);
    }

    #[test]
    fn test_round_length_is_capped() {
        let config = AppConfig::from_toml("[study]\nround_length = 5000\n").unwrap();
        assert_eq!(config.round_length, MAX_ROUND_LENGTH);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(AppConfig::from_toml("[server\nport = ").is_err());
    }
}
