//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! This allows running multiple isolated server instances:
//! ```bash
//! DATA_DIR=data/test PORT=3001 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database path
pub fn db_path() -> String {
    format!("{}/smart_decks.db", data_dir())
}

/// Directory scanned for static deck JSON files
pub fn decks_dir() -> String {
    format!("{}/decks", data_dir())
}

/// Deck id to unlock code map for locked static decks
pub fn unlock_codes_path() -> String {
    format!("{}/deck_unlock_codes.json", data_dir())
}

/// Profiling JSONL output for a session
pub fn profile_log_path(session_id: &str) -> String {
    format!("{}/profile_{}.jsonl", data_dir(), session_id)
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    // Note: We can't easily test env var override because OnceLock
    // initializes once. These tests verify the default behavior.

    #[test]
    fn test_data_dir_default() {
        let dir = data_dir();
        assert!(!dir.is_empty());
    }

    #[test]
    fn test_db_path_format() {
        assert!(db_path().ends_with("/smart_decks.db"));
    }

    #[test]
    fn test_deck_paths() {
        assert!(decks_dir().ends_with("/decks"));
        assert!(unlock_codes_path().ends_with("/deck_unlock_codes.json"));
    }

    #[test]
    fn test_profile_log_path() {
        assert!(profile_log_path("20240101_120000").ends_with("/profile_20240101_120000.jsonl"));
    }
}
