//! Unlock codes for locked static decks.
//!
//! The codes file maps deck ids to codes (`{ "plsql_deck": "123456" }`); it
//! is kept inverted for lookup by code.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone)]
pub struct UnlockCodes {
  by_code: HashMap<String, String>,
}

impl UnlockCodes {
  /// Build from a deck id to code map
  pub fn from_map(codes: HashMap<String, String>) -> Self {
    let by_code = codes
      .into_iter()
      .map(|(deck_id, code)| (code.trim().to_string(), deck_id))
      .collect();
    Self { by_code }
  }

  /// Load the codes file. A missing or unreadable file disables unlocking.
  pub fn load(path: &Path) -> Self {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(_) => {
        tracing::info!("No unlock codes at {}, unlocking disabled", path.display());
        return Self::default();
      }
    };

    match serde_json::from_str::<HashMap<String, String>>(&content) {
      Ok(codes) => {
        tracing::debug!("Loaded {} unlock codes", codes.len());
        Self::from_map(codes)
      }
      Err(e) => {
        tracing::warn!("Invalid unlock codes file {}: {}", path.display(), e);
        Self::default()
      }
    }
  }

  /// Deck unlocked by `code`, if any
  pub fn deck_for_code(&self, code: &str) -> Option<&str> {
    self.by_code.get(code.trim()).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.by_code.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_lookup_by_code() {
    let codes = UnlockCodes::from_map(HashMap::from([
      ("plsql_deck".to_string(), "123456".to_string()),
      ("git_deck".to_string(), "654321".to_string()),
    ]));
    assert_eq!(codes.deck_for_code("123456"), Some("plsql_deck"));
    assert_eq!(codes.deck_for_code(" 654321 "), Some("git_deck"));
    assert_eq!(codes.deck_for_code("000000"), None);
  }

  #[test]
  fn test_load_missing_file() {
    let codes = UnlockCodes::load(Path::new("/no/such/deck_unlock_codes.json"));
    assert!(codes.is_empty());
  }

  #[test]
  fn test_load_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("deck_unlock_codes.json");
    fs::write(&path, r#"{"secret_deck": "111222"}"#).unwrap();
    assert_eq!(UnlockCodes::load(&path).deck_for_code("111222"), Some("secret_deck"));

    fs::write(&path, "nope").unwrap();
    assert!(UnlockCodes::load(&path).is_empty());
  }
}
