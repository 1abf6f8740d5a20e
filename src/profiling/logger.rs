//! JSONL file logger for profiling events.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;

use super::event::{EventType, ProfileEvent};
use crate::paths;

/// Events between flushes of the log file
const FLUSH_EVERY: u64 = 100;

/// Active log file, set by `init`
static LOGGER: Mutex<Option<ProfileLogger>> = Mutex::new(None);

/// Events written since `init`
static EVENT_COUNT: AtomicU64 = AtomicU64::new(0);

struct ProfileLogger {
    writer: BufWriter<File>,
}

impl ProfileLogger {
    /// Open `profile_<timestamp>.jsonl` in the data directory.
    fn open(session_id: &str) -> std::io::Result<Self> {
        create_dir_all(paths::data_dir())?;
        let filename = paths::profile_log_path(session_id);
        let file = OpenOptions::new().create(true).append(true).open(&filename)?;
        tracing::info!("Profiling enabled: writing to {}", filename);
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write(&mut self, event: &ProfileEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Unserializable profile event: {}", e);
                return;
            }
        };
        if let Err(e) = writeln!(self.writer, "{}", json) {
            tracing::warn!("Failed to write profile event: {}", e);
            return;
        }
        tracing::trace!(target: "profile", "{}", json);

        let count = EVENT_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
        if count % FLUSH_EVERY == 0 {
            let _ = self.writer.flush();
        }
    }
}

/// Run `f` against the logger if profiling was initialized.
fn with_logger(f: impl FnOnce(&mut ProfileLogger)) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_mut() {
            f(logger);
        }
    }
}

/// Start a profiling session. Call once from main() before any logging.
pub fn init() {
    let session_id = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    {
        let Ok(mut guard) = LOGGER.lock() else {
            tracing::error!("Profiler lock poisoned");
            return;
        };
        if guard.is_some() {
            tracing::warn!("Profiler already initialized");
            return;
        }
        match ProfileLogger::open(&session_id) {
            Ok(logger) => *guard = Some(logger),
            Err(e) => {
                tracing::error!("Failed to initialize profiler: {}", e);
                return;
            }
        }
    }
    log_event(EventType::SessionStart { session_id });
}

/// End the profiling session and flush the log file.
pub fn shutdown() {
    let total_events = EVENT_COUNT.load(Ordering::Relaxed);
    log_event(EventType::SessionEnd { total_events });

    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(mut logger) = guard.take() {
            let _ = logger.writer.flush();
            tracing::info!("Profiling session ended: {} events logged", total_events);
        }
    }
}

pub fn log_event(event_type: EventType) {
    let event = ProfileEvent::new(event_type);
    with_logger(|logger| logger.write(&event));
}

pub fn log_event_with_meta(event_type: EventType, metadata: serde_json::Value) {
    let event = ProfileEvent::with_metadata(event_type, metadata);
    with_logger(|logger| logger.write(&event));
}

/// Record how long a named scope took.
pub fn log_timed(name: &str, duration: Duration) {
    let event = ProfileEvent::with_duration(
        EventType::TimedScope {
            name: name.to_string(),
        },
        duration,
    );
    with_logger(|logger| logger.write(&event));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ProfileEvent::new(EventType::CardAssessed {
            deck_id: "git".into(),
            card_id: "git_001".into(),
            correct: true,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"card_assessed\""));
        assert!(json.contains("git_001"));
        assert!(!json.contains("duration_us"));
    }

    #[test]
    fn test_timed_event_has_duration() {
        let event = ProfileEvent::with_duration(
            EventType::TimedScope { name: "load_catalog".into() },
            Duration::from_millis(3),
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"duration_us\":3000"));
    }

    #[test]
    fn test_logging_before_init_is_a_no_op() {
        log_event(EventType::CardIgnored {
            deck_id: "git".into(),
            card_id: "git_002".into(),
        });
    }
}
