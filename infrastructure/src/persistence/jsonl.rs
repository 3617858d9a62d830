//! JSONL file writer for completed skip events.
//!
//! Each [`SkipEvent`] is serialized as a single JSON line with a `type`
//! field and `timestamp`, appended to the history file via a buffered
//! writer. Fire-and-forget: every failure is logged here and never
//! reaches the coordinator.

use skipvote_application::PersistencePort;
use skipvote_domain::SkipEvent;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Skip-history log that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record —
/// skips are rare and the history is append-only.
pub struct JsonlSkipLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlSkipLog {
    /// Open (or create) the history file at the given path.
    ///
    /// Creates parent directories if needed. Returns `None` if the file
    /// cannot be opened; the caller falls back to no persistence.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create skip history directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open skip history file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistencePort for JsonlSkipLog {
    fn record_skip_event(&self, event: &SkipEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = serde_json::json!({
            "type": "skip",
            "timestamp": timestamp,
            "world": &event.world,
            "kind": event.kind,
            "voters": event.voters.iter().map(|v| v.display_name()).collect::<Vec<_>>(),
            "voter_count": event.voter_count(),
        });

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{line}") {
            warn!("Could not append skip history record: {e}");
        }
        let _ = writer.flush();
    }
}

impl Drop for JsonlSkipLog {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
