use std::{fs::OpenOptions, io::Write, path::Path, sync::Mutex};

use crate::trace::trace::TraceEvent;

/// Appends resolution events to a JSONL file. Failures only disable tracing.
pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not open trace file");
                Self { file: None }
            }
        }
    }

    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Append one event. Errors are logged and otherwise ignored.
    pub fn log(&self, event: &TraceEvent) {
        let Some(file) = &self.file else { return };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize trace event");
                return;
            }
        };

        let Ok(mut file) = file.lock() else {
            tracing::warn!("trace file lock poisoned; dropping event");
            return;
        };
        if let Err(e) = writeln!(file, "{}", line) {
            tracing::warn!(error = %e, "failed to write trace event");
        }
    }
}
