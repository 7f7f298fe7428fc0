use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOG_FILE: &str = "operations.log";

/// Append-only JSON-line log of client operations. Logging is
/// best-effort: a full disk or missing directory must never fail the
/// operation being logged.
#[derive(Debug)]
pub struct OperationLog {
    logs_dir: PathBuf,
    guard: Mutex<()>,
}

impl OperationLog {
    pub fn new(logs_dir: impl AsRef<Path>) -> Self {
        Self {
            logs_dir: logs_dir.as_ref().to_path_buf(),
            guard: Mutex::new(()),
        }
    }

    pub fn info(&self, operation: &str, message: &str) {
        self.append("info", operation, message);
    }

    pub fn error(&self, operation: &str, message: &str) {
        self.append("error", operation, message);
    }

    fn append(&self, level: &str, operation: &str, message: &str) {
        let Ok(_guard) = self.guard.lock() else {
            return;
        };
        let path = self.logs_dir.join(LOG_FILE);
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "operation": operation,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_ID: AtomicUsize = AtomicUsize::new(0);

    fn temp_logs_dir() -> PathBuf {
        let sequence = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "taskpad-logs-{}-{}-{}",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or(0),
            sequence
        ));
        fs::create_dir_all(&path).expect("create temp directory");
        path
    }

    #[test]
    fn entries_are_appended_as_json_lines() {
        let dir = temp_logs_dir();
        let log = OperationLog::new(&dir);
        log.info("create_task", "created t1");
        log.error("delete_task", "server rejected request");

        let raw = fs::read_to_string(dir.join(LOG_FILE)).expect("read log");
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("parse line");
        assert_eq!(first["level"], "info");
        assert_eq!(first["operation"], "create_task");
        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("parse line");
        assert_eq!(second["level"], "error");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn logging_into_a_missing_directory_is_silent() {
        let log = OperationLog::new(std::env::temp_dir().join("taskpad-logs-absent"));
        log.info("refresh_tasks", "no directory");
    }
}
