use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::download::ErrorRecord;

/// Ensure the medext config directory (`~/.medext`) exists and return it.
pub fn ensure_app_dir(home_dir: &Path) -> anyhow::Result<PathBuf> {
    let app_dir = home_dir.join(concat!(".", env!("CARGO_PKG_NAME")));
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir)
}

/// Append per-file failures as JSON Lines under `<app_dir>/logs/`, one file
/// per run named with a UTC timestamp. Returns the path written, or `None`
/// when nothing could be written (failure logging is best-effort and never
/// aborts the run).
pub fn write_failures_jsonl(app_dir: &Path, failures: &[ErrorRecord]) -> Option<PathBuf> {
    if failures.is_empty() {
        return None;
    }
    let logs_dir = app_dir.join("logs");
    if std::fs::create_dir_all(&logs_dir).is_err() {
        return None;
    }
    let path =
        logs_dir.join(format!("failures_{}.jsonl", Utc::now().format("%Y%m%dT%H%M%SZ")));
    let mut f = OpenOptions::new().create(true).append(true).open(&path).ok()?;
    for err in failures {
        if let Ok(line) = serde_json::to_string(err) {
            let _ = writeln!(f, "{}", line);
        }
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tmp_dir() -> PathBuf {
        let mut base = std::env::temp_dir();
        let uniq = format!(
            "medext_util_test_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        );
        base.push(uniq);
        std::fs::create_dir(&base).expect("create tmp dir");
        base
    }

    #[test]
    fn writes_one_json_line_per_failure() {
        let dir = make_tmp_dir();
        let failures = vec![
            ErrorRecord {
                patient: "Smith, Jane".into(),
                file: "a.pdf".into(),
                remote_path: "/docs/a.pdf".into(),
                error: "no such file".into(),
            },
            ErrorRecord {
                patient: "Smith, Jane".into(),
                file: "b.pdf".into(),
                remote_path: "/docs/b.pdf".into(),
                error: "permission denied".into(),
            },
        ];
        let path = write_failures_jsonl(&dir, &failures).expect("ledger written");
        let content = std::fs::read_to_string(&path).expect("read ledger");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("/docs/a.pdf"));
        assert!(lines[1].contains("permission denied"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_failures_write_nothing() {
        let dir = make_tmp_dir();
        assert!(write_failures_jsonl(&dir, &[]).is_none());
        assert!(!dir.join("logs").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
