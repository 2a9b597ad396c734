//! Observability: tracing init and the JSONL audit log.
//!
//! Uses config::ObservabilityConfig for RUNLITE_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Audit log path. A relative configured path stays relative until
/// [`anchor_audit_log`] joins it onto the launcher directory.
static AUDIT_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Initialize tracing and the audit log. Call once at process startup.
///
/// `RUST_LOG` wins over the config. When RUNLITE_QUIET=1 only errors are logged.
/// Logs go to stderr so stdout stays with the child processes.
pub fn init(cfg: &ObservabilityConfig) {
    let level = if cfg.quiet {
        "runlite=error".to_string()
    } else {
        cfg.log_level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    };

    let audit = cfg.audit_log.clone().filter(|p| !p.as_os_str().is_empty());
    if let Some(ref path) = audit {
        if path.is_absolute() {
            ensure_parent(path);
        }
    }
    if let Ok(mut guard) = AUDIT_PATH.lock() {
        *guard = audit;
    }
}

/// Resolve a relative audit path against `base`; absolute paths are kept.
pub fn resolve_audit_path(configured: &Path, base: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        base.join(configured)
    }
}

/// Pin a relative audit path to `base` (the launcher directory), so every
/// record of a run lands in one file whatever the caller's cwd was.
pub fn anchor_audit_log(base: &Path) {
    let Ok(mut guard) = AUDIT_PATH.lock() else {
        return;
    };
    if let Some(path) = guard.take() {
        let path = resolve_audit_path(&path, base);
        ensure_parent(&path);
        *guard = Some(path);
    }
}

/// Current audit path, if auditing is on.
pub fn audit_log_path() -> Option<PathBuf> {
    AUDIT_PATH.lock().ok().and_then(|g| g.clone())
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

/// One audit line. `status` is present once a step or the run has finished.
#[derive(Debug, Serialize)]
pub struct AuditRecord<'a> {
    pub ts: String,
    pub event: &'a str,
    pub step: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub pid: u32,
}

impl<'a> AuditRecord<'a> {
    pub fn new(event: &'a str, step: &'a str) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            event,
            step,
            detail: None,
            status: None,
            duration_ms: None,
            pid: std::process::id(),
        }
    }
}

/// Append one record as a JSON line. Failures are swallowed: auditing never
/// changes the outcome of a launch.
pub fn append_jsonl(path: &Path, record: &AuditRecord<'_>) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn audit(record: AuditRecord<'_>) {
    if let Some(path) = audit_log_path() {
        append_jsonl(&path, &record);
    }
}

/// Audit: step_started
pub fn audit_step_started(step: &str, detail: &str) {
    let mut record = AuditRecord::new("step_started", step);
    record.detail = Some(detail);
    audit(record);
}

/// Audit: step_completed (status 0) or step_failed
pub fn audit_step_finished(step: &str, status: i32, duration_ms: u64) {
    let event = if status == 0 {
        "step_completed"
    } else {
        "step_failed"
    };
    let mut record = AuditRecord::new(event, step);
    record.status = Some(status);
    record.duration_ms = Some(duration_ms);
    audit(record);
}

/// Audit: run_finished, with the exit status the process is about to return
pub fn audit_run_finished(last_state: &str, exit_code: i32) {
    let mut record = AuditRecord::new("run_finished", last_state);
    record.status = Some(exit_code);
    audit(record);
}
