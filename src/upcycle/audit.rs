//! Run trail for `analyze` and `categories`: one JSON object per line in
//! `<logs_dir>/audit.log`.

use crate::upcycle::paths::UpcyclePaths;
use crate::upcycle::pipeline::SuggestionSource;
use crate::upcycle::util::now_epoch_secs;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const AUDIT_FILE: &str = "audit.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub at_epoch_secs: u64,
    pub command: String,
    pub material: String,
    pub source: String,
    pub status: RunStatus,
}

impl AuditEvent {
    /// Any fallback source marks the run `degraded`, whatever the reason.
    pub fn for_run(command: &str, material: &str, source: SuggestionSource) -> Result<Self> {
        let status = if source.is_fallback() {
            RunStatus::Degraded
        } else {
            RunStatus::Ok
        };
        Ok(Self {
            at_epoch_secs: now_epoch_secs()?,
            command: command.to_string(),
            material: material.trim().to_string(),
            source: source.to_string(),
            status,
        })
    }
}

pub fn audit_log_path(paths: &UpcyclePaths) -> PathBuf {
    paths.logs_dir.join(AUDIT_FILE)
}

pub fn append_event(paths: &UpcyclePaths, event: &AuditEvent) -> Result<()> {
    fs::create_dir_all(&paths.logs_dir)
        .with_context(|| format!("failed to create {}", paths.logs_dir.display()))?;
    let path = audit_log_path(paths);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writeln!(file, "{}", serde_json::to_string(event)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Non-empty lines in the trail. A missing file counts as zero.
pub fn count_events(paths: &UpcyclePaths) -> Result<usize> {
    let path = audit_log_path(paths);
    if !path.exists() {
        return Ok(0);
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(raw.lines().filter(|line| !line.trim().is_empty()).count())
}
