use crate::upcycle::model::{CarbonResult, MaterialRequest, SuggestionSet};
use crate::upcycle::paths::UpcyclePaths;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const RECORD_ID_HEX_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcycleRecord {
    pub id: String,
    pub user_id: String,
    pub created_at: String,
    pub created_at_epoch_secs: u64,
    pub request: MaterialRequest,
    pub carbon: CarbonResult,
    pub suggestions: SuggestionSet,
    pub source: String,
}

#[derive(Debug, Clone, Copy)]
pub struct NewRecord<'a> {
    pub user: &'a str,
    pub request: &'a MaterialRequest,
    pub carbon: CarbonResult,
    pub suggestions: &'a SuggestionSet,
    pub source: &'a str,
}

pub trait RecordStore {
    fn save(&self, record: NewRecord<'_>) -> Result<UpcycleRecord>;
    /// Newest first, at most `limit` entries.
    fn find_by_user(&self, user: &str, limit: usize) -> Result<Vec<UpcycleRecord>>;
    fn find_by_id(&self, user: &str, id: &str) -> Result<Option<UpcycleRecord>>;
}

/// Append-only JSON-lines ledger guarded by advisory file locks.
#[derive(Debug, Clone)]
pub struct JsonlRecordStore {
    path: PathBuf,
}

impl JsonlRecordStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_paths(paths: &UpcyclePaths) -> Self {
        Self::new(paths.records_file.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<UpcycleRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut file = File::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        FileExt::lock_shared(&file)
            .with_context(|| format!("failed to lock {}", self.path.display()))?;
        let mut raw = String::new();
        let read = file.read_to_string(&mut raw);
        FileExt::unlock(&file)?;
        read.with_context(|| format!("failed to read {}", self.path.display()))?;
        parse_ledger(&raw, &self.path)
    }
}

fn parse_ledger(raw: &str, path: &Path) -> Result<Vec<UpcycleRecord>> {
    let mut out = Vec::new();
    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let entry: UpcycleRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("failed to parse record line in {}", path.display()))?;
        out.push(entry);
    }
    Ok(out)
}

/// `seq` is the ledger length at save time so identical requests saved within
/// the same second still get distinct ids.
pub fn record_id(user: &str, epoch_secs: u64, seq: usize, request: &MaterialRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(
        format!(
            "{user}|{epoch_secs}|{seq}|{}|{}|{}|{}",
            request.material(),
            request.category(),
            request.quantity(),
            request.unit()
        )
        .as_bytes(),
    );
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(RECORD_ID_HEX_LEN);
    hex
}

fn append_locked(path: &Path, build: impl FnOnce(usize) -> Result<UpcycleRecord>) -> Result<UpcycleRecord> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    FileExt::lock_exclusive(&file)
        .with_context(|| format!("failed to lock {}", path.display()))?;

    let result = (|| -> Result<UpcycleRecord> {
        file.seek(SeekFrom::Start(0))?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)?;
        let seq = raw.lines().filter(|line| !line.trim().is_empty()).count();
        let record = build(seq)?;
        let line = format!("{}\n", serde_json::to_string(&record)?);
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(record)
    })();

    FileExt::unlock(&file)?;
    result.with_context(|| format!("failed to append record to {}", path.display()))
}

impl RecordStore for JsonlRecordStore {
    fn save(&self, new: NewRecord<'_>) -> Result<UpcycleRecord> {
        let now: DateTime<Utc> = Utc::now();
        let epoch = u64::try_from(now.timestamp()).unwrap_or_default();
        append_locked(&self.path, |seq| {
            Ok(UpcycleRecord {
                id: record_id(new.user, epoch, seq, new.request),
                user_id: new.user.to_string(),
                created_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
                created_at_epoch_secs: epoch,
                request: new.request.clone(),
                carbon: new.carbon,
                suggestions: new.suggestions.clone(),
                source: new.source.to_string(),
            })
        })
    }

    fn find_by_user(&self, user: &str, limit: usize) -> Result<Vec<UpcycleRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .rev()
            .filter(|record| record.user_id == user)
            .take(limit)
            .collect())
    }

    fn find_by_id(&self, user: &str, id: &str) -> Result<Option<UpcycleRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .find(|record| record.id == id && record.user_id == user))
    }
}
