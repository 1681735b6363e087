//! File-backed override repository.
//!
//! The whole override state is kept in memory and rewritten to one JSON file
//! after every accepted mutation (write to a sibling temp file, then rename).
//! Loading is lenient: an override or history entry that does not parse is
//! skipped with a warning and the rest of the file is used. A file that is
//! not JSON at all is moved aside to `*.corrupt` and the store starts empty.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use rackquote_core::{DomainError, DomainResult, ExpectedVersion, PartId};
use rackquote_pricing::{
    InMemoryOverrideRepository, OverrideHistoryEntry, OverrideRepository, OverrideSnapshot, PriceOverride,
};

/// Backup document format version.
pub const BACKUP_VERSION: u32 = 1;

/// Exported override state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideBackup {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: OverrideSnapshot,
}

impl OverrideBackup {
    pub fn new(snapshot: OverrideSnapshot) -> Self {
        Self {
            version: BACKUP_VERSION,
            created_at: Utc::now(),
            snapshot,
        }
    }
}

#[derive(Debug)]
pub struct FileOverrideRepository {
    path: PathBuf,
    state: InMemoryOverrideRepository,
    write_lock: Mutex<()>,
}

impl FileOverrideRepository {
    /// Open `path`; a missing or unreadable file starts an empty store.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let snapshot = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<JsonValue>(&raw) {
                Ok(value) => snapshot_from_json(&value),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "override store is not JSON; starting empty");
                    set_aside(&path);
                    OverrideSnapshot::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "override store not found; starting empty");
                OverrideSnapshot::default()
            }
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                warn!(path = %path.display(), error = %err, "override store is not UTF-8; starting empty");
                set_aside(&path);
                OverrideSnapshot::default()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading override store {}", path.display()));
            }
        };

        Ok(Self {
            path,
            state: InMemoryOverrideRepository::from_snapshot(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialized backup of the current state.
    pub fn backup(&self) -> DomainResult<String> {
        let backup = OverrideBackup::new(self.state.snapshot()?);
        serde_json::to_string_pretty(&backup)
            .map_err(|e| DomainError::storage(format!("serializing backup: {e}")))
    }

    fn persist(&self) -> DomainResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| DomainError::storage("override file lock poisoned"))?;
        let snapshot = self.state.snapshot()?;
        let body = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| DomainError::storage(format!("serializing overrides: {e}")))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| DomainError::storage(format!("creating {}: {e}", dir.display())))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| DomainError::storage(format!("writing {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| DomainError::storage(format!("replacing {}: {e}", self.path.display())))?;
        Ok(())
    }
}

impl OverrideRepository for FileOverrideRepository {
    fn get(&self, part_id: &PartId) -> DomainResult<Option<PriceOverride>> {
        self.state.get(part_id)
    }

    fn list(&self) -> DomainResult<Vec<(PartId, PriceOverride)>> {
        self.state.list()
    }

    fn put(
        &self,
        part_id: &PartId,
        record: PriceOverride,
        expected: ExpectedVersion,
    ) -> DomainResult<u64> {
        let revision = self.state.put(part_id, record, expected)?;
        self.persist()?;
        Ok(revision)
    }

    fn remove(&self, part_id: &PartId, expected: ExpectedVersion) -> DomainResult<Option<PriceOverride>> {
        let removed = self.state.remove(part_id, expected)?;
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    fn history(&self, part_id: &PartId) -> DomainResult<Vec<OverrideHistoryEntry>> {
        self.state.history(part_id)
    }

    fn prepend_history(
        &self,
        part_id: &PartId,
        entry: OverrideHistoryEntry,
        cap: usize,
    ) -> DomainResult<()> {
        self.state.prepend_history(part_id, entry, cap)?;
        self.persist()
    }

    fn record_change(
        &self,
        part_id: &PartId,
        change: Option<PriceOverride>,
        expected: ExpectedVersion,
        entry: OverrideHistoryEntry,
        cap: usize,
    ) -> DomainResult<u64> {
        let revision = self.state.record_change(part_id, change, expected, entry, cap)?;
        self.persist()?;
        Ok(revision)
    }

    fn snapshot(&self) -> DomainResult<OverrideSnapshot> {
        self.state.snapshot()
    }

    fn restore(&self, snapshot: OverrideSnapshot) -> DomainResult<()> {
        self.state.restore(snapshot)?;
        self.persist()
    }
}

/// Keep an unreadable store file next to the original instead of
/// overwriting it on the next write.
fn set_aside(path: &Path) {
    let corrupt = path.with_extension("json.corrupt");
    if let Err(err) = fs::rename(path, &corrupt) {
        warn!(path = %path.display(), error = %err, "could not move unreadable override store aside");
    }
}

/// Parse a backup document into a snapshot (malformed entries skipped).
pub fn parse_backup(raw: &str) -> anyhow::Result<OverrideSnapshot> {
    let value: JsonValue = serde_json::from_str(raw).context("backup is not JSON")?;
    if value.get("overrides").is_none() && value.get("history").is_none() {
        bail!("backup has neither overrides nor history");
    }
    if let Some(version) = value.get("version").and_then(JsonValue::as_u64) {
        if version > u64::from(BACKUP_VERSION) {
            warn!(version, "backup written by a newer format version");
        }
    }
    Ok(snapshot_from_json(&value))
}

fn snapshot_from_json(value: &JsonValue) -> OverrideSnapshot {
    let mut snapshot = OverrideSnapshot::default();

    if let Some(overrides) = value.get("overrides").and_then(JsonValue::as_object) {
        for (key, raw) in overrides {
            match serde_json::from_value::<PriceOverride>(raw.clone()) {
                Ok(record) => {
                    snapshot.overrides.insert(PartId::from_raw(key.as_str()), record);
                }
                Err(err) => warn!(part_id = %key, error = %err, "malformed override skipped"),
            }
        }
    }

    if let Some(history) = value.get("history").and_then(JsonValue::as_object) {
        for (key, raw) in history {
            let Some(entries) = raw.as_array() else {
                warn!(part_id = %key, "history is not a list; skipped");
                continue;
            };
            let parsed: Vec<OverrideHistoryEntry> = entries
                .iter()
                .filter_map(|e| match serde_json::from_value(e.clone()) {
                    Ok(entry) => Some(entry),
                    Err(err) => {
                        warn!(part_id = %key, error = %err, "malformed history entry skipped");
                        None
                    }
                })
                .collect();
            if !parsed.is_empty() {
                snapshot.history.insert(PartId::from_raw(key.as_str()), parsed);
            }
        }
    }

    snapshot
}
