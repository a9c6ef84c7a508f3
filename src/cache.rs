//! Fingerprint-validated summary cache.
//!
//! Summaries are keyed by record id and stored alongside the fingerprint of
//! the record they were computed from. A lookup only hits when the caller's
//! current record still produces the same fingerprint, so edited records
//! are re-summarized without any explicit invalidation step.
//!
//! # Storage
//!
//! Two pretty-printed JSON files in the cache directory:
//!
//! | File | Shape |
//! |------|-------|
//! | `project_summaries.json` | `{ id: summary }` |
//! | `metadata.json` | `{ id: { hash, created_at, title } }` |
//!
//! Both files are rewritten as a pair on every [`SummaryCache::put`]. Each
//! is written to a temporary sibling and renamed into place; any failure is
//! returned to the caller, never reported as success.
//!
//! # Concurrency
//!
//! Reads take a shared lock. Writers (`put`, `clear`, `load`) are
//! serialized by a separate mutex that is held across persistence, so the
//! files on disk always reflect one complete sequence of writes.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::fingerprint::fingerprint;
use crate::models::ProjectRecord;

pub const SUMMARIES_FILE: &str = "project_summaries.json";
pub const METADATA_FILE: &str = "metadata.json";

/// Per-entry bookkeeping stored in `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMetadata {
    /// Fingerprint of the record the summary was computed from.
    pub hash: String,
    /// ISO-8601 local timestamp of the write.
    pub created_at: String,
    pub title: String,
}

/// Snapshot returned by [`SummaryCache::stats`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub count: usize,
    /// On-disk size of `project_summaries.json`.
    pub size_bytes: u64,
    /// Entries per creation day (`YYYY-MM-DD`).
    pub creation_dates: BTreeMap<String, usize>,
}

impl CacheStats {
    /// Size in megabytes, rounded to two decimals.
    pub fn size_mb(&self) -> f64 {
        (self.size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
    }
}

#[derive(Debug, Default, Clone)]
struct CacheState {
    summaries: BTreeMap<String, String>,
    metadata: BTreeMap<String, SummaryMetadata>,
}

pub struct SummaryCache {
    dir: PathBuf,
    state: RwLock<CacheState>,
    writer: Mutex<()>,
}

impl SummaryCache {
    /// Open the cache rooted at `dir`, creating the directory if needed and
    /// loading whatever is already stored there.
    ///
    /// Never fails: an unreadable directory or corrupt file yields an empty
    /// cache and a warning.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let cache = Self::empty(dir);
        if let Err(e) = std::fs::create_dir_all(&cache.dir) {
            tracing::warn!(
                dir = %cache.dir.display(),
                error = %e,
                "failed to create cache directory"
            );
        }
        cache.load();
        cache
    }

    /// An empty cache for `dir` that has not touched the filesystem yet.
    pub fn empty(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            state: RwLock::new(CacheState::default()),
            writer: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn summaries_path(&self) -> PathBuf {
        self.dir.join(SUMMARIES_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Replace in-memory state with the contents of the backing files.
    ///
    /// Missing files are empty maps. If either file is unreadable or
    /// malformed the whole cache starts empty.
    pub fn load(&self) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let loaded = read_map::<String>(&self.summaries_path()).and_then(|summaries| {
            read_map::<SummaryMetadata>(&self.metadata_path())
                .map(|metadata| CacheState { summaries, metadata })
        });

        let state = match loaded {
            Ok(state) => {
                tracing::info!(count = state.summaries.len(), "loaded cached summaries");
                state
            }
            Err(e) => {
                tracing::warn!(
                    dir = %self.dir.display(),
                    error = %format!("{:#}", e),
                    "failed to load cached summaries, starting empty"
                );
                CacheState::default()
            }
        };

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Write the current in-memory state to both backing files.
    pub fn save(&self) -> Result<()> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.read_state().summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cached summary for `id`, if one exists and was computed from a
    /// record with the same fingerprint as `record`.
    pub fn get(&self, id: &str, record: &ProjectRecord) -> Option<String> {
        let state = self.read_state();
        let summary = match state.summaries.get(id) {
            Some(s) => s,
            None => {
                tracing::debug!(id, "summary cache miss");
                return None;
            }
        };

        let stored = state.metadata.get(id).map(|m| m.hash.as_str());
        if stored != Some(fingerprint(record).as_str()) {
            tracing::debug!(id, "project changed since summary was cached");
            return None;
        }

        tracing::debug!(id, "summary cache hit");
        Some(summary.clone())
    }

    /// Insert or replace the summary for `id` and persist both files.
    ///
    /// The in-memory entry is updated before persisting, so on `Err` the
    /// summary is still served for the rest of the process.
    pub fn put(&self, id: &str, record: &ProjectRecord, summary: &str) -> Result<()> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let title = if record.title().is_empty() {
            "Unknown".to_string()
        } else {
            record.title().to_string()
        };
        let meta = SummaryMetadata {
            hash: fingerprint(record),
            created_at: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            title,
        };

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.summaries.insert(id.to_string(), summary.to_string());
            state.metadata.insert(id.to_string(), meta);
        }

        self.persist()
            .with_context(|| format!("Failed to persist summary for {}", id))
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.read_state();

        let mut creation_dates = BTreeMap::new();
        for meta in state.metadata.values() {
            let day: String = meta.created_at.chars().take(10).collect();
            *creation_dates.entry(day).or_insert(0) += 1;
        }

        let size_bytes = std::fs::metadata(self.summaries_path())
            .map(|m| m.len())
            .unwrap_or(0);

        CacheStats {
            count: state.summaries.len(),
            size_bytes,
            creation_dates,
        }
    }

    /// Drop every entry and delete both backing files. Missing files are fine.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = CacheState::default();

        for path in [self.summaries_path(), self.metadata_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to remove {}", path.display()))
                }
            }
        }

        tracing::info!(dir = %self.dir.display(), "summary cache cleared");
        Ok(())
    }

    /// Write a snapshot of both maps to `output`, or to
    /// `ai_summaries_export_<timestamp>.json` in the working directory.
    pub fn export(&self, output: Option<&Path>) -> Result<PathBuf> {
        let now = Local::now();
        let path = match output {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(default_export_name(&now)),
        };

        let state = self.read_state().clone();
        let snapshot = serde_json::json!({
            "exported_at": now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            "total_summaries": state.summaries.len(),
            "summaries": state.summaries,
            "metadata": state.metadata,
        });

        let body = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&path, body)
            .with_context(|| format!("Failed to write export: {}", path.display()))?;

        tracing::info!(
            count = state.summaries.len(),
            path = %path.display(),
            "exported summaries"
        );
        Ok(path)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller must hold `writer`.
    fn persist(&self) -> Result<()> {
        let (summaries, metadata) = {
            let state = self.read_state();
            (
                serde_json::to_string_pretty(&state.summaries)?,
                serde_json::to_string_pretty(&state.metadata)?,
            )
        };

        let summaries_path = self.summaries_path();
        let metadata_path = self.metadata_path();
        let summaries_tmp = tmp_sibling(&summaries_path);
        let metadata_tmp = tmp_sibling(&metadata_path);

        let result = (|| -> Result<()> {
            std::fs::write(&summaries_tmp, summaries)
                .with_context(|| format!("Failed to write {}", summaries_tmp.display()))?;
            std::fs::write(&metadata_tmp, metadata)
                .with_context(|| format!("Failed to write {}", metadata_tmp.display()))?;
            std::fs::rename(&summaries_tmp, &summaries_path)
                .with_context(|| format!("Failed to replace {}", summaries_path.display()))?;
            std::fs::rename(&metadata_tmp, &metadata_path)
                .with_context(|| format!("Failed to replace {}", metadata_path.display()))?;
            Ok(())
        })();

        if let Err(e) = &result {
            let _ = std::fs::remove_file(&summaries_tmp);
            let _ = std::fs::remove_file(&metadata_tmp);
            tracing::error!(error = %format!("{:#}", e), "failed to save summary cache");
        }
        result
    }
}

/// `ai_summaries_export_%Y%m%d_%H%M%S.json` for the given instant.
pub fn default_export_name(now: &DateTime<Local>) -> String {
    format!("ai_summaries_export_{}.json", now.format("%Y%m%d_%H%M%S"))
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_map<V: for<'de> Deserialize<'de>>(path: &Path) -> Result<BTreeMap<String, V>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    serde_json::from_str(&content).with_context(|| format!("Malformed {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn record(id: &str, title: &str) -> ProjectRecord {
        ProjectRecord::from_value(json!({
            "basic_info": {"id": id, "title": title, "domains": ["AI"]}
        }))
        .unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let tmp = TempDir::new().unwrap();
        let cache = SummaryCache::open(tmp.path());
        let r = record("p1", "Alpha");

        assert!(cache.get("p1", &r).is_none());
        cache.put("p1", &r, "S1").unwrap();
        assert_eq!(cache.get("p1", &r).as_deref(), Some("S1"));
        assert!(cache.summaries_path().exists());
        assert!(cache.metadata_path().exists());
    }

    #[test]
    fn test_changed_record_misses() {
        let tmp = TempDir::new().unwrap();
        let cache = SummaryCache::open(tmp.path());
        cache.put("p1", &record("p1", "Alpha"), "S1").unwrap();

        assert!(cache.get("p1", &record("p1", "Alpha v2")).is_none());
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let tmp = TempDir::new().unwrap();
        let cache = SummaryCache::open(tmp.path());
        let r = record("p1", "Alpha");

        cache.put("p1", &r, "S1").unwrap();
        cache.put("p1", &r, "S2").unwrap();

        assert_eq!(cache.get("p1", &r).as_deref(), Some("S2"));
        assert_eq!(cache.stats().count, 1);
    }

    #[test]
    fn test_clear_removes_everything() {
        let tmp = TempDir::new().unwrap();
        let cache = SummaryCache::open(tmp.path());
        let r = record("p1", "Alpha");
        cache.put("p1", &r, "S1").unwrap();

        cache.clear().unwrap();
        assert!(cache.get("p1", &r).is_none());
        assert_eq!(cache.stats().count, 0);
        assert!(!cache.summaries_path().exists());
        assert!(!cache.metadata_path().exists());

        // second clear with no files is fine
        cache.clear().unwrap();
    }

    #[test]
    fn test_reopen_reads_persisted_entries() {
        let tmp = TempDir::new().unwrap();
        let r = record("p1", "Alpha");
        {
            let cache = SummaryCache::open(tmp.path());
            cache.put("p1", &r, "persisted").unwrap();
        }
        let reopened = SummaryCache::open(tmp.path());
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get("p1", &r).as_deref(), Some("persisted"));

        let meta: BTreeMap<String, SummaryMetadata> =
            serde_json::from_str(&fs::read_to_string(reopened.metadata_path()).unwrap()).unwrap();
        assert_eq!(meta["p1"].title, "Alpha");
        assert_eq!(meta["p1"].hash, fingerprint(&r));
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(SUMMARIES_FILE), "{not json").unwrap();
        fs::write(tmp.path().join(METADATA_FILE), "{}").unwrap();

        let cache = SummaryCache::open(tmp.path());
        assert!(cache.is_empty());

        // still usable
        let r = record("p1", "Alpha");
        cache.put("p1", &r, "fresh").unwrap();
        assert_eq!(cache.get("p1", &r).as_deref(), Some("fresh"));
    }

    #[test]
    fn test_missing_metadata_entry_is_miss() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(SUMMARIES_FILE),
            r#"{"p1": "orphaned summary"}"#,
        )
        .unwrap();
        let cache = SummaryCache::open(tmp.path());
        assert_eq!(cache.len(), 1);
        assert!(cache.get("p1", &record("p1", "Alpha")).is_none());
    }

    #[test]
    fn test_stats_buckets_by_day() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(SUMMARIES_FILE),
            r#"{"a": "x", "b": "y", "c": "z"}"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join(METADATA_FILE),
            r#"{
                "a": {"hash": "h", "created_at": "2025-03-01T10:00:00.000001", "title": "A"},
                "b": {"hash": "h", "created_at": "2025-03-01T23:59:59", "title": "B"},
                "c": {"hash": "h", "created_at": "2025-03-02T08:00:00", "title": "C"}
            }"#,
        )
        .unwrap();

        let stats = SummaryCache::open(tmp.path()).stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.creation_dates["2025-03-01"], 2);
        assert_eq!(stats.creation_dates["2025-03-02"], 1);
        assert!(stats.size_bytes > 0);
    }

    #[test]
    fn test_size_mb_rounds() {
        let stats = CacheStats {
            size_bytes: 1024 * 1024 + 1024 * 1024 / 2,
            ..CacheStats::default()
        };
        assert_eq!(stats.size_mb(), 1.5);
        assert_eq!(CacheStats::default().size_mb(), 0.0);
    }

    #[test]
    fn test_export_snapshot() {
        let tmp = TempDir::new().unwrap();
        let cache = SummaryCache::open(tmp.path().join("cache"));
        cache.put("p1", &record("p1", "Alpha"), "S1").unwrap();

        let out = tmp.path().join("export.json");
        let written = cache.export(Some(&out)).unwrap();
        assert_eq!(written, out);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["total_summaries"], 1);
        assert_eq!(value["summaries"]["p1"], "S1");
        assert_eq!(value["metadata"]["p1"]["title"], "Alpha");
        assert!(value["exported_at"].is_string());
    }

    #[test]
    fn test_default_export_name() {
        use chrono::TimeZone;
        let now = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            default_export_name(&now),
            "ai_summaries_export_20250102_030405.json"
        );
    }

    #[test]
    fn test_persist_failure_keeps_memory() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let cache = SummaryCache::open(blocker.join("cache"));
        let r = record("p1", "Alpha");
        assert!(cache.put("p1", &r, "S1").is_err());
        assert_eq!(cache.get("p1", &r).as_deref(), Some("S1"));
    }
}
