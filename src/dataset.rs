//! Dataset discovery and loading.
//!
//! The scraper writes timestamped exports such as
//! `output/sdgp_projects_20250101_120000.json`. A configured data path may
//! point at one of those files directly or at the directory that holds them,
//! in which case the most recently modified export wins.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::models::ProjectRecord;

/// Substring every export file name carries.
const EXPORT_MARKER: &str = "sdgp_projects";

/// Resolve `path` to a concrete dataset file.
pub fn resolve_dataset_path(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if !path.is_dir() {
        bail!(
            "Dataset not found: {}. Run the scraper first or set [data] path.",
            path.display()
        );
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(path)
        .with_context(|| format!("Failed to read data directory: {}", path.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if !name.ends_with(".json") || !name.contains(EXPORT_MARKER) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
            newest = Some((modified, entry.path()));
        }
    }

    match newest {
        Some((_, file)) => Ok(file),
        None => bail!(
            "No *{}*.json files found in {}",
            EXPORT_MARKER,
            path.display()
        ),
    }
}

/// Load every record from the dataset at `path` (file or export directory).
///
/// Records without an id are assigned `project_{index}` by position.
pub fn load_records(path: &Path) -> Result<Vec<ProjectRecord>> {
    let file = resolve_dataset_path(path)?;
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read dataset: {}", file.display()))?;
    let records = parse_records(&content)
        .with_context(|| format!("Failed to parse dataset: {}", file.display()))?;

    tracing::info!(
        count = records.len(),
        file = %file.display(),
        "loaded project records"
    );
    Ok(records)
}

/// Parse a dataset document: a JSON array of enriched records or bare listings.
pub fn parse_records(content: &str) -> Result<Vec<ProjectRecord>> {
    let value: Value = serde_json::from_str(content)?;
    let items = match value {
        Value::Array(items) => items,
        _ => bail!("dataset must be a JSON array of projects"),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let mut record = ProjectRecord::from_value(item)
                .with_context(|| format!("record #{}", index))?;
            record.ensure_id(index);
            Ok(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_mixed_shapes_and_missing_ids() {
        let records = parse_records(
            r#"[
                {"basic_info": {"id": "a1", "title": "Alpha"}, "detailed_info": null},
                {"title": "Bare Listing", "domains": ["AI"]},
                {"basic_info": {"title": "No Id"}}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id(), "a1");
        assert_eq!(records[1].id(), "project_1");
        assert_eq!(records[1].basic_info.domains, vec!["AI"]);
        assert!(!records[1].has_details());
        assert_eq!(records[2].id(), "project_2");
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(parse_records(r#"{"projects": []}"#).is_err());
        assert!(parse_records("not json").is_err());
    }

    #[test]
    fn test_directory_picks_export_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.json"), "[]").unwrap();
        fs::write(
            tmp.path().join("sdgp_projects_20250101.json"),
            r#"[{"id": "x", "title": "From Export"}]"#,
        )
        .unwrap();

        let resolved = resolve_dataset_path(tmp.path()).unwrap();
        assert!(resolved.ends_with("sdgp_projects_20250101.json"));

        let records = load_records(tmp.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "From Export");
    }

    #[test]
    fn test_directory_without_exports_errors() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("other.json"), "[]").unwrap();
        let err = resolve_dataset_path(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("sdgp_projects"));
    }

    #[test]
    fn test_missing_path_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(load_records(&tmp.path().join("absent")).is_err());
    }
}
