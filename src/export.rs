//! `sdgp cache export` and `sdgp cache clear`.
//!
//! Export writes a snapshot of both cache stores to one JSON file:
//!
//! ```json
//! {
//!   "exported_at": "2025-01-02T03:04:05.000000",
//!   "total_summaries": 1,
//!   "summaries": { "42": "..." },
//!   "metadata": { "42": { "hash": "...", "created_at": "...", "title": "..." } }
//! }
//! ```

use anyhow::Result;
use std::path::Path;

use crate::cache::SummaryCache;
use crate::config::Config;

/// Export the cache. Without `output` the file name is derived from the
/// current time (`ai_summaries_export_YYYYMMDD_HHMMSS.json`).
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let cache = SummaryCache::open(&config.cache.dir);
    let path = cache.export(output)?;
    println!(
        "Exported {} summaries to {}",
        cache.len(),
        path.display()
    );
    Ok(())
}

/// Remove every cached summary and both backing files.
pub async fn run_clear(config: &Config) -> Result<()> {
    let cache = SummaryCache::open(&config.cache.dir);
    let removed = cache.len();
    cache.clear()?;
    println!(
        "Cleared {} cached summaries from {}",
        removed,
        cache.dir().display()
    );
    Ok(())
}
