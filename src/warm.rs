//! `sdgp warm`: make sure every project has a current summary.

use anyhow::Result;
use std::sync::Arc;

use crate::cache::SummaryCache;
use crate::config::Config;
use crate::dataset::load_records;
use crate::generation::create_generator;
use crate::progress::ProgressMode;
use crate::summarize::{warm_summaries, Summarizer};

/// Summarize every record whose cached summary is missing or stale.
///
/// With generation disabled the templated fallback summary is cached.
pub async fn run_warm(config: &Config, progress: ProgressMode) -> Result<()> {
    let records = load_records(&config.data.path)?;
    let cache = SummaryCache::open(&config.cache.dir);
    let generator = create_generator(&config.generation)?;
    let summarizer = Summarizer::new(Arc::clone(&generator));

    if !config.generation.is_enabled() {
        tracing::warn!("generation disabled; caching templated summaries");
    }

    let reporter = progress.reporter();
    let stats = warm_summaries(&records, &cache, &summarizer, reporter.as_ref()).await;

    println!("warm");
    println!("  projects:          {}", records.len());
    println!("  cached:            {}", stats.cached);
    println!("  generated:         {}", stats.generated);
    if stats.failed_to_persist > 0 {
        println!("  failed to persist: {}", stats.failed_to_persist);
    }
    Ok(())
}
