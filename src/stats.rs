//! Summary cache statistics.
//!
//! `sdgp stats` shows how many summaries are cached, how large the store
//! is, when entries were written, and how many dataset records currently
//! have a valid (non-stale) summary.

use anyhow::Result;

use crate::cache::{CacheStats, SummaryCache};
use crate::config::Config;
use crate::dataset::load_records;

/// Run the stats command: open the cache and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let cache = SummaryCache::open(&config.cache.dir);
    let stats = cache.stats();

    println!("SDGP Context — Summary Cache");
    println!("============================");
    println!();
    println!("  Cache dir:   {}", cache.dir().display());
    println!(
        "  Size:        {} ({:.2} MB)",
        format_bytes(stats.size_bytes),
        stats.size_mb()
    );
    println!("  Summaries:   {}", stats.count);

    match load_records(&config.data.path) {
        Ok(records) => {
            let current = records
                .iter()
                .filter(|r| cache.get(r.id(), r).is_some())
                .count();
            println!(
                "  Current:     {} / {} projects ({}%)",
                current,
                records.len(),
                percent(current, records.len())
            );
        }
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "dataset unavailable");
            println!("  Current:     dataset unavailable");
        }
    }

    print_creation_dates(&stats);
    println!();
    Ok(())
}

fn print_creation_dates(stats: &CacheStats) {
    if stats.creation_dates.is_empty() {
        return;
    }
    println!();
    println!("  By creation date:");
    println!("  {:<12} {:>8}", "DATE", "ENTRIES");
    println!("  {}", "-".repeat(21));
    for (day, count) in &stats.creation_dates {
        println!("  {:<12} {:>8}", day, count);
    }
}

fn percent(part: usize, total: usize) -> usize {
    if total > 0 {
        part * 100 / total
    } else {
        0
    }
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
