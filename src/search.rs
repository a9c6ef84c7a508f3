//! `sdgp search`: print ranked matches without building a context block.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::dataset::load_records;
use crate::rank::{rank, ScoredProject};
use crate::text::excerpt;

/// Rank the dataset against `query` and print the hits.
///
/// `limit` overrides `retrieval.top_k`; `explain` adds the per-signal
/// score breakdown under each hit.
pub async fn run_search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    explain: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }
    if limit == Some(0) {
        bail!("--limit must be >= 1");
    }

    let records = load_records(&config.data.path)?;
    let mut params = config.retrieval.rank_params();
    if let Some(limit) = limit {
        params.top_k = limit;
    }

    let results = rank(query, &records, &params);
    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in results.iter().enumerate() {
        print_hit(config, i + 1, hit, explain);
    }
    Ok(())
}

fn print_hit(config: &Config, n: usize, hit: &ScoredProject<'_>, explain: bool) {
    let record = hit.record;
    let basic = &record.basic_info;
    let title = if basic.title.is_empty() {
        "(untitled)"
    } else {
        basic.title.as_str()
    };

    println!("{}. [{}] {}", n, hit.score, title);
    if !basic.domains.is_empty() {
        println!("    domains: {}", basic.domains.join(", "));
    }
    if !basic.project_types.is_empty() {
        println!("    types: {}", basic.project_types.join(", "));
    }
    println!("    url: {}", config.retrieval.project_url(record.id()));
    let snippet = if basic.subtitle.is_empty() {
        record.problem_statement()
    } else {
        basic.subtitle.as_str()
    };
    if !snippet.is_empty() {
        println!(
            "    excerpt: \"{}\"",
            excerpt(snippet, config.retrieval.excerpt_chars)
                .replace('\n', " ")
                .trim()
        );
    }
    if explain {
        let topics = if hit.explain.matched_topics.is_empty() {
            "-".to_string()
        } else {
            hit.explain.matched_topics.join(", ")
        };
        println!(
            "    score: fields={} topics={} ({})",
            hit.explain.field_score, hit.explain.topic_score, topics
        );
    }
    println!("    id: {}", record.id());
    println!();
}
