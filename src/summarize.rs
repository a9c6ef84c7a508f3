//! Summary synthesis and cache warm-up.
//!
//! [`Summarizer`] asks a [`Generator`] for a short project summary and
//! falls back to [`fallback_summary`] when generation is unavailable, so a
//! summary is always produced. [`warm_summaries`] runs it over a whole
//! dataset, filling the [`SummaryCache`] for every record whose cached
//! entry is missing or stale.

use std::sync::Arc;

use serde::Serialize;

use crate::cache::SummaryCache;
use crate::generation::Generator;
use crate::models::ProjectRecord;
use crate::progress::{WarmProgressEvent, WarmProgressReporter};

pub struct Summarizer {
    generator: Arc<dyn Generator>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    /// A summary for `record`. Never fails and never returns blank text.
    pub async fn summarize(&self, record: &ProjectRecord) -> String {
        match self.generator.generate(&summary_prompt(record)).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::debug!(id = record.id(), "generator returned blank summary");
                fallback_summary(record)
            }
            Err(e) => {
                tracing::debug!(id = record.id(), error = %e, "summary generation failed, using fallback");
                fallback_summary(record)
            }
        }
    }
}

/// The prompt sent to the generator for one record.
pub fn summary_prompt(record: &ProjectRecord) -> String {
    let basic = &record.basic_info;
    format!(
        "Create a detailed, comprehensive summary for this SDGP project. \
Include key details, technologies, and insights.\n\n\
PROJECT DETAILS:\n\
Title: {title}\n\
Description: {subtitle}\n\
Status: {status}\n\
Year: {year}\n\
Domains: {domains}\n\
Project Types: {types}\n\n\
TECHNICAL DETAILS:\n\
Problem Statement: {problem}\n\
Solution Approach: {solution}\n\
Key Features: {features}\n\
Team Size: {team} members\n\
Technology Stack: {tech}\n\n\
INSTRUCTIONS:\n\
1. Write 3-4 sentences explaining what this project does.\n\
2. Highlight the main problem it solves and how.\n\
3. Mention key technologies and innovative aspects.\n\
4. Include searchable keywords (health, education, AI, IoT, etc.).\n\
5. Keep it readable for technical and non-technical audiences.\n",
        title = or_unknown(&basic.title),
        subtitle = basic.subtitle,
        status = or_unknown(&basic.status),
        year = or_unknown(&basic.year),
        domains = basic.domains.join(", "),
        types = basic.project_types.join(", "),
        problem = record.problem_statement(),
        solution = record.solution(),
        features = record.features(),
        team = record.team_size(),
        tech = record.tech_stack().join(", "),
    )
}

/// Deterministic one-line summary built from listing fields.
///
/// `"{title}: {subtitle} - A {types} project in {domains} domains."`, with
/// empty parts dropped.
pub fn fallback_summary(record: &ProjectRecord) -> String {
    let basic = &record.basic_info;
    let mut out = or_unknown(&basic.title).to_string();

    if !basic.subtitle.trim().is_empty() {
        out.push_str(": ");
        out.push_str(basic.subtitle.trim());
    }

    let types = basic.project_types.join(", ");
    let domains = basic.domains.join(", ");
    match (types.is_empty(), domains.is_empty()) {
        (false, false) => out.push_str(&format!(" - A {} project in {} domains.", types, domains)),
        (false, true) => out.push_str(&format!(" - A {} project.", types)),
        (true, false) => out.push_str(&format!(" - A project in {} domains.", domains)),
        (true, true) => out.push('.'),
    }
    out
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "Unknown"
    } else {
        value
    }
}

/// Outcome of [`warm_summaries`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarmStats {
    /// Records whose cached summary was still valid.
    pub cached: u64,
    /// Records summarized during this run.
    pub generated: u64,
    /// Generated summaries that could not be written to disk.
    pub failed_to_persist: u64,
}

/// Make sure every record has a current summary in `cache`.
pub async fn warm_summaries(
    records: &[ProjectRecord],
    cache: &SummaryCache,
    summarizer: &Summarizer,
    reporter: &dyn WarmProgressReporter,
) -> WarmStats {
    let mut stats = WarmStats::default();
    let total = records.len() as u64;

    for (i, record) in records.iter().enumerate() {
        let id = record.id();
        let cached = cache.get(id, record).is_some();

        if cached {
            stats.cached += 1;
        } else {
            let summary = summarizer.summarize(record).await;
            stats.generated += 1;
            if let Err(e) = cache.put(id, record, &summary) {
                tracing::warn!(id, error = %format!("{:#}", e), "summary not persisted");
                stats.failed_to_persist += 1;
            }
        }

        reporter.report(WarmProgressEvent::Summarizing {
            id: id.to_string(),
            n: i as u64 + 1,
            total,
            cached,
        });
    }

    reporter.report(WarmProgressEvent::Finished {
        cached: stats.cached,
        generated: stats.generated,
        failed_to_persist: stats.failed_to_persist,
    });
    tracing::info!(
        cached = stats.cached,
        generated = stats.generated,
        failed_to_persist = stats.failed_to_persist,
        "summary warm-up complete"
    );
    stats
}
