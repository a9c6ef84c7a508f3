//! Context block assembly.
//!
//! Turns a query into the text block handed to the generator. When the
//! ranker finds matches, each selected record is rendered with its listing
//! fields, truncated detail excerpts, and a cached summary. When nothing
//! matches (including the empty query), a dataset overview is rendered
//! instead so the generator always has something to work with.
//!
//! Summaries are read through the [`SummaryCache`] and filled on a miss, so
//! a rendered record is never left without one. Persist failures during
//! the fill are logged and do not affect the returned text.

use std::sync::Arc;

use crate::analysis::domain_histogram;
use crate::cache::SummaryCache;
use crate::config::RetrievalConfig;
use crate::models::ProjectRecord;
use crate::rank::{rank, RankParams};
use crate::summarize::Summarizer;
use crate::text::{excerpt, or_placeholder, query_words};

const NOT_SPECIFIED: &str = "Not specified";
const UNKNOWN: &str = "Unknown";

pub struct ContextAssembler {
    cache: Arc<SummaryCache>,
    summarizer: Arc<Summarizer>,
    retrieval: RetrievalConfig,
    params: RankParams,
}

impl ContextAssembler {
    pub fn new(
        cache: Arc<SummaryCache>,
        summarizer: Arc<Summarizer>,
        retrieval: RetrievalConfig,
    ) -> Self {
        let params = retrieval.rank_params();
        Self {
            cache,
            summarizer,
            retrieval,
            params,
        }
    }

    pub fn rank_params(&self) -> &RankParams {
        &self.params
    }

    pub fn retrieval(&self) -> &RetrievalConfig {
        &self.retrieval
    }

    /// Render the context block for `query` over `records`.
    pub async fn build_context(&self, query: &str, records: &[ProjectRecord]) -> String {
        let ranked = rank(query, records, &self.params);
        if ranked.is_empty() {
            tracing::debug!(query, "no ranked matches, rendering overview");
            return self.overview(query, records);
        }

        let mut out = format!(
            "Found {} relevant projects for '{}':\n\n",
            ranked.len(),
            query
        );
        for hit in &ranked {
            let summary = self.summary_for(hit.record).await;
            out.push_str(&self.render_record(hit.record, &summary));
        }
        out
    }

    /// Cached summary for `record`, synthesizing and storing one on a miss.
    pub async fn summary_for(&self, record: &ProjectRecord) -> String {
        if let Some(summary) = self.cache.get(record.id(), record) {
            return summary;
        }

        let summary = self.summarizer.summarize(record).await;
        if let Err(e) = self.cache.put(record.id(), record, &summary) {
            tracing::error!(
                id = record.id(),
                error = %format!("{:#}", e),
                "failed to persist summary"
            );
        }
        summary
    }

    fn render_record(&self, record: &ProjectRecord, summary: &str) -> String {
        let basic = &record.basic_info;
        let max = self.retrieval.excerpt_chars;
        let tech = record.tech_stack();

        let mut out = String::new();
        out.push_str(&format!("PROJECT ID: {}\n", record.id()));
        out.push_str(&format!(
            "Project URL: {}\n",
            self.retrieval.project_url(record.id())
        ));
        out.push_str(&format!("Title: {}\n", or_placeholder(&basic.title, UNKNOWN)));
        out.push_str(&format!("Status: {}\n", or_placeholder(&basic.status, UNKNOWN)));
        out.push_str(&format!("Year: {}\n", or_placeholder(&basic.year, UNKNOWN)));
        out.push_str(&format!("Domains: {}\n", basic.domains.join(", ")));
        out.push_str(&format!(
            "Project Types: {}\n",
            basic.project_types.join(", ")
        ));
        out.push_str(&format!("Team Size: {} members\n", record.team_size()));
        out.push_str(&format!(
            "Tech Stack: {}\n",
            if tech.is_empty() {
                NOT_SPECIFIED.to_string()
            } else {
                tech.join(", ")
            }
        ));
        out.push_str(&format!(
            "Problem: {}...\n",
            excerpt(or_placeholder(record.problem_statement(), NOT_SPECIFIED), max)
        ));
        out.push_str(&format!(
            "Solution: {}...\n",
            excerpt(or_placeholder(record.solution(), NOT_SPECIFIED), max)
        ));
        out.push_str(&format!(
            "Features: {}...\n",
            excerpt(or_placeholder(record.features(), NOT_SPECIFIED), max)
        ));
        out.push_str(&format!("AI Summary: {}\n\n", summary));
        out
    }

    /// Dataset overview used when no record matches `query`.
    pub fn overview(&self, query: &str, records: &[ProjectRecord]) -> String {
        let words = query_words(query);
        let related: Vec<&ProjectRecord> = records
            .iter()
            .filter(|r| {
                let problem = r.problem_statement().to_lowercase();
                let solution = r.solution().to_lowercase();
                words
                    .iter()
                    .any(|w| problem.contains(w.as_str()) || solution.contains(w.as_str()))
            })
            .collect();

        let mut domains = domain_histogram(records);
        domains.truncate(self.retrieval.overview_domains);

        let mut out = String::from("COMPREHENSIVE SDGP PROJECT OVERVIEW:\n\n");
        out.push_str("Database Overview:\n");
        out.push_str(&format!("- Total Projects: {}\n", records.len()));
        out.push_str(&format!(
            "- Projects with any relevance to '{}': {}\n\n",
            query.to_lowercase(),
            related.len()
        ));

        out.push_str("Domain Distribution:\n");
        for (domain, count) in &domains {
            out.push_str(&format!("- {}: {} projects\n", domain, count));
        }

        out.push_str("\nRelated Projects Found:\n");
        let shown: Vec<&ProjectRecord> = if related.is_empty() {
            out.push_str(
                "No directly related projects found, but here are some interesting \
projects from different domains:\n",
            );
            records.iter().take(self.retrieval.overview_projects).collect()
        } else {
            related
                .into_iter()
                .take(self.retrieval.overview_projects)
                .collect()
        };

        for (i, record) in shown.iter().enumerate() {
            out.push_str(&format!(
                "{}. {} ({}) - {}\n",
                i + 1,
                or_placeholder(record.title(), UNKNOWN),
                record.basic_info.domains.join(", "),
                self.retrieval.project_url(record.id())
            ));
        }
        out
    }
}
