//! Multi-signal relevance ranking.
//!
//! Every record is scored against a free-text query with fixed field
//! weights and configurable topic boosts. The ranker has no notion of
//! storage; callers pass the full record slice and receive borrowed,
//! scored references back.
//!
//! # Scoring Algorithm
//!
//! 1. Lowercase the query and split it on whitespace into words.
//! 2. For every word, add the field weight of each field that contains the
//!    word as a substring: title, subtitle, problem statement, solution,
//!    features, any domain tag, any project-type tag.
//! 3. For every topic whose query terms occur in the whole query string,
//!    add `domain_boost` when a domain equals one of the topic's canonical
//!    domain terms, and `problem_boost` when the problem statement contains
//!    one of the topic's problem terms.
//! 4. Drop records scoring zero.
//! 5. Stable sort by score descending (ties keep input order).
//! 6. Truncate to `top_k`.

use serde::{Deserialize, Serialize};

use crate::models::ProjectRecord;

/// Default size of the context window.
pub const DEFAULT_TOP_K: usize = 10;

/// Per-field weights added for each matching query word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub title: u32,
    pub subtitle: u32,
    pub problem: u32,
    pub solution: u32,
    pub features: u32,
    pub domain: u32,
    pub project_type: u32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 10,
            subtitle: 8,
            problem: 6,
            solution: 6,
            features: 4,
            domain: 7,
            project_type: 7,
        }
    }
}

/// A topic that boosts records when the query mentions one of its synonyms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicBoost {
    pub name: String,
    /// Synonyms looked for anywhere in the lowercased query.
    pub query_terms: Vec<String>,
    /// Canonical domain names; a record domain must equal one (case-insensitive).
    pub domain_terms: Vec<String>,
    /// Keywords looked for in the record's problem statement.
    #[serde(default)]
    pub problem_terms: Vec<String>,
}

impl TopicBoost {
    pub fn new(name: &str, query: &[&str], domains: &[&str], problem: &[&str]) -> Self {
        let owned = |terms: &[&str]| terms.iter().map(|t| t.to_lowercase()).collect();
        Self {
            name: name.to_string(),
            query_terms: owned(query),
            domain_terms: owned(domains),
            problem_terms: owned(problem),
        }
    }

    fn triggered_by(&self, query_lower: &str) -> bool {
        contains_any(query_lower, &self.query_terms)
    }
}

/// The built-in topics: health, education, and AI.
pub fn default_topics() -> Vec<TopicBoost> {
    vec![
        TopicBoost::new(
            "health",
            &["health", "medical"],
            &["healthcare", "medical", "health"],
            &["health", "medical"],
        ),
        TopicBoost::new(
            "education",
            &["education", "edtech"],
            &["education", "edtech", "learning"],
            &["education", "learning"],
        ),
        TopicBoost::new(
            "ai",
            &["ai", "artificial intelligence"],
            &["ai", "artificial intelligence", "machine learning"],
            &["ai", "intelligence"],
        ),
    ]
}

/// Ranking parameters, decoupled from application config.
#[derive(Debug, Clone)]
pub struct RankParams {
    pub weights: FieldWeights,
    pub topics: Vec<TopicBoost>,
    /// Added when a triggered topic matches a record domain.
    pub domain_boost: u32,
    /// Added when a triggered topic keyword appears in the problem statement.
    pub problem_boost: u32,
    /// Maximum number of results returned by [`rank`].
    pub top_k: usize,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            weights: FieldWeights::default(),
            topics: default_topics(),
            domain_boost: 15,
            problem_boost: 10,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Scoring breakdown for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreExplanation {
    /// Sum of field weights over all query words.
    pub field_score: u32,
    /// Sum of topic boosts.
    pub topic_score: u32,
    /// Names of topics that contributed a boost.
    pub matched_topics: Vec<String>,
}

impl ScoreExplanation {
    /// Combined score. Saturates at `u32::MAX` instead of wrapping.
    pub fn total(&self) -> u32 {
        self.field_score.saturating_add(self.topic_score)
    }
}

/// A record with its relevance score for one query.
#[derive(Debug, Clone)]
pub struct ScoredProject<'a> {
    pub record: &'a ProjectRecord,
    pub score: u32,
    pub explain: ScoreExplanation,
}

/// Rank `records` against `query`, returning at most `params.top_k` hits.
///
/// An empty or whitespace-only query matches nothing.
pub fn rank<'a>(
    query: &str,
    records: &'a [ProjectRecord],
    params: &RankParams,
) -> Vec<ScoredProject<'a>> {
    let query_lower = query.to_lowercase();
    let words: Vec<&str> = query_lower.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredProject<'a>> = records
        .iter()
        .filter_map(|record| {
            let explain = explain_score(&query_lower, &words, record, params);
            let score = explain.total();
            if score > 0 {
                Some(ScoredProject {
                    record,
                    score,
                    explain,
                })
            } else {
                None
            }
        })
        .collect();

    // `sort_by` is stable: equal scores keep their input order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(params.top_k);
    scored
}

/// Score a single record against `query`.
pub fn score(query: &str, record: &ProjectRecord, params: &RankParams) -> u32 {
    let query_lower = query.to_lowercase();
    let words: Vec<&str> = query_lower.split_whitespace().collect();
    if words.is_empty() {
        return 0;
    }
    explain_score(&query_lower, &words, record, params).total()
}

fn explain_score(
    query_lower: &str,
    words: &[&str],
    record: &ProjectRecord,
    params: &RankParams,
) -> ScoreExplanation {
    let basic = &record.basic_info;
    let weights = &params.weights;

    let title = basic.title.to_lowercase();
    let subtitle = basic.subtitle.to_lowercase();
    let problem = record.problem_statement().to_lowercase();
    let solution = record.solution().to_lowercase();
    let features = record.features().to_lowercase();
    let domains: Vec<String> = basic.domains.iter().map(|d| d.to_lowercase()).collect();
    let types: Vec<String> = basic
        .project_types
        .iter()
        .map(|t| t.to_lowercase())
        .collect();

    let mut explain = ScoreExplanation::default();

    for word in words {
        if title.contains(word) {
            explain.field_score = explain.field_score.saturating_add(weights.title);
        }
        if subtitle.contains(word) {
            explain.field_score = explain.field_score.saturating_add(weights.subtitle);
        }
        if problem.contains(word) {
            explain.field_score = explain.field_score.saturating_add(weights.problem);
        }
        if solution.contains(word) {
            explain.field_score = explain.field_score.saturating_add(weights.solution);
        }
        if features.contains(word) {
            explain.field_score = explain.field_score.saturating_add(weights.features);
        }
        if domains.iter().any(|d| d.contains(word)) {
            explain.field_score = explain.field_score.saturating_add(weights.domain);
        }
        if types.iter().any(|t| t.contains(word)) {
            explain.field_score = explain.field_score.saturating_add(weights.project_type);
        }
    }

    for topic in params.topics.iter().filter(|t| t.triggered_by(query_lower)) {
        let mut boosted = false;
        if domains
            .iter()
            .any(|d| topic.domain_terms.iter().any(|term| term.eq_ignore_ascii_case(d)))
        {
            explain.topic_score = explain.topic_score.saturating_add(params.domain_boost);
            boosted = true;
        }
        if contains_any(&problem, &topic.problem_terms) {
            explain.topic_score = explain.topic_score.saturating_add(params.problem_boost);
            boosted = true;
        }
        if boosted {
            explain.matched_topics.push(topic.name.clone());
        }
    }

    explain
}

fn contains_any(haystack: &str, terms: &[String]) -> bool {
    terms
        .iter()
        .filter(|t| !t.is_empty())
        .any(|t| haystack.contains(t.to_lowercase().as_str()))
}
