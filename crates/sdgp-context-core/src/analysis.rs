//! Dataset-wide statistics.
//!
//! Distributions are returned as `(label, count)` vectors sorted by count
//! descending; equal counts keep the order in which labels were first seen.

use serde::Serialize;

use crate::models::ProjectRecord;

/// Aggregate statistics over a record set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetReport {
    pub total_projects: usize,
    pub with_details: usize,
    pub without_details: usize,
    pub status_distribution: Vec<(String, usize)>,
    pub year_distribution: Vec<(String, usize)>,
    pub project_types: Vec<(String, usize)>,
    pub domains: Vec<(String, usize)>,
    /// Top technologies by number of projects listing them.
    pub tech_stack: Vec<(String, usize)>,
    pub team: Option<TeamStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamStats {
    pub average: f64,
    pub min: usize,
    pub max: usize,
    /// `(team size, number of teams)`, ascending by size.
    pub distribution: Vec<(usize, usize)>,
    pub teams_analyzed: usize,
}

/// Number of technologies kept in [`DatasetReport::tech_stack`].
pub const TOP_TECH: usize = 10;

pub fn analyze(records: &[ProjectRecord]) -> DatasetReport {
    let with_details = records.iter().filter(|r| r.has_details()).count();

    let team_sizes: Vec<usize> = records
        .iter()
        .filter(|r| r.has_details())
        .map(|r| r.team_size())
        .collect();

    let mut tech = count_labels(
        records
            .iter()
            .flat_map(|r| r.tech_stack().into_iter().map(str::to_string)),
    );
    tech.truncate(TOP_TECH);

    DatasetReport {
        total_projects: records.len(),
        with_details,
        without_details: records.len() - with_details,
        status_distribution: count_labels(
            records.iter().map(|r| label_or_unknown(&r.basic_info.status)),
        ),
        year_distribution: count_labels(
            records.iter().map(|r| label_or_unknown(&r.basic_info.year)),
        ),
        project_types: count_labels(
            records
                .iter()
                .flat_map(|r| r.basic_info.project_types.iter().cloned()),
        ),
        domains: domain_histogram(records),
        tech_stack: tech,
        team: team_stats(&team_sizes),
    }
}

/// Domain frequencies across all records.
pub fn domain_histogram(records: &[ProjectRecord]) -> Vec<(String, usize)> {
    count_labels(records.iter().flat_map(|r| r.basic_info.domains.iter().cloned()))
}

/// Records tagged with `domain` (case-insensitive), newest year first.
///
/// Records are ordered by `(year, status)` descending; equal keys keep
/// their dataset order. At most `limit` records are returned.
pub fn projects_in_domain<'a>(
    records: &'a [ProjectRecord],
    domain: &str,
    limit: usize,
) -> Vec<&'a ProjectRecord> {
    let wanted = domain.trim().to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<&ProjectRecord> = records
        .iter()
        .filter(|r| {
            r.basic_info
                .domains
                .iter()
                .any(|d| d.trim().to_lowercase() == wanted)
        })
        .collect();
    hits.sort_by(|a, b| {
        (&b.basic_info.year, &b.basic_info.status)
            .cmp(&(&a.basic_info.year, &a.basic_info.status))
    });
    hits.truncate(limit);
    hits
}

fn team_stats(sizes: &[usize]) -> Option<TeamStats> {
    let min = *sizes.iter().min()?;
    let max = *sizes.iter().max()?;
    let total: usize = sizes.iter().sum();

    let mut distribution: Vec<(usize, usize)> = Vec::new();
    for &size in sizes {
        match distribution.iter_mut().find(|(s, _)| *s == size) {
            Some((_, count)) => *count += 1,
            None => distribution.push((size, 1)),
        }
    }
    distribution.sort_by_key(|(size, _)| *size);

    Some(TeamStats {
        average: total as f64 / sizes.len() as f64,
        min,
        max,
        distribution,
        teams_analyzed: sizes.len(),
    })
}

fn label_or_unknown(value: &str) -> String {
    if value.trim().is_empty() {
        "Unknown".to_string()
    } else {
        value.to_string()
    }
}

fn count_labels(labels: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
