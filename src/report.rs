//! `sdgp report`: dataset statistics and per-domain project listings.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::analysis::{analyze, projects_in_domain, DatasetReport};
use crate::config::Config;
use crate::dataset::{load_records, resolve_dataset_path};
use crate::models::ProjectRecord;

/// Default number of projects listed by `--domain`.
pub const DEFAULT_DOMAIN_LIMIT: usize = 10;

/// Options for [`run_report`].
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub json: bool,
    /// List projects in this domain instead of printing statistics.
    pub domain: Option<String>,
    pub limit: Option<usize>,
    /// `Some(None)` saves under [`default_report_name`]; `Some(Some(p))`
    /// saves to `p`; `None` prints to stdout.
    pub output: Option<Option<PathBuf>>,
}

/// One row of a domain listing.
#[derive(Debug, Serialize)]
pub struct DomainProject<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub subtitle: &'a str,
    pub status: &'a str,
    pub year: &'a str,
    pub domains: &'a [String],
}

impl<'a> From<&'a ProjectRecord> for DomainProject<'a> {
    fn from(record: &'a ProjectRecord) -> Self {
        let basic = &record.basic_info;
        Self {
            id: &basic.id,
            title: &basic.title,
            subtitle: &basic.subtitle,
            status: &basic.status,
            year: &basic.year,
            domains: &basic.domains,
        }
    }
}

/// Analyze the configured dataset and print or save the report.
pub async fn run_report(config: &Config, opts: &ReportOptions) -> Result<()> {
    let file = resolve_dataset_path(&config.data.path)?;
    let records = load_records(&file)?;
    let now = Local::now();

    let body = match &opts.domain {
        Some(domain) => {
            let limit = opts.limit.unwrap_or(DEFAULT_DOMAIN_LIMIT);
            let rows: Vec<DomainProject> = projects_in_domain(&records, domain, limit)
                .into_iter()
                .map(DomainProject::from)
                .collect();
            if opts.json {
                format!("{}\n", serde_json::to_string_pretty(&rows)?)
            } else {
                render_domain_listing(domain, &rows)
            }
        }
        None => {
            let report = analyze(&records);
            if opts.json {
                format!("{}\n", serde_json::to_string_pretty(&report)?)
            } else {
                render_document(&file, &now, &report)
            }
        }
    };

    match &opts.output {
        None => print!("{}", body),
        Some(path) => {
            let path = match path {
                Some(p) => p.clone(),
                None => PathBuf::from(default_report_name(&now, opts.json)),
            };
            save_report(&path, &body)?;
            println!("Analysis report saved to: {}", path.display());
        }
    }
    Ok(())
}

/// `sdgp_analysis_report_%Y%m%d_%H%M%S.txt` (or `.json`) for the given instant.
pub fn default_report_name(now: &DateTime<Local>, json: bool) -> String {
    let ext = if json { "json" } else { "txt" };
    format!(
        "sdgp_analysis_report_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        ext
    )
}

fn save_report(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved analysis report");
    Ok(())
}

/// Full text report with its header block.
pub fn render_document(file: &Path, generated: &DateTime<Local>, report: &DatasetReport) -> String {
    let mut out = String::new();
    out.push_str("SDGP Dataset Report\n");
    out.push_str("===================\n\n");
    out.push_str(&format!(
        "  Generated:   {}\n",
        generated.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("  Dataset:     {}\n", file.display()));
    out.push_str(&render_report(report));
    out
}

/// Plain-text rendering of a [`DatasetReport`].
pub fn render_report(report: &DatasetReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("  Projects:    {}\n", report.total_projects));
    out.push_str(&format!("  Detailed:    {}\n", report.with_details));
    out.push_str(&format!("  Listing only: {}\n", report.without_details));

    section(&mut out, "Status", &report.status_distribution);
    section(&mut out, "Year", &report.year_distribution);
    section(&mut out, "Project types", &report.project_types);
    section(&mut out, "Domains", &report.domains);
    section(&mut out, "Top technologies", &report.tech_stack);

    if let Some(team) = &report.team {
        out.push_str("\n  Team size:\n");
        out.push_str(&format!(
            "    average {:.1}, min {}, max {} ({} teams)\n",
            team.average, team.min, team.max, team.teams_analyzed
        ));
        for (size, count) in &team.distribution {
            out.push_str(&format!("    {:>3} members  {:>5}\n", size, count));
        }
    }
    out
}

/// Numbered listing of the projects in one domain.
pub fn render_domain_listing(domain: &str, rows: &[DomainProject]) -> String {
    if rows.is_empty() {
        return format!("No projects in domain '{}'.\n", domain);
    }

    let mut out = format!("Projects in {} ({}):\n", domain, rows.len());
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", i + 1, row.title));
        if !row.subtitle.trim().is_empty() {
            out.push_str(&format!("    {}\n", row.subtitle));
        }
        out.push_str(&format!(
            "    status: {}  year: {}\n",
            or_unknown(row.status),
            or_unknown(row.year)
        ));
        out.push_str(&format!("    domains: {}\n", row.domains.join(", ")));
        out.push_str(&format!("    id: {}\n", row.id));
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

fn section(out: &mut String, title: &str, rows: &[(String, usize)]) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("\n  {}:\n", title));
    for (label, count) in rows {
        out.push_str(&format!("    {:<32} {:>5}\n", label, count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<serde_json::Value>) -> Vec<ProjectRecord> {
        values
            .into_iter()
            .map(|v| ProjectRecord::from_value(v).unwrap())
            .collect()
    }

    #[test]
    fn test_render_report_sections() {
        let records = records(vec![
            json!({"basic_info": {"id": "1", "status": "IDEA", "domains": ["AI"]},
                   "detailed_info": {"content": {"team": [{"name": "a"}]}}}),
            json!({"id": "2", "status": "IDEA"}),
        ]);

        let text = render_report(&analyze(&records));
        assert!(text.contains("  Projects:    2\n"));
        assert!(text.contains("  Status:\n"));
        assert!(text.contains("IDEA"));
        assert!(text.contains("average 1.0, min 1, max 1 (1 teams)"));
        assert!(!text.contains("Top technologies"));
    }

    #[test]
    fn test_render_document_header() {
        use chrono::TimeZone;
        let now = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let text = render_document(Path::new("data.json"), &now, &analyze(&[]));
        assert!(text.starts_with("SDGP Dataset Report\n"));
        assert!(text.contains("  Generated:   2025-01-02 03:04:05\n"));
        assert!(text.contains("  Dataset:     data.json\n"));
        assert!(text.contains("  Projects:    0\n"));
    }

    #[test]
    fn test_render_domain_listing() {
        let records = records(vec![
            json!({"id": "7", "title": "Bus Tracker", "subtitle": "Live arrivals",
                   "status": "DEPLOYED", "year": 2024, "domains": ["Transport", "IoT"]}),
            json!({"id": "8", "title": "Route Planner", "domains": ["Transport"]}),
        ]);
        let rows: Vec<DomainProject> = projects_in_domain(&records, "transport", 10)
            .into_iter()
            .map(DomainProject::from)
            .collect();

        let text = render_domain_listing("transport", &rows);
        assert!(text.starts_with("Projects in transport (2):\n"));
        assert!(text.contains("1. Bus Tracker\n    Live arrivals\n"));
        assert!(text.contains("    status: DEPLOYED  year: 2024\n"));
        assert!(text.contains("    domains: Transport, IoT\n"));
        assert!(text.contains("2. Route Planner\n    status: Unknown  year: Unknown\n"));
    }

    #[test]
    fn test_render_domain_listing_empty() {
        assert_eq!(
            render_domain_listing("Space", &[]),
            "No projects in domain 'Space'.\n"
        );
    }

    #[test]
    fn test_default_report_name() {
        use chrono::TimeZone;
        let now = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            default_report_name(&now, false),
            "sdgp_analysis_report_20250102_030405.txt"
        );
        assert_eq!(
            default_report_name(&now, true),
            "sdgp_analysis_report_20250102_030405.json"
        );
    }

    #[test]
    fn test_save_report_creates_parent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("reports/out.txt");
        save_report(&path, "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
