//! `sdgp get` and `sdgp find`: print the full detail page for one project.

use anyhow::Result;

use crate::config::Config;
use crate::harness::ProjectHarness;

/// Print the detail page for the project with `id`.
pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let harness = ProjectHarness::from_config(config)?;
    match harness.project_details(id).await {
        Some(page) => {
            println!("{}", page);
            Ok(())
        }
        None => {
            eprintln!("Error: project with ID '{}' not found.", id);
            std::process::exit(1);
        }
    }
}

/// Print the detail page for the first project whose title matches `title`.
pub async fn run_find(config: &Config, title: &str) -> Result<()> {
    let harness = ProjectHarness::from_config(config)?;
    let id = match harness.get_by_title_substring(title) {
        Some(record) => record.id().to_string(),
        None => {
            eprintln!("Error: no project title matches '{}'.", title);
            std::process::exit(1);
        }
    };

    if let Some(page) = harness.project_details(&id).await {
        println!("{}", page);
    }
    Ok(())
}
