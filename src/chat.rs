//! `sdgp ask` and the interactive `sdgp chat` loop.
//!
//! Besides free-form questions, the chat loop understands a few commands:
//!
//! | Input | Effect |
//! |-------|--------|
//! | `stats` | Summary cache statistics |
//! | `clear cache` | Drop every cached summary |
//! | `export` | Export the cache to a timestamped JSON file |
//! | `details <id>` / `project <id>` | Full detail page for one project |
//! | `help` | List commands |
//! | `quit` / `exit` / `bye` | Leave the loop |

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::harness::ProjectHarness;

/// One parsed line of chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Empty,
    Quit,
    Help,
    Stats,
    ClearCache,
    Export,
    Details(String),
    Ask(String),
}

pub fn parse_command(line: &str) -> ChatCommand {
    let trimmed = line.trim();
    let lower = trimmed.to_lowercase();

    match lower.as_str() {
        "" => return ChatCommand::Empty,
        "quit" | "exit" | "bye" => return ChatCommand::Quit,
        "help" => return ChatCommand::Help,
        "stats" => return ChatCommand::Stats,
        "clear cache" => return ChatCommand::ClearCache,
        "export" => return ChatCommand::Export,
        _ => {}
    }

    for prefix in ["details ", "project "] {
        if lower.starts_with(prefix) {
            let rest = trimmed.get(prefix.len()..).unwrap_or("").trim();
            if !rest.is_empty() && !rest.contains(char::is_whitespace) {
                return ChatCommand::Details(rest.to_string());
            }
            if let Some(id) = rest.split_whitespace().find(|w| looks_like_id(w)) {
                return ChatCommand::Details(id.to_string());
            }
        }
    }

    ChatCommand::Ask(trimmed.to_string())
}

/// A numeric id or a synthesized `project_<n>` id.
fn looks_like_id(word: &str) -> bool {
    let numeric = !word.is_empty() && word.chars().all(|c| c.is_ascii_digit());
    let synthesized = word.len() > "project_".len()
        && word
            .get(.."project_".len())
            .is_some_and(|p| p.eq_ignore_ascii_case("project_"));
    numeric || synthesized
}

/// Handle one line of input. Returns `None` when the user asked to quit.
pub async fn handle_line(harness: &ProjectHarness, line: &str) -> Option<String> {
    let reply = match parse_command(line) {
        ChatCommand::Quit => return None,
        ChatCommand::Empty => String::new(),
        ChatCommand::Help => help_text(),
        ChatCommand::Stats => {
            let stats = harness.cache_stats();
            format!(
                "Cache Statistics:\n- Total summaries: {}\n- Cache size: {:.2} MB\n- Projects loaded: {}",
                stats.count,
                stats.size_mb(),
                harness.records().len()
            )
        }
        ChatCommand::ClearCache => match harness.clear_cache() {
            Ok(()) => "Cache cleared. Summaries will be regenerated on demand.".to_string(),
            Err(e) => format!("Failed to clear cache: {:#}", e),
        },
        ChatCommand::Export => match harness.export_cache(None) {
            Ok(path) => format!("Exported summaries to {}", path.display()),
            Err(e) => format!("Failed to export summaries: {:#}", e),
        },
        ChatCommand::Details(id) => match harness.project_details(&id).await {
            Some(page) => page,
            None => format!(
                "Project ID '{}' not found. Please check the project ID and try again.",
                id
            ),
        },
        ChatCommand::Ask(question) => harness.ask(&question).await,
    };
    Some(reply)
}

fn help_text() -> String {
    [
        "Ask anything about the projects, or use:",
        "  stats          cache statistics",
        "  clear cache    drop all cached summaries",
        "  export         export summaries to JSON",
        "  details <id>   full detail page for a project",
        "  quit | bye    leave (also exit)",
    ]
    .join("\n")
}

/// Answer a single question and print it.
pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
    let harness = ProjectHarness::from_config(config)?;
    println!("{}", harness.ask(question).await);
    Ok(())
}

/// Run the interactive loop until `quit`/`exit`/`bye` or end of input.
pub async fn run_chat(config: &Config) -> Result<()> {
    let harness = ProjectHarness::from_config(config)?;

    println!(
        "SDGP project assistant: {} projects loaded, {} cached summaries.",
        harness.records().len(),
        harness.cache().len()
    );
    if !config.generation.is_enabled() {
        println!("Generation is disabled; questions will fail. Set [generation] provider in config.");
    }
    println!("Type 'help' for commands, 'quit' to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        match handle_line(&harness, &line).await {
            Some(reply) if reply.is_empty() => continue,
            Some(reply) => println!("\n{}", reply),
            None => break,
        }
    }

    println!("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SummaryCache;
    use crate::generation::DisabledGenerator;
    use crate::models::ProjectRecord;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("  QUIT "), ChatCommand::Quit);
        assert_eq!(parse_command("exit"), ChatCommand::Quit);
        assert_eq!(parse_command("Clear Cache"), ChatCommand::ClearCache);
        assert_eq!(parse_command("stats"), ChatCommand::Stats);
        assert_eq!(parse_command(""), ChatCommand::Empty);
        assert_eq!(
            parse_command("details Project_12"),
            ChatCommand::Details("Project_12".to_string())
        );
        assert_eq!(
            parse_command("project 7"),
            ChatCommand::Details("7".to_string())
        );
        assert_eq!(
            parse_command("project ideas for health"),
            ChatCommand::Ask("project ideas for health".to_string())
        );
    }

    #[test]
    fn test_bye_quits() {
        assert_eq!(parse_command("Bye"), ChatCommand::Quit);
    }

    #[test]
    fn test_details_finds_id_among_words() {
        assert_eq!(
            parse_command("details for 123"),
            ChatCommand::Details("123".to_string())
        );
        assert_eq!(
            parse_command("project about project_45 please"),
            ChatCommand::Details("project_45".to_string())
        );
        assert_eq!(
            parse_command("details of the bus tracker"),
            ChatCommand::Ask("details of the bus tracker".to_string())
        );
        // "project_" alone is not an id
        assert_eq!(
            parse_command("details on project_ stuff"),
            ChatCommand::Ask("details on project_ stuff".to_string())
        );
    }

    #[tokio::test]
    async fn test_handle_line() {
        let tmp = TempDir::new().unwrap();
        let record =
            ProjectRecord::from_value(json!({"basic_info": {"id": "7", "title": "Bus Tracker"}}))
                .unwrap();
        let harness = ProjectHarness::new(
            vec![record],
            Arc::new(SummaryCache::open(tmp.path())),
            Arc::new(DisabledGenerator),
            &Config::minimal(),
        );

        assert!(handle_line(&harness, "quit").await.is_none());
        assert!(handle_line(&harness, "bye").await.is_none());

        let details = handle_line(&harness, "details 7").await.unwrap();
        assert!(details.contains("- Title: Bus Tracker"));

        let phrased = handle_line(&harness, "details for 7").await.unwrap();
        assert!(phrased.contains("- Title: Bus Tracker"));

        let missing = handle_line(&harness, "details 99").await.unwrap();
        assert!(missing.contains("'99' not found"));

        // the details lookup filled the cache
        let stats = handle_line(&harness, "stats").await.unwrap();
        assert!(stats.contains("Total summaries: 1"));

        let cleared = handle_line(&harness, "clear cache").await.unwrap();
        assert!(cleared.starts_with("Cache cleared"));
        assert_eq!(harness.cache_stats().count, 0);
    }
}
