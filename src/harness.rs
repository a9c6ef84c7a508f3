//! The query surface shared by the CLI commands and the chat loop.
//!
//! [`ProjectHarness`] owns the loaded records together with everything a
//! query needs: the summary cache, the summarizer, the context assembler,
//! and the conversation memory. All operations take `&self`; the memory is
//! behind a mutex and the cache synchronizes internally, so one harness
//! can be shared across tasks.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::cache::{CacheStats, SummaryCache};
use crate::config::Config;
use crate::context::ContextAssembler;
use crate::dataset::load_records;
use crate::generation::{create_generator, Generator};
use crate::indicator::ThinkingIndicator;
use crate::memory::ConversationMemory;
use crate::models::ProjectRecord;
use crate::summarize::Summarizer;
use crate::text::{excerpt, or_placeholder};

const NOT_SPECIFIED: &str = "Not specified";
const UNKNOWN: &str = "Unknown";

pub struct ProjectHarness {
    records: Vec<ProjectRecord>,
    cache: Arc<SummaryCache>,
    summarizer: Arc<Summarizer>,
    assembler: ContextAssembler,
    memory: Mutex<ConversationMemory>,
}

impl ProjectHarness {
    pub fn new(
        records: Vec<ProjectRecord>,
        cache: Arc<SummaryCache>,
        generator: Arc<dyn Generator>,
        config: &Config,
    ) -> Self {
        let summarizer = Arc::new(Summarizer::new(generator));
        let assembler = ContextAssembler::new(
            cache.clone(),
            summarizer.clone(),
            config.retrieval.clone(),
        );
        let memory = ConversationMemory::new(config.conversation.capacity).with_rendering(
            config.conversation.recent_turns,
            config.conversation.response_chars,
        );

        Self {
            records,
            cache,
            summarizer,
            assembler,
            memory: Mutex::new(memory),
        }
    }

    /// Load the dataset, open the cache, and build the configured generator.
    pub fn from_config(config: &Config) -> Result<Self> {
        let records = load_records(&config.data.path)?;
        let cache = Arc::new(SummaryCache::open(&config.cache.dir));
        let generator = create_generator(&config.generation)?;
        Ok(Self::new(records, cache, generator, config))
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn cache(&self) -> &Arc<SummaryCache> {
        &self.cache
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    pub fn assembler(&self) -> &ContextAssembler {
        &self.assembler
    }

    /// Context block for `query`; see [`ContextAssembler::build_context`].
    pub async fn get_context(&self, query: &str) -> String {
        self.assembler.build_context(query, &self.records).await
    }

    pub fn conversation_context(&self) -> String {
        self.lock_memory().recent_context()
    }

    pub fn record_exchange(&self, user: &str, response: &str) {
        self.lock_memory().append(user, response);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    pub fn export_cache(&self, output: Option<&Path>) -> Result<PathBuf> {
        self.cache.export(output)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&ProjectRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// First record whose title contains `text` or is contained in it,
    /// ignoring case. Blank input and blank titles never match.
    pub fn get_by_title_substring(&self, text: &str) -> Option<&ProjectRecord> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.records.iter().find(|r| {
            let title = r.title().trim().to_lowercase();
            !title.is_empty() && (title.contains(&needle) || needle.contains(&title))
        })
    }

    /// Full detail page for one record, or `None` for an unknown id.
    pub async fn project_details(&self, id: &str) -> Option<String> {
        let record = self.get_by_id(id)?;
        let summary = self.assembler.summary_for(record).await;
        Some(render_details(
            record,
            &self.assembler.retrieval().project_url(record.id()),
            &summary,
        ))
    }

    /// Answer `question` with the configured generator.
    ///
    /// On success the exchange is recorded in conversation memory. On
    /// failure an apology line is returned and nothing is recorded.
    pub async fn ask(&self, question: &str) -> String {
        let context = self.get_context(question).await;
        let history = self.conversation_context();
        let prompt = chat_prompt(
            question,
            &context,
            &history,
            &self.assembler.retrieval().project_url("<PROJECT_ID>"),
        );

        let indicator = ThinkingIndicator::start();
        let result = self.summarizer.generator().generate(&prompt).await;
        indicator.stop().await;

        match result {
            Ok(answer) => {
                self.record_exchange(question, &answer);
                answer
            }
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "failed to generate answer");
                format!(
                    "I apologize, but I encountered an error while processing your request: {}",
                    e
                )
            }
        }
    }

    fn lock_memory(&self) -> std::sync::MutexGuard<'_, ConversationMemory> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Prompt for a chat answer grounded in `context`.
pub fn chat_prompt(question: &str, context: &str, history: &str, url_template: &str) -> String {
    format!(
        "You are an expert assistant for SDGP (Software Development Group Project) projects. \
Help the user understand and explore these projects.\n\n\
CONTEXT DATA:\n{context}\n\
CONVERSATION HISTORY:\n{history}\n\
USER QUESTION: {question}\n\n\
RESPONSE GUIDELINES:\n\
1. Start with a short overview of what you found.\n\
2. For each relevant project give its ID, its page ({url_template}), title, \
domains, technologies, and a brief description.\n\
3. Share patterns, trends, and notable innovations across the projects.\n\
4. Compare projects where it helps.\n\
5. End with next steps. Users can type \"details <PROJECT_ID>\" for the full record.\n"
    )
}

fn render_details(record: &ProjectRecord, url: &str, summary: &str) -> String {
    let basic = &record.basic_info;
    let tech = record.tech_stack();
    let team = record.team_names();
    let problem = or_placeholder(record.problem_statement(), NOT_SPECIFIED);

    let mut out = String::from("DETAILED PROJECT ANALYSIS\n\n");
    out.push_str("Basic Information:\n");
    out.push_str(&format!("- Project ID: {}\n", record.id()));
    out.push_str(&format!("- Project URL: {}\n", url));
    out.push_str(&format!("- Title: {}\n", or_placeholder(&basic.title, UNKNOWN)));
    if !basic.subtitle.trim().is_empty() {
        out.push_str(&format!("- Subtitle: {}\n", basic.subtitle));
    }
    out.push_str(&format!("- Status: {}\n", or_placeholder(&basic.status, UNKNOWN)));
    out.push_str(&format!("- Year: {}\n", or_placeholder(&basic.year, UNKNOWN)));
    out.push_str(&format!("- Domains: {}\n", basic.domains.join(", ")));
    out.push_str(&format!("- Project Types: {}\n\n", basic.project_types.join(", ")));

    out.push_str("Team Information:\n");
    out.push_str(&format!("- Team Size: {} members\n", record.team_size()));
    out.push_str(&format!(
        "- Team Members: {}\n\n",
        if team.is_empty() {
            NOT_SPECIFIED.to_string()
        } else {
            team.join(", ")
        }
    ));

    out.push_str("Technical Details:\n");
    out.push_str(&format!(
        "- Technology Stack: {}\n\n",
        if tech.is_empty() {
            NOT_SPECIFIED.to_string()
        } else {
            tech.join(", ")
        }
    ));

    out.push_str("Project Details:\n");
    out.push_str(&format!("- Problem Statement: {}\n", problem));
    out.push_str(&format!(
        "- Solution Approach: {}\n",
        or_placeholder(record.solution(), NOT_SPECIFIED)
    ));
    out.push_str(&format!(
        "- Key Features: {}\n\n",
        or_placeholder(record.features(), NOT_SPECIFIED)
    ));

    out.push_str(&format!("AI Analysis:\n{}\n\n", summary));

    out.push_str("Key Insights:\n");
    out.push_str(&format!("- This project addresses: {}...\n", excerpt(problem, 100)));
    out.push_str(&format!(
        "- Target impact: {} stage development\n",
        or_placeholder(&basic.status, UNKNOWN)
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::DisabledGenerator;
    use serde_json::json;
    use tempfile::TempDir;

    fn harness(tmp: &TempDir) -> ProjectHarness {
        let records = vec![
            json!({
                "basic_info": {"id": "42", "title": "Smart Health Monitor", "status": "IDEA",
                               "domains": ["Healthcare"]},
                "detailed_info": {"content": {
                    "projectDetails": {"problem_statement": "Vitals are not tracked at home"},
                    "team": [{"name": "Nimal"}, {"name": ""}]
                }}
            }),
            json!({"basic_info": {"id": "43", "title": "Crop Planner"}}),
            json!({"basic_info": {"id": "44", "title": ""}}),
        ]
        .into_iter()
        .map(|v| ProjectRecord::from_value(v).unwrap())
        .collect();

        ProjectHarness::new(
            records,
            Arc::new(SummaryCache::open(tmp.path())),
            Arc::new(DisabledGenerator),
            &Config::minimal(),
        )
    }

    #[test]
    fn test_get_by_id() {
        let tmp = TempDir::new().unwrap();
        let h = harness(&tmp);
        assert_eq!(h.get_by_id("43").unwrap().title(), "Crop Planner");
        assert!(h.get_by_id("missing").is_none());
    }

    #[test]
    fn test_title_substring_both_directions() {
        let tmp = TempDir::new().unwrap();
        let h = harness(&tmp);
        assert_eq!(h.get_by_title_substring("health").unwrap().id(), "42");
        assert_eq!(
            h.get_by_title_substring("tell me about CROP PLANNER please")
                .unwrap()
                .id(),
            "43"
        );
        assert!(h.get_by_title_substring("submarine").is_none());
        assert!(h.get_by_title_substring("   ").is_none());
    }

    #[tokio::test]
    async fn test_project_details() {
        let tmp = TempDir::new().unwrap();
        let h = harness(&tmp);
        let page = h.project_details("42").await.unwrap();
        assert!(page.contains("- Project URL: https://www.sdgp.lk/project/42\n"));
        assert!(page.contains("- Team Members: Nimal, Unknown\n"));
        assert!(page.contains("- Technology Stack: Not specified\n"));
        assert!(page.contains("- Problem Statement: Vitals are not tracked at home\n"));
        assert!(h.project_details("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_ask_failure_apologizes_and_records_nothing() {
        let tmp = TempDir::new().unwrap();
        let h = harness(&tmp);
        let answer = h.ask("health projects?").await;
        assert!(answer.starts_with("I apologize"));
        assert_eq!(h.conversation_context(), "");
    }

    #[test]
    fn test_record_exchange_feeds_context() {
        let tmp = TempDir::new().unwrap();
        let h = harness(&tmp);
        h.record_exchange("hi", "hello");
        assert_eq!(
            h.conversation_context(),
            "Recent conversation:\nUser: hi\nAI: hello...\n\n"
        );
    }

    #[test]
    fn test_chat_prompt_sections() {
        let prompt = chat_prompt("q?", "CTX", "HIST", "https://x/<PROJECT_ID>");
        assert!(prompt.contains("CONTEXT DATA:\nCTX\n"));
        assert!(prompt.contains("CONVERSATION HISTORY:\nHIST\n"));
        assert!(prompt.contains("USER QUESTION: q?"));
        assert!(prompt.contains("https://x/<PROJECT_ID>"));
    }
}
