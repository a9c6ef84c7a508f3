//! Project record schema.
//!
//! Records arrive as loosely-typed JSON scraped from the project catalogue.
//! Every field is optional upstream; here absence (and `null`) is resolved
//! once at deserialization time so the ranker and renderers never have to
//! deal with missing values: strings default to `""`, lists to `[]`, and a
//! record without detailed content behaves as if it had an empty one.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Association type that marks a technology-stack entry.
pub const TECH_ASSOCIATION: &str = "PROJECT_TECH";

static EMPTY_CONTENT: ProjectContent = ProjectContent {
    project_details: ProjectDetails {
        problem_statement: String::new(),
        solution: String::new(),
        features: String::new(),
    },
    team: Vec::new(),
    associations: Vec::new(),
};

/// A single project: listing fields plus optional detailed content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default, deserialize_with = "null_default")]
    pub basic_info: BasicInfo,
    #[serde(default)]
    pub detailed_info: Option<DetailedInfo>,
}

/// Listing-level fields shown on the catalogue page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub domains: Vec<String>,
    #[serde(
        default,
        rename = "projectTypes",
        deserialize_with = "lenient_list"
    )]
    pub project_types: Vec<String>,
    #[serde(default, rename = "updatedAt", deserialize_with = "lenient_string")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailedInfo {
    #[serde(default, deserialize_with = "null_default")]
    pub content: ProjectContent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectContent {
    #[serde(
        default,
        rename = "projectDetails",
        deserialize_with = "null_default"
    )]
    pub project_details: ProjectDetails,
    #[serde(default, deserialize_with = "null_default")]
    pub team: Vec<TeamMember>,
    #[serde(default, deserialize_with = "null_default")]
    pub associations: Vec<Association>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(default, deserialize_with = "lenient_string")]
    pub problem_statement: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub solution: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub features: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

/// A typed link from a project to something else (tech, sponsor, …).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Association {
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, rename = "techStack", deserialize_with = "lenient_string")]
    pub tech_stack: String,
}

impl ProjectRecord {
    /// Parse one element of a dataset file.
    ///
    /// Accepts both the enriched shape (`{basic_info, detailed_info}`) and a
    /// bare listing object, which is treated as `basic_info` with no details.
    pub fn from_value(value: Value) -> Result<Self> {
        let enriched = value
            .as_object()
            .map(|obj| obj.contains_key("basic_info"))
            .unwrap_or(false);
        if enriched {
            serde_json::from_value(value).context("invalid project record")
        } else {
            let basic_info: BasicInfo =
                serde_json::from_value(value).context("invalid project listing")?;
            Ok(Self {
                basic_info,
                detailed_info: None,
            })
        }
    }

    pub fn id(&self) -> &str {
        &self.basic_info.id
    }

    pub fn title(&self) -> &str {
        &self.basic_info.title
    }

    /// Assign `project_{index}` when the upstream record carried no id.
    pub fn ensure_id(&mut self, index: usize) {
        if self.basic_info.id.trim().is_empty() {
            self.basic_info.id = format!("project_{}", index);
        }
    }

    pub fn has_details(&self) -> bool {
        self.detailed_info.is_some()
    }

    /// Detailed content, or a shared empty content when absent.
    pub fn content(&self) -> &ProjectContent {
        self.detailed_info
            .as_ref()
            .map(|d| &d.content)
            .unwrap_or(&EMPTY_CONTENT)
    }

    pub fn problem_statement(&self) -> &str {
        &self.content().project_details.problem_statement
    }

    pub fn solution(&self) -> &str {
        &self.content().project_details.solution
    }

    pub fn features(&self) -> &str {
        &self.content().project_details.features
    }

    pub fn team_size(&self) -> usize {
        self.content().team.len()
    }

    pub fn team_names(&self) -> Vec<&str> {
        self.content()
            .team
            .iter()
            .map(|m| if m.name.is_empty() { "Unknown" } else { m.name.as_str() })
            .collect()
    }

    /// Technology-stack entries, in the order they were listed.
    pub fn tech_stack(&self) -> Vec<&str> {
        self.content().tech_stack()
    }
}

impl ProjectContent {
    pub fn tech_stack(&self) -> Vec<&str> {
        self.associations
            .iter()
            .filter(|a| a.kind == TECH_ASSOCIATION && !a.tech_stack.is_empty())
            .map(|a| a.tech_stack.as_str())
            .collect()
    }
}

/// A string field that tolerates `null`, numbers and booleans.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    })
}

/// A list of strings that tolerates `null` and drops non-scalar entries.
fn lenient_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
