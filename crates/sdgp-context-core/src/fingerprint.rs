//! Content fingerprints for summary staleness detection.
//!
//! A fingerprint is the hex SHA-256 of a canonical JSON object built from
//! the fields a summary depends on. Object keys are emitted in sorted order
//! (via `BTreeMap`) so the digest does not depend on field declaration
//! order, but list fields keep their given order: reordering domains or
//! tech entries is a content change.
//!
//! Hashed fields: title, subtitle, status, domains, project types, year,
//! last-updated timestamp, and a nested digest of the detailed content
//! (problem statement, solution, features, team size, tech stack). Anything
//! else on the record (team member names, unknown upstream flags) does not
//! affect the fingerprint.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::models::{ProjectContent, ProjectRecord};

/// Compute the fingerprint of a record.
pub fn fingerprint(record: &ProjectRecord) -> String {
    let basic = &record.basic_info;
    let mut fields: BTreeMap<&str, Value> = BTreeMap::new();
    fields.insert("title", json!(basic.title));
    fields.insert("subtitle", json!(basic.subtitle));
    fields.insert("status", json!(basic.status));
    fields.insert("domains", json!(basic.domains));
    fields.insert("projectTypes", json!(basic.project_types));
    fields.insert("year", json!(basic.year));
    fields.insert("updated_at", json!(basic.updated_at));
    fields.insert("content_hash", json!(content_digest(record.content())));
    digest(&fields)
}

/// Digest of the detailed content only.
///
/// A record without detailed content hashes as an empty [`ProjectContent`].
pub fn content_digest(content: &ProjectContent) -> String {
    let details = &content.project_details;
    let mut fields: BTreeMap<&str, Value> = BTreeMap::new();
    fields.insert("problem_statement", json!(details.problem_statement));
    fields.insert("solution", json!(details.solution));
    fields.insert("features", json!(details.features));
    fields.insert("team_size", json!(content.team.len()));
    fields.insert("tech_stack", json!(content.tech_stack()));
    digest(&fields)
}

fn digest(fields: &BTreeMap<&str, Value>) -> String {
    // Serializing a BTreeMap of plain JSON values cannot fail.
    let canonical = serde_json::to_string(fields).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ProjectRecord {
        ProjectRecord::from_value(value).unwrap()
    }

    fn base() -> Value {
        json!({
            "basic_info": {
                "id": "p1",
                "title": "Smart Health Monitor",
                "subtitle": "Wearable vitals",
                "status": "DEPLOYED",
                "year": "2024",
                "domains": ["Healthcare", "IoT"],
                "projectTypes": ["Hardware"],
                "updatedAt": "2024-05-01T00:00:00Z",
                "featured": false
            },
            "detailed_info": {
                "content": {
                    "projectDetails": {
                        "problem_statement": "Remote monitoring",
                        "solution": "A wristband",
                        "features": "Alerts"
                    },
                    "team": [{"name": "Ann"}, {"name": "Ben"}],
                    "associations": [
                        {"type": "PROJECT_TECH", "techStack": "Flutter"},
                        {"type": "PROJECT_TECH", "techStack": "Firebase"}
                    ]
                }
            }
        })
    }

    #[test]
    fn test_deterministic() {
        let r = record(base());
        assert_eq!(fingerprint(&r), fingerprint(&r));
        assert_eq!(fingerprint(&r), fingerprint(&record(base())));
        assert_eq!(fingerprint(&r).len(), 64);
    }

    #[test]
    fn test_hashed_field_change_detected() {
        let original = fingerprint(&record(base()));

        let mut v = base();
        v["basic_info"]["title"] = json!("Smart Health Monitor v2");
        assert_ne!(original, fingerprint(&record(v)));

        let mut v = base();
        v["detailed_info"]["content"]["projectDetails"]["solution"] = json!("A ring");
        assert_ne!(original, fingerprint(&record(v)));

        let mut v = base();
        v["detailed_info"]["content"]["team"] = json!([{"name": "Ann"}]);
        assert_ne!(original, fingerprint(&record(v)));

        let mut v = base();
        v["basic_info"]["updatedAt"] = json!("2024-06-01T00:00:00Z");
        assert_ne!(original, fingerprint(&record(v)));
    }

    #[test]
    fn test_list_order_is_significant() {
        let original = fingerprint(&record(base()));

        let mut v = base();
        v["basic_info"]["domains"] = json!(["IoT", "Healthcare"]);
        assert_ne!(original, fingerprint(&record(v)));

        let mut v = base();
        v["detailed_info"]["content"]["associations"] = json!([
            {"type": "PROJECT_TECH", "techStack": "Firebase"},
            {"type": "PROJECT_TECH", "techStack": "Flutter"}
        ]);
        assert_ne!(original, fingerprint(&record(v)));
    }

    #[test]
    fn test_unhashed_fields_ignored() {
        let original = fingerprint(&record(base()));

        let mut v = base();
        v["basic_info"]["featured"] = json!(true);
        v["basic_info"]["id"] = json!("other-id");
        v["detailed_info"]["content"]["team"] = json!([{"name": "Zed"}, {"name": "Yan"}]);
        assert_eq!(original, fingerprint(&record(v)));
    }

    #[test]
    fn test_object_key_order_irrelevant() {
        let a = record(serde_json::from_str(
            r#"{"basic_info": {"title": "T", "status": "IDEA", "year": "2023"}}"#,
        )
        .unwrap());
        let b = record(serde_json::from_str(
            r#"{"basic_info": {"year": "2023", "status": "IDEA", "title": "T"}}"#,
        )
        .unwrap());
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_missing_details_hash_as_empty_content() {
        let r = record(json!({"basic_info": {"id": "p9", "title": "Bare"}}));
        assert_eq!(
            content_digest(r.content()),
            content_digest(&ProjectContent::default())
        );

        let with_empty = record(json!({
            "basic_info": {"id": "p9", "title": "Bare"},
            "detailed_info": {"content": {}}
        }));
        assert_eq!(fingerprint(&r), fingerprint(&with_empty));
    }
}
