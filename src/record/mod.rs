//! Canonical records and the normalizer that produces them
//!
//! Every input unit (a CSV row, a JSON/YAML object, a block of text) is
//! reduced to one [`Record`] whose id depends on nothing but its collapsed
//! `content`. Two units with the same text therefore upsert onto the same
//! Qdrant point, whatever file they came from.

mod identity;

pub use identity::*;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provenance used when neither the caller nor the unit names a source
pub const UNKNOWN_SOURCE: &str = "unknown";

/// A normalized knowledge-base entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// UUID-shaped digest of `content`
    pub id: String,

    /// Question text for Q&A entries, otherwise empty
    pub question: String,

    /// Answer text for Q&A entries, otherwise empty
    pub answer: String,

    /// Whitespace-collapsed body
    pub content: String,

    /// File name, optionally suffixed with `#part<N>`
    pub source: String,
}

/// One raw input unit before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawUnit {
    pub content: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub source: Option<String>,
}

impl RawUnit {
    /// A unit carrying only body text
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Build a unit from a JSON/YAML object, ignoring unrelated keys
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            content: map.get("content").and_then(field_text),
            question: map.get("question").and_then(field_text),
            answer: map.get("answer").and_then(field_text),
            source: map.get("source").and_then(field_text),
        }
    }
}

/// Scalars are kept as text; null, lists and nested objects count as missing
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Collapse every whitespace run to a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn qa_body(question: &str, answer: &str) -> String {
    format!("Q: {}\nA: {}", question.trim(), answer.trim())
}

/// Normalize a unit with no explicit question/answer overrides
pub fn normalize(unit: &RawUnit, source: Option<&str>, digest: IdDigest) -> Record {
    normalize_qa(unit, source, None, None, digest)
}

/// Normalize a unit, preferring explicit question/answer overrides
pub fn normalize_qa(
    unit: &RawUnit,
    source: Option<&str>,
    question: Option<&str>,
    answer: Option<&str>,
    digest: IdDigest,
) -> Record {
    let overrides = match (question, answer) {
        (Some(q), Some(a)) if !q.trim().is_empty() && !a.trim().is_empty() => Some((q, a)),
        _ => None,
    };

    let body = if let Some((q, a)) = overrides {
        qa_body(q, a)
    } else if let (Some(q), Some(a)) = (&unit.question, &unit.answer) {
        qa_body(q, a)
    } else if let Some(content) = non_empty(unit.content.as_deref()) {
        content.to_string()
    } else {
        String::new()
    };

    let content = collapse_whitespace(&body);
    let id = content_id(&content, digest).to_string();

    let question = non_empty(question)
        .or(unit.question.as_deref())
        .unwrap_or_default()
        .to_string();
    let answer = non_empty(answer)
        .or(unit.answer.as_deref())
        .unwrap_or_default()
        .to_string();
    let source = non_empty(source)
        .or_else(|| non_empty(unit.source.as_deref()))
        .unwrap_or(UNKNOWN_SOURCE)
        .to_string();

    Record {
        id,
        question,
        answer,
        content,
        source,
    }
}
