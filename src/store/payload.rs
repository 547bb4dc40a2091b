//! Payload schema for stored points

use crate::record::Record;
use qdrant_client::qdrant::{PointStruct, Value as QdrantValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// A point ready to be upserted
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: RecordPayload,
}

impl IndexedPoint {
    /// Convert to qdrant-client PointStruct
    pub fn to_point_struct(self) -> PointStruct {
        PointStruct::new(
            self.id.to_string(),
            self.vector,
            self.payload.to_qdrant_payload(),
        )
    }
}

/// Record fields stored alongside each vector (everything but the id)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: String,
}

impl From<&Record> for RecordPayload {
    fn from(record: &Record) -> Self {
        Self {
            question: record.question.clone(),
            answer: record.answer.clone(),
            content: record.content.clone(),
            source: record.source.clone(),
        }
    }
}

impl RecordPayload {
    /// Convert to Qdrant payload format
    pub fn to_qdrant_payload(self) -> HashMap<String, QdrantValue> {
        HashMap::from([
            ("question".to_string(), string_to_qdrant(self.question)),
            ("answer".to_string(), string_to_qdrant(self.answer)),
            ("content".to_string(), string_to_qdrant(self.content)),
            ("source".to_string(), string_to_qdrant(self.source)),
        ])
    }
}

fn string_to_qdrant(s: String) -> QdrantValue {
    QdrantValue {
        kind: Some(qdrant_client::qdrant::value::Kind::StringValue(s)),
    }
}

/// Missing or mistyped keys come back as empty strings
impl From<Map<String, Value>> for RecordPayload {
    fn from(map: Map<String, Value>) -> Self {
        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            question: text("question"),
            answer: text("answer"),
            content: text("content"),
            source: text("source"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{normalize, IdDigest, RawUnit};
    use serde_json::json;

    #[test]
    fn test_payload_drops_only_the_id() {
        let record = normalize(&RawUnit::from_content("body"), Some("a.md"), IdDigest::Md5);
        let payload = RecordPayload::from(&record);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"question": "", "answer": "", "content": "body", "source": "a.md"})
        );

        let qdrant = payload.to_qdrant_payload();
        assert_eq!(qdrant.len(), 4);
        assert!(!qdrant.contains_key("id"));
    }

    #[test]
    fn test_payload_from_partial_map() {
        let map = json!({"content": "c", "source": 7}).as_object().unwrap().clone();
        let payload = RecordPayload::from(map);
        assert_eq!(payload.content, "c");
        assert_eq!(payload.source, "");
        assert_eq!(payload.question, "");
    }
}
