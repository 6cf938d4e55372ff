//! JSON shapes spoken by the knowledge-base backend.

use braintrace_core::{AnswerReply, Message, MessageDraft, MessageId, SourceEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct BrainRecord {
    pub brain_name: String,
}

/// Stored chat rows use 0/1 for `is_ai`; newer rows use booleans.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(value) => *value,
            Flag::Int(value) => *value != 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum NodeRef {
    Name(String),
    Node { name: String },
}

impl NodeRef {
    fn into_name(self) -> String {
        match self {
            NodeRef::Name(name) | NodeRef::Node { name } => name,
        }
    }
}

/// Referenced nodes arrive either as a list or as a JSON-encoded string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ReferencedNodes {
    List(Vec<NodeRef>),
    Encoded(String),
}

impl Default for ReferencedNodes {
    fn default() -> Self {
        ReferencedNodes::List(Vec::new())
    }
}

impl ReferencedNodes {
    pub fn into_names(self) -> Vec<String> {
        let nodes = match self {
            ReferencedNodes::List(nodes) => nodes,
            ReferencedNodes::Encoded(text) => {
                serde_json::from_str::<Vec<NodeRef>>(&text).unwrap_or_default()
            }
        };
        nodes.into_iter().map(NodeRef::into_name).collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRecord {
    pub chat_id: i64,
    pub is_ai: Flag,
    pub message: String,
    #[serde(default)]
    pub referenced_nodes: Option<ReferencedNodes>,
}

impl From<ChatRecord> for Message {
    fn from(record: ChatRecord) -> Self {
        Message {
            id: MessageId::Persisted(record.chat_id),
            is_from_assistant: record.is_ai.is_set(),
            text: record.message,
            referenced_entity_names: record
                .referenced_nodes
                .unwrap_or_default()
                .into_names(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SaveChatBody<'a> {
    pub is_ai: u8,
    pub message: &'a str,
    pub referenced_nodes: &'a [String],
}

impl<'a> From<&'a MessageDraft> for SaveChatBody<'a> {
    fn from(draft: &'a MessageDraft) -> Self {
        Self {
            is_ai: u8::from(draft.is_from_assistant),
            message: &draft.text,
            referenced_nodes: &draft.referenced_entity_names,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SavedChat {
    pub chat_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerBody<'a> {
    pub question: &'a str,
    pub brain_id: &'a str,
    pub model: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerPayload {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub referenced_nodes: Option<ReferencedNodes>,
}

impl From<AnswerPayload> for AnswerReply {
    fn from(payload: AnswerPayload) -> Self {
        AnswerReply {
            answer: payload.answer,
            message: payload.message,
            chat_id: payload.chat_id,
            referenced_entity_names: payload
                .referenced_nodes
                .unwrap_or_default()
                .into_names(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SourceRecord {
    pub id: Value,
    #[serde(default)]
    pub source_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl From<SourceRecord> for SourceEntry {
    fn from(record: SourceRecord) -> Self {
        let id = match record.id {
            Value::String(id) => id,
            other => other.to_string(),
        };
        let title = record
            .source_title
            .or(record.title)
            .unwrap_or_else(|| format!("Source {id}"));
        SourceEntry { id, title }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SourcesPayload {
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReferencedPayload {
    #[serde(default)]
    pub referenced_nodes: Option<ReferencedNodes>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagePayload {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SourceCountPayload {
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphNode {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_record_accepts_int_flag_and_encoded_nodes() {
        let record: ChatRecord = serde_json::from_str(
            r#"{"chat_id": 3, "is_ai": 1, "message": "m", "referenced_nodes": "[\"지구\", {\"name\": \"달\"}]"}"#,
        )
        .unwrap();
        let message = Message::from(record);
        assert!(message.is_from_assistant);
        assert_eq!(message.referenced_entity_names, vec!["지구", "달"]);
    }

    #[test]
    fn chat_record_tolerates_null_nodes() {
        let record: ChatRecord = serde_json::from_str(
            r#"{"chat_id": 4, "is_ai": false, "message": "m", "referenced_nodes": null}"#,
        )
        .unwrap();
        let message = Message::from(record);
        assert!(!message.is_from_assistant);
        assert!(message.referenced_entity_names.is_empty());
    }

    #[test]
    fn source_record_prefers_source_title_and_stringifies_ids() {
        let record: SourceRecord =
            serde_json::from_str(r#"{"id": 67, "source_title": "a.pdf", "title": "b"}"#).unwrap();
        assert_eq!(
            SourceEntry::from(record),
            SourceEntry {
                id: "67".into(),
                title: "a.pdf".into()
            }
        );
        let record: SourceRecord = serde_json::from_str(r#"{"id": "x9"}"#).unwrap();
        assert_eq!(SourceEntry::from(record).title, "Source x9");
    }
}
