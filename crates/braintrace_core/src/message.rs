use crate::{MessageId, SourceId};

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub is_from_assistant: bool,
    pub text: String,
    pub referenced_entity_names: Vec<String>,
}

impl Message {
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            is_from_assistant: false,
            text: text.into(),
            referenced_entity_names: Vec::new(),
        }
    }

    pub fn assistant(id: MessageId, text: impl Into<String>, referenced: Vec<String>) -> Self {
        Self {
            id,
            is_from_assistant: true,
            text: text.into(),
            referenced_entity_names: referenced,
        }
    }
}

/// A message without identity, as sent for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub is_from_assistant: bool,
    pub text: String,
    pub referenced_entity_names: Vec<String>,
}

impl From<&Message> for MessageDraft {
    fn from(message: &Message) -> Self {
        Self {
            is_from_assistant: message.is_from_assistant,
            text: message.text.clone(),
            referenced_entity_names: message.referenced_entity_names.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub id: SourceId,
    pub title: String,
}

/// Answer endpoint reply with every field optional, as received.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerReply {
    pub answer: Option<String>,
    pub message: Option<String>,
    pub chat_id: Option<i64>,
    pub referenced_entity_names: Vec<String>,
}

/// Classified answer reply. Whitespace-only payloads count as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Neither an answer nor guidance; a legitimate "nothing to say".
    Empty,
    Answer {
        text: String,
        chat_id: Option<i64>,
        referenced: Vec<String>,
    },
    Guidance {
        text: String,
    },
    AnswerWithGuidance {
        text: String,
        chat_id: Option<i64>,
        referenced: Vec<String>,
        guidance: String,
    },
}

impl AnswerReply {
    pub fn classify(self) -> AnswerOutcome {
        let answer = self.answer.filter(|text| !text.trim().is_empty());
        let guidance = self.message.filter(|text| !text.trim().is_empty());
        match (answer, guidance) {
            (None, None) => AnswerOutcome::Empty,
            (Some(text), None) => AnswerOutcome::Answer {
                text,
                chat_id: self.chat_id,
                referenced: self.referenced_entity_names,
            },
            (None, Some(text)) => AnswerOutcome::Guidance { text },
            (Some(text), Some(guidance)) => AnswerOutcome::AnswerWithGuidance {
                text,
                chat_id: self.chat_id,
                referenced: self.referenced_entity_names,
                guidance,
            },
        }
    }
}

impl AnswerOutcome {
    /// Referenced entity names carried by the primary answer, if any.
    pub fn referenced(&self) -> &[String] {
        match self {
            AnswerOutcome::Answer { referenced, .. }
            | AnswerOutcome::AnswerWithGuidance { referenced, .. } => referenced,
            AnswerOutcome::Empty | AnswerOutcome::Guidance { .. } => &[],
        }
    }
}
