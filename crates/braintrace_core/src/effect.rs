use crate::{
    ConversationId, Generation, GraphCommand, HighlightSets, MessageDraft, MessageId, Revision,
    SourceId, SourceKey,
};

/// Side effects requested by `update`. Backend effects carry the generation
/// that was current when they were issued; it comes back on the completion msg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchMetadata {
        generation: Generation,
        conversation_id: ConversationId,
    },
    /// `revision` is the transcript revision at issue time.
    FetchTranscript {
        generation: Generation,
        revision: Revision,
        conversation_id: ConversationId,
    },
    CountSources {
        generation: Generation,
        conversation_id: ConversationId,
    },
    LoadEntityUniverse {
        generation: Generation,
        conversation_id: ConversationId,
    },
    RequestAnswer {
        generation: Generation,
        conversation_id: ConversationId,
        question: String,
        model_hint: String,
    },
    /// Best-effort save; failures are logged only.
    PersistMessage {
        generation: Generation,
        conversation_id: ConversationId,
        message_id: MessageId,
        draft: MessageDraft,
    },
    DeleteTranscript {
        generation: Generation,
        conversation_id: ConversationId,
    },
    /// Re-fetch the transcript to give provisional entries their server ids.
    ReconcileTranscript {
        generation: Generation,
        revision: Revision,
        conversation_id: ConversationId,
    },
    LookupSources {
        generation: Generation,
        conversation_id: ConversationId,
        key: SourceKey,
    },
    LookupReferencedEntities {
        generation: Generation,
        message_id: i64,
    },
    /// Copy a message; persisted messages are re-read from the backend first.
    CopyMessage {
        message_id: Option<i64>,
        fallback_text: String,
    },
    OpenSource {
        source_id: SourceId,
    },
    OpenFullView {
        conversation_id: ConversationId,
        highlights: HighlightSets,
        node_count: Option<usize>,
    },
    Graph(GraphCommand),
}
