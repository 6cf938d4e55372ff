use crate::{
    AnswerReply, ConversationId, Generation, HighlightKind, Message, MessageId, Revision,
    SourceEntry, SourceId, SourceKey,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User opened a conversation (or switched to another one).
    ConversationSelected(ConversationId),
    /// User edited the question input.
    InputChanged(String),
    /// User submitted the current input (keyboard or button).
    SubmitClicked,
    /// User asked to clear the transcript; waits for confirmation.
    ClearRequested,
    ClearConfirmed,
    ClearCancelled,
    /// "Show sources" toggle on a citation.
    SourcesToggled(SourceKey),
    /// User picked a source document from an open list.
    SourceOpened(SourceId),
    CopyClicked(MessageId),
    /// "Show in graph" on an assistant message.
    ShowInGraphClicked(MessageId),
    /// User clicked the entity name of a citation line.
    CitationClicked(String),
    MessageHovered(Option<MessageId>),
    /// User closed one of the host's highlight popups.
    HighlightDismissed(HighlightKind),
    FullViewRequested,
    NoticeDismissed,

    /// Graph view: the knowledge graph was rebuilt.
    GraphRebuilt,
    /// Graph view or source panel: entities generated from the opened source.
    FocusNamesSupplied(Vec<String>),
    /// Graph view: entities that appeared since the last rebuild.
    NewlyAddedReported(Vec<String>),
    /// Graph view cleared one of its own highlights.
    GraphHighlightCleared(HighlightKind),

    MetadataLoaded {
        generation: Generation,
        result: Result<String, String>,
    },
    TranscriptLoaded {
        generation: Generation,
        revision: Revision,
        result: Result<Vec<Message>, String>,
    },
    SourceCountLoaded {
        generation: Generation,
        result: Result<u64, String>,
    },
    EntityUniverseLoaded {
        generation: Generation,
        result: Result<Vec<String>, String>,
    },
    AnswerReceived {
        generation: Generation,
        result: Result<AnswerReply, String>,
    },
    MessagePersisted {
        generation: Generation,
        message_id: MessageId,
        result: Result<i64, String>,
    },
    TranscriptDeleted {
        generation: Generation,
        result: Result<(), String>,
    },
    TranscriptReconciled {
        generation: Generation,
        revision: Revision,
        result: Result<Vec<Message>, String>,
    },
    SourcesResolved {
        generation: Generation,
        key: SourceKey,
        result: Result<Vec<SourceEntry>, String>,
    },
    ReferencedEntitiesLoaded {
        generation: Generation,
        result: Result<Vec<String>, String>,
    },

    /// Render tick.
    Tick,
    NoOp,
}
