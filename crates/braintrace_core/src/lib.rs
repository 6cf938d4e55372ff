//! Braintrace core: pure conversation state machine and view-model helpers.
mod citation;
mod config;
mod effect;
mod full_view;
mod graph;
mod ids;
mod message;
mod msg;
mod sources;
mod state;
mod transcript;
mod update;
mod view_model;

pub use citation::{parse_citations, CitationLine};
pub use config::{ChatConfig, CitationMode, GraphActionReveal, SourceScope};
pub use effect::Effect;
pub use full_view::full_view_url;
pub use graph::{
    GraphCommand, GraphControls, GraphSyncBridge, HighlightKind, HighlightSet, HighlightSets,
};
pub use ids::{ConversationId, Generation, MessageId, Revision, SourceId};
pub use message::{AnswerOutcome, AnswerReply, Message, MessageDraft, SourceEntry};
pub use msg::Msg;
pub use sources::{SourceCache, SourceKey, Toggle};
pub use state::{AppState, TurnState};
pub use transcript::Transcript;
pub use update::update;
pub use view_model::{AppViewModel, LineView, MessageView, PopupView};
