use std::collections::HashSet;

use crate::ids::ProvisionalIds;
use crate::view_model::{self, AppViewModel};
use crate::{
    ChatConfig, CitationMode, ConversationId, Generation, HighlightSets, MessageId, Revision,
    SourceCache, Transcript,
};

/// Per-turn state of the answer orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    /// `started_at` is the transcript revision before the question was appended.
    Sending {
        question: String,
        started_at: Revision,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) config: ChatConfig,
    pub(crate) generation: Generation,
    pub(crate) conversation: Option<ConversationId>,
    pub(crate) display_name: String,
    pub(crate) source_count: u64,
    pub(crate) chat_ready: Option<bool>,
    pub(crate) transcript: Transcript,
    pub(crate) input: String,
    pub(crate) turn: TurnState,
    pub(crate) sources: SourceCache,
    pub(crate) highlights: HighlightSets,
    pub(crate) entity_universe: Option<HashSet<String>>,
    pub(crate) graph_node_count: Option<usize>,
    pub(crate) provisional_ids: ProvisionalIds,
    pub(crate) confirm_clear: bool,
    pub(crate) hovered: Option<MessageId>,
    pub(crate) notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ChatConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Starts provisional ids at `seed` (the app passes wall-clock millis).
    pub fn with_provisional_seed(mut self, seed: u64) -> Self {
        self.provisional_ids = ProvisionalIds::starting_at(seed);
        self
    }

    pub fn view(&self) -> AppViewModel {
        view_model::project(self)
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn conversation(&self) -> Option<&ConversationId> {
        self.conversation.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.turn, TurnState::Sending { .. })
    }

    pub fn sources(&self) -> &SourceCache {
        &self.sources
    }

    pub fn highlights(&self) -> &HighlightSets {
        &self.highlights
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Universe the citation parser should match against, if any.
    pub(crate) fn citation_universe(&self) -> Option<&HashSet<String>> {
        match self.config.citation_mode {
            CitationMode::Strict => self.entity_universe.as_ref(),
            CitationMode::Loose => None,
        }
    }

    pub(crate) fn next_provisional_id(&mut self) -> MessageId {
        self.provisional_ids.allocate()
    }

    /// Drops everything tied to the previous conversation and bumps the generation.
    pub(crate) fn switch_to(&mut self, conversation: ConversationId) {
        self.generation = self.generation.next();
        self.display_name.clear();
        self.source_count = 0;
        self.chat_ready = None;
        self.transcript.load(Vec::new());
        self.turn = TurnState::Idle;
        self.sources.clear();
        self.highlights.reset();
        self.entity_universe = None;
        self.graph_node_count = None;
        self.confirm_clear = false;
        self.hovered = None;
        self.notice = None;
        self.conversation = Some(conversation);
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns and resets the dirty flag. Used to decide when to re-render.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// True once after the transcript length changed.
    pub fn consume_scroll_request(&mut self) -> bool {
        self.transcript.consume_scroll_request()
    }
}
