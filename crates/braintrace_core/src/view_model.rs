use crate::{
    parse_citations, AppState, CitationLine, GraphActionReveal, HighlightKind, MessageId,
    SourceEntry, SourceKey,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub conversation_name: String,
    pub source_count: u64,
    /// `None` until the first transcript load finishes.
    pub chat_ready: Option<bool>,
    pub input: String,
    pub submit_enabled: bool,
    /// Thinking indicator while a turn is in flight.
    pub thinking: bool,
    pub confirm_clear: bool,
    pub notice: Option<String>,
    pub messages: Vec<MessageView>,
    pub popups: Vec<PopupView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: MessageId,
    pub is_from_assistant: bool,
    pub lines: Vec<LineView>,
    pub graph_action_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineView {
    Text(String),
    Citation {
        entity_name: String,
        key: SourceKey,
        sources_open: bool,
        sources: Vec<SourceEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    pub kind: HighlightKind,
    pub names: Vec<String>,
}

pub(crate) fn project(state: &AppState) -> AppViewModel {
    let universe = state.citation_universe();
    let messages = state
        .transcript
        .messages()
        .iter()
        .map(|message| {
            let lines = parse_citations(&message.text, universe)
                .into_iter()
                .map(|line| match line {
                    CitationLine::Text(text) => LineView::Text(text),
                    CitationLine::Citation { entity_name } => {
                        let key = SourceKey::scoped(
                            state.config.source_scope,
                            message.id,
                            &entity_name,
                        );
                        LineView::Citation {
                            sources_open: state.sources.is_open(&key),
                            sources: state.sources.entries_for(&key).to_vec(),
                            entity_name,
                            key,
                        }
                    }
                })
                .collect();
            let graph_action_visible = message.is_from_assistant
                && match state.config.graph_action {
                    GraphActionReveal::Always => true,
                    GraphActionReveal::OnHover => state.hovered == Some(message.id),
                };
            MessageView {
                id: message.id,
                is_from_assistant: message.is_from_assistant,
                lines,
                graph_action_visible,
            }
        })
        .collect();

    let popups = HighlightKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let set = state.highlights.get(kind);
            set.is_shown().then(|| PopupView {
                kind,
                names: set.names.clone(),
            })
        })
        .collect();

    AppViewModel {
        conversation_name: state.display_name.clone(),
        source_count: state.source_count,
        chat_ready: state.chat_ready,
        input: state.input.clone(),
        submit_enabled: state.conversation.is_some()
            && !state.is_sending()
            && !state.input.trim().is_empty(),
        thinking: state.is_sending(),
        confirm_clear: state.confirm_clear,
        notice: state.notice.clone(),
        messages,
        popups,
    }
}
