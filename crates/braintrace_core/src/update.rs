use braintrace_logging::{bt_debug, bt_info, bt_warn};

use crate::sources::Toggle;
use crate::{
    AnswerOutcome, AnswerReply, AppState, CitationMode, Effect, Generation, GraphCommand,
    HighlightKind, Message, MessageDraft, MessageId, Msg, TurnState,
};

const ANSWER_FAILED_NOTICE: &str = "An error occurred while generating the answer.";
const DELETE_FAILED_NOTICE: &str = "An error occurred while deleting the conversation.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ConversationSelected(conversation_id) => {
            state.switch_to(conversation_id.clone());
            state.mark_dirty();
            let generation = state.generation;
            bt_info!("conversation selected ({generation})");
            let mut effects = vec![
                Effect::FetchMetadata {
                    generation,
                    conversation_id: conversation_id.clone(),
                },
                Effect::FetchTranscript {
                    generation,
                    revision: state.transcript.revision(),
                    conversation_id: conversation_id.clone(),
                },
                Effect::CountSources {
                    generation,
                    conversation_id: conversation_id.clone(),
                },
            ];
            if state.config.citation_mode == CitationMode::Strict {
                effects.push(Effect::LoadEntityUniverse {
                    generation,
                    conversation_id,
                });
            }
            effects.push(Effect::Graph(GraphCommand::ResetAll));
            effects
        }
        Msg::InputChanged(text) => {
            state.input = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::ClearRequested => {
            if !state.transcript.is_empty() && !state.confirm_clear {
                state.confirm_clear = true;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ClearCancelled => {
            if state.confirm_clear {
                state.confirm_clear = false;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ClearConfirmed => {
            let Some(conversation_id) = state.conversation.clone() else {
                return (state, Vec::new());
            };
            if !state.confirm_clear {
                return (state, Vec::new());
            }
            vec![Effect::DeleteTranscript {
                generation: state.generation,
                conversation_id,
            }]
        }
        Msg::SourcesToggled(key) => {
            let Some(conversation_id) = state.conversation.clone() else {
                return (state, Vec::new());
            };
            match state.sources.toggle(&key) {
                Toggle::Closed => {
                    state.mark_dirty();
                    Vec::new()
                }
                Toggle::LookupNeeded => vec![Effect::LookupSources {
                    generation: state.generation,
                    conversation_id,
                    key,
                }],
            }
        }
        Msg::SourceOpened(source_id) => vec![Effect::OpenSource { source_id }],
        Msg::CopyClicked(message_id) => match state.transcript.get(message_id) {
            Some(message) => vec![Effect::CopyMessage {
                message_id: message.id.persisted(),
                fallback_text: message.text.clone(),
            }],
            None => Vec::new(),
        },
        Msg::ShowInGraphClicked(message_id) => show_in_graph(&mut state, message_id),
        Msg::CitationClicked(entity_name) => {
            supply(&mut state, HighlightKind::Referenced, vec![entity_name])
        }
        Msg::MessageHovered(hovered) => {
            if state.hovered != hovered {
                state.hovered = hovered;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::HighlightDismissed(kind) => {
            if state.highlights.hide(kind) {
                state.mark_dirty();
            }
            // Forward even when already hidden so the graph's copy cannot drift.
            vec![Effect::Graph(GraphCommand::Hide(kind))]
        }
        Msg::FullViewRequested => match state.conversation.clone() {
            Some(conversation_id) => vec![Effect::OpenFullView {
                conversation_id,
                highlights: state.highlights.clone(),
                node_count: state.graph_node_count,
            }],
            None => Vec::new(),
        },
        Msg::NoticeDismissed => {
            if state.notice.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }

        Msg::GraphRebuilt => {
            state.highlights.reset();
            state.mark_dirty();
            let mut effects = vec![Effect::Graph(GraphCommand::ResetAll)];
            if let Some(conversation_id) = state.conversation.clone() {
                effects.push(Effect::CountSources {
                    generation: state.generation,
                    conversation_id: conversation_id.clone(),
                });
                if state.config.citation_mode == CitationMode::Strict {
                    effects.push(Effect::LoadEntityUniverse {
                        generation: state.generation,
                        conversation_id,
                    });
                }
            }
            effects
        }
        Msg::FocusNamesSupplied(names) => supply(&mut state, HighlightKind::Focus, names),
        Msg::NewlyAddedReported(names) => {
            // The graph view already shows these; only the host copy changes.
            if state.highlights.supply(HighlightKind::NewlyAdded, names) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::GraphHighlightCleared(kind) => {
            if state.highlights.hide(kind) {
                state.mark_dirty();
            }
            Vec::new()
        }

        Msg::MetadataLoaded { generation, result } => {
            if !is_current(&state, generation, "metadata") {
                return (state, Vec::new());
            }
            state.display_name = match result {
                Ok(name) => name,
                Err(err) => {
                    bt_warn!("conversation metadata unavailable: {err}");
                    fallback_display_name(&state)
                }
            };
            state.mark_dirty();
            Vec::new()
        }
        Msg::TranscriptLoaded {
            generation,
            revision,
            result,
        } => {
            if !is_current(&state, generation, "transcript") {
                return (state, Vec::new());
            }
            let (messages, ready) = match result {
                Ok(messages) => (messages, true),
                Err(err) => {
                    bt_warn!("transcript fetch failed: {err}");
                    (Vec::new(), false)
                }
            };
            // Entries appended while the fetch was out stay behind the history.
            match state.transcript.apply_snapshot(messages, revision) {
                Some(renamed) => {
                    for (from, to) in renamed {
                        rekey(&mut state, from, to);
                    }
                    state.chat_ready = Some(ready);
                    state.mark_dirty();
                }
                None => bt_debug!("discarding transcript from {revision}; cleared since"),
            }
            Vec::new()
        }
        Msg::SourceCountLoaded { generation, result } => {
            if !is_current(&state, generation, "source count") {
                return (state, Vec::new());
            }
            state.source_count = result.unwrap_or_else(|err| {
                bt_warn!("source count unavailable: {err}");
                0
            });
            state.mark_dirty();
            Vec::new()
        }
        Msg::EntityUniverseLoaded { generation, result } => {
            if !is_current(&state, generation, "entity names") {
                return (state, Vec::new());
            }
            match result {
                Ok(names) => {
                    state.graph_node_count = Some(names.len());
                    state.entity_universe = Some(names.into_iter().collect());
                    state.mark_dirty();
                }
                // Strict matching keeps falling back to loose until a universe arrives.
                Err(err) => bt_warn!("entity names unavailable: {err}"),
            }
            Vec::new()
        }
        Msg::AnswerReceived { generation, result } => {
            if !is_current(&state, generation, "answer") {
                return (state, Vec::new());
            }
            answer_received(&mut state, result)
        }
        Msg::MessagePersisted {
            generation,
            message_id,
            result,
        } => {
            if !is_current(&state, generation, "persist result") {
                return (state, Vec::new());
            }
            match result {
                Ok(chat_id) => {
                    if message_id.is_provisional() && state.transcript.confirm(message_id, chat_id)
                    {
                        rekey(&mut state, message_id, MessageId::Persisted(chat_id));
                        state.mark_dirty();
                    }
                }
                Err(err) => bt_warn!("saving message {message_id} failed: {err}"),
            }
            Vec::new()
        }
        Msg::TranscriptDeleted { generation, result } => {
            if !is_current(&state, generation, "delete result") {
                return (state, Vec::new());
            }
            state.confirm_clear = false;
            state.mark_dirty();
            match result {
                Ok(()) => {
                    state.transcript.clear_all();
                    state.sources.clear();
                    state.hovered = None;
                    match state.conversation.clone() {
                        Some(conversation_id) => vec![Effect::FetchTranscript {
                            generation,
                            revision: state.transcript.revision(),
                            conversation_id,
                        }],
                        None => Vec::new(),
                    }
                }
                Err(err) => {
                    bt_warn!("deleting transcript failed: {err}");
                    state.notice = Some(DELETE_FAILED_NOTICE.to_string());
                    Vec::new()
                }
            }
        }
        Msg::TranscriptReconciled {
            generation,
            revision,
            result,
        } => {
            if !is_current(&state, generation, "reconcile") {
                return (state, Vec::new());
            }
            if state.transcript.reset_since(revision) {
                bt_debug!("discarding reconcile from {revision}; cleared since");
                return (state, Vec::new());
            }
            match result {
                Ok(server) => {
                    let renamed = state.transcript.reconcile(&server);
                    if !renamed.is_empty() {
                        for (from, to) in renamed {
                            rekey(&mut state, from, to);
                        }
                        state.mark_dirty();
                    }
                }
                Err(err) => bt_debug!("reconcile fetch failed: {err}"),
            }
            Vec::new()
        }
        Msg::SourcesResolved {
            generation,
            key,
            result,
        } => {
            if !is_current(&state, generation, "sources") {
                return (state, Vec::new());
            }
            if let Err(err) = &result {
                bt_warn!("source lookup for {:?} failed: {err}", key.entity_name);
            }
            state.sources.resolve(key, result);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ReferencedEntitiesLoaded { generation, result } => {
            if !is_current(&state, generation, "referenced entities") {
                return (state, Vec::new());
            }
            match result {
                Ok(names) => supply(&mut state, HighlightKind::Referenced, names),
                Err(err) => {
                    bt_warn!("referenced entity lookup failed: {err}");
                    Vec::new()
                }
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    let Some(conversation_id) = state.conversation.clone() else {
        return Vec::new();
    };
    if state.input.trim().is_empty() || state.is_sending() {
        return Vec::new();
    }
    let question = std::mem::take(&mut state.input);
    let id = state.next_provisional_id();
    let started_at = state.transcript.revision();
    state.transcript.append(Message::user(id, question.clone()));
    state.turn = TurnState::Sending {
        question: question.clone(),
        started_at,
    };
    state.notice = None;
    state.mark_dirty();
    bt_info!("turn started with {} chars", question.chars().count());
    vec![Effect::RequestAnswer {
        generation: state.generation,
        conversation_id,
        question,
        model_hint: state.config.model_hint.clone(),
    }]
}

fn answer_received(state: &mut AppState, result: Result<AnswerReply, String>) -> Vec<Effect> {
    // Every completion ends the turn, success or not.
    let started_at = match std::mem::take(&mut state.turn) {
        TurnState::Sending { started_at, .. } => started_at,
        TurnState::Idle => state.transcript.revision(),
    };
    state.mark_dirty();
    let Some(conversation_id) = state.conversation.clone() else {
        return Vec::new();
    };
    let generation = state.generation;

    let outcome = match result {
        Ok(reply) => reply.classify(),
        Err(err) => {
            bt_warn!("answer request failed: {err}");
            state.notice = Some(ANSWER_FAILED_NOTICE.to_string());
            return Vec::new();
        }
    };

    let referenced = outcome.referenced().to_vec();
    let (answer, guidance) = match outcome {
        AnswerOutcome::Empty => {
            bt_debug!("answer carried nothing to show");
            (None, None)
        }
        AnswerOutcome::Answer {
            text,
            chat_id,
            referenced,
        } => (Some((text, chat_id, referenced)), None),
        AnswerOutcome::Guidance { text } => (None, Some(text)),
        AnswerOutcome::AnswerWithGuidance {
            text,
            chat_id,
            referenced,
            guidance,
        } => (Some((text, chat_id, referenced)), Some(guidance)),
    };

    let mut effects = Vec::new();
    if let Some((text, chat_id, referenced)) = answer {
        let id = match chat_id {
            Some(chat_id) => MessageId::Persisted(chat_id),
            None => state.next_provisional_id(),
        };
        effects.push(append_and_persist(
            state,
            Message::assistant(id, text, referenced),
            generation,
            &conversation_id,
        ));
    }
    if let Some(text) = guidance {
        let id = state.next_provisional_id();
        effects.push(append_and_persist(
            state,
            Message::assistant(id, text, Vec::new()),
            generation,
            &conversation_id,
        ));
    }
    if state.highlights.supply(HighlightKind::Referenced, referenced.clone()) {
        effects.push(Effect::Graph(GraphCommand::Show {
            kind: HighlightKind::Referenced,
            names: referenced,
        }));
    }
    // Entries left unmatched by earlier turns do not trigger another fetch.
    if state.transcript.has_provisional_since(started_at) {
        effects.push(Effect::ReconcileTranscript {
            generation,
            revision: state.transcript.revision(),
            conversation_id,
        });
    }
    effects
}

fn append_and_persist(
    state: &mut AppState,
    message: Message,
    generation: Generation,
    conversation_id: &crate::ConversationId,
) -> Effect {
    let effect = Effect::PersistMessage {
        generation,
        conversation_id: conversation_id.clone(),
        message_id: message.id,
        draft: MessageDraft::from(&message),
    };
    state.transcript.append(message);
    effect
}

fn show_in_graph(state: &mut AppState, message_id: MessageId) -> Vec<Effect> {
    let Some(message) = state.transcript.get(message_id) else {
        return Vec::new();
    };
    if !message.is_from_assistant {
        return Vec::new();
    }
    match message.id {
        MessageId::Persisted(chat_id) => vec![Effect::LookupReferencedEntities {
            generation: state.generation,
            message_id: chat_id,
        }],
        // Not known to the server yet; use what the answer carried.
        MessageId::Provisional(_) => {
            let names = message.referenced_entity_names.clone();
            supply(state, HighlightKind::Referenced, names)
        }
    }
}

fn supply(state: &mut AppState, kind: HighlightKind, names: Vec<String>) -> Vec<Effect> {
    if !state.highlights.supply(kind, names.clone()) {
        return Vec::new();
    }
    state.mark_dirty();
    vec![Effect::Graph(GraphCommand::Show { kind, names })]
}

fn rekey(state: &mut AppState, from: MessageId, to: MessageId) {
    state.sources.rekey(from, to);
    if state.hovered == Some(from) {
        state.hovered = Some(to);
    }
}

fn is_current(state: &AppState, generation: Generation, what: &str) -> bool {
    if generation == state.generation {
        return true;
    }
    bt_debug!(
        "discarding stale {what} from {generation}; current is {}",
        state.generation
    );
    false
}

fn fallback_display_name(state: &AppState) -> String {
    match &state.conversation {
        Some(id) => format!("Conversation #{id}"),
        None => String::new(),
    }
}
