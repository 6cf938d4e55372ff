use std::collections::HashMap;

use braintrace_core::{
    full_view_url, ConversationId, Effect, Generation, GraphSyncBridge, HighlightSets, MessageId,
    Msg, Revision, SourceKey,
};
use braintrace_engine::{EngineEvent, EngineHandle, Reply, Request, Ticket};
use braintrace_logging::{bt_debug, bt_info, bt_warn};
use url::Url;

/// Outward actions that leave the chat surface.
pub trait Surface {
    fn copy_text(&mut self, text: &str) -> Result<(), String>;
    fn open_source(&mut self, source_id: &str);
    fn open_url(&mut self, url: &Url);
}

/// What a ticket's reply turns into.
#[derive(Debug)]
enum Pending {
    Metadata(Generation),
    Transcript(Generation, Revision),
    SourceCount(Generation),
    EntityUniverse(Generation),
    Answer(Generation),
    Persist {
        generation: Generation,
        message_id: MessageId,
    },
    Delete(Generation),
    Reconcile(Generation, Revision),
    Sources {
        generation: Generation,
        key: SourceKey,
    },
    Referenced(Generation),
    Copy {
        fallback_text: String,
    },
}

pub struct EffectRunner {
    engine: EngineHandle,
    next_ticket: u64,
    pending: HashMap<Ticket, Pending>,
    bridge: GraphSyncBridge,
    full_view_base: Url,
    surface: Box<dyn Surface>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, full_view_base: Url, surface: Box<dyn Surface>) -> Self {
        Self {
            engine,
            next_ticket: 1,
            pending: HashMap::new(),
            bridge: GraphSyncBridge::new(),
            full_view_base,
            surface,
        }
    }

    pub fn bridge_mut(&mut self) -> &mut GraphSyncBridge {
        &mut self.bridge
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_one(effect);
        }
    }

    fn run_one(&mut self, effect: Effect) {
        match effect {
            Effect::FetchMetadata {
                generation,
                conversation_id,
            } => self.submit(Pending::Metadata(generation), Request::Metadata(conversation_id)),
            Effect::FetchTranscript {
                generation,
                revision,
                conversation_id,
            } => self.submit(
                Pending::Transcript(generation, revision),
                Request::Transcript(conversation_id),
            ),
            Effect::CountSources {
                generation,
                conversation_id,
            } => self.submit(
                Pending::SourceCount(generation),
                Request::CountSources(conversation_id),
            ),
            Effect::LoadEntityUniverse {
                generation,
                conversation_id,
            } => self.submit(
                Pending::EntityUniverse(generation),
                Request::EntityNames(conversation_id),
            ),
            Effect::RequestAnswer {
                generation,
                conversation_id,
                question,
                model_hint,
            } => {
                bt_info!("Requesting answer len={} model={}", question.len(), model_hint);
                self.submit(
                    Pending::Answer(generation),
                    Request::Answer {
                        conversation_id,
                        question,
                        model_hint,
                    },
                );
            }
            Effect::PersistMessage {
                generation,
                conversation_id,
                message_id,
                draft,
            } => self.submit(
                Pending::Persist {
                    generation,
                    message_id,
                },
                Request::Persist {
                    conversation_id,
                    draft,
                },
            ),
            Effect::DeleteTranscript {
                generation,
                conversation_id,
            } => self.submit(
                Pending::Delete(generation),
                Request::DeleteTranscript(conversation_id),
            ),
            Effect::ReconcileTranscript {
                generation,
                revision,
                conversation_id,
            } => self.submit(
                Pending::Reconcile(generation, revision),
                Request::Transcript(conversation_id),
            ),
            Effect::LookupSources {
                generation,
                conversation_id,
                key,
            } => {
                let entity_name = key.entity_name.clone();
                self.submit(
                    Pending::Sources { generation, key },
                    Request::Sources {
                        conversation_id,
                        entity_name,
                    },
                );
            }
            Effect::LookupReferencedEntities {
                generation,
                message_id,
            } => self.submit(
                Pending::Referenced(generation),
                Request::ReferencedEntities(message_id),
            ),
            Effect::CopyMessage {
                message_id: Some(chat_id),
                fallback_text,
            } => self.submit(
                Pending::Copy { fallback_text },
                Request::MessageText(chat_id),
            ),
            Effect::CopyMessage {
                message_id: None,
                fallback_text,
            } => self.copy(&fallback_text),
            Effect::OpenSource { source_id } => {
                bt_info!("Opening source {}", source_id);
                self.surface.open_source(&source_id);
            }
            Effect::OpenFullView {
                conversation_id,
                highlights,
                node_count,
            } => self.open_full_view(&conversation_id, &highlights, node_count),
            Effect::Graph(command) => self.bridge.apply(&command),
        }
    }

    fn submit(&mut self, pending: Pending, request: Request) {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(ticket, pending);
        self.engine.submit(ticket, request);
    }

    /// Drains finished engine work into completion messages.
    pub fn poll(&mut self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            if let Some(msg) = self.complete(event) {
                msgs.push(msg);
            }
        }
        msgs
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    fn complete(&mut self, event: EngineEvent) -> Option<Msg> {
        let Some(pending) = self.pending.remove(&event.ticket) else {
            bt_warn!("Reply for unknown ticket {}", event.ticket.0);
            return None;
        };
        let msg = match (pending, event.reply) {
            (Pending::Metadata(generation), Reply::Metadata(result)) => Msg::MetadataLoaded {
                generation,
                result: result.map_err(|e| e.to_string()),
            },
            (Pending::Transcript(generation, revision), Reply::Transcript(result)) => {
                Msg::TranscriptLoaded {
                    generation,
                    revision,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            (Pending::Reconcile(generation, revision), Reply::Transcript(result)) => {
                Msg::TranscriptReconciled {
                    generation,
                    revision,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            (Pending::SourceCount(generation), Reply::SourceCount(result)) => {
                Msg::SourceCountLoaded {
                    generation,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            (Pending::EntityUniverse(generation), Reply::EntityNames(result)) => {
                Msg::EntityUniverseLoaded {
                    generation,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            (Pending::Answer(generation), Reply::Answer(result)) => {
                if let Err(err) = &result {
                    bt_warn!("Answer request failed: {}", err);
                }
                Msg::AnswerReceived {
                    generation,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            (
                Pending::Persist {
                    generation,
                    message_id,
                },
                Reply::Persisted(result),
            ) => Msg::MessagePersisted {
                generation,
                message_id,
                result: result.map_err(|e| e.to_string()),
            },
            (Pending::Delete(generation), Reply::Deleted(result)) => Msg::TranscriptDeleted {
                generation,
                result: result.map_err(|e| e.to_string()),
            },
            (Pending::Sources { generation, key }, Reply::Sources(result)) => {
                Msg::SourcesResolved {
                    generation,
                    key,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            (Pending::Referenced(generation), Reply::ReferencedEntities(result)) => {
                Msg::ReferencedEntitiesLoaded {
                    generation,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            (Pending::Copy { fallback_text }, Reply::MessageText(result)) => {
                match result {
                    Ok(text) => self.copy(&text),
                    Err(err) => {
                        bt_warn!("Could not re-read message for copy: {}; using local text", err);
                        self.copy(&fallback_text);
                    }
                }
                return None;
            }
            (pending, reply) => {
                bt_warn!("Mismatched reply {:?} for {:?}", reply, pending);
                return None;
            }
        };
        Some(msg)
    }

    fn copy(&mut self, text: &str) {
        match self.surface.copy_text(text) {
            Ok(()) => bt_debug!("Copied {} chars", text.len()),
            Err(err) => bt_warn!("Copy failed: {}", err),
        }
    }

    fn open_full_view(
        &mut self,
        conversation_id: &ConversationId,
        highlights: &HighlightSets,
        node_count: Option<usize>,
    ) {
        match full_view_url(&self.full_view_base, conversation_id, highlights, node_count) {
            Ok(url) => self.surface.open_url(&url),
            Err(err) => bt_warn!("Could not build full view url: {}", err),
        }
    }
}
