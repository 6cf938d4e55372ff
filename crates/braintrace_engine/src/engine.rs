use std::sync::{mpsc, Arc};
use std::thread;

use braintrace_core::{AnswerReply, ConversationId, Message, MessageDraft, SourceEntry};
use braintrace_logging::{bt_debug, bt_error, bt_warn};
use tokio_util::sync::CancellationToken;

use crate::{Backend, BackendError, FailureKind};

/// Correlates a submitted [`Request`] with its [`EngineEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Metadata(ConversationId),
    Transcript(ConversationId),
    CountSources(ConversationId),
    EntityNames(ConversationId),
    Answer {
        conversation_id: ConversationId,
        question: String,
        model_hint: String,
    },
    Persist {
        conversation_id: ConversationId,
        draft: MessageDraft,
    },
    DeleteTranscript(ConversationId),
    Sources {
        conversation_id: ConversationId,
        entity_name: String,
    },
    ReferencedEntities(i64),
    MessageText(i64),
}

impl Request {
    /// The reply this request produces when it cannot complete.
    pub fn fail(&self, err: BackendError) -> Reply {
        match self {
            Request::Metadata(_) => Reply::Metadata(Err(err)),
            Request::Transcript(_) => Reply::Transcript(Err(err)),
            Request::CountSources(_) => Reply::SourceCount(Err(err)),
            Request::EntityNames(_) => Reply::EntityNames(Err(err)),
            Request::Answer { .. } => Reply::Answer(Err(err)),
            Request::Persist { .. } => Reply::Persisted(Err(err)),
            Request::DeleteTranscript(_) => Reply::Deleted(Err(err)),
            Request::Sources { .. } => Reply::Sources(Err(err)),
            Request::ReferencedEntities(_) => Reply::ReferencedEntities(Err(err)),
            Request::MessageText(_) => Reply::MessageText(Err(err)),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Request::Metadata(_) => "metadata",
            Request::Transcript(_) => "transcript",
            Request::CountSources(_) => "source count",
            Request::EntityNames(_) => "entity names",
            Request::Answer { .. } => "answer",
            Request::Persist { .. } => "persist",
            Request::DeleteTranscript(_) => "delete transcript",
            Request::Sources { .. } => "sources",
            Request::ReferencedEntities(_) => "referenced entities",
            Request::MessageText(_) => "message text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Metadata(Result<String, BackendError>),
    Transcript(Result<Vec<Message>, BackendError>),
    SourceCount(Result<u64, BackendError>),
    EntityNames(Result<Vec<String>, BackendError>),
    Answer(Result<AnswerReply, BackendError>),
    Persisted(Result<i64, BackendError>),
    Deleted(Result<(), BackendError>),
    Sources(Result<Vec<SourceEntry>, BackendError>),
    ReferencedEntities(Result<Vec<String>, BackendError>),
    MessageText(Result<String, BackendError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    pub ticket: Ticket,
    pub reply: Reply,
}

enum EngineCommand {
    Submit { ticket: Ticket, request: Request },
}

/// Runs backend requests on a dedicated tokio runtime.
///
/// Every submitted request yields exactly one [`EngineEvent`], including
/// requests whose task panicked or that were cut short by [`shutdown`].
///
/// [`shutdown`]: EngineHandle::shutdown
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    bt_error!("Engine runtime failed to start: {err}");
                    reject_all(cmd_rx, event_tx, &err.to_string());
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Submit { ticket, request } => {
                        let backend = backend.clone();
                        let event_tx = event_tx.clone();
                        let token = token.clone();
                        runtime.spawn(async move {
                            let reply = supervise(backend, request, token).await;
                            let _ = event_tx.send(EngineEvent { ticket, reply });
                        });
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx,
            cancel,
        }
    }

    pub fn submit(&self, ticket: Ticket, request: Request) {
        bt_debug!("Submitting {} request as ticket {}", request.label(), ticket.0);
        let _ = self.cmd_tx.send(EngineCommand::Submit { ticket, request });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocking variant used by tests and the shutdown drain.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Aborts in-flight requests. Their events report [`FailureKind::Aborted`].
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Runs the request as its own task so a panic surfaces through the join
/// handle instead of silently dropping the reply.
async fn supervise(
    backend: Arc<dyn Backend>,
    request: Request,
    token: CancellationToken,
) -> Reply {
    let pending = request.clone();
    let task = tokio::spawn(async move { execute(backend.as_ref(), request).await });
    let abort = task.abort_handle();

    tokio::select! {
        joined = task => match joined {
            Ok(reply) => reply,
            Err(err) => {
                bt_warn!("{} request did not finish: {err}", pending.label());
                pending.fail(BackendError::new(FailureKind::Aborted, err.to_string()))
            }
        },
        _ = token.cancelled() => {
            abort.abort();
            pending.fail(BackendError::new(FailureKind::Aborted, "engine shut down"))
        }
    }
}

async fn execute(backend: &dyn Backend, request: Request) -> Reply {
    match request {
        Request::Metadata(id) => Reply::Metadata(backend.conversation_metadata(&id).await),
        Request::Transcript(id) => Reply::Transcript(backend.fetch_transcript(&id).await),
        Request::CountSources(id) => Reply::SourceCount(backend.count_sources(&id).await),
        Request::EntityNames(id) => Reply::EntityNames(backend.fetch_entity_names(&id).await),
        Request::Answer {
            conversation_id,
            question,
            model_hint,
        } => Reply::Answer(
            backend
                .request_answer(&question, &conversation_id, &model_hint)
                .await,
        ),
        Request::Persist {
            conversation_id,
            draft,
        } => Reply::Persisted(backend.persist_message(&conversation_id, &draft).await),
        Request::DeleteTranscript(id) => Reply::Deleted(backend.delete_transcript(&id).await),
        Request::Sources {
            conversation_id,
            entity_name,
        } => Reply::Sources(backend.lookup_sources(&entity_name, &conversation_id).await),
        Request::ReferencedEntities(chat_id) => {
            Reply::ReferencedEntities(backend.lookup_referenced_entities(chat_id).await)
        }
        Request::MessageText(chat_id) => {
            Reply::MessageText(backend.fetch_message_text(chat_id).await)
        }
    }
}

fn reject_all(
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    reason: &str,
) {
    while let Ok(EngineCommand::Submit { ticket, request }) = cmd_rx.recv() {
        let reply = request.fail(BackendError::new(FailureKind::Aborted, reason));
        let _ = event_tx.send(EngineEvent { ticket, reply });
    }
}
