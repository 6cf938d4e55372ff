use std::sync::Arc;
use std::time::Duration;

use braintrace_core::{AnswerReply, ConversationId, Message, MessageDraft, MessageId, SourceEntry};
use braintrace_engine::{
    Backend, BackendError, EngineHandle, FailureKind, Reply, Request, Ticket,
};
use pretty_assertions::assert_eq;

const WAIT: Duration = Duration::from_secs(5);

/// Answers from fixed data; `"boom"` panics and `"slow"` never finishes in time.
struct FakeBackend;

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn conversation_metadata(&self, id: &ConversationId) -> Result<String, BackendError> {
        Ok(format!("Brain {id}"))
    }

    async fn fetch_transcript(&self, _id: &ConversationId) -> Result<Vec<Message>, BackendError> {
        Ok(vec![Message::user(MessageId::Persisted(1), "hi")])
    }

    async fn delete_transcript(&self, _id: &ConversationId) -> Result<(), BackendError> {
        Ok(())
    }

    async fn persist_message(
        &self,
        _id: &ConversationId,
        _draft: &MessageDraft,
    ) -> Result<i64, BackendError> {
        Ok(9)
    }

    async fn request_answer(
        &self,
        question: &str,
        _id: &ConversationId,
        _model_hint: &str,
    ) -> Result<AnswerReply, BackendError> {
        match question {
            "boom" => panic!("backend exploded"),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(AnswerReply::default())
            }
            _ => Ok(AnswerReply {
                answer: Some(format!("re: {question}")),
                ..AnswerReply::default()
            }),
        }
    }

    async fn lookup_sources(
        &self,
        entity_name: &str,
        _id: &ConversationId,
    ) -> Result<Vec<SourceEntry>, BackendError> {
        Ok(vec![SourceEntry {
            id: "1".into(),
            title: format!("{entity_name}.pdf"),
        }])
    }

    async fn lookup_referenced_entities(&self, _chat_id: i64) -> Result<Vec<String>, BackendError> {
        Ok(vec!["지구".into()])
    }

    async fn fetch_message_text(&self, _chat_id: i64) -> Result<String, BackendError> {
        Ok("Earth".into())
    }

    async fn count_sources(&self, _id: &ConversationId) -> Result<u64, BackendError> {
        Ok(3)
    }

    async fn fetch_entity_names(&self, _id: &ConversationId) -> Result<Vec<String>, BackendError> {
        Ok(vec!["지구".into(), "달".into()])
    }
}

fn engine() -> EngineHandle {
    braintrace_logging::initialize_for_tests();
    EngineHandle::new(Arc::new(FakeBackend))
}

fn answer(question: &str) -> Request {
    Request::Answer {
        conversation_id: ConversationId::new("7"),
        question: question.into(),
        model_hint: "gpt".into(),
    }
}

#[test]
fn replies_carry_the_submitted_ticket() {
    let engine = engine();
    engine.submit(Ticket(1), Request::Metadata(ConversationId::new("7")));

    let event = engine.recv_timeout(WAIT).expect("event");
    assert_eq!(event.ticket, Ticket(1));
    assert_eq!(event.reply, Reply::Metadata(Ok("Brain 7".into())));
}

#[test]
fn every_request_produces_one_event() {
    let engine = engine();
    engine.submit(Ticket(1), Request::CountSources(ConversationId::new("7")));
    engine.submit(Ticket(2), Request::EntityNames(ConversationId::new("7")));
    engine.submit(Ticket(3), answer("Earth?"));

    let mut tickets = (0..3)
        .map(|_| engine.recv_timeout(WAIT).expect("event").ticket)
        .collect::<Vec<_>>();
    tickets.sort();
    assert_eq!(tickets, vec![Ticket(1), Ticket(2), Ticket(3)]);
    assert!(engine.recv_timeout(Duration::from_millis(100)).is_none());
}

#[test]
fn panicking_request_still_reports_aborted() {
    let engine = engine();
    engine.submit(Ticket(5), answer("boom"));

    let event = engine.recv_timeout(WAIT).expect("event");
    assert_eq!(event.ticket, Ticket(5));
    match event.reply {
        Reply::Answer(Err(err)) => assert_eq!(err.kind, FailureKind::Aborted),
        other => panic!("unexpected reply {other:?}"),
    }
}

#[test]
fn shutdown_aborts_in_flight_requests() {
    let engine = engine();
    engine.submit(Ticket(8), answer("slow"));
    std::thread::sleep(Duration::from_millis(50));
    engine.shutdown();

    let event = engine.recv_timeout(WAIT).expect("event");
    assert_eq!(event.ticket, Ticket(8));
    match event.reply {
        Reply::Answer(Err(err)) => assert_eq!(err.kind, FailureKind::Aborted),
        other => panic!("unexpected reply {other:?}"),
    }
}

#[test]
fn failure_reply_matches_request_kind() {
    let err = BackendError {
        kind: FailureKind::Network,
        message: String::new(),
    };
    assert_eq!(
        Request::ReferencedEntities(4).fail(err.clone()),
        Reply::ReferencedEntities(Err(err.clone()))
    );
    assert_eq!(
        Request::Sources {
            conversation_id: ConversationId::new("7"),
            entity_name: "지구".into(),
        }
        .fail(err.clone()),
        Reply::Sources(Err(err))
    );
}
