use std::sync::Once;

use braintrace_core::{
    update, AnswerReply, AppState, ConversationId, Effect, Generation, GraphCommand,
    HighlightKind, HighlightSet, Message, MessageDraft, MessageId, Msg, TurnState,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(braintrace_logging::initialize_for_tests);
}

fn opened(id: &str) -> AppState {
    let (state, _) = update(AppState::new(), Msg::ConversationSelected(id.into()));
    let generation = state.generation();
    let revision = state.transcript().revision();
    let (state, _) = update(
        state,
        Msg::TranscriptLoaded {
            generation,
            revision,
            result: Ok(Vec::new()),
        },
    );
    state
}

fn submit(state: AppState, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::SubmitClicked)
}

fn answer(state: AppState, reply: AnswerReply) -> (AppState, Vec<Effect>) {
    let generation = state.generation();
    update(
        state,
        Msg::AnswerReceived {
            generation,
            result: Ok(reply),
        },
    )
}

fn texts(state: &AppState) -> Vec<(bool, String)> {
    state
        .transcript()
        .messages()
        .iter()
        .map(|m| (m.is_from_assistant, m.text.clone()))
        .collect()
}

#[test]
fn earth_question_round_trip() {
    init_logging();
    let state = opened("42");
    let (state, effects) = submit(state, "지구는 왜 둥글까?");

    assert_eq!(
        effects,
        vec![Effect::RequestAnswer {
            generation: state.generation(),
            conversation_id: ConversationId::new("42"),
            question: "지구는 왜 둥글까?".to_string(),
            model_hint: "gpt".to_string(),
        }]
    );
    assert_eq!(state.input(), "");
    assert!(state.is_sending());

    let (state, effects) = answer(
        state,
        AnswerReply {
            answer: Some("- 지구\n중력 때문입니다".into()),
            message: None,
            chat_id: None,
            referenced_entity_names: vec!["지구".into()],
        },
    );

    assert_eq!(
        texts(&state),
        vec![
            (false, "지구는 왜 둥글까?".to_string()),
            (true, "- 지구\n중력 때문입니다".to_string()),
        ]
    );
    assert_eq!(
        state.highlights().referenced,
        HighlightSet {
            visible: true,
            names: vec!["지구".to_string()],
        }
    );
    assert_eq!(state.turn(), &TurnState::Idle);
    assert!(effects.contains(&Effect::Graph(GraphCommand::Show {
        kind: HighlightKind::Referenced,
        names: vec!["지구".to_string()],
    })));
    let persisted: Vec<&MessageDraft> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::PersistMessage { draft, .. } => Some(draft),
            _ => None,
        })
        .collect();
    assert_eq!(
        persisted,
        vec![&MessageDraft {
            is_from_assistant: true,
            text: "- 지구\n중력 때문입니다".to_string(),
            referenced_entity_names: vec!["지구".to_string()],
        }]
    );
}

#[test]
fn blank_input_never_sends() {
    init_logging();
    let state = opened("42");
    let before = state.transcript().len();

    for input in ["", "   ", "\n\t "] {
        let (next, effects) = submit(state.clone(), input);
        assert!(effects.is_empty());
        assert_eq!(next.transcript().len(), before);
        assert!(!next.is_sending());
    }
}

#[test]
fn second_submit_while_sending_is_refused() {
    init_logging();
    let (state, effects) = submit(opened("42"), "first");
    assert_eq!(effects.len(), 1);

    let (state, effects) = submit(state, "second");
    assert!(effects.is_empty());
    assert_eq!(state.transcript().len(), 1);
    // The refused input stays in the field.
    assert_eq!(state.input(), "second");
}

#[test]
fn submit_without_conversation_is_refused() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "hello");
    assert!(effects.is_empty());
    assert!(state.transcript().is_empty());
}

#[test]
fn empty_reply_keeps_only_the_user_message() {
    init_logging();
    let (state, _) = submit(opened("42"), "anything?");
    let (state, effects) = answer(
        state,
        AnswerReply {
            answer: Some("   ".into()),
            message: Some("".into()),
            chat_id: None,
            referenced_entity_names: Vec::new(),
        },
    );

    assert_eq!(texts(&state), vec![(false, "anything?".to_string())]);
    assert_eq!(state.turn(), &TurnState::Idle);
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::PersistMessage { .. })));
}

#[test]
fn guidance_is_appended_after_the_answer() {
    init_logging();
    let (state, _) = submit(opened("42"), "q");
    let (state, effects) = answer(
        state,
        AnswerReply {
            answer: Some("answer".into()),
            message: Some("add more sources".into()),
            chat_id: Some(501),
            referenced_entity_names: vec!["a".into()],
        },
    );

    let messages = state.transcript().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].id, MessageId::Persisted(501));
    assert_eq!(messages[2].text, "add more sources");
    assert!(messages[2].referenced_entity_names.is_empty());
    assert!(messages[2].id.is_provisional());

    let persist_count = effects
        .iter()
        .filter(|effect| matches!(effect, Effect::PersistMessage { .. }))
        .count();
    assert_eq!(persist_count, 2);
}

#[test]
fn failure_keeps_user_message_and_reenables_submit() {
    init_logging();
    let (state, _) = submit(opened("42"), "q");
    let generation = state.generation();
    let (state, effects) = update(
        state,
        Msg::AnswerReceived {
            generation,
            result: Err("http status 500".into()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(texts(&state), vec![(false, "q".to_string())]);
    assert!(state.notice().is_some());
    assert!(!state.is_sending());

    let (state, effects) = submit(state, "retry");
    assert_eq!(effects.len(), 1);
    assert_eq!(state.transcript().len(), 2);
    assert!(state.notice().is_none());
}

#[test]
fn persistence_failure_is_silent() {
    init_logging();
    let (state, _) = submit(opened("42"), "q");
    let (state, _) = answer(
        state,
        AnswerReply {
            answer: Some("a".into()),
            ..AnswerReply::default()
        },
    );
    let answer_id = state.transcript().messages()[1].id;
    let generation = state.generation();

    let (state, effects) = update(
        state,
        Msg::MessagePersisted {
            generation,
            message_id: answer_id,
            result: Err("disk full".into()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.transcript().len(), 2);
    assert!(state.notice().is_none());
}

#[test]
fn persisted_id_replaces_provisional_id() {
    init_logging();
    let (state, _) = submit(opened("42"), "q");
    let (state, _) = answer(
        state,
        AnswerReply {
            answer: Some("a".into()),
            ..AnswerReply::default()
        },
    );
    let answer_id = state.transcript().messages()[1].id;
    assert!(answer_id.is_provisional());
    let generation = state.generation();

    let (state, _) = update(
        state,
        Msg::MessagePersisted {
            generation,
            message_id: answer_id,
            result: Ok(900),
        },
    );

    assert_eq!(state.transcript().messages()[1].id, MessageId::Persisted(900));
    assert!(state.transcript().get(answer_id).is_none());
}

#[test]
fn reconciliation_confirms_the_user_message() {
    init_logging();
    let (state, _) = submit(opened("42"), "q");
    let (state, effects) = answer(
        state,
        AnswerReply {
            answer: Some("a".into()),
            chat_id: Some(12),
            ..AnswerReply::default()
        },
    );
    let generation = state.generation();
    let revision = state.transcript().revision();
    assert!(effects.contains(&Effect::ReconcileTranscript {
        generation,
        revision,
        conversation_id: ConversationId::new("42"),
    }));

    let server = vec![
        Message::user(MessageId::Persisted(11), "q"),
        Message::assistant(MessageId::Persisted(12), "a", Vec::new()),
    ];
    let (state, _) = update(
        state,
        Msg::TranscriptReconciled {
            generation,
            revision,
            result: Ok(server),
        },
    );

    assert!(!state.transcript().has_provisional());
    assert_eq!(state.transcript().messages()[0].id, MessageId::Persisted(11));
}

#[test]
fn stale_answer_after_switch_is_discarded() {
    init_logging();
    let (state, _) = submit(opened("42"), "q");
    let stale = state.generation();

    let (state, _) = update(state, Msg::ConversationSelected("7".into()));
    assert_ne!(state.generation(), stale);
    assert!(!state.is_sending());

    let (state, effects) = update(
        state,
        Msg::AnswerReceived {
            generation: stale,
            result: Ok(AnswerReply {
                answer: Some("late".into()),
                referenced_entity_names: vec!["x".into()],
                ..AnswerReply::default()
            }),
        },
    );

    assert!(effects.is_empty());
    assert!(state.transcript().is_empty());
    assert!(!state.highlights().referenced.visible);
}

#[test]
fn stale_generation_never_matches_fresh_state() {
    let state = AppState::new();
    let (state, effects) = update(
        state,
        Msg::AnswerReceived {
            generation: Generation(99),
            result: Err("boom".into()),
        },
    );
    assert!(effects.is_empty());
    assert!(state.notice().is_none());
}

#[test]
fn late_history_load_keeps_the_turn_in_progress() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ConversationSelected("42".into()));
    let fetched_at = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchTranscript { revision, .. } => Some(*revision),
            _ => None,
        })
        .unwrap();

    let (state, _) = submit(state, "지구는 왜 둥글까?");
    let (state, _) = answer(
        state,
        AnswerReply {
            answer: Some("중력 때문입니다".into()),
            chat_id: Some(30),
            ..AnswerReply::default()
        },
    );

    let generation = state.generation();
    let (state, _) = update(
        state,
        Msg::TranscriptLoaded {
            generation,
            revision: fetched_at,
            result: Ok(vec![Message::user(MessageId::Persisted(1), "이전 질문")]),
        },
    );

    assert_eq!(
        texts(&state),
        vec![
            (false, "이전 질문".to_string()),
            (false, "지구는 왜 둥글까?".to_string()),
            (true, "중력 때문입니다".to_string()),
        ]
    );
    assert_eq!(state.view().chat_ready, Some(true));
}

#[test]
fn late_history_load_adopts_the_saved_question() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ConversationSelected("42".into()));
    let fetched_at = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchTranscript { revision, .. } => Some(*revision),
            _ => None,
        })
        .unwrap();
    let (state, _) = submit(state, "q");
    let question = state.transcript().messages()[0].id;

    let generation = state.generation();
    let (state, _) = update(
        state,
        Msg::TranscriptLoaded {
            generation,
            revision: fetched_at,
            result: Ok(vec![Message::user(MessageId::Persisted(11), "q")]),
        },
    );

    assert_eq!(state.transcript().len(), 1);
    assert!(state.transcript().get(question).is_none());
    assert_eq!(state.transcript().messages()[0].id, MessageId::Persisted(11));
    assert!(state.is_sending());
}
