//! Terminal input to messages.

use braintrace_core::{AppViewModel, ConversationId, HighlightKind, MessageId, Msg};

use super::render::citations;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    /// Graph view clears one of its own highlights.
    GraphClear(HighlightKind),
    /// Graph view reports entities added since the last rebuild.
    GraphReportNew(Vec<String>),
    Help,
    Quit,
    Invalid(String),
}

pub fn parse(line: &str, view: &AppViewModel) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Dispatch(Vec::new());
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Dispatch(vec![Msg::InputChanged(line.to_string()), Msg::SubmitClicked]);
    };
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let one = |msg: Msg| Command::Dispatch(vec![msg]);
    match name {
        "load" if !args.is_empty() => one(Msg::ConversationSelected(ConversationId::new(args))),
        "load" => Command::Invalid("usage: /load <id>".into()),
        "clear" => one(Msg::ClearRequested),
        "yes" => one(Msg::ClearConfirmed),
        "no" => one(Msg::ClearCancelled),
        "sources" => match citation_at(view, args) {
            Ok(index) => one(Msg::SourcesToggled(citations(view)[index].key.clone())),
            Err(err) => Command::Invalid(err),
        },
        "cite" => match citation_at(view, args) {
            Ok(index) => one(Msg::CitationClicked(
                citations(view)[index].entity_name.to_string(),
            )),
            Err(err) => Command::Invalid(err),
        },
        "open" => open_source(view, args),
        "copy" => match message_at(view, args) {
            Ok(id) => one(Msg::CopyClicked(id)),
            Err(err) => Command::Invalid(err),
        },
        "graph" => match message_at(view, args) {
            Ok(id) => one(Msg::ShowInGraphClicked(id)),
            Err(err) => Command::Invalid(err),
        },
        "hover" if args.is_empty() => one(Msg::MessageHovered(None)),
        "hover" => match message_at(view, args) {
            Ok(id) => one(Msg::MessageHovered(Some(id))),
            Err(err) => Command::Invalid(err),
        },
        "focus" => one(Msg::FocusNamesSupplied(names(args))),
        "dismiss" => match kind(args) {
            Some(kind) => one(Msg::HighlightDismissed(kind)),
            None => Command::Invalid(format!("unknown highlight {args:?}")),
        },
        "full" => one(Msg::FullViewRequested),
        "ok" => one(Msg::NoticeDismissed),
        "rebuild" => one(Msg::GraphRebuilt),
        "new" => Command::GraphReportNew(names(args)),
        "gclear" => match kind(args) {
            Some(kind) => Command::GraphClear(kind),
            None => Command::Invalid(format!("unknown highlight {args:?}")),
        },
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Invalid(format!("unknown command /{name}")),
    }
}

fn number(arg: &str, what: &str, len: usize) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(format!("no {what} {arg:?}")),
    }
}

fn citation_at(view: &AppViewModel, arg: &str) -> Result<usize, String> {
    number(arg, "citation", citations(view).len())
}

fn message_at(view: &AppViewModel, arg: &str) -> Result<MessageId, String> {
    let index = number(arg, "message", view.messages.len())?;
    Ok(view.messages[index].id)
}

fn open_source(view: &AppViewModel, args: &str) -> Command {
    let mut parts = args.split_whitespace();
    let (Some(citation), Some(source)) = (parts.next(), parts.next()) else {
        return Command::Invalid("usage: /open <citation> <source>".into());
    };
    let all = citations(view);
    let picked = number(citation, "citation", all.len()).and_then(|index| {
        let sources = all[index].sources;
        number(source, "source", sources.len()).map(|k| sources[k].id.clone())
    });
    match picked {
        Ok(source_id) => Command::Dispatch(vec![Msg::SourceOpened(source_id)]),
        Err(err) => Command::Invalid(err),
    }
}

fn kind(arg: &str) -> Option<HighlightKind> {
    match arg {
        "referenced" | "ref" => Some(HighlightKind::Referenced),
        "focus" => Some(HighlightKind::Focus),
        "new" | "newly-added" => Some(HighlightKind::NewlyAdded),
        _ => None,
    }
}

fn names(args: &str) -> Vec<String> {
    args.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use braintrace_core::{LineView, MessageView, SourceEntry, SourceKey};
    use pretty_assertions::assert_eq;

    fn view() -> AppViewModel {
        AppViewModel {
            messages: vec![MessageView {
                id: MessageId::Provisional(9),
                is_from_assistant: true,
                lines: vec![
                    LineView::Citation {
                        entity_name: "지구".into(),
                        key: SourceKey::in_message(MessageId::Provisional(9), "지구"),
                        sources_open: true,
                        sources: vec![SourceEntry {
                            id: "67".into(),
                            title: "earth.pdf".into(),
                        }],
                    },
                    LineView::Citation {
                        entity_name: "달".into(),
                        key: SourceKey::in_message(MessageId::Provisional(9), "달"),
                        sources_open: false,
                        sources: Vec::new(),
                    },
                ],
                graph_action_visible: true,
            }],
            ..AppViewModel::default()
        }
    }

    #[test]
    fn plain_text_is_submitted() {
        assert_eq!(
            parse("  Tell me about Earth ", &view()),
            Command::Dispatch(vec![
                Msg::InputChanged("Tell me about Earth".into()),
                Msg::SubmitClicked
            ])
        );
        assert_eq!(parse("   ", &view()), Command::Dispatch(Vec::new()));
    }

    #[test]
    fn numbered_targets_resolve_against_the_view() {
        let view = view();
        assert_eq!(
            parse("/sources 2", &view),
            Command::Dispatch(vec![Msg::SourcesToggled(SourceKey::in_message(
                MessageId::Provisional(9),
                "달"
            ))])
        );
        assert_eq!(
            parse("/open 1 1", &view),
            Command::Dispatch(vec![Msg::SourceOpened("67".into())])
        );
        assert_eq!(
            parse("/graph 1", &view),
            Command::Dispatch(vec![Msg::ShowInGraphClicked(MessageId::Provisional(9))])
        );
        assert!(matches!(parse("/sources 3", &view), Command::Invalid(_)));
        assert!(matches!(parse("/open 2 1", &view), Command::Invalid(_)));
    }

    #[test]
    fn graph_side_commands() {
        let view = view();
        assert_eq!(
            parse("/new 화성, , 금성", &view),
            Command::GraphReportNew(vec!["화성".into(), "금성".into()])
        );
        assert_eq!(
            parse("/gclear focus", &view),
            Command::GraphClear(HighlightKind::Focus)
        );
        assert_eq!(
            parse("/dismiss new", &view),
            Command::Dispatch(vec![Msg::HighlightDismissed(HighlightKind::NewlyAdded)])
        );
        assert_eq!(parse("/load", &view), Command::Invalid("usage: /load <id>".into()));
    }
}
