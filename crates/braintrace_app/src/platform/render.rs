use std::fmt::Write;

use braintrace_core::{AppViewModel, HighlightKind, HighlightSets, LineView, SourceEntry, SourceKey};

/// A citation as numbered on screen, in transcript order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedCitation<'a> {
    pub entity_name: &'a str,
    pub key: &'a SourceKey,
    pub sources: &'a [SourceEntry],
}

pub fn citations(view: &AppViewModel) -> Vec<NumberedCitation<'_>> {
    view.messages
        .iter()
        .flat_map(|message| message.lines.iter())
        .filter_map(|line| match line {
            LineView::Citation {
                entity_name,
                key,
                sources,
                ..
            } => Some(NumberedCitation {
                entity_name,
                key,
                sources,
            }),
            LineView::Text(_) => None,
        })
        .collect()
}

pub fn render(view: &AppViewModel, graph: &HighlightSets) -> String {
    let mut out = String::new();
    if view.conversation_name.is_empty() {
        out.push_str("== no conversation (/load <id>) ==\n");
    } else {
        let _ = writeln!(
            out,
            "== {} ({} sources) ==",
            view.conversation_name, view.source_count
        );
    }
    if view.chat_ready == Some(false) {
        out.push_str("  Ask something about this brain.\n");
    }

    let mut citation_no = 0;
    for (index, message) in view.messages.iter().enumerate() {
        let author = if message.is_from_assistant {
            "assistant"
        } else {
            "you"
        };
        let _ = writeln!(out, "[{}] {} ({})", index + 1, author, message.id);
        for line in &message.lines {
            match line {
                LineView::Text(text) => {
                    let _ = writeln!(out, "    {text}");
                }
                LineView::Citation {
                    entity_name,
                    sources_open,
                    sources,
                    ..
                } => {
                    citation_no += 1;
                    let _ = writeln!(out, "    - {entity_name}  <{citation_no}>");
                    if *sources_open {
                        if sources.is_empty() {
                            out.push_str("        (no sources)\n");
                        }
                        for (n, source) in sources.iter().enumerate() {
                            let _ = writeln!(out, "        {}. {}", n + 1, source.title);
                        }
                    }
                }
            }
        }
        if message.graph_action_visible {
            let _ = writeln!(out, "    (/graph {} to show in graph)", index + 1);
        }
    }

    for popup in &view.popups {
        let _ = writeln!(
            out,
            "* {}: {}  (/dismiss {})",
            popup.kind.label(),
            popup.names.join(", "),
            kind_keyword(popup.kind)
        );
    }
    let shown = HighlightKind::ALL
        .into_iter()
        .filter(|kind| graph.get(*kind).is_shown())
        .map(|kind| format!("{}[{}]", kind_keyword(kind), graph.get(kind).names.join(",")))
        .collect::<Vec<_>>();
    if !shown.is_empty() {
        let _ = writeln!(out, "graph view: {}", shown.join(" "));
    }

    if view.thinking {
        out.push_str("... thinking\n");
    }
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "! {notice}  (/ok)");
    }
    if view.confirm_clear {
        out.push_str("Delete this conversation's history? /yes or /no\n");
    }
    out
}

pub fn kind_keyword(kind: HighlightKind) -> &'static str {
    match kind {
        HighlightKind::Referenced => "referenced",
        HighlightKind::Focus => "focus",
        HighlightKind::NewlyAdded => "new",
    }
}

pub const HELP: &str = "\
<text>               ask a question
/load <id>           open a conversation
/clear, /yes, /no    clear the history (asks first)
/sources <n>         toggle sources of citation <n>
/cite <n>            highlight the entity of citation <n>
/open <n> <k>        open source <k> of citation <n>
/copy <m>            copy message <m>
/graph <m>           show message <m>'s entities in the graph
/hover [<m>]         hover message <m> (none to leave)
/focus a, b          supply focus entities
/dismiss <kind>      close a popup (referenced, focus, new)
/full                open the full graph view
/ok                  dismiss the notice
/rebuild             graph view: graph was rebuilt
/new a, b            graph view: report newly added entities
/gclear <kind>       graph view: clear its own highlight
/quit";

#[cfg(test)]
mod tests {
    use super::*;
    use braintrace_core::{MessageId, MessageView, PopupView};

    fn sample() -> AppViewModel {
        AppViewModel {
            conversation_name: "Space".into(),
            source_count: 2,
            chat_ready: Some(true),
            messages: vec![
                MessageView {
                    id: MessageId::Persisted(1),
                    is_from_assistant: false,
                    lines: vec![LineView::Text("Earth?".into())],
                    graph_action_visible: false,
                },
                MessageView {
                    id: MessageId::Persisted(2),
                    is_from_assistant: true,
                    lines: vec![
                        LineView::Text("Earth".into()),
                        LineView::Citation {
                            entity_name: "지구".into(),
                            key: SourceKey::entity("지구"),
                            sources_open: true,
                            sources: vec![SourceEntry {
                                id: "3".into(),
                                title: "earth.pdf".into(),
                            }],
                        },
                    ],
                    graph_action_visible: true,
                },
            ],
            popups: vec![PopupView {
                kind: HighlightKind::Referenced,
                names: vec!["지구".into()],
            }],
            ..AppViewModel::default()
        }
    }

    #[test]
    fn numbers_citations_and_lists_open_sources() {
        let text = render(&sample(), &HighlightSets::default());
        assert!(text.starts_with("== Space (2 sources) =="));
        assert!(text.contains("    - 지구  <1>\n        1. earth.pdf\n"));
        assert!(text.contains("(/graph 2 to show in graph)"));
        assert!(text.contains("* referenced: 지구  (/dismiss referenced)"));
        assert!(!text.contains("graph view:"));
    }

    #[test]
    fn citation_numbering_matches_render_order() {
        let view = sample();
        let numbered = citations(&view);
        assert_eq!(numbered.len(), 1);
        assert_eq!(numbered[0].entity_name, "지구");
        assert_eq!(numbered[0].sources.len(), 1);
    }
}
