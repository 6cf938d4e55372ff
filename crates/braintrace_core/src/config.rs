use serde::{Deserialize, Serialize};

/// How citation lines are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CitationMode {
    /// Any dash-prefixed line is a citation.
    #[default]
    Loose,
    /// Only dash-prefixed lines naming a known entity. Behaves like `Loose`
    /// until the entity universe has been loaded.
    Strict,
}

/// When the per-message "show in graph" action is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GraphActionReveal {
    #[default]
    Always,
    OnHover,
}

/// Key granularity for the source cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceScope {
    /// `(message id, entity name)`: the same entity cited twice toggles independently.
    #[default]
    PerMessage,
    /// Entity name only.
    PerEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    pub citation_mode: CitationMode,
    pub graph_action: GraphActionReveal,
    pub source_scope: SourceScope,
    /// Model hint forwarded to the answer endpoint.
    pub model_hint: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            citation_mode: CitationMode::default(),
            graph_action: GraphActionReveal::default(),
            source_scope: SourceScope::default(),
            model_hint: "gpt".to_string(),
        }
    }
}
