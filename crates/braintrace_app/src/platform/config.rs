use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use braintrace_core::{ChatConfig, CitationMode, ConversationId, GraphActionReveal, SourceScope};
use braintrace_engine::BackendSettings;
use serde::{Deserialize, Serialize};
use url::Url;

use super::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "braintrace.ron";

/// User settings read from `braintrace.ron`. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    /// Where the standalone graph view is served.
    pub full_view_url: String,
    pub model_hint: String,
    pub citation_mode: CitationMode,
    pub graph_action: GraphActionReveal,
    pub source_scope: SourceScope,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub log_destination: LogDestination,
    /// Opened on start instead of the last remembered conversation.
    pub initial_conversation: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        let chat = ChatConfig::default();
        Self {
            backend_url: backend.base_url,
            full_view_url: "http://localhost:5173/".to_string(),
            model_hint: chat.model_hint,
            citation_mode: chat.citation_mode,
            graph_action: chat.graph_action,
            source_scope: chat.source_scope,
            connect_timeout_secs: backend.connect_timeout.as_secs(),
            request_timeout_secs: backend.request_timeout.as_secs(),
            log_destination: LogDestination::default(),
            initial_conversation: None,
        }
    }
}

impl AppConfig {
    /// Reads `path`; an absent file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };
        ron::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            citation_mode: self.citation_mode,
            graph_action: self.graph_action,
            source_scope: self.source_scope,
            model_hint: self.model_hint.clone(),
        }
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.backend_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn full_view_base(&self) -> anyhow::Result<Url> {
        Url::parse(&self.full_view_url)
            .with_context(|| format!("invalid full_view_url {:?}", self.full_view_url))
    }

    pub fn initial_conversation(&self) -> Option<ConversationId> {
        self.initial_conversation
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ConversationId::new)
    }
}
