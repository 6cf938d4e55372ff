use std::path::Path;

use braintrace_core::ConversationId;
use braintrace_engine::{load_if_present, save_atomically};
use braintrace_logging::{bt_error, bt_info, bt_warn};
use serde::{Deserialize, Serialize};

const STATE_FILENAME: &str = ".braintrace_state.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    last_conversation: Option<String>,
}

pub(crate) fn load_last_conversation(dir: &Path) -> Option<ConversationId> {
    let path = dir.join(STATE_FILENAME);
    let content = match load_if_present(&path) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            bt_warn!("Failed to read persisted state from {:?}: {}", path, err);
            return None;
        }
    };

    let state: PersistedState = match ron::from_str(&content) {
        Ok(state) => state,
        Err(err) => {
            bt_warn!("Failed to parse persisted state from {:?}: {}", path, err);
            return None;
        }
    };

    let id = state.last_conversation.map(ConversationId::new);
    if let Some(id) = &id {
        bt_info!("Resuming conversation {} from {:?}", id, path);
    }
    id
}

pub(crate) fn save_last_conversation(dir: &Path, conversation_id: &ConversationId) {
    let state = PersistedState {
        last_conversation: Some(conversation_id.as_str().to_string()),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&state, pretty) {
        Ok(text) => text,
        Err(err) => {
            bt_error!("Failed to serialize persisted state: {}", err);
            return;
        }
    };

    let path = dir.join(STATE_FILENAME);
    if let Err(err) = save_atomically(&path, &content) {
        bt_error!("Failed to write persisted state to {:?}: {}", path, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn remembers_the_last_conversation() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_last_conversation(dir.path()), None);

        save_last_conversation(dir.path(), &ConversationId::new("42"));
        save_last_conversation(dir.path(), &ConversationId::new("43"));
        assert_eq!(
            load_last_conversation(dir.path()),
            Some(ConversationId::new("43"))
        );
    }

    #[test]
    fn unreadable_state_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILENAME), "not ron at all (").unwrap();
        assert_eq!(load_last_conversation(dir.path()), None);
    }
}
