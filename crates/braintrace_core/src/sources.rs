//! Lazily resolved source lists for cited entities.

use std::collections::HashMap;

use crate::{MessageId, SourceEntry, SourceScope};

/// Cache key. `message_id` is `None` under [`SourceScope::PerEntity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub message_id: Option<MessageId>,
    pub entity_name: String,
}

impl SourceKey {
    pub fn entity(entity_name: impl Into<String>) -> Self {
        Self {
            message_id: None,
            entity_name: entity_name.into(),
        }
    }

    pub fn in_message(message_id: MessageId, entity_name: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id),
            entity_name: entity_name.into(),
        }
    }

    /// Builds the key the configured scope uses for a citation in `message_id`.
    pub fn scoped(scope: SourceScope, message_id: MessageId, entity_name: &str) -> Self {
        match scope {
            SourceScope::PerMessage => Self::in_message(message_id, entity_name),
            SourceScope::PerEntity => Self::entity(entity_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The key was open and is now closed; nothing to fetch.
    Closed,
    /// The key is closed; a lookup must run before it opens.
    LookupNeeded,
}

/// Open-map of source lists. Closing is local; every open re-fetches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceCache {
    open: HashMap<SourceKey, Vec<SourceEntry>>,
}

impl SourceCache {
    pub fn toggle(&mut self, key: &SourceKey) -> Toggle {
        if self.open.remove(key).is_some() {
            Toggle::Closed
        } else {
            Toggle::LookupNeeded
        }
    }

    /// Binds a lookup result; a failed lookup opens the key with no entries.
    /// Later results for the same key overwrite earlier ones.
    pub fn resolve(&mut self, key: SourceKey, result: Result<Vec<SourceEntry>, String>) {
        let entries = result.unwrap_or_default();
        self.open.insert(key, entries);
    }

    pub fn is_open(&self, key: &SourceKey) -> bool {
        self.open.contains_key(key)
    }

    pub fn entries_for(&self, key: &SourceKey) -> &[SourceEntry] {
        self.open.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.open.clear();
    }

    /// Moves entries keyed on a provisional message id to its confirmed id.
    pub(crate) fn rekey(&mut self, from: MessageId, to: MessageId) {
        let moved: Vec<SourceKey> = self
            .open
            .keys()
            .filter(|key| key.message_id == Some(from))
            .cloned()
            .collect();
        for key in moved {
            if let Some(entries) = self.open.remove(&key) {
                self.open
                    .insert(SourceKey::in_message(to, key.entity_name), entries);
            }
        }
    }
}
