use std::fmt;

/// Knowledge-base conversation key as the backend spells it (a decimal id string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Message identity. Provisional ids are replaced, never merged, once the
/// server assigns a chat id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageId {
    Provisional(u64),
    Persisted(i64),
}

impl MessageId {
    pub fn is_provisional(self) -> bool {
        matches!(self, MessageId::Provisional(_))
    }

    pub fn persisted(self) -> Option<i64> {
        match self {
            MessageId::Persisted(id) => Some(id),
            MessageId::Provisional(_) => None,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Provisional(id) => write!(f, "tmp-{id}"),
            MessageId::Persisted(id) => write!(f, "{id}"),
        }
    }
}

/// Source document id as returned by the lookup endpoint.
pub type SourceId = String;

/// Bumped on every conversation switch; completions from an older generation
/// are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Bumped on every length change of the transcript. Fetches carry the
/// revision they were issued at so late replies can be merged or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Revision(pub u64);

impl Revision {
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Strictly increasing provisional id source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProvisionalIds {
    next: u64,
}

impl ProvisionalIds {
    pub(crate) fn starting_at(seed: u64) -> Self {
        Self { next: seed.max(1) }
    }

    pub(crate) fn allocate(&mut self) -> MessageId {
        let id = self.next;
        self.next += 1;
        MessageId::Provisional(id)
    }
}

impl Default for ProvisionalIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
