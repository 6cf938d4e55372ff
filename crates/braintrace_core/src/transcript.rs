use crate::{Message, MessageId, Revision};

/// Ordered messages of the active conversation. Append-only during a turn.
///
/// Every length change bumps the revision. Each entry remembers the revision
/// it was appended at, so a server snapshot taken earlier can be merged
/// without losing entries added since.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    stamps: Vec<Revision>,
    revision: Revision,
    reset_at: Revision,
    scroll_pending: bool,
}

impl Transcript {
    /// Replaces the whole transcript.
    pub fn load(&mut self, messages: Vec<Message>) {
        let changed = messages.len() != self.messages.len();
        self.revision = self.revision.next();
        self.reset_at = self.revision;
        self.stamps = vec![self.revision; messages.len()];
        self.messages = messages;
        self.scroll_pending |= changed;
    }

    pub fn append(&mut self, message: Message) {
        self.revision = self.revision.next();
        self.messages.push(message);
        self.stamps.push(self.revision);
        self.scroll_pending = true;
    }

    /// Applies a server transcript fetched at `taken_at`.
    ///
    /// Returns `None` when the transcript was loaded or cleared since, in
    /// which case the snapshot is ignored. Entries appended after `taken_at`
    /// survive behind the server list; those the server already holds at its
    /// tail are adopted, and the `(old, new)` id pairs are returned.
    pub fn apply_snapshot(
        &mut self,
        server: Vec<Message>,
        taken_at: Revision,
    ) -> Option<Vec<(MessageId, MessageId)>> {
        if self.reset_since(taken_at) {
            return None;
        }
        let Some(first_later) = self.stamps.iter().position(|stamp| *stamp > taken_at) else {
            self.load(server);
            return Some(Vec::new());
        };

        let later = self.messages.split_off(first_later);
        let later_stamps = self.stamps.split_off(first_later);
        let overlap = (0..=later.len().min(server.len()))
            .rev()
            .find(|&n| {
                server[server.len() - n..]
                    .iter()
                    .zip(&later[..n])
                    .all(|(remote, local)| same_entry(local, remote))
            })
            .unwrap_or(0);

        let adopted_from = server.len() - overlap;
        let renamed: Vec<(MessageId, MessageId)> = later[..overlap]
            .iter()
            .zip(&server[adopted_from..])
            .filter(|(local, remote)| local.id.is_provisional() && local.id != remote.id)
            .map(|(local, remote)| (local.id, remote.id))
            .collect();

        let before = self.messages.len() + later.len();
        let mut stamps = vec![taken_at; adopted_from];
        stamps.extend(&later_stamps[..overlap]);
        let kept: Vec<(Message, Revision)> = later
            .into_iter()
            .zip(later_stamps)
            .skip(overlap)
            .filter(|(local, _)| {
                local.id.is_provisional() || !server.iter().any(|remote| remote.id == local.id)
            })
            .collect();
        self.messages = server;
        for (message, stamp) in kept {
            self.messages.push(message);
            stamps.push(stamp);
        }
        self.stamps = stamps;
        self.revision = self.revision.next();
        self.scroll_pending |= self.messages.len() != before;
        Some(renamed)
    }

    /// Swaps a provisional id for the server id. Returns false when no
    /// message carries `provisional` any more.
    pub fn confirm(&mut self, provisional: MessageId, persisted: i64) -> bool {
        match self.messages.iter_mut().find(|m| m.id == provisional) {
            Some(message) if provisional.is_provisional() => {
                message.id = MessageId::Persisted(persisted);
                true
            }
            _ => false,
        }
    }

    /// Assigns server ids to provisional entries whose positional counterpart
    /// in `server` has the same author and text. Returns the `(old, new)` pairs.
    pub fn reconcile(&mut self, server: &[Message]) -> Vec<(MessageId, MessageId)> {
        let mut renamed = Vec::new();
        for (local, remote) in self.messages.iter_mut().zip(server) {
            if !local.id.is_provisional() || remote.id.is_provisional() {
                continue;
            }
            if local.is_from_assistant == remote.is_from_assistant && local.text == remote.text {
                renamed.push((local.id, remote.id));
                local.id = remote.id;
            }
        }
        renamed
    }

    pub fn clear_all(&mut self) {
        if !self.messages.is_empty() {
            self.scroll_pending = true;
        }
        self.revision = self.revision.next();
        self.reset_at = self.revision;
        self.messages.clear();
        self.stamps.clear();
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// True when a load or clear happened after `revision`.
    pub fn reset_since(&self, revision: Revision) -> bool {
        self.reset_at > revision
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn has_provisional(&self) -> bool {
        self.messages.iter().any(|m| m.id.is_provisional())
    }

    /// Provisional entries appended after `revision`.
    pub fn has_provisional_since(&self, revision: Revision) -> bool {
        self.messages
            .iter()
            .zip(&self.stamps)
            .any(|(m, stamp)| *stamp > revision && m.id.is_provisional())
    }

    /// True once after any length change; drives scroll-to-latest.
    pub fn consume_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }
}

fn same_entry(local: &Message, remote: &Message) -> bool {
    match local.id {
        MessageId::Persisted(_) => local.id == remote.id,
        MessageId::Provisional(_) => {
            !remote.id.is_provisional()
                && local.is_from_assistant == remote.is_from_assistant
                && local.text == remote.text
        }
    }
}
