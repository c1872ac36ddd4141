//! The ordered, persisted list of chat turns.

use tracing::{debug, warn};

use crate::persona::GREETING;
use crate::state::ChatTurn;
use crate::store::HistoryStore;

pub struct Conversation {
    turns: Vec<ChatTurn>,
    store: Box<dyn HistoryStore>,
}

impl Conversation {
    /// Restore the persisted history, or start from the greeting.
    ///
    /// Never fails: an unreadable or empty slot is treated as no history.
    pub fn load(store: Box<dyn HistoryStore>) -> Self {
        let turns = match store.load() {
            Ok(Some(turns)) if !turns.is_empty() => {
                debug!(turns = turns.len(), "restored chat history");
                turns
            }
            Ok(_) => initial_turns(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable chat history");
                initial_turns()
            }
        };
        Self { turns, store }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Never true: every conversation starts from the greeting.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> &ChatTurn {
        // seeded with the greeting and never drained
        &self.turns[self.turns.len() - 1]
    }

    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
        self.persist();
    }

    /// Back to the single greeting turn, with the persisted slot cleared.
    pub fn reset(&mut self) {
        self.turns = initial_turns();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear chat history");
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.turns) {
            warn!(error = %e, "failed to persist chat history");
        }
    }
}

pub fn initial_turns() -> Vec<ChatTurn> {
    vec![ChatTurn::assistant(GREETING)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatRole;
    use crate::store::{JsonFileStore, MemoryStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_to_greeting() {
        let conversation = Conversation::load(Box::new(MemoryStore::new()));
        assert_eq!(conversation.turns(), &[ChatTurn::assistant(GREETING)]);
    }

    #[test]
    fn test_load_malformed_falls_back() {
        let store = MemoryStore::with_raw("[{\"role\": \"user\"");
        let conversation = Conversation::load(Box::new(store));
        assert_eq!(conversation.turns(), initial_turns().as_slice());
    }

    #[test]
    fn test_load_empty_list_falls_back() {
        let conversation = Conversation::load(Box::new(MemoryStore::with_raw("[]")));
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.last().role, ChatRole::Assistant);
    }

    #[test]
    fn test_append_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let mut conversation = Conversation::load(Box::new(JsonFileStore::new(dir.path())));
        conversation.append(ChatTurn::user("hi"));
        conversation.append(ChatTurn::assistant("hello"));
        let expected = conversation.turns().to_vec();

        let reloaded = Conversation::load(Box::new(JsonFileStore::new(dir.path())));
        assert_eq!(reloaded.turns(), expected.as_slice());
        assert_eq!(reloaded.len(), 3);
    }

    #[test]
    fn test_reset_clears_slot() {
        let store = Arc::new(MemoryStore::new());
        let mut conversation = Conversation::load(Box::new(store.clone()));
        conversation.append(ChatTurn::user("hi"));
        assert!(store.raw().is_some());

        conversation.reset();
        assert_eq!(conversation.turns(), initial_turns().as_slice());
        assert!(store.raw().is_none());

        let reloaded = Conversation::load(Box::new(store));
        assert_eq!(reloaded.turns(), initial_turns().as_slice());
    }
}
