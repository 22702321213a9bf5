//! Ordered chat history and its persistence

use crate::model::Message;
use crate::store::{load_json, save_json, KeyValueStore, StoreResult};

/// Store key for the persisted log
pub const HISTORY_KEY: &str = "chat_history";

/// The conversation as shown to the user, in insertion order
///
/// Memory is updated first and then the whole log is written; a failed
/// write leaves the in-memory log ahead of the stored one until the next
/// successful write.
pub struct ConversationLog<S> {
    store: S,
    messages: Vec<Message>,
}

impl<S: KeyValueStore> ConversationLog<S> {
    /// Load the persisted history, or seed the generic greeting
    pub fn restore(store: S) -> Self {
        let messages = match load_json::<Vec<Message>, _>(&store, HISTORY_KEY) {
            Ok(Some(messages)) if !messages.is_empty() => messages,
            Ok(_) => vec![Message::greeting(None)],
            Err(e) => {
                tracing::warn!(error = %e, "Stored chat history unreadable, starting fresh");
                vec![Message::greeting(None)]
            }
        };
        Self { store, messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn append(&mut self, message: Message) -> StoreResult<()> {
        self.messages.push(message);
        self.persist()
    }

    /// Only the reset path swaps out the whole log
    pub(crate) fn replace_all(&mut self, messages: Vec<Message>) -> StoreResult<()> {
        self.messages = messages;
        self.persist()
    }

    pub(crate) fn clear(&mut self) -> StoreResult<()> {
        self.messages.clear();
        self.store.remove(HISTORY_KEY)
    }

    fn persist(&self) -> StoreResult<()> {
        save_json(&self.store, HISTORY_KEY, &self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SocialEvent, GENERIC_GREETING};
    use crate::store::MemoryStore;

    #[test]
    fn fresh_store_seeds_greeting() {
        let log = ConversationLog::restore(MemoryStore::new());
        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].text, GENERIC_GREETING);
    }

    #[test]
    fn append_persists_full_log() {
        let store = MemoryStore::new();
        let mut log = ConversationLog::restore(store.clone());
        log.append(Message::user("jazz nights")).unwrap();
        log.append(Message::assistant(
            "Found one!",
            vec![SocialEvent {
                title: "Jazz Night".to_string(),
                date: "Fri".to_string(),
                ..SocialEvent::default()
            }],
        ))
        .unwrap();

        let restored = ConversationLog::restore(store);
        assert_eq!(restored.messages(), log.messages());
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn clear_removes_persisted_record() {
        let store = MemoryStore::new();
        let mut log = ConversationLog::restore(store.clone());
        log.append(Message::user("hi")).unwrap();
        log.clear().unwrap();

        assert_eq!(log.len(), 0);
        assert!(store.load(HISTORY_KEY).unwrap().is_none());
    }

    #[test]
    fn replace_all_persists_immediately() {
        let store = MemoryStore::new();
        let mut log = ConversationLog::restore(store.clone());
        log.append(Message::user("hi")).unwrap();
        log.replace_all(vec![Message::greeting(Some("Al"))]).unwrap();

        let restored = ConversationLog::restore(store);
        assert_eq!(restored.messages(), &[Message::greeting(Some("Al"))]);
    }

    #[test]
    fn corrupt_or_empty_history_falls_back_to_greeting() {
        let store = MemoryStore::new();
        store.save(HISTORY_KEY, "{{{").unwrap();
        assert_eq!(
            ConversationLog::restore(store.clone()).messages(),
            &[Message::greeting(None)]
        );

        store.save(HISTORY_KEY, "[]").unwrap();
        assert_eq!(
            ConversationLog::restore(store).messages(),
            &[Message::greeting(None)]
        );
    }
}
