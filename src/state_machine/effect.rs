//! Effects produced by state transitions

use crate::model::{Message, FALLBACK_REPLY};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a message to the log and persist it
    AppendMessage(Message),

    /// Drop the persisted and in-memory log
    ClearLog,

    /// Replace the whole log and persist it
    ReplaceLog(Vec<Message>),

    /// Forward a pushed vibe to the identity
    ApplyProfile(String),

    /// Issue the chat request for this turn
    RequestChat { generation: u64, text: String },

    /// Ask the backend to discard server-side session state
    RequestReset { generation: u64 },

    /// A reply came back for a generation that has since been reset
    DiscardStale { generation: u64 },
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendMessage(Message::user(text))
    }

    pub fn append_fallback() -> Self {
        Effect::AppendMessage(Message::assistant(FALLBACK_REPLY, Vec::new()))
    }
}
