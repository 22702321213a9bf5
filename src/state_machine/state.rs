//! Session state types

use serde::Serialize;

/// Where the session is in its request cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatState {
    /// Ready for user input, no request in flight
    #[default]
    Idle,

    /// Chat request in flight, tagged with the generation it was sent under
    Sending { generation: u64 },

    /// Backend discard request in flight after a local reset
    Resetting { generation: u64 },
}

impl ChatState {
    /// Input must be refused while this is true
    pub fn is_busy(self) -> bool {
        !matches!(self, ChatState::Idle)
    }

    #[cfg(test)]
    pub fn is_sending(self) -> bool {
        matches!(self, ChatState::Sending { .. })
    }
}

/// Everything the transition function reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct SessionState {
    pub chat: ChatState,
    /// Bumped by every reset; replies tagged with an older value are stale
    pub generation: u64,
    /// Set by the backend's mission-complete signal, cleared by reset
    pub completed: bool,
}

impl SessionState {
    pub fn is_busy(&self) -> bool {
        self.chat.is_busy()
    }
}
