//! Events that can occur in a session

use crate::backend::ChatResponse;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSend {
        text: String,
    },
    Reset {
        /// Name of the user the new conversation is for, if logged in
        user_name: Option<String>,
    },

    // Backend events
    ChatReply {
        generation: u64,
        reply: ChatResponse,
    },
    /// Transport error, error status or undecodable body; already logged
    ChatFailed {
        generation: u64,
    },
    /// The caller dropped the `send` future before the reply arrived
    ChatAbandoned {
        generation: u64,
    },
    /// The backend discard request finished, successfully or not
    ResetSettled {
        generation: u64,
    },
}
