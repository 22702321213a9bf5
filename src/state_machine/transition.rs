//! Pure state transition function
//!
//! Given the same state and event this always produces the same result and
//! performs no I/O. The session executes the returned effects.

use super::{ChatState, Effect, Event, SessionState};
use crate::backend::ChatResponse;
use crate::model::Message;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Still waiting on the previous reply")]
    Busy,
    #[error("Conversation is being reset")]
    ResetInProgress,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state.chat, event) {
        // ============================================================
        // User input
        // ============================================================
        (_, Event::UserSend { text }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        // Idle + UserSend -> Sending (user message is appended before the request goes out)
        (ChatState::Idle, Event::UserSend { text }) => {
            let generation = state.generation;
            Ok(TransitionResult::new(SessionState {
                chat: ChatState::Sending { generation },
                ..*state
            })
            .with_effect(Effect::append_user(text.clone()))
            .with_effect(Effect::RequestChat { generation, text }))
        }

        (ChatState::Sending { .. }, Event::UserSend { .. }) => Err(TransitionError::Busy),

        (ChatState::Resetting { .. }, Event::UserSend { .. }) => {
            Err(TransitionError::ResetInProgress)
        }

        // ============================================================
        // Stale replies from before the last reset
        // ============================================================
        (
            _,
            Event::ChatReply { generation, .. } | Event::ChatFailed { generation, .. },
        ) if generation != state.generation => {
            Ok(TransitionResult::new(*state).with_effect(Effect::DiscardStale { generation }))
        }

        (_, Event::ChatAbandoned { generation }) if generation != state.generation => {
            Ok(TransitionResult::new(*state))
        }

        // ============================================================
        // Chat replies
        // ============================================================
        (ChatState::Sending { generation: sent }, Event::ChatReply { generation, reply })
            if sent == generation =>
        {
            Ok(apply_reply(state, reply))
        }

        // Failure keeps `completed` as it was
        (ChatState::Sending { generation: sent }, Event::ChatFailed { generation, .. })
            if sent == generation =>
        {
            Ok(TransitionResult::new(SessionState {
                chat: ChatState::Idle,
                ..*state
            })
            .with_effect(Effect::append_fallback()))
        }

        (ChatState::Sending { generation: sent }, Event::ChatAbandoned { generation })
            if sent == generation =>
        {
            Ok(TransitionResult::new(SessionState {
                chat: ChatState::Idle,
                ..*state
            }))
        }

        // Guard fired after the send already settled
        (_, Event::ChatAbandoned { .. }) => Ok(TransitionResult::new(*state)),

        (chat, Event::ChatReply { .. } | Event::ChatFailed { .. }) => Err(
            TransitionError::InvalidTransition(format!("chat reply received while {chat:?}")),
        ),

        // ============================================================
        // Reset
        // ============================================================

        // Any + Reset -> Resetting under a new generation
        (_, Event::Reset { user_name }) => {
            let generation = state.generation + 1;
            Ok(TransitionResult::new(SessionState {
                chat: ChatState::Resetting { generation },
                generation,
                completed: false,
            })
            .with_effects([
                Effect::ClearLog,
                Effect::RequestReset { generation },
                Effect::ReplaceLog(vec![Message::greeting(user_name.as_deref())]),
            ]))
        }

        (ChatState::Resetting { generation: pending }, Event::ResetSettled { generation })
            if pending == generation =>
        {
            Ok(TransitionResult::new(SessionState {
                chat: ChatState::Idle,
                ..*state
            }))
        }

        // A newer reset superseded this one
        (_, Event::ResetSettled { .. }) => Ok(TransitionResult::new(*state)),
    }
}

fn apply_reply(state: &SessionState, reply: ChatResponse) -> TransitionResult {
    let ChatResponse {
        text,
        events,
        mission_complete,
        new_vibe,
    } = reply;

    let result = TransitionResult::new(SessionState {
        chat: ChatState::Idle,
        completed: state.completed || mission_complete,
        ..*state
    })
    .with_effect(Effect::AppendMessage(Message::assistant(text, events)));

    match new_vibe {
        Some(vibe) if !vibe.trim().is_empty() => result.with_effect(Effect::ApplyProfile(vibe)),
        _ => result,
    }
}
