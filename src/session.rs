//! Client-side session controller
//!
//! [`Session`] owns the conversation log, the identity and the state machine
//! state behind one mutex that is never held across an `.await`. Every user
//! action runs an [`Event`] through [`transition`], executes the local
//! effects while still holding the lock, then performs the single outbound
//! request (if any) with the lock released.

mod auth;
mod chat;
mod reset;

#[cfg(test)]
pub mod testing;

pub use auth::LoginOutcome;
pub use chat::SendOutcome;

use crate::backend::{Backend, BackendError, ChatRequest, ResetRequest};
use crate::conversation::ConversationLog;
use crate::identity::{AuthError, SessionIdentity};
use crate::model::{Message, SocialEvent, User};
use crate::state_machine::{transition, Effect, Event, SessionState, TransitionError};
use crate::store::KeyValueStore;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Backend unavailable: {0}")]
    Backend(#[from] BackendError),
}

/// State guarded by the session mutex
struct Shared<S> {
    state: SessionState,
    identity: SessionIdentity<S>,
    log: ConversationLog<S>,
}

/// A request produced by a transition, to be sent once the lock is released
#[derive(Debug)]
enum Outbound {
    Chat {
        generation: u64,
        request: ChatRequest,
    },
    Reset {
        generation: u64,
        request: ResetRequest,
    },
}

/// A message added to the log, with the number its first event card got
#[derive(Debug)]
struct Appended {
    message: Message,
    first_event: usize,
}

/// What running one event produced
#[derive(Debug, Default)]
struct Processed {
    outbound: Vec<Outbound>,
    /// Last message appended while processing
    appended: Option<Appended>,
    discarded: bool,
}

pub struct Session<B, S> {
    id: String,
    backend: B,
    shared: Mutex<Shared<S>>,
}

impl<B, S> Session<B, S>
where
    B: Backend,
    S: KeyValueStore + Clone,
{
    /// Load identity and history from `store`; `id` is reused for every backend call
    pub fn restore(id: impl Into<String>, backend: B, store: S) -> Self {
        let id = id.into();
        let identity = SessionIdentity::restore(store.clone());
        let log = ConversationLog::restore(store);

        tracing::info!(
            session_id = %id,
            messages = log.len(),
            logged_in = identity.current().is_some(),
            "Session restored"
        );

        Self {
            id,
            backend,
            shared: Mutex::new(Shared {
                state: SessionState::default(),
                identity,
                log,
            }),
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Snapshot of the log in presentation order
    pub fn messages(&self) -> Vec<Message> {
        self.lock().log.messages().to_vec()
    }

    #[cfg(test)]
    pub fn message_count(&self) -> usize {
        self.lock().log.len()
    }

    /// Every event shown so far, in the order it appeared
    pub fn events(&self) -> Vec<SocialEvent> {
        self.lock()
            .log
            .messages()
            .iter()
            .flat_map(|m| m.events.iter().cloned())
            .collect()
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock().identity.current().cloned()
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// A chat or reset request is in flight
    pub fn is_busy(&self) -> bool {
        self.lock().state.is_busy()
    }

    /// The backend reported the goal as met since the last reset
    pub fn is_complete(&self) -> bool {
        self.lock().state.completed
    }

    fn lock(&self) -> MutexGuard<'_, Shared<S>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn process(&self, event: Event) -> Result<Processed, TransitionError> {
        let mut shared = self.lock();
        self.apply(&mut shared, event)
    }

    /// Transition and execute local effects; outbound ones are returned
    fn apply(&self, shared: &mut Shared<S>, event: Event) -> Result<Processed, TransitionError> {
        let result = transition(&shared.state, event)?;
        shared.state = result.new_state;

        let mut processed = Processed::default();
        for effect in result.effects {
            self.execute_effect(shared, effect, &mut processed);
        }
        Ok(processed)
    }

    fn execute_effect(&self, shared: &mut Shared<S>, effect: Effect, processed: &mut Processed) {
        match effect {
            Effect::AppendMessage(message) => {
                let first_event = 1 + shared
                    .log
                    .messages()
                    .iter()
                    .map(|m| m.events.len())
                    .sum::<usize>();
                processed.appended = Some(Appended {
                    message: message.clone(),
                    first_event,
                });
                if let Err(e) = shared.log.append(message) {
                    tracing::warn!(session_id = %self.id, error = %e, "Failed to persist chat history");
                }
            }

            Effect::ClearLog => {
                if let Err(e) = shared.log.clear() {
                    tracing::warn!(session_id = %self.id, error = %e, "Failed to clear stored chat history");
                }
            }

            Effect::ReplaceLog(messages) => {
                if let Err(e) = shared.log.replace_all(messages) {
                    tracing::warn!(session_id = %self.id, error = %e, "Failed to persist chat history");
                }
            }

            Effect::ApplyProfile(profile) => {
                match shared.identity.apply_profile_update(&profile) {
                    Ok(true) => tracing::info!(session_id = %self.id, "Profile updated from backend"),
                    Ok(false) => tracing::debug!("Profile update ignored, no user logged in"),
                    Err(e) => tracing::warn!(error = %e, "Failed to persist profile update"),
                }
            }

            Effect::RequestChat { generation, text } => {
                let request = ChatRequest {
                    message: text,
                    session_id: self.id.clone(),
                    email: shared.identity.current().map(|u| u.email.clone()),
                };
                processed.outbound.push(Outbound::Chat {
                    generation,
                    request,
                });
            }

            Effect::RequestReset { generation } => {
                processed.outbound.push(Outbound::Reset {
                    generation,
                    request: ResetRequest::new(self.id.clone()),
                });
            }

            Effect::DiscardStale { generation } => {
                tracing::info!(
                    session_id = %self.id,
                    generation,
                    current = shared.state.generation,
                    "Discarding reply for a conversation that was reset"
                );
                processed.discarded = true;
            }
        }
    }
}

/// Feeds a settling event to the state machine if the owning future is
/// dropped before it could do so itself
struct SettleGuard<'a, B, S>
where
    B: Backend,
    S: KeyValueStore + Clone,
{
    session: &'a Session<B, S>,
    on_drop: Option<Event>,
}

impl<'a, B, S> SettleGuard<'a, B, S>
where
    B: Backend,
    S: KeyValueStore + Clone,
{
    fn new(session: &'a Session<B, S>, on_drop: Event) -> Self {
        Self {
            session,
            on_drop: Some(on_drop),
        }
    }

    fn disarm(mut self) {
        self.on_drop = None;
    }
}

impl<B, S> Drop for SettleGuard<'_, B, S>
where
    B: Backend,
    S: KeyValueStore + Clone,
{
    fn drop(&mut self) {
        if let Some(event) = self.on_drop.take() {
            tracing::debug!(session_id = %self.session.id, ?event, "Request dropped before settling");
            if let Err(e) = self.session.process(event) {
                tracing::warn!(error = %e, "Failed to settle dropped request");
            }
        }
    }
}
