//! Sending a chat turn

use super::{Outbound, Session, SessionError, SettleGuard};
use crate::backend::Backend;
use crate::model::Message;
use crate::state_machine::{Event, TransitionError};
use crate::store::KeyValueStore;

/// How a `send` settled
///
/// Carries the appended reply itself so callers never have to read it back
/// from a log that may have been reset in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The backend answered; `first_event` numbers the reply's first event
    /// card across the whole conversation
    Answered {
        reply: Message,
        first_event: usize,
        mission_complete: bool,
    },
    /// The request failed and the fallback reply was appended
    Fallback { reply: Message },
    /// The conversation was reset while waiting; the reply was dropped
    Discarded,
}

impl<B, S> Session<B, S>
where
    B: Backend,
    S: KeyValueStore + Clone,
{
    /// Send one user message and apply the reply
    ///
    /// The user message is in the log before this first suspends. Whatever
    /// happens to the request (or to this future) the session leaves
    /// `Sending`.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, SessionError> {
        let processed = self.process(Event::UserSend {
            text: text.to_string(),
        })?;

        let (generation, request) = match processed.outbound.into_iter().next() {
            Some(Outbound::Chat {
                generation,
                request,
            }) => (generation, request),
            other => {
                return Err(TransitionError::InvalidTransition(format!(
                    "send produced {other:?} instead of a chat request"
                ))
                .into())
            }
        };

        tracing::debug!(session_id = %self.id, generation, "Chat request in flight");

        let guard = SettleGuard::new(self, Event::ChatAbandoned { generation });
        let result = self.backend.chat(&request).await;
        guard.disarm();

        let (event, mission_complete) = match result {
            Ok(reply) => {
                let mission_complete = reply.mission_complete;
                (Event::ChatReply { generation, reply }, Some(mission_complete))
            }
            Err(e) => {
                tracing::warn!(session_id = %self.id, generation, error = %e, "Chat request failed");
                (Event::ChatFailed { generation }, None)
            }
        };

        let processed = self.process(event)?;
        if processed.discarded {
            return Ok(SendOutcome::Discarded);
        }
        let Some(appended) = processed.appended else {
            return Err(TransitionError::InvalidTransition(
                "chat settled without appending a reply".to_string(),
            )
            .into());
        };

        Ok(match mission_complete {
            Some(mission_complete) => SendOutcome::Answered {
                reply: appended.message,
                first_event: appended.first_event,
                mission_complete,
            },
            None => SendOutcome::Fallback {
                reply: appended.message,
            },
        })
    }
}
