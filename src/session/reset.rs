//! Starting a fresh conversation

use super::{Outbound, Session, SessionError, SettleGuard};
use crate::backend::Backend;
use crate::state_machine::{Event, TransitionError};
use crate::store::KeyValueStore;

impl<B, S> Session<B, S>
where
    B: Backend,
    S: KeyValueStore + Clone,
{
    /// Clear the conversation locally and ask the backend to forget it
    ///
    /// The log, the greeting and the flags are reset before anything is
    /// awaited. A failed backend call is returned as an error but leaves the
    /// local reset in place.
    pub async fn reset(&self) -> Result<(), SessionError> {
        let processed = {
            let mut shared = self.lock();
            let user_name = shared.identity.current().map(|u| u.name.clone());
            self.apply(&mut shared, Event::Reset { user_name })?
        };

        let (generation, request) = match processed.outbound.into_iter().next() {
            Some(Outbound::Reset {
                generation,
                request,
            }) => (generation, request),
            other => {
                return Err(TransitionError::InvalidTransition(format!(
                    "reset produced {other:?} instead of a reset request"
                ))
                .into())
            }
        };

        let guard = SettleGuard::new(self, Event::ResetSettled { generation });
        let result = self.backend.reset(&request).await;
        guard.disarm();

        self.process(Event::ResetSettled { generation })?;

        match result {
            Ok(()) => {
                tracing::info!(session_id = %self.id, generation, "Conversation reset");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    generation,
                    error = %e,
                    "Backend reset failed, local conversation already cleared"
                );
                Err(e.into())
            }
        }
    }
}
