//! Login and logout at the session level

use super::{Session, SessionError};
use crate::backend::Backend;
use crate::identity::{authenticate, Credentials};
use crate::model::User;
use crate::store::KeyValueStore;

/// A successful login
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    /// Set when the backend could not discard the previous conversation;
    /// the local reset still happened
    pub reset_error: Option<SessionError>,
}

impl<B, S> Session<B, S>
where
    B: Backend,
    S: KeyValueStore + Clone,
{
    /// Authenticate, then start a fresh conversation greeting the new user
    ///
    /// A rejected login leaves identity and history untouched. Once the user
    /// is established the login stands even if the backend reset fails; that
    /// failure is handed back in [`LoginOutcome::reset_error`].
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, SessionError> {
        let user = authenticate(&self.backend, credentials).await?;

        {
            let mut shared = self.lock();
            if let Err(e) = shared.identity.establish(user.clone()) {
                tracing::warn!(session_id = %self.id, error = %e, "Failed to persist user");
            }
        }
        tracing::info!(session_id = %self.id, email = %user.email, "Logged in");

        let reset_error = self.reset().await.err();
        Ok(LoginOutcome { user, reset_error })
    }

    /// Forget the user and return to a generic conversation
    pub async fn logout(&self) -> Result<(), SessionError> {
        {
            let mut shared = self.lock();
            if let Err(e) = shared.identity.logout() {
                tracing::warn!(session_id = %self.id, error = %e, "Failed to clear stored user");
            }
        }
        tracing::info!(session_id = %self.id, "Logged out");
        self.reset().await
    }
}
