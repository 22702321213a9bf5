//! The logged-in user and its persistence

use crate::backend::{Backend, BackendError, LoginRequest, RegisterRequest};
use crate::model::User;
use crate::store::{load_json, save_json, KeyValueStore, StoreResult};
use thiserror::Error;

/// Store key for the persisted user; absent means logged out
pub const USER_KEY: &str = "socialsync_user";

/// What the auth dialog submits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Login {
        email: String,
        password: String,
    },
    Register {
        name: String,
        email: String,
        password: String,
    },
}

impl Credentials {
    pub fn email(&self) -> &str {
        match self {
            Credentials::Login { email, .. } | Credentials::Register { email, .. } => email,
        }
    }

    fn password(&self) -> &str {
        match self {
            Credentials::Login { password, .. } | Credentials::Register { password, .. } => {
                password
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,
    /// The backend's own explanation, shown as-is
    #[error("{0}")]
    Rejected(String),
    #[error("Could not reach the server: {0}")]
    Unavailable(BackendError),
}

impl From<BackendError> for AuthError {
    fn from(e: BackendError) -> Self {
        if e.kind.is_rejection() {
            AuthError::Rejected(e.message)
        } else {
            AuthError::Unavailable(e)
        }
    }
}

/// Submit credentials to the matching auth endpoint
///
/// Touches no local state; the caller decides what to do with the user.
pub async fn authenticate<B: Backend + ?Sized>(
    backend: &B,
    credentials: &Credentials,
) -> Result<User, AuthError> {
    if credentials.email().trim().is_empty() || credentials.password().is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let response = match credentials {
        Credentials::Login { email, password } => {
            backend
                .login(&LoginRequest {
                    email: email.clone(),
                    password: password.clone(),
                })
                .await?
        }
        Credentials::Register {
            name,
            email,
            password,
        } => {
            backend
                .register(&RegisterRequest {
                    email: email.clone(),
                    password: password.clone(),
                    name: name.clone(),
                })
                .await?
        }
    };

    Ok(response.into())
}

/// Owner of the current user record
pub struct SessionIdentity<S> {
    store: S,
    user: Option<User>,
}

impl<S: KeyValueStore> SessionIdentity<S> {
    /// Load the stored user; anything unreadable counts as logged out
    pub fn restore(store: S) -> Self {
        let user = match load_json::<User, _>(&store, USER_KEY) {
            Ok(user) => user.map(User::normalized),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user unreadable, starting logged out");
                None
            }
        };
        Self { store, user }
    }

    pub fn current(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Record a freshly authenticated user
    pub fn establish(&mut self, user: User) -> StoreResult<()> {
        self.user = Some(user.normalized());
        self.persist()
    }

    pub fn logout(&mut self) -> StoreResult<()> {
        self.user = None;
        self.persist()
    }

    /// Merge a backend-pushed vibe; returns whether a user was updated
    pub fn apply_profile_update(&mut self, profile: &str) -> StoreResult<bool> {
        if profile.trim().is_empty() {
            return Ok(false);
        }
        let Some(user) = self.user.as_mut() else {
            return Ok(false);
        };
        user.profile = Some(profile.to_string());
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> StoreResult<()> {
        match &self.user {
            Some(user) => save_json(&self.store, USER_KEY, user),
            None => self.store.remove(USER_KEY),
        }
    }
}
