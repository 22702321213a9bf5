//! Emailing an event card to the user
//!
//! Runs beside the chat flow and never touches the conversation state, so it
//! is safe to call while a send is in flight.

use crate::backend::{Backend, BackendError, EmailRequest};
use crate::model::{SocialEvent, User};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No email address given")]
    NoAddress,
    #[error("'{0}' is not a valid email address")]
    InvalidAddress(String),
    #[error("Email not sent: {0}")]
    NotDelivered(String),
    #[error("Email not sent: {0}")]
    Backend(#[from] BackendError),
}

/// Asks the user where to send an event when nobody is logged in
#[async_trait]
pub trait AddressPrompt: Send {
    /// `None` means the user cancelled
    async fn solicit(&mut self, event: &SocialEvent) -> Option<String>;
}

/// A confirmed delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailReceipt {
    pub address: String,
    pub message: Option<String>,
}

pub struct EventActionDispatcher<B> {
    backend: B,
}

impl<B: Backend> EventActionDispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Send `event` to the logged-in user, or to an address from `prompt`
    pub async fn dispatch_email<P>(
        &self,
        event: &SocialEvent,
        current_user: Option<&User>,
        prompt: &mut P,
    ) -> Result<EmailReceipt, DispatchError>
    where
        P: AddressPrompt + ?Sized,
    {
        let address = match current_user {
            Some(user) => user.email.clone(),
            None => prompt.solicit(event).await.unwrap_or_default(),
        };
        let address = validate_address(&address)?;

        let response = self
            .backend
            .send_event_email(&EmailRequest {
                email: address.clone(),
                event: event.clone(),
            })
            .await?;

        if !response.is_success() {
            let reason = response
                .message
                .unwrap_or_else(|| format!("status '{}'", response.status));
            tracing::warn!(title = %event.title, reason = %reason, "Event email not delivered");
            return Err(DispatchError::NotDelivered(reason));
        }

        tracing::info!(title = %event.title, "Event email sent");
        Ok(EmailReceipt {
            address,
            message: response.message,
        })
    }
}

fn validate_address(raw: &str) -> Result<String, DispatchError> {
    let address = raw.trim();
    if address.is_empty() {
        return Err(DispatchError::NoAddress);
    }
    if !address.contains('@') {
        return Err(DispatchError::InvalidAddress(address.to_string()));
    }
    Ok(address.to_string())
}
