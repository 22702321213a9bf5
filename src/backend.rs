//! Client for the SocialSync backend
//!
//! One trait method per endpoint so the session core can run against a mock.

mod error;
mod http;
mod types;

pub use error::{BackendError, BackendErrorKind};
pub use http::HttpBackend;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// The backend HTTP surface
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, BackendError>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, BackendError>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;

    /// Ask the backend to drop server-side state for a session
    async fn reset(&self, request: &ResetRequest) -> Result<(), BackendError>;

    async fn send_event_email(&self, request: &EmailRequest)
        -> Result<EmailResponse, BackendError>;
}

#[async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, BackendError> {
        (**self).login(request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, BackendError> {
        (**self).register(request).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        (**self).chat(request).await
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), BackendError> {
        (**self).reset(request).await
    }

    async fn send_event_email(
        &self,
        request: &EmailRequest,
    ) -> Result<EmailResponse, BackendError> {
        (**self).send_event_email(request).await
    }
}

/// Logging wrapper for backends
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B: Backend> LoggingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    fn record<T>(endpoint: &'static str, start: Instant, result: &Result<T, BackendError>) {
        let duration = start.elapsed();
        match result {
            Ok(_) => {
                tracing::info!(
                    endpoint,
                    duration_ms = %duration.as_millis(),
                    "Backend request completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Backend request failed"
                );
            }
        }
    }
}

#[async_trait]
impl<B: Backend> Backend for LoggingBackend<B> {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, BackendError> {
        let start = Instant::now();
        let result = self.inner.login(request).await;
        Self::record("/login", start, &result);
        result
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, BackendError> {
        let start = Instant::now();
        let result = self.inner.register(request).await;
        Self::record("/register", start, &result);
        result
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let start = Instant::now();
        let result = self.inner.chat(request).await;
        Self::record("/chat", start, &result);
        if let Ok(response) = &result {
            tracing::debug!(
                session_id = %request.session_id,
                events = response.events.len(),
                mission_complete = response.mission_complete,
                vibe_update = response.new_vibe.is_some(),
                "Chat reply received"
            );
        }
        result
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), BackendError> {
        let start = Instant::now();
        let result = self.inner.reset(request).await;
        Self::record("/reset", start, &result);
        result
    }

    async fn send_event_email(
        &self,
        request: &EmailRequest,
    ) -> Result<EmailResponse, BackendError> {
        let start = Instant::now();
        let result = self.inner.send_event_email(request).await;
        Self::record("/send-event-email", start, &result);
        result
    }
}
