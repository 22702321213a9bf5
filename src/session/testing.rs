//! Mock backends for testing
//!
//! These mocks let the session core run without a server.

use crate::backend::{
    AuthResponse, Backend, BackendError, ChatRequest, ChatResponse, EmailRequest, EmailResponse,
    LoginRequest, RegisterRequest, ResetRequest,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Backend
// ============================================================================

/// Backend that returns queued responses and records every request
#[derive(Default)]
pub struct MockBackend {
    auth_responses: Mutex<VecDeque<Result<AuthResponse, BackendError>>>,
    chat_responses: Mutex<VecDeque<Result<ChatResponse, BackendError>>>,
    reset_responses: Mutex<VecDeque<Result<(), BackendError>>>,
    email_responses: Mutex<VecDeque<Result<EmailResponse, BackendError>>>,

    logins: Mutex<Vec<LoginRequest>>,
    registrations: Mutex<Vec<RegisterRequest>>,
    chats: Mutex<Vec<ChatRequest>>,
    resets: Mutex<Vec<ResetRequest>>,
    emails: Mutex<Vec<EmailRequest>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next login or register call
    pub fn queue_auth(&self, result: Result<AuthResponse, BackendError>) {
        self.auth_responses.lock().unwrap().push_back(result);
    }

    pub fn queue_chat(&self, result: Result<ChatResponse, BackendError>) {
        self.chat_responses.lock().unwrap().push_back(result);
    }

    /// Reset calls succeed unless a failure is queued
    pub fn queue_reset(&self, result: Result<(), BackendError>) {
        self.reset_responses.lock().unwrap().push_back(result);
    }

    /// Email calls report success unless something else is queued
    pub fn queue_email(&self, result: Result<EmailResponse, BackendError>) {
        self.email_responses.lock().unwrap().push_back(result);
    }

    pub fn recorded_logins(&self) -> Vec<LoginRequest> {
        self.logins.lock().unwrap().clone()
    }

    pub fn recorded_registrations(&self) -> Vec<RegisterRequest> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn recorded_chats(&self) -> Vec<ChatRequest> {
        self.chats.lock().unwrap().clone()
    }

    pub fn recorded_resets(&self) -> Vec<ResetRequest> {
        self.resets.lock().unwrap().clone()
    }

    pub fn recorded_emails(&self) -> Vec<EmailRequest> {
        self.emails.lock().unwrap().clone()
    }

    fn next_auth(&self) -> Result<AuthResponse, BackendError> {
        self.auth_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::network("No mock response queued")))
    }

    fn next_chat(&self) -> Result<ChatResponse, BackendError> {
        self.chat_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::network("No mock response queued")))
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, BackendError> {
        self.logins.lock().unwrap().push(request.clone());
        self.next_auth()
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, BackendError> {
        self.registrations.lock().unwrap().push(request.clone());
        self.next_auth()
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        self.chats.lock().unwrap().push(request.clone());
        self.next_chat()
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), BackendError> {
        self.resets.lock().unwrap().push(request.clone());
        self.reset_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn send_event_email(
        &self,
        request: &EmailRequest,
    ) -> Result<EmailResponse, BackendError> {
        self.emails.lock().unwrap().push(request.clone());
        self.email_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(EmailResponse {
                    status: "success".to_string(),
                    message: None,
                })
            })
    }
}

// ============================================================================
// Gated Mock Backend (for in-flight testing)
// ============================================================================

/// Mock whose chat calls block until released
pub struct GatedMockBackend {
    inner: MockBackend,
    release: Notify,
    /// Notified when a chat request arrives (for test synchronization)
    pub chat_started: Arc<Notify>,
}

#[allow(dead_code)]
impl GatedMockBackend {
    pub fn new() -> Self {
        Self {
            inner: MockBackend::new(),
            release: Notify::new(),
            chat_started: Arc::new(Notify::new()),
        }
    }

    pub fn inner(&self) -> &MockBackend {
        &self.inner
    }

    /// Let one waiting (or the next) chat call complete
    pub fn release_one(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl Backend for GatedMockBackend {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, BackendError> {
        self.inner.login(request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, BackendError> {
        self.inner.register(request).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        self.inner.chats.lock().unwrap().push(request.clone());
        self.chat_started.notify_one();
        self.release.notified().await;
        self.inner.next_chat()
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), BackendError> {
        self.inner.reset(request).await
    }

    async fn send_event_email(
        &self,
        request: &EmailRequest,
    ) -> Result<EmailResponse, BackendError> {
        self.inner.send_event_email(request).await
    }
}
