//! Wire types for the backend HTTP surface

use crate::model::{SocialEvent, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Response of both auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile: Option<String>,
}

impl From<AuthResponse> for User {
    fn from(resp: AuthResponse) -> Self {
        User {
            name: resp.name,
            email: resp.email,
            profile: resp.profile,
        }
        .normalized()
    }
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    /// `null` when logged out
    pub email: Option<String>,
}

/// Response of `POST /chat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub events: Vec<SocialEvent>,
    #[serde(default)]
    pub mission_complete: bool,
    #[serde(default)]
    pub new_vibe: Option<String>,
}

impl ChatResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Body of `POST /reset`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetRequest {
    pub message: String,
    pub session_id: String,
}

impl ResetRequest {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            message: String::new(),
            session_id: session_id.into(),
        }
    }
}

/// Body of `POST /send-event-email`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailRequest {
    pub email: String,
    pub event: SocialEvent,
}

/// Response of `POST /send-event-email`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl EmailResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Error body returned with non-success statuses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub detail: Value,
}

impl ErrorResponse {
    /// `detail` is usually a string, but validation failures carry a list
    pub fn detail_text(&self) -> String {
        match &self.detail {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
