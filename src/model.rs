//! Domain types shared by the session core and the front end

use serde::{Deserialize, Serialize};

/// Greeting seeded into a fresh conversation
pub const GENERIC_GREETING: &str = "Hey there! 👋 I'm SocialSync. I'm here to help you find your people. No pressure — just tell me, what’s your vibe lately?";

/// Assistant text substituted when the chat request fails
pub const FALLBACK_REPLY: &str = "Sorry, I'm having trouble connecting to the brain.";

/// Greeting for a conversation started by a known user
pub fn personalized_greeting(name: &str) -> String {
    format!(
        "Welcome back, {name}! 👋 Ready for another adventure? Tell me what you're in the mood for today."
    )
}

/// The authenticated user, keyed by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    /// Backend-maintained summary of the user's tastes ("vibe")
    #[serde(default)]
    pub profile: Option<String>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            profile: None,
        }
    }

    /// Drop a blank profile so "no vibe yet" has a single representation
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.profile.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.profile = None;
        }
        self
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub events: Vec<SocialEvent>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            events: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>, events: Vec<SocialEvent>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            events,
        }
    }

    /// The greeting that opens a conversation, personalized when a name is known
    pub fn greeting(name: Option<&str>) -> Self {
        match name {
            Some(name) => Self::assistant(personalized_greeting(name), Vec::new()),
            None => Self::assistant(GENERIC_GREETING, Vec::new()),
        }
    }
}

/// A recommended event embedded in an assistant message
///
/// Opaque to the client: fields are displayed and forwarded to the email
/// endpoint as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialEvent {
    pub title: String,
    pub date: String,
    pub location: String,
    pub cost: String,
    pub description: String,
    pub url: String,
}

impl SocialEvent {
    /// Whether there is enough to show a card for it
    pub fn is_renderable(&self) -> bool {
        !self.title.trim().is_empty()
    }
}
