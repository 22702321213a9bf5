//! reqwest implementation of [`Backend`]

use super::types::{
    AuthResponse, ChatRequest, ChatResponse, EmailRequest, EmailResponse, ErrorResponse,
    LoginRequest, RegisterRequest, ResetRequest,
};
use super::{Backend, BackendError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Backend reached over HTTP with JSON bodies
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a JSON body and read back the raw response text
    async fn post_raw<Req: Serialize + Sync>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    BackendError::network(format!("Connection failed: {e}"))
                } else {
                    BackendError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &text));
        }

        Ok(text)
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let text = self.post_raw(path, body).await?;
        serde_json::from_str(&text)
            .map_err(|e| BackendError::decode(format!("Failed to parse {path} response: {e}")))
    }
}

/// Map a non-success status and body to an error
fn classify_error(status: u16, body: &str) -> BackendError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.detail_text())
        .ok();

    match status {
        400..=499 => BackendError::rejected(
            status,
            detail.unwrap_or_else(|| "Something went wrong".to_string()),
        ),
        500..=599 => BackendError::server_error(
            status,
            detail.unwrap_or_else(|| format!("Server error (HTTP {status})")),
        ),
        _ => BackendError::unknown(format!("HTTP {status}: {body}")).with_status(status),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, BackendError> {
        self.post("/login", request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, BackendError> {
        self.post("/register", request).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        self.post("/chat", request).await
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), BackendError> {
        // Acknowledgement body is ignored
        self.post_raw("/reset", request).await.map(|_| ())
    }

    async fn send_event_email(
        &self,
        request: &EmailRequest,
    ) -> Result<EmailResponse, BackendError> {
        self.post("/send-event-email", request).await
    }
}
