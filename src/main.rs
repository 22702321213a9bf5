//! SocialSync - terminal client for the SocialSync event concierge
//!
//! Keeps a persistent conversation with the recommendation backend,
//! remembers the logged-in user, and can email event cards.

mod backend;
mod config;
mod conversation;
mod dispatch;
mod identity;
mod model;
mod repl;
mod session;
mod state_machine;
mod store;

use backend::{HttpBackend, LoggingBackend};
use config::ClientConfig;
use dispatch::EventActionDispatcher;
use session::Session;
use std::sync::Arc;
use store::{KeyValueStore, MemoryStore, SqliteStore};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so the conversation owns stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socialsync=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();

    let store: Arc<dyn KeyValueStore> = match &config.db_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Opening store");
            Arc::new(SqliteStore::open(path)?)
        }
        None => {
            tracing::info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let backend = Arc::new(LoggingBackend::new(HttpBackend::new(
        &config.backend_url,
        config.request_timeout,
    )?));
    tracing::info!(
        url = %config.backend_url,
        session_id = %config.session_id,
        timeout_secs = config.request_timeout.as_secs(),
        "Backend configured"
    );

    let session = Arc::new(Session::restore(
        config.session_id.clone(),
        Arc::clone(&backend),
        store,
    ));
    let dispatcher = EventActionDispatcher::new(backend);

    if let Some(user) = session.current_user() {
        println!("Logged in as {} <{}>", user.name, user.email);
    }
    println!("Type /help for commands.");

    repl::run(session, dispatcher, BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}
