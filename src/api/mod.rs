//! Web chat surface.
//!
//! Serves the single-page interface and the small JSON/SSE API it talks to.
//! The server owns exactly one [`Session`]; a turn holds the session lock
//! until its reply has been fully streamed, so overlapping submissions are
//! refused rather than interleaved.

mod handlers;
mod types;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::chat::ProviderFactory;
use crate::error::LLMError;
use crate::persona::Persona;
use crate::session::Session;
use crate::streamer::CompletionStreamer;

pub use types::{ChatRequest, DoneEvent, FragmentEvent, Link, Message, PageCopy};

/// Web server around a single chat session
pub struct Server {
    session: Session,
}

/// Internal server state shared between request handlers
#[derive(Clone)]
struct ServerState {
    session: Arc<Mutex<Session>>,
}

impl Server {
    /// Creates a server whose session builds providers with `factory`
    pub fn new(factory: impl ProviderFactory + 'static, persona: Persona) -> Self {
        Self {
            session: Session::new(factory, persona),
        }
    }

    /// Pre-loads an API key so visitors do not need to type one
    pub fn with_credential(mut self, key: impl Into<String>) -> Self {
        self.session.set_credential(key);
        self
    }

    pub fn with_streamer(mut self, streamer: CompletionStreamer) -> Self {
        self.session = self.session.with_streamer(streamer);
        self
    }

    /// Builds the router without binding a socket
    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/api/page", get(handlers::page_copy))
            .route("/api/messages", get(handlers::messages))
            .route("/api/chat", post(handlers::chat))
            .route("/api/reset", post(handlers::reset))
            .layer(CorsLayer::permissive())
            .with_state(ServerState {
                session: Arc::new(Mutex::new(self.session)),
            })
    }

    /// Starts the server and listens for requests on the specified address
    ///
    /// # Arguments
    /// * `addr` - Address to bind to (e.g. "127.0.0.1:3000")
    pub async fn run(self, addr: &str) -> Result<(), LLMError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| LLMError::InvalidRequest(e.to_string()))?;

        log::info!("serving chat on http://{addr}");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| LLMError::Generic(e.to_string()))?;

        Ok(())
    }
}
