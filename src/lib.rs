//! pfd-chat is a streaming research-assistant chat for Prevention of Future
//! Death (PFD) reports.
//!
//! # Overview
//! Each session keeps an in-memory conversation seeded with a fixed system
//! prompt and a greeting. On every user turn the whole conversation is sent
//! to an OpenAI-compatible chat completion endpoint and the reply is
//! streamed back fragment by fragment:
//!
//! - [`conversation`] holds the append-only history
//! - [`streamer`] folds a streamed reply into one message
//! - [`session`] runs turns and guarantees one assistant message per turn
//!
//! Two chat surfaces sit on top: an interactive terminal (feature `cli`)
//! and a single-page web interface (feature `api`).

// Re-export for convenience
pub use async_trait::async_trait;

/// Backend implementations for supported providers
pub mod backends;

/// Builder pattern for configuring and instantiating the provider
pub mod builder;

/// Chat messages and the streaming provider trait
pub mod chat;

/// Session-scoped conversation history
pub mod conversation;

/// Error types and handling
pub mod error;

/// The assistant persona and page copy
pub mod persona;

/// Generic OpenAI-compatible provider
pub mod providers;

/// Chat sessions and turns
pub mod session;

/// Folding streamed fragments into replies
pub mod streamer;

#[cfg(feature = "api")]
pub mod api;

pub use builder::ChatBuilder;
pub use chat::{ChatMessage, ChatProvider, ChatRole, ProviderFactory};
pub use conversation::Conversation;
pub use error::LLMError;
pub use persona::Persona;
pub use session::{Session, Turn};
pub use streamer::{CompletionStreamer, FragmentObserver};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
