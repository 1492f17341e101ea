//! One user's chat session: the conversation, the credential, and the
//! machinery to run a turn against the completion API.
//!
//! Every turn ends with exactly one assistant message in the conversation.
//! Failures after the request starts become a diagnostic reply instead of
//! an error; the only error `submit` returns is a missing credential, and
//! in that case nothing is appended.

use std::future::{pending, Future};

use crate::chat::{ChatMessage, ProviderFactory};
use crate::conversation::Conversation;
use crate::error::LLMError;
use crate::persona::Persona;
use crate::streamer::{diagnostic, CompletionStreamer, FragmentObserver};

/// Outcome of a completed turn.
#[derive(Debug)]
pub struct Turn {
    /// The text appended as the assistant message
    pub reply: String,
    /// Why the reply is a diagnostic, if it is one
    pub failure: Option<LLMError>,
}

impl Turn {
    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Per-session context passed to every chat operation.
pub struct Session {
    conversation: Conversation,
    credential: Option<String>,
    factory: Box<dyn ProviderFactory>,
    streamer: CompletionStreamer,
}

impl Session {
    /// Creates a session whose conversation is already seeded from `persona`.
    pub fn new(factory: impl ProviderFactory + 'static, persona: Persona) -> Self {
        let mut conversation = Conversation::new(persona);
        conversation.initialize();
        Self {
            conversation,
            credential: None,
            factory: Box::new(factory),
            streamer: CompletionStreamer::default(),
        }
    }

    pub fn with_streamer(mut self, streamer: CompletionStreamer) -> Self {
        self.streamer = streamer;
        self
    }

    /// Stores the user's API key. The value is opaque; an empty key counts as none.
    pub fn set_credential(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.credential = if key.is_empty() { None } else { Some(key) };
    }

    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The messages to display, re-seeding the conversation after a reset.
    pub fn transcript(&mut self) -> &[ChatMessage] {
        self.conversation.initialize();
        self.conversation.transcript()
    }

    /// Clears the conversation. It is re-seeded the next time it is shown or used.
    pub fn reset(&mut self) {
        log::debug!("conversation reset ({} messages dropped)", self.conversation.len());
        self.conversation.reset();
    }

    /// Runs one turn with no way to cancel it other than the idle timeout.
    pub async fn submit(
        &mut self,
        input: impl Into<String>,
        observer: &mut dyn FragmentObserver,
    ) -> Result<Turn, LLMError> {
        self.submit_until(input, observer, pending()).await
    }

    /// Runs one turn: appends the user's message, streams the reply through
    /// `observer`, and appends the reply (or a diagnostic) as the assistant
    /// message.
    ///
    /// # Errors
    ///
    /// [`LLMError::MissingCredential`] if no key is set. No request is made
    /// and the conversation is not touched.
    pub async fn submit_until<C>(
        &mut self,
        input: impl Into<String>,
        observer: &mut dyn FragmentObserver,
        cancel: C,
    ) -> Result<Turn, LLMError>
    where
        C: Future<Output = ()> + Send,
    {
        let key = match self.credential.as_deref() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(LLMError::MissingCredential),
        };

        self.conversation.initialize();
        self.conversation
            .append(ChatMessage::user().content(input).build());

        let result = match self.factory.create(&key) {
            Ok(provider) => {
                self.streamer
                    .stream_reply(
                        provider.as_ref(),
                        self.conversation.messages(),
                        observer,
                        cancel,
                    )
                    .await
            }
            Err(e) => Err(e),
        };

        let turn = match result {
            Ok(reply) => {
                log::debug!("reply complete ({} chars)", reply.len());
                Turn {
                    reply,
                    failure: None,
                }
            }
            Err(e) => {
                log::warn!("chat turn failed: {e}");
                Turn {
                    reply: diagnostic(&e),
                    failure: Some(e),
                }
            }
        };

        self.conversation
            .append(ChatMessage::assistant().content(turn.reply.clone()).build());
        Ok(turn)
    }
}
