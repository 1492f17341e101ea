//! Completion streaming: turns a conversation into one assistant reply.
//!
//! Fragments are folded in arrival order into a single accumulated string.
//! Every fragment is shown to a [`FragmentObserver`] as soon as it arrives,
//! so a chat surface can render the reply while it is still being written.

use std::future::Future;
use std::time::Duration;

use futures::StreamExt;

use crate::chat::{ChatMessage, ChatProvider};
use crate::error::LLMError;

/// How long to wait for the next fragment before giving up on a reply.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

const DIAGNOSTIC_PREFIX: &str = "Sorry, I ran into a technical problem:";

/// Receives each fragment of a reply as it arrives.
pub trait FragmentObserver: Send {
    /// Called once per non-empty fragment, with the reply accumulated so far
    /// (the fragment included).
    fn on_fragment(&mut self, fragment: &str, accumulated: &str);
}

impl<F> FragmentObserver for F
where
    F: FnMut(&str, &str) + Send,
{
    fn on_fragment(&mut self, fragment: &str, accumulated: &str) {
        self(fragment, accumulated)
    }
}

/// Folds a provider's fragment stream into a finished reply.
#[derive(Debug, Clone)]
pub struct CompletionStreamer {
    idle_timeout: Option<Duration>,
}

impl Default for CompletionStreamer {
    fn default() -> Self {
        Self {
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
        }
    }
}

impl CompletionStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-fragment idle timeout; `None` waits forever.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Streams one reply for `messages`.
    ///
    /// The wait for the response headers and the wait between fragments
    /// are each bounded by the idle timeout. If `cancel` completes first
    /// the reply is abandoned with [`LLMError::Cancelled`]. There are no
    /// retries.
    ///
    /// # Returns
    ///
    /// The concatenation of every non-empty fragment, or the first error.
    pub async fn stream_reply<C>(
        &self,
        provider: &dyn ChatProvider,
        messages: &[ChatMessage],
        observer: &mut dyn FragmentObserver,
        cancel: C,
    ) -> Result<String, LLMError>
    where
        C: Future<Output = ()> + Send,
    {
        let fold = async {
            let mut stream = self.bounded(provider.chat_stream(messages)).await??;
            let mut accumulated = String::new();
            while let Some(next) = self.bounded(stream.next()).await? {
                let fragment = next?;
                if fragment.is_empty() {
                    continue;
                }
                accumulated.push_str(&fragment);
                observer.on_fragment(&fragment, &accumulated);
            }
            Ok::<_, LLMError>(accumulated)
        };

        tokio::select! {
            biased;
            _ = cancel => Err(LLMError::Cancelled),
            result = fold => result,
        }
    }

    async fn bounded<F: Future>(&self, fut: F) -> Result<F::Output, LLMError> {
        match self.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| LLMError::Timeout(limit)),
            None => Ok(fut.await),
        }
    }
}

/// The assistant-facing text for a failed turn.
pub fn diagnostic(err: &LLMError) -> String {
    format!("{DIAGNOSTIC_PREFIX} {err}")
}
