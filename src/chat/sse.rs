//! Server-Sent Events decoding for streamed completions.
//!
//! Network chunks do not line up with SSE lines, so bytes are buffered
//! until a full line is available before any `data:` payload is parsed.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;

use futures::stream::{Stream, StreamExt};

use super::FragmentStream;
use crate::error::LLMError;

const DONE_MARKER: &str = "[DONE]";

/// Splits a byte stream into complete SSE `data:` payloads.
#[derive(Debug, Default)]
pub(crate) struct SseLineBuffer {
    pending: Vec<u8>,
    done: bool,
}

impl SseLineBuffer {
    /// Feeds raw bytes and returns every payload completed by them.
    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut payloads = Vec::new();
        if self.done {
            return payloads;
        }
        self.pending.extend_from_slice(bytes);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(payload) = self.take_line(&line) {
                payloads.push(payload);
            }
            if self.done {
                self.pending.clear();
                break;
            }
        }
        payloads
    }

    /// Flushes a trailing line the server sent without a newline.
    pub(crate) fn finish(&mut self) -> Vec<String> {
        if self.done || self.pending.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.pending);
        self.take_line(&line).into_iter().collect()
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    fn take_line(&mut self, raw: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        // comments (": keep-alive") and event/id fields carry no content
        let data = line.strip_prefix("data:")?.trim_start();
        if data == DONE_MARKER {
            self.done = true;
            return None;
        }
        if data.is_empty() {
            return None;
        }
        Some(data.to_string())
    }
}

struct SseState<F> {
    body: Pin<Box<dyn Stream<Item = Result<Vec<u8>, String>> + Send>>,
    buffer: SseLineBuffer,
    queue: VecDeque<Result<String, LLMError>>,
    parser: F,
    finished: bool,
}

impl<F> SseState<F>
where
    F: Fn(&str) -> Result<Option<String>, LLMError>,
{
    fn accept(&mut self, payloads: Vec<String>) {
        for payload in payloads {
            if self.finished {
                return;
            }
            match (self.parser)(&payload) {
                Ok(Some(fragment)) => self.queue.push_back(Ok(fragment)),
                Ok(None) => {}
                Err(e) => {
                    self.queue.push_back(Err(e));
                    self.finished = true;
                }
            }
        }
        if self.buffer.is_done() {
            self.finished = true;
        }
    }
}

/// Creates a fragment stream from an SSE response body.
///
/// # Arguments
///
/// * `body` - The raw byte chunks of the HTTP response
/// * `parser` - Turns one `data:` payload into an optional fragment
///
/// # Returns
///
/// A pinned stream that ends at `[DONE]`, at the end of the body, or right
/// after the first error.
pub(crate) fn create_sse_stream<S, B, E, F>(body: S, parser: F) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + 'static,
    E: fmt::Display + 'static,
    F: Fn(&str) -> Result<Option<String>, LLMError> + Send + 'static,
{
    let body = body.map(|chunk| match chunk {
        Ok(bytes) => Ok(bytes.as_ref().to_vec()),
        Err(e) => Err(e.to_string()),
    });
    let state = SseState {
        body: Box::pin(body),
        buffer: SseLineBuffer::default(),
        queue: VecDeque::new(),
        parser,
        finished: false,
    };

    let stream = futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.queue.pop_front() {
                return Some((item, st));
            }
            if st.finished {
                return None;
            }
            match st.body.next().await {
                Some(Ok(bytes)) => {
                    let payloads = st.buffer.feed(&bytes);
                    st.accept(payloads);
                }
                Some(Err(e)) => {
                    st.queue.push_back(Err(LLMError::HttpError(e)));
                    st.finished = true;
                }
                None => {
                    let payloads = st.buffer.finish();
                    st.accept(payloads);
                    st.finished = true;
                }
            }
        }
    });

    Box::pin(stream)
}
