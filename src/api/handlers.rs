use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html,
    },
    Json,
};
use futures::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::mpsc;

use super::types::{ChatRequest, DoneEvent, FragmentEvent, Message, PageCopy};
use super::ServerState;
use crate::error::LLMError;
use crate::persona::MISSING_KEY_NOTICE;

const PAGE: &str = include_str!("page.html");

const BUSY: &str = "A reply is still streaming; wait for it to finish.";

fn event<T: Serialize>(name: &str, payload: &T) -> Event {
    Event::default()
        .event(name)
        .data(serde_json::to_string(payload).unwrap_or_default())
}

/// Serves the single-page chat interface
pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}

/// Returns the copy shown around the chat
pub async fn page_copy() -> Json<PageCopy> {
    Json(PageCopy::default())
}

/// Returns the visible transcript, re-seeding the conversation after a reset
pub async fn messages(State(state): State<ServerState>) -> Json<Vec<Message>> {
    let mut session = state.session.lock().await;
    Json(session.transcript().iter().map(Message::from).collect())
}

/// Clears the conversation
pub async fn reset(State(state): State<ServerState>) -> Result<StatusCode, (StatusCode, String)> {
    let mut session = state
        .session
        .try_lock()
        .map_err(|_| (StatusCode::CONFLICT, BUSY.to_string()))?;
    session.reset();
    Ok(StatusCode::NO_CONTENT)
}

/// Runs one chat turn and streams the reply as Server-Sent Events
///
/// # Events
/// - `fragment` for every piece of text as it arrives
/// - `done` once, with the stored assistant message
///
/// # Errors
/// - 400 if no API key is available or the message is blank; nothing is stored
/// - 409 if another reply is still streaming
///
/// If the client disconnects mid-reply the turn is cancelled and a
/// diagnostic is stored in its place.
pub async fn chat(
    State(state): State<ServerState>,
    Json(req): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)> {
    let mut session = state
        .session
        .clone()
        .try_lock_owned()
        .map_err(|_| (StatusCode::CONFLICT, BUSY.to_string()))?;

    if let Some(key) = req.api_key {
        session.set_credential(key.trim());
    }
    if !session.has_credential() {
        return Err((StatusCode::BAD_REQUEST, MISSING_KEY_NOTICE.to_string()));
    }
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Message is empty".to_string()));
    }

    let (tx, rx) = mpsc::unbounded_channel::<Event>();

    tokio::spawn(async move {
        let fragments = tx.clone();
        let mut observer = move |text: &str, accumulated: &str| {
            let _ = fragments.send(event(
                "fragment",
                &FragmentEvent {
                    text: text.to_string(),
                    accumulated: accumulated.to_string(),
                },
            ));
        };
        let disconnected = {
            let tx = tx.clone();
            async move { tx.closed().await }
        };

        match session
            .submit_until(message, &mut observer, disconnected)
            .await
        {
            Ok(turn) => {
                let _ = tx.send(event(
                    "done",
                    &DoneEvent {
                        failed: turn.failed(),
                        content: turn.reply,
                    },
                ));
            }
            Err(LLMError::MissingCredential) => {
                let _ = tx.send(Event::default().event("error").data(MISSING_KEY_NOTICE));
            }
            Err(e) => {
                let _ = tx.send(Event::default().event("error").data(e.to_string()));
            }
        }
    });

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok::<_, Infallible>(event), rx))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
