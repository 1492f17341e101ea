use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;
use crate::persona;

/// Request payload for the chat endpoint
#[derive(Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    /// API key typed into the page; replaces the session key when present
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Single message in the transcript
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Message {
    /// Role of the message sender ("user" or "assistant")
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl From<&ChatMessage> for Message {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.to_string(),
            content: msg.content.clone(),
        }
    }
}

/// Payload of a `fragment` event
#[derive(Debug, Deserialize, Serialize)]
pub struct FragmentEvent {
    /// The text that just arrived
    pub text: String,
    /// The reply so far
    pub accumulated: String,
}

/// Payload of the `done` event that closes every turn
#[derive(Debug, Deserialize, Serialize)]
pub struct DoneEvent {
    /// The text stored as the assistant message
    pub content: String,
    /// Whether `content` is a diagnostic rather than a model reply
    pub failed: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// Static copy rendered around the chat
#[derive(Debug, Deserialize, Serialize)]
pub struct PageCopy {
    pub title: String,
    pub caption: String,
    pub welcome: String,
    pub about: String,
    pub links: Vec<Link>,
    pub add_key_hint: String,
    pub missing_key: String,
    pub placeholder: String,
}

impl Default for PageCopy {
    fn default() -> Self {
        Self {
            title: persona::PAGE_TITLE.to_string(),
            caption: persona::CAPTION.to_string(),
            welcome: persona::WELCOME.to_string(),
            about: persona::ABOUT.to_string(),
            links: persona::LINKS
                .iter()
                .map(|(label, url)| Link {
                    label: label.to_string(),
                    url: url.to_string(),
                })
                .collect(),
            add_key_hint: persona::ADD_KEY_HINT.to_string(),
            missing_key: persona::MISSING_KEY_NOTICE.to_string(),
            placeholder: persona::INPUT_PLACEHOLDER.to_string(),
        }
    }
}
