//! Session-scoped conversation history.
//!
//! The store is append-only: messages are only ever pushed to the end, and
//! the only way to drop them is a full `reset()`. Once initialized, the first
//! message is the persona's system prompt and the second its greeting.

use crate::chat::{ChatMessage, ChatRole};
use crate::persona::Persona;

/// Ordered chat history for one session.
///
/// # Examples
///
/// ```rust
/// use pfd_chat::chat::ChatMessage;
/// use pfd_chat::conversation::Conversation;
/// use pfd_chat::persona::Persona;
///
/// let mut conversation = Conversation::new(Persona::pfd_toolkit());
/// conversation.initialize();
/// conversation.append(ChatMessage::user().content("I study road safety").build());
///
/// assert_eq!(conversation.len(), 3);
/// // the system prompt is never part of what users see
/// assert_eq!(conversation.transcript().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Conversation {
    persona: Persona,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Creates an empty conversation; call `initialize()` to seed it.
    pub fn new(persona: Persona) -> Self {
        Self {
            persona,
            messages: Vec::new(),
        }
    }

    /// Seeds an empty conversation with the system prompt and greeting.
    ///
    /// A conversation that already holds messages is left untouched.
    pub fn initialize(&mut self) {
        if self.messages.is_empty() {
            self.messages.extend(self.persona.seed());
        }
    }

    /// Adds a message to the end of the conversation.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Drops every message. The next `initialize()` re-seeds.
    pub fn reset(&mut self) {
        self.messages.clear();
    }

    /// All messages in order, system prompt included.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The messages a chat surface displays: everything after the system prompt.
    pub fn transcript(&self) -> &[ChatMessage] {
        match self.messages.first() {
            Some(first) if first.role == ChatRole::System => &self.messages[1..],
            _ => &self.messages,
        }
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }
}
