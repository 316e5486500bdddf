//! Conversation-related types.

use std::fmt::{self, Display, Formatter};

use chat_widget_backend::{ChatResponse, Entities};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The end user.
    User,
    /// The backend, including apologies for failed requests.
    Bot,
}

/// Identifies a message for list rendering.
///
/// The identifier is the role tag followed by the creation time in
/// milliseconds. It is unique on a best-effort basis only and must not be
/// used as a deduplication or security key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    fn new(role: &str, at: DateTime<Utc>) -> Self {
        Self(format!("{role}_{}", at.timestamp_millis()))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An entry in the conversation history.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub(crate) id: MessageId,
    pub(crate) text: String,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) origin: Origin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) entities: Option<Entities>,
}

impl Message {
    pub(crate) fn user(text: String) -> Self {
        let now = Utc::now();
        Self {
            id: MessageId::new("user", now),
            text,
            timestamp: now,
            origin: Origin::User,
            intent: None,
            entities: None,
        }
    }

    pub(crate) fn from_response(resp: &ChatResponse) -> Self {
        Self {
            id: MessageId::new("bot", Utc::now()),
            text: resp.message.clone(),
            timestamp: resp.timestamp,
            origin: Origin::Bot,
            intent: resp.intent.clone(),
            entities: if resp.entities.is_empty() {
                None
            } else {
                Some(resp.entities.clone())
            },
        }
    }

    pub(crate) fn apology(text: &str) -> Self {
        let now = Utc::now();
        Self {
            id: MessageId::new("error", now),
            text: text.to_owned(),
            timestamp: now,
            origin: Origin::Bot,
            intent: None,
            entities: None,
        }
    }

    /// Returns the identifier of this message.
    #[inline]
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the text shown to the user.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns when the message became part of the history. Bot replies
    /// carry the backend's timestamp.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns who authored the message.
    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Returns the intent label of a bot reply, if it carries one.
    #[inline]
    pub fn intent(&self) -> Option<&str> {
        self.intent.as_deref()
    }

    /// Returns the entities of a bot reply, if it carries any.
    #[inline]
    pub fn entities(&self) -> Option<&Entities> {
        self.entities.as_ref()
    }
}

/// A consistent snapshot of the conversation, as rendered by the
/// presentation layer.
#[derive(Clone, Default, Debug)]
pub struct ConversationState {
    pub(crate) history: Vec<Message>,
    pub(crate) in_flight: usize,
    pub(crate) open: bool,
}

impl ConversationState {
    /// Returns the messages in the order they were appended.
    #[inline]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Returns whether a request is in flight.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Returns whether the widget window is open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }
}
