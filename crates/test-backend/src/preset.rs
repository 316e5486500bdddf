use chat_widget_backend::Entities;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the backend answers one scripted call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetOutcome {
    /// The call succeeds with this reply.
    #[serde(rename = "reply")]
    Reply(PresetMessage),
    /// The call fails.
    #[serde(rename = "failure")]
    Failure,
}

/// The content of a successful scripted reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresetMessage {
    /// Reply text.
    pub text: String,
    /// Intent label, if any.
    #[serde(default)]
    pub intent: Option<String>,
    /// Extracted entities.
    #[serde(default)]
    pub entities: Entities,
    /// Backend timestamp; the time of the call is used when unset.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A scripted answer for one call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresetReply {
    /// What the call yields.
    pub outcome: PresetOutcome,
    /// Overrides the backend-wide delay for this call, in milliseconds.
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

impl PresetReply {
    /// Creates a successful reply with the given text.
    #[inline]
    pub fn message<S: Into<String>>(text: S) -> Self {
        Self {
            outcome: PresetOutcome::Reply(PresetMessage {
                text: text.into(),
                intent: None,
                entities: Entities::new(),
                timestamp: None,
            }),
            delay_ms: None,
        }
    }

    /// Creates a failed call.
    #[inline]
    pub fn failure() -> Self {
        Self {
            outcome: PresetOutcome::Failure,
            delay_ms: None,
        }
    }

    /// Attaches an intent label. No effect on failures.
    #[inline]
    pub fn with_intent<S: Into<String>>(mut self, intent: S) -> Self {
        if let PresetOutcome::Reply(msg) = &mut self.outcome {
            msg.intent = Some(intent.into());
        }
        self
    }

    /// Attaches an entity. No effect on failures.
    #[inline]
    pub fn with_entity<K: Into<String>, V: Into<Value>>(
        mut self,
        key: K,
        value: V,
    ) -> Self {
        if let PresetOutcome::Reply(msg) = &mut self.outcome {
            msg.entities.insert(key.into(), value.into());
        }
        self
    }

    /// Pins the backend timestamp. No effect on failures.
    #[inline]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        if let PresetOutcome::Reply(msg) = &mut self.outcome {
            msg.timestamp = Some(timestamp);
        }
        self
    }

    /// Delays this call by the given number of milliseconds.
    #[inline]
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}
