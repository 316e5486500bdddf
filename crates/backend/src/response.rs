use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::session::SessionId;

/// Slots extracted from a message, keyed by slot name.
pub type Entities = Map<String, Value>;

/// A structured reply from the chat backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// The reply text to show to the user.
    pub message: String,
    /// The intent the backend classified the user's message as, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Entities extracted from the user's message.
    #[serde(default)]
    pub entities: Entities,
    /// When the backend produced the reply.
    pub timestamp: DateTime<Utc>,
    /// The session the reply belongs to.
    pub session_id: SessionId,
    /// Whether the reply asks the host to perform an action.
    #[serde(default)]
    pub requires_action: bool,
    /// The kind of action requested, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    /// Arguments for the requested action, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_data: Option<Map<String, Value>>,
}

impl ChatResponse {
    /// Creates a plain text reply for the session with no intent, entities
    /// or action attached.
    pub fn text<S: Into<String>>(
        message: S,
        session_id: SessionId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message: message.into(),
            intent: None,
            entities: Entities::new(),
            timestamp,
            session_id,
            requires_action: false,
            action_type: None,
            action_data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_wire_shape() {
        let value = json!({
            "message": "Sure, what time?",
            "intent": "book_appointment",
            "entities": { "doctor": "Smith" },
            "timestamp": "2024-01-01T00:00:00Z",
            "sessionId": "session_1_abc",
            "requiresAction": true,
            "actionType": "SHOW_SLOTS",
        });
        let resp: ChatResponse = serde_json::from_value(value).unwrap();
        assert_eq!(resp.intent.as_deref(), Some("book_appointment"));
        assert_eq!(resp.entities["doctor"], json!("Smith"));
        assert_eq!(resp.session_id.as_str(), "session_1_abc");
        assert!(resp.requires_action);
        assert_eq!(resp.action_type.as_deref(), Some("SHOW_SLOTS"));
        assert!(resp.action_data.is_none());
    }
}
