use chat_widget_backend::{ChatResponse, SessionId};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest<'a> {
    message: &'a str,
    session_id: &'a str,
}

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
    pub intent: Option<String>,
    pub entities: Option<Map<String, Value>>,
    pub timestamp: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub requires_action: bool,
    pub action_type: Option<String>,
    pub action_data: Option<Map<String, Value>>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request<'a>(
    text: &'a str,
    session_id: &'a SessionId,
) -> MessageRequest<'a> {
    MessageRequest {
        message: text,
        session_id: session_id.as_str(),
    }
}

/// Converts a wire response, filling in what the server left out.
///
/// A missing or unparseable timestamp falls back to `received_at`, and a
/// missing session id falls back to the one the request was sent with.
pub fn into_chat_response(
    resp: MessageResponse,
    session_id: &SessionId,
    received_at: DateTime<Utc>,
) -> ChatResponse {
    let timestamp = match resp.timestamp.as_deref().map(parse_timestamp) {
        Some(Some(timestamp)) => timestamp,
        Some(None) => {
            warn!("unparseable reply timestamp: {:?}", resp.timestamp);
            received_at
        }
        None => received_at,
    };
    ChatResponse {
        message: resp.message,
        intent: resp.intent.filter(|intent| !intent.is_empty()),
        entities: resp.entities.unwrap_or_default(),
        timestamp,
        session_id: resp
            .session_id
            .map(SessionId::new)
            .unwrap_or_else(|| session_id.clone()),
        requires_action: resp.requires_action,
        action_type: resp.action_type,
        action_data: resp.action_data,
    }
}

/// Parses an ISO-8601 timestamp. Timestamps without an offset are taken
/// as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
