//! An in-process fake chat backend for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::future::ready;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chat_widget_backend::{
    AdapterError, ChatBackend, ChatResponse, Operation, SessionId,
};
use chrono::Utc;
use tokio::time::sleep;

pub use preset::*;

#[derive(Default)]
struct Script {
    replies: VecDeque<PresetReply>,
    received: Vec<String>,
    intents: Option<Vec<String>>,
    delay: Option<Duration>,
}

/// A local fake backend for testing purpose.
///
/// Before sending messages, you need to setup the script, which is how
/// the backend should answer each call. Replies are consumed in call order.
/// If there are no enough replies in the script, the call fails.
///
/// Clones share the same script, so a test can keep a clone around to
/// add replies or inspect the received messages after handing the backend
/// over.
#[derive(Clone)]
pub struct ScriptedBackend {
    session_id: SessionId,
    script: Arc<Mutex<Script>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::with_session_id(SessionId::generate())
    }
}

impl ScriptedBackend {
    /// Creates a backend with the given session identifier.
    #[inline]
    pub fn with_session_id<S: Into<SessionId>>(session_id: S) -> Self {
        Self {
            session_id: session_id.into(),
            script: Default::default(),
        }
    }

    /// Appends a scripted answer.
    #[inline]
    pub fn add_reply(&self, reply: PresetReply) {
        self.script().replies.push_back(reply);
    }

    /// Delays every call that doesn't carry its own delay.
    #[inline]
    pub fn set_delay(&self, delay: Duration) {
        self.script().delay = Some(delay);
    }

    /// Sets the intents to report. Fetching intents fails until this is
    /// called.
    #[inline]
    pub fn set_intents<I, S>(&self, intents: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script().intents =
            Some(intents.into_iter().map(Into::into).collect());
    }

    /// Makes fetching intents fail.
    #[inline]
    pub fn fail_intents(&self) {
        self.script().intents = None;
    }

    /// Returns every text received so far, in call order.
    #[inline]
    pub fn received(&self) -> Vec<String> {
        self.script().received.clone()
    }

    /// Returns the number of scripted answers not consumed yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.script().replies.len()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // A panicking test thread may poison the lock; the script itself is
        // still usable.
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ChatBackend for ScriptedBackend {
    #[inline]
    fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    fn send_message(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<ChatResponse, AdapterError>> + Send + 'static
    {
        let (reply, delay) = {
            let mut script = self.script();
            script.received.push(text.to_owned());
            (script.replies.pop_front(), script.delay)
        };

        let (result, delay) = match reply {
            Some(PresetReply { outcome, delay_ms }) => {
                let delay = delay_ms.map(Duration::from_millis).or(delay);
                let result = match outcome {
                    PresetOutcome::Reply(msg) => Ok(ChatResponse {
                        message: msg.text,
                        intent: msg.intent,
                        entities: msg.entities,
                        timestamp: msg.timestamp.unwrap_or_else(Utc::now),
                        session_id: self.session_id.clone(),
                        requires_action: false,
                        action_type: None,
                        action_data: None,
                    }),
                    PresetOutcome::Failure => {
                        Err(AdapterError::new(Operation::SendMessage))
                    }
                };
                (result, delay)
            }
            None => (Err(AdapterError::new(Operation::SendMessage)), delay),
        };

        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            result
        }
    }

    fn available_intents(
        &self,
    ) -> impl Future<Output = Result<Vec<String>, AdapterError>> + Send + 'static
    {
        let result = self
            .script()
            .intents
            .clone()
            .ok_or(AdapterError::new(Operation::FetchIntents));
        ready(result)
    }
}
