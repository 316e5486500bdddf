use std::pin::Pin;
use std::sync::Arc;

use chat_widget_backend::{AdapterError, ChatBackend, ChatResponse, SessionId};
use tracing::Instrument;

type BoxedFuture<T> =
    Pin<Box<dyn Future<Output = Result<T, AdapterError>> + Send>>;
type SendFn = Arc<dyn Fn(String) -> BoxedFuture<ChatResponse> + Send + Sync>;
type IntentsFn = Arc<dyn Fn() -> BoxedFuture<Vec<String>> + Send + Sync>;

/// A wrapper around a chat backend that provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct BackendClient {
    session_id: SessionId,
    send_fn: SendFn,
    intents_fn: IntentsFn,
}

impl BackendClient {
    #[inline]
    pub fn new<B: ChatBackend>(backend: B) -> Self {
        // We have to erase the type `B`, since the controller doesn't have a
        // generic parameter and we don't want it either.
        let session_id = backend.session_id().clone();
        let backend = Arc::new(backend);

        let send_fn: SendFn = {
            let backend = Arc::clone(&backend);
            Arc::new(move |text: String| -> BoxedFuture<ChatResponse> {
                let fut = backend.send_message(&text);
                Box::pin(
                    handle_reply(text, fut)
                        .instrument(trace_span!("backend client req")),
                )
            })
        };
        let intents_fn: IntentsFn =
            Arc::new(move || -> BoxedFuture<Vec<String>> {
                let fut = backend.available_intents();
                Box::pin(
                    handle_intents(fut)
                        .instrument(trace_span!("backend client intents")),
                )
            });

        Self {
            session_id,
            send_fn,
            intents_fn,
        }
    }

    #[inline]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Sends the text and returns the reply.
    ///
    /// The returned future doesn't borrow `self`.
    #[inline]
    pub fn send_message(&self, text: String) -> BoxedFuture<ChatResponse> {
        (self.send_fn)(text)
    }

    #[inline]
    pub fn available_intents(&self) -> BoxedFuture<Vec<String>> {
        (self.intents_fn)()
    }
}

async fn handle_reply(
    text: String,
    fut: impl Future<Output = Result<ChatResponse, AdapterError>>,
) -> Result<ChatResponse, AdapterError> {
    trace!("sending {} bytes", text.len());
    let resp_or_err = fut.await;
    match &resp_or_err {
        Ok(resp) => trace!("got a reply with intent {:?}", resp.intent),
        Err(err) => warn!("request failed: {err}"),
    }
    resp_or_err
}

async fn handle_intents(
    fut: impl Future<Output = Result<Vec<String>, AdapterError>>,
) -> Result<Vec<String>, AdapterError> {
    let intents_or_err = fut.await;
    if let Err(err) = &intents_or_err {
        warn!("fetching intents failed: {err}");
    }
    intents_or_err
}

#[cfg(test)]
mod tests {
    use chat_widget_test_backend::{PresetReply, ScriptedBackend};

    use super::*;

    #[tokio::test]
    async fn test_send_message() {
        let backend = ScriptedBackend::with_session_id("session_1_abc");
        backend.add_reply(PresetReply::message("How are you?"));
        backend.set_intents(["greeting"]);

        let client = BackendClient::new(backend.clone());
        assert_eq!(client.session_id().as_str(), "session_1_abc");

        let resp = client.send_message("Hi".to_owned()).await.unwrap();
        assert_eq!(resp.message, "How are you?");
        assert_eq!(client.available_intents().await.unwrap(), ["greeting"]);
        assert_eq!(backend.received(), ["Hi"]);
    }

    #[tokio::test]
    async fn test_error_handling() {
        let client = BackendClient::new(ScriptedBackend::default());
        let resp_or_err = client.send_message("Hi".to_owned()).await;
        assert!(resp_or_err.is_err());
    }
}
