//! A chat backend that talks JSON over HTTP(S) to the chat service.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::sync::Arc;

use chat_widget_backend::{
    AdapterError, ChatBackend, ChatResponse, ConfigError, Operation, SessionId,
};
use chrono::Utc;
use mime::Mime;
use reqwest::{Client, Method, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use tracing::Instrument;

pub use config::{HttpBackendConfig, HttpBackendConfigBuilder};
use proto::MessageResponse;

const MESSAGE_PATH: &str = "/api/chat/message";
const INTENTS_PATH: &str = "/api/chat/intents";

/// Chat backend for the HTTP chat service.
///
/// Every call performs exactly one round trip. Failures of any sort are
/// logged and then reported as an [`AdapterError`] without detail.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    config: Arc<HttpBackendConfig>,
    session_id: SessionId,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` with the given configuration.
    ///
    /// A session identifier is generated unless the configuration
    /// supplies one.
    pub fn new(config: HttpBackendConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ConfigError::Client(err.to_string()))?;
        let session_id = config
            .session_id
            .clone()
            .unwrap_or_else(SessionId::generate);
        debug!(
            "created http backend for {} with session {session_id}",
            config.base_url
        );
        Ok(Self {
            client,
            config: Arc::new(config),
            session_id,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.config.base_url, path))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.token),
            )
            .header(header::CONTENT_TYPE, "application/json")
    }
}

impl ChatBackend for HttpBackend {
    #[inline]
    fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    fn send_message(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<ChatResponse, AdapterError>> + Send + 'static
    {
        let body = proto::create_request(text, &self.session_id);
        let resp_fut = self.request(Method::POST, MESSAGE_PATH).json(&body).send();
        let session_id = self.session_id.clone();

        async move {
            let resp: MessageResponse =
                read_json(resp_fut.await, Operation::SendMessage).await?;
            Ok(proto::into_chat_response(resp, &session_id, Utc::now()))
        }
        .instrument(trace_span!("http backend req", path = MESSAGE_PATH))
    }

    fn available_intents(
        &self,
    ) -> impl Future<Output = Result<Vec<String>, AdapterError>> + Send + 'static
    {
        let resp_fut = self.request(Method::GET, INTENTS_PATH).send();

        async move { read_json(resp_fut.await, Operation::FetchIntents).await }
            .instrument(trace_span!("http backend req", path = INTENTS_PATH))
    }
}

async fn read_json<T: DeserializeOwned>(
    resp_or_err: reqwest::Result<Response>,
    operation: Operation,
) -> Result<T, AdapterError> {
    let fail = |reason: String| {
        error!("{operation:?} failed: {reason}");
        AdapterError::new(operation)
    };

    let resp = resp_or_err
        .and_then(Response::error_for_status)
        .map_err(|err| fail(format!("{err}")))?;

    // Servers may omit the content type, but one that is present must be
    // JSON.
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    if let Some(content_type) = content_type {
        let is_json = content_type
            .parse()
            .map(|m: Mime| {
                m.subtype().as_str() == "json"
                    || m.suffix().map(|s| s.as_str()) == Some("json")
            })
            .unwrap_or(false);
        if !is_json {
            return Err(fail(format!(
                "unexpected content type: {content_type:?}"
            )));
        }
    }

    let payload = resp.json::<T>().await.map_err(|err| fail(format!("{err}")))?;
    trace!("decoded {operation:?} payload");
    Ok(payload)
}
