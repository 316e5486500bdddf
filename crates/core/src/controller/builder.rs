use std::sync::{Arc, Mutex};

use chat_widget_backend::{ChatBackend, ChatResponse};
use tokio::sync::watch;

use super::{Controller, DEFAULT_APOLOGY_TEXT, SendPolicy, Shared};
use crate::backend_client::BackendClient;
use crate::conversation::Message;
use crate::error::WidgetError;
use crate::observer::Observers;

/// [`Controller`] builder.
pub struct ControllerBuilder {
    client: BackendClient,
    observers: Observers,
    policy: SendPolicy,
    apology_text: String,
}

impl ControllerBuilder {
    /// Creates a new builder with the specified backend.
    #[inline]
    pub fn with_backend<B: ChatBackend>(backend: B) -> Self {
        Self {
            client: BackendClient::new(backend),
            observers: Observers::default(),
            policy: SendPolicy::default(),
            apology_text: DEFAULT_APOLOGY_TEXT.to_owned(),
        }
    }

    /// Replaces all observer callbacks.
    #[inline]
    pub fn with_observers(mut self, observers: Observers) -> Self {
        self.observers = observers;
        self
    }

    /// Attaches a callback to be invoked with the user's own messages.
    #[inline]
    pub fn on_message(
        mut self,
        on_message: impl Fn(&Message) + Send + Sync + 'static,
    ) -> Self {
        self.observers = self.observers.on_message(on_message);
        self
    }

    /// Attaches a callback to be invoked with raw backend responses.
    #[inline]
    pub fn on_response(
        mut self,
        on_response: impl Fn(&ChatResponse) + Send + Sync + 'static,
    ) -> Self {
        self.observers = self.observers.on_response(on_response);
        self
    }

    /// Attaches a callback to be invoked when a request fails.
    #[inline]
    pub fn on_error(
        mut self,
        on_error: impl Fn(&WidgetError) + Send + Sync + 'static,
    ) -> Self {
        self.observers = self.observers.on_error(on_error);
        self
    }

    /// Sets how overlapping requests are scheduled.
    #[inline]
    pub fn with_send_policy(mut self, policy: SendPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the reply shown when a request fails.
    #[inline]
    pub fn with_apology_text<S: Into<String>>(mut self, text: S) -> Self {
        self.apology_text = text.into();
        self
    }

    /// Builds the controller, with an empty history and the window closed.
    pub fn build(self) -> Controller {
        let ControllerBuilder {
            client,
            observers,
            policy,
            apology_text,
        } = self;

        debug!("new conversation for session {}", client.session_id());
        let (state_tx, _) = watch::channel(Default::default());
        let shared = Shared {
            client,
            observers,
            policy,
            apology_text,
            state_tx,
            tasks: Mutex::new(Default::default()),
        };
        Controller {
            shared: Arc::new(shared),
        }
    }
}
