use std::time::Duration;

use chat_widget_backend::{
    AdapterError, ChatBackend, ChatResponse, ConfigError, SessionId,
};
use chat_widget_core::conversation::{ConversationState, Message};
use chat_widget_core::{
    Controller, ControllerBuilder, Observers, PendingReply, SendPolicy,
    WidgetError,
};
use chat_widget_http_backend::{HttpBackend, HttpBackendConfigBuilder};
use tokio::sync::watch;

use crate::config::{DisplayOptions, WidgetConfig};

/// A widget builder.
///
/// See [`Widget`].
pub struct WidgetBuilder {
    config: WidgetConfig,
    observers: Observers,
    policy: SendPolicy,
    timeout: Option<Duration>,
}

impl WidgetBuilder {
    /// Creates a widget builder with the given configuration.
    #[inline]
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            observers: Observers::default(),
            policy: SendPolicy::default(),
            timeout: None,
        }
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

    /// Attaches a callback to be invoked for configuration and request
    /// failures.
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

    /// Bounds every backend request by the given duration.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Initializes a widget talking to the configured chat service.
    ///
    /// If the configuration is unusable, the error observer is notified
    /// and no widget is created.
    pub fn init(self) -> Result<Widget, ConfigError> {
        match self.http_backend() {
            Ok(backend) => Ok(self.init_with_backend(backend)),
            Err(err) => {
                error!("failed to initialize chat widget: {err}");
                self.observers
                    .error(&WidgetError::Configuration(err.clone()));
                Err(err)
            }
        }
    }

    /// Initializes a widget around the given backend. The endpoint, token
    /// and session in the configuration are not used.
    pub fn init_with_backend<B: ChatBackend>(self, backend: B) -> Widget {
        let controller = ControllerBuilder::with_backend(backend)
            .with_observers(self.observers)
            .with_send_policy(self.policy)
            .build();
        info!("chat widget ready, session {}", controller.session_id());
        Widget {
            controller,
            display: self.config.display,
        }
    }

    fn http_backend(&self) -> Result<HttpBackend, ConfigError> {
        let mut builder =
            HttpBackendConfigBuilder::with_endpoint(&self.config.api_url)
                .with_token(&self.config.jwt_token);
        if let Some(session_id) = self
            .config
            .session_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
        {
            builder = builder.with_session_id(session_id);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.with_timeout(timeout);
        }
        HttpBackend::new(builder.build()?)
    }
}

/// A chat widget, the handle a host application owns.
///
/// The widget holds one conversation bound to one backend session. The
/// presentation layer forwards user commands to it and renders from its
/// state. Destroying (or dropping) the widget aborts requests in flight.
pub struct Widget {
    controller: Controller,
    display: DisplayOptions,
}

impl Widget {
    /// Sends the user's text. See [`Controller::send_message`].
    #[inline]
    pub fn send(&self, text: &str) -> PendingReply {
        self.controller.send_message(text)
    }

    /// Opens or closes the window, returning whether it is now open.
    #[inline]
    pub fn toggle_open(&self) -> bool {
        self.controller.toggle_open()
    }

    /// Clears the conversation history, keeping the session.
    #[inline]
    pub fn clear(&self) {
        self.controller.clear_history();
    }

    /// Returns a snapshot of the conversation.
    #[inline]
    pub fn state(&self) -> ConversationState {
        self.controller.state()
    }

    /// Subscribes to conversation changes.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.controller.subscribe()
    }

    /// Fetches the intents the backend supports.
    #[inline]
    pub async fn available_intents(&self) -> Result<Vec<String>, AdapterError> {
        self.controller.available_intents().await
    }

    /// Returns the presentation settings.
    #[inline]
    pub fn display(&self) -> &DisplayOptions {
        &self.display
    }

    /// Returns the backend session identifier.
    #[inline]
    pub fn session_id(&self) -> &SessionId {
        self.controller.session_id()
    }

    /// Returns the underlying controller.
    #[inline]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Tears the widget down.
    #[inline]
    pub fn destroy(self) {
        drop(self);
    }
}

impl Drop for Widget {
    fn drop(&mut self) {
        self.controller.shutdown();
        debug!("chat widget destroyed");
    }
}
