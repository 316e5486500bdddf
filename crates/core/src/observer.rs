use chat_widget_backend::ChatResponse;

use crate::conversation::Message;
use crate::error::WidgetError;

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Callbacks the host application supplies to follow the conversation.
///
/// Callbacks run on whichever task made the change, right after the new
/// state has been published. They must not block.
#[derive(Default)]
pub struct Observers {
    on_message: Option<Callback<Message>>,
    on_response: Option<Callback<ChatResponse>>,
    on_error: Option<Callback<WidgetError>>,
}

impl Observers {
    /// Attaches a callback invoked with the user's own message once it
    /// has been added to the history.
    #[inline]
    pub fn on_message(
        mut self,
        on_message: impl Fn(&Message) + Send + Sync + 'static,
    ) -> Self {
        self.on_message = Some(Box::new(on_message));
        self
    }

    /// Attaches a callback invoked with the raw backend response.
    #[inline]
    pub fn on_response(
        mut self,
        on_response: impl Fn(&ChatResponse) + Send + Sync + 'static,
    ) -> Self {
        self.on_response = Some(Box::new(on_response));
        self
    }

    /// Attaches a callback invoked for configuration and backend failures.
    #[inline]
    pub fn on_error(
        mut self,
        on_error: impl Fn(&WidgetError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }

    #[inline]
    pub(crate) fn message(&self, message: &Message) {
        if let Some(on_message) = &self.on_message {
            on_message(message);
        }
    }

    #[inline]
    pub(crate) fn response(&self, response: &ChatResponse) {
        if let Some(on_response) = &self.on_response {
            on_response(response);
        }
    }

    /// Reports an error to the host, if it is listening.
    #[inline]
    pub fn error(&self, error: &WidgetError) {
        if let Some(on_error) = &self.on_error {
            on_error(error);
        }
    }
}
