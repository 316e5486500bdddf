use crate::error::AdapterError;
use crate::response::ChatResponse;
use crate::session::SessionId;

/// A type that represents a chat backend, the single point of contact with
/// the remote chat service.
///
/// Once the backend is created, it should behave like a stateless object
/// except for its session identifier, which must stay the same for the
/// entire lifetime of the backend. Every call performs exactly one round
/// trip; retrying and caching are left to the callers.
///
/// Returned futures are `'static` so that callers may run them on their
/// own tasks, detached from the borrow of the backend.
pub trait ChatBackend: Send + Sync + 'static {
    /// Returns the session identifier in effect.
    fn session_id(&self) -> &SessionId;

    /// Sends the user's text verbatim together with the session identifier
    /// and returns the structured reply.
    fn send_message(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<ChatResponse, AdapterError>> + Send + 'static;

    /// Fetches the intent labels the backend is able to recognize.
    fn available_intents(
        &self,
    ) -> impl Future<Output = Result<Vec<String>, AdapterError>> + Send + 'static;
}
