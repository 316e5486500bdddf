mod builder;
mod reply;
#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chat_widget_backend::{AdapterError, SessionId};
use tokio::sync::{oneshot, watch};
use tokio::task::{AbortHandle, JoinHandle};

use crate::backend_client::BackendClient;
use crate::conversation::{ConversationState, Message};
use crate::error::WidgetError;
use crate::observer::Observers;
pub use builder::ControllerBuilder;
pub use reply::{PendingReply, SendOutcome};

/// The text of the reply appended when a request fails.
pub const DEFAULT_APOLOGY_TEXT: &str =
    "Sorry, I encountered an error. Please try again.";

/// How requests issued while another one is in flight are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SendPolicy {
    /// Requests run concurrently and their replies are appended in
    /// completion order, so a fast reply may overtake a slow one.
    #[default]
    Concurrent,
    /// Requests run one at a time in the order they were sent, so replies
    /// are appended in the same order as the user's messages. User
    /// messages are still appended immediately, and the order is fixed
    /// when [`Controller::send_message`] is called, not when the request
    /// task first runs.
    Serialized,
}

/// The conversation controller, which owns the message history and the
/// request lifecycle flags for one backend session.
///
/// The controller is the sole mutator of [`ConversationState`]. Every
/// change is published as one snapshot through a watch channel, so the
/// presentation layer never observes an intermediate state. Clones share
/// the same conversation.
///
/// Requests run on spawned tasks, so the controller must be used from
/// within a Tokio runtime.
#[derive(Clone)]
pub struct Controller {
    shared: Arc<Shared>,
}

struct Shared {
    client: BackendClient,
    observers: Observers,
    policy: SendPolicy,
    apology_text: String,
    state_tx: watch::Sender<ConversationState>,
    tasks: Mutex<Tasks>,
}

#[derive(Default)]
struct Tasks {
    running: HashMap<u64, AbortHandle>,
    next_task_id: u64,
    shut_down: bool,
    /// Resolves once the most recently spawned serialized request is done.
    last_ticket: Option<oneshot::Receiver<()>>,
}

/// Orders a serialized request after its predecessor. The request waits on
/// `prev`, and signals its own completion through `done` (or by dropping it
/// when aborted).
struct Ticket {
    prev: Option<oneshot::Receiver<()>>,
    done: oneshot::Sender<()>,
}

impl Ticket {
    async fn wait_turn(&mut self) {
        if let Some(prev) = self.prev.take() {
            // An error means the predecessor was dropped, which also ends
            // its turn.
            let _ = prev.await;
        }
    }
}

impl Controller {
    /// Sends the user's text to the backend.
    ///
    /// Blank text is ignored. Otherwise the user's message is appended and
    /// `loading` is raised before this method returns; the reply (or an
    /// apology if the request fails) is appended later by a spawned task.
    ///
    /// Awaiting the returned [`PendingReply`] is optional, dropping it does
    /// not cancel the request. Failures are never returned from here, they
    /// are recovered in the conversation and reported to the error
    /// observer.
    pub fn send_message<S: Into<String>>(&self, text: S) -> PendingReply {
        let text = text.into();
        if text.trim().is_empty() {
            trace!("ignoring blank input");
            return PendingReply::ready(SendOutcome::Ignored);
        }
        if self.shared.tasks().shut_down {
            debug!("controller is shut down, ignoring input");
            return PendingReply::ready(SendOutcome::Ignored);
        }

        let user_msg = Message::user(text.clone());
        self.shared.state_tx.send_modify(|state| {
            state.history.push(user_msg.clone());
            state.in_flight += 1;
        });
        self.shared.observers.message(&user_msg);

        match self.spawn_request(text) {
            Some(task) => PendingReply::task(task),
            None => {
                // Shut down in the meantime, so nobody will finish this one.
                self.shared.state_tx.send_modify(|state| {
                    state.in_flight = state.in_flight.saturating_sub(1);
                });
                PendingReply::ready(SendOutcome::Ignored)
            }
        }
    }

    /// Flips the `open` flag and returns its new value.
    pub fn toggle_open(&self) -> bool {
        let mut open = false;
        self.shared.state_tx.send_modify(|state| {
            state.open = !state.open;
            open = state.open;
        });
        open
    }

    /// Empties the history. The session, `open` and `loading` are left
    /// untouched, and replies still in flight are appended when they land.
    pub fn clear_history(&self) {
        self.shared.state_tx.send_modify(|state| state.history.clear());
        debug!("history cleared");
    }

    /// Returns a snapshot of the current state.
    #[inline]
    pub fn state(&self) -> ConversationState {
        self.shared.state_tx.borrow().clone()
    }

    /// Subscribes to state changes, for re-rendering.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.shared.state_tx.subscribe()
    }

    /// Returns the session identifier of the backend.
    #[inline]
    pub fn session_id(&self) -> &SessionId {
        self.shared.client.session_id()
    }

    /// Fetches the intents the backend supports. Failures are also
    /// reported to the error observer.
    pub async fn available_intents(&self) -> Result<Vec<String>, AdapterError> {
        let intents_or_err = self.shared.client.available_intents().await;
        if let Err(err) = &intents_or_err {
            self.shared.observers.error(&WidgetError::Adapter(*err));
        }
        intents_or_err
    }

    /// Aborts every request in flight and ignores further input. Calling
    /// this more than once has no further effect.
    pub fn shutdown(&self) {
        let running = {
            let mut tasks = self.shared.tasks();
            if tasks.shut_down {
                return;
            }
            tasks.shut_down = true;
            std::mem::take(&mut tasks.running)
        };
        debug!("shutting down, aborting {} requests", running.len());
        for task in running.into_values() {
            task.abort();
        }
        self.shared
            .state_tx
            .send_modify(|state| state.in_flight = 0);
    }

    fn spawn_request(&self, text: String) -> Option<JoinHandle<SendOutcome>> {
        let mut tasks = self.shared.tasks();
        if tasks.shut_down {
            return None;
        }
        let task_id = tasks.next_task_id;
        tasks.next_task_id += 1;

        // Taken while the lock is held, so serialized requests queue up in
        // call order regardless of when their tasks get polled.
        let ticket = match self.shared.policy {
            SendPolicy::Serialized => {
                let (done, next) = oneshot::channel();
                let prev = tasks.last_ticket.replace(next);
                Some(Ticket { prev, done })
            }
            SendPolicy::Concurrent => None,
        };

        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let outcome = shared.run_request(text, ticket).await;
            shared.tasks().running.remove(&task_id);
            outcome
        });
        tasks.running.insert(task_id, task.abort_handle());
        Some(task)
    }
}

impl Shared {
    async fn run_request(
        &self,
        text: String,
        mut ticket: Option<Ticket>,
    ) -> SendOutcome {
        // Released only after the reply is appended, so serialized replies
        // land in the order they were sent.
        if let Some(ticket) = &mut ticket {
            ticket.wait_turn().await;
        }

        let outcome = match self.client.send_message(text).await {
            Ok(resp) => {
                self.finish_request(Message::from_response(&resp));
                self.observers.response(&resp);
                SendOutcome::Replied
            }
            Err(err) => {
                self.finish_request(Message::apology(&self.apology_text));
                self.observers.error(&WidgetError::Adapter(err));
                SendOutcome::Recovered
            }
        };
        if let Some(ticket) = ticket {
            let _ = ticket.done.send(());
        }
        outcome
    }

    /// Appends the reply and lowers the in-flight count in one snapshot.
    fn finish_request(&self, reply: Message) {
        self.state_tx.send_modify(|state| {
            state.history.push(reply);
            state.in_flight = state.in_flight.saturating_sub(1);
        });
    }

    #[inline]
    fn tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
