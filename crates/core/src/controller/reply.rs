use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::task::JoinHandle;

/// What became of a call to [`super::Controller::send_message`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SendOutcome {
    /// The text was blank, or the controller was shut down. Nothing was
    /// appended.
    Ignored,
    /// The backend replied and the reply was appended.
    Replied,
    /// The request failed and an apology was appended.
    Recovered,
    /// The request was aborted by a shutdown before it finished.
    Aborted,
}

/// A future that resolves once the reply to a sent message has been
/// appended.
///
/// The request runs on its own task, so dropping this future does not
/// cancel it.
#[must_use = "the reply is appended even if this is dropped, but the outcome is lost"]
pub struct PendingReply {
    inner: Inner,
}

enum Inner {
    Ready(Option<SendOutcome>),
    Task(JoinHandle<SendOutcome>),
}

impl PendingReply {
    #[inline]
    pub(crate) fn ready(outcome: SendOutcome) -> Self {
        Self {
            inner: Inner::Ready(Some(outcome)),
        }
    }

    #[inline]
    pub(crate) fn task(task: JoinHandle<SendOutcome>) -> Self {
        Self {
            inner: Inner::Task(task),
        }
    }
}

impl Future for PendingReply {
    type Output = SendOutcome;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Self::Output> {
        match &mut self.inner {
            Inner::Ready(outcome) => {
                // Polling after completion keeps reporting `Ignored`.
                Poll::Ready(outcome.take().unwrap_or(SendOutcome::Ignored))
            }
            Inner::Task(task) => match ready!(Pin::new(task).poll(cx)) {
                Ok(outcome) => Poll::Ready(outcome),
                Err(err) => {
                    if err.is_panic() {
                        error!("request task panicked: {err}");
                    }
                    Poll::Ready(SendOutcome::Aborted)
                }
            },
        }
    }
}
