//! Conversation controller: message history, request lifecycle, and the
//! observer callbacks a host application hooks into.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod backend_client;
mod controller;
pub mod conversation;
mod error;
mod observer;

pub use controller::{
    Controller, ControllerBuilder, DEFAULT_APOLOGY_TEXT, PendingReply,
    SendOutcome, SendPolicy,
};
pub use error::WidgetError;
pub use observer::Observers;
