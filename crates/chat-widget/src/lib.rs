//! An embeddable chat widget: a conversation controller bound to the HTTP
//! chat service, behind a handle the host application owns.
//!
//! The crate includes a CLI tool that renders the conversation in the
//! terminal. And you can also use it as a library to drive your own
//! presentation layer.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod config;
mod widget;

pub use config::{DisplayOptions, Position, Theme, WidgetConfig};
pub use widget::{Widget, WidgetBuilder};

/// Re-exports of [`chat_widget_core`] crate.
pub mod core {
    pub use chat_widget_core::*;
}

/// Re-exports of [`chat_widget_backend`] crate.
pub mod backend {
    pub use chat_widget_backend::*;
}
