//! The contract between the conversation controller and a chat backend.
//!
//! This crate establishes the protocol that every backend adapter speaks,
//! so the controller can drive a remote HTTP service, an in-process fake,
//! or anything else without knowing how the reply was produced.
//!
//! Types in this crate don't define any transport behavior, they are the
//! constraints that adapter implementors should adhere to.

#![deny(missing_docs)]

mod backend;
mod error;
mod response;
mod session;

pub use backend::*;
pub use error::*;
pub use response::*;
pub use session::*;
