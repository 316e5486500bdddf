use std::fmt::{self, Display, Formatter};

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

const SESSION_PREFIX: &str = "session";
const SUFFIX_LEN: usize = 9;
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// An opaque identifier that correlates all requests belonging to one
/// conversation on the backend.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps an externally supplied identifier.
    #[inline]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Generates a fresh identifier.
    ///
    /// The identifier is the fixed prefix, the current Unix time in
    /// milliseconds and a short random alphanumeric suffix, which keeps
    /// identifiers created at the same millisecond apart without any
    /// coordination.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..SUFFIX_CHARSET.len());
                SUFFIX_CHARSET[idx] as char
            })
            .collect();
        Self(format!("{SESSION_PREFIX}_{millis}_{suffix}"))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SessionId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
