use std::error::Error;
use std::fmt::{self, Display, Formatter};

use chat_widget_backend::{AdapterError, ConfigError};

/// An error reported to the host application through
/// [`crate::Observers::on_error`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetError {
    /// The widget could not be set up from its configuration.
    Configuration(ConfigError),
    /// A backend request failed. The conversation has already recovered.
    Adapter(AdapterError),
}

impl Display for WidgetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::Configuration(err) => {
                write!(f, "configuration error: {err}")
            }
            WidgetError::Adapter(err) => write!(f, "backend error: {err}"),
        }
    }
}

impl Error for WidgetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WidgetError::Configuration(err) => Some(err),
            WidgetError::Adapter(err) => Some(err),
        }
    }
}

impl From<ConfigError> for WidgetError {
    #[inline]
    fn from(value: ConfigError) -> Self {
        WidgetError::Configuration(value)
    }
}

impl From<AdapterError> for WidgetError {
    #[inline]
    fn from(value: AdapterError) -> Self {
        WidgetError::Adapter(value)
    }
}
