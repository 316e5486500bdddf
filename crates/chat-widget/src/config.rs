use std::env;
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TITLE: &str = "PMS Assistant";
const DEFAULT_SUBTITLE: &str = "How can I help you today?";

/// Where the widget is anchored on the host page.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    /// Bottom right corner.
    #[default]
    BottomRight,
    /// Bottom left corner.
    BottomLeft,
    /// Top right corner.
    TopRight,
    /// Top left corner.
    TopLeft,
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom-right" => Ok(Position::BottomRight),
            "bottom-left" => Ok(Position::BottomLeft),
            "top-right" => Ok(Position::TopRight),
            "top-left" => Ok(Position::TopLeft),
            _ => Err(format!("unknown position `{s}`")),
        }
    }
}

/// Color scheme of the widget.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("unknown theme `{s}`")),
        }
    }
}

/// Presentation settings. The widget passes these through to the
/// presentation layer without interpreting them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOptions {
    /// Where the widget is anchored.
    pub position: Position,
    /// Color scheme.
    pub theme: Theme,
    /// Accent color, in any CSS color syntax.
    pub primary_color: Option<String>,
    /// Window title.
    pub title: String,
    /// Line shown under the title.
    pub subtitle: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            position: Position::default(),
            theme: Theme::default(),
            primary_color: None,
            title: DEFAULT_TITLE.to_owned(),
            subtitle: DEFAULT_SUBTITLE.to_owned(),
        }
    }
}

/// Everything needed to set up a widget.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Base URL of the chat service.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer token for the chat service.
    pub jwt_token: String,
    /// Session to resume. A new one is generated when unset.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Presentation settings.
    #[serde(flatten)]
    pub display: DisplayOptions,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

impl WidgetConfig {
    /// Creates a configuration with default display settings.
    #[inline]
    pub fn new<U, T>(api_url: U, jwt_token: T) -> Self
    where
        U: Into<String>,
        T: Into<String>,
    {
        Self {
            api_url: api_url.into(),
            jwt_token: jwt_token.into(),
            session_id: None,
            display: DisplayOptions::default(),
        }
    }

    /// Reads the configuration from `CHAT_WIDGET_*` environment variables.
    ///
    /// Unset variables fall back to defaults. A missing token is left
    /// empty and reported when the widget is initialized.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        // Blank values count as unset.
        let lookup = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        let mut display = DisplayOptions::default();
        if let Some(position) = lookup("CHAT_WIDGET_POSITION") {
            match position.parse() {
                Ok(position) => display.position = position,
                Err(err) => warn!("ignoring CHAT_WIDGET_POSITION: {err}"),
            }
        }
        if let Some(theme) = lookup("CHAT_WIDGET_THEME") {
            match theme.parse() {
                Ok(theme) => display.theme = theme,
                Err(err) => warn!("ignoring CHAT_WIDGET_THEME: {err}"),
            }
        }
        display.primary_color = lookup("CHAT_WIDGET_PRIMARY_COLOR");
        if let Some(title) = lookup("CHAT_WIDGET_TITLE") {
            display.title = title;
        }
        if let Some(subtitle) = lookup("CHAT_WIDGET_SUBTITLE") {
            display.subtitle = subtitle;
        }

        Self {
            api_url: lookup("CHAT_WIDGET_API_URL")
                .unwrap_or_else(default_api_url),
            jwt_token: lookup("CHAT_WIDGET_TOKEN").unwrap_or_default(),
            session_id: lookup("CHAT_WIDGET_SESSION_ID"),
            display,
        }
    }
}

impl Debug for WidgetConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("api_url", &self.api_url)
            .field("jwt_token", &"<redacted>")
            .field("session_id", &self.session_id)
            .field("display", &self.display)
            .finish()
    }
}
