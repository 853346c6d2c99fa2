//! One-shot notification messages.

use serde::{Deserialize, Serialize};

/// How a flash message is styled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    /// An operation succeeded.
    #[default]
    Success,
    /// Neutral information, e.g. why a redirect happened.
    Info,
    /// Something the user should correct.
    Warning,
}

impl FlashKind {
    /// Returns the CSS class suffix for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

/// A message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Message text.
    pub body: String,
    /// Message style.
    pub kind: FlashKind,
}

impl FlashMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(body: impl Into<String>, kind: FlashKind) -> Self {
        Self {
            body: body.into(),
            kind,
        }
    }
}
