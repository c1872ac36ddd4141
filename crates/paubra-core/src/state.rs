//! UI-agnostic conversation types
//!
//! These are shared by every front end and are also the on-disk format of the
//! persisted history, so the serialized shape must stay stable.

use serde::{Deserialize, Serialize};

/// One message exchanged in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// Who a turn is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    #[serde(rename = "user")]
    User,
    // Histories written by the web widget use "ai"
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

impl ChatRole {
    /// Speaker label used in the flattened transcript
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        }
    }
}
