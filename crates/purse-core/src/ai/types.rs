//! AI backend request/response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use base64::Engine;
use serde::Serialize;

use crate::models::ChatRole;

/// Which chat surface a message belongs to
///
/// Standard is the everyday assistant; Architect is the pro-tier
/// deep-analysis chat with its own transcript and elevated capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    #[default]
    Standard,
    Architect,
}

impl ChatMode {
    /// Whether messages in this mode land in the pro transcript
    pub fn is_pro_transcript(&self) -> bool {
        matches!(self, Self::Architect)
    }
}

/// A tool the service may invoke, with a JSON Schema for its arguments
#[derive(Debug, Clone, Serialize)]
pub struct ToolDecl {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDecl {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// An inline image attachment, base64-encoded
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub data: String,
    pub mime_type: String,
}

impl InlineImage {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }
}

/// One prior turn of conversation, as role/text
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// One request to the generative service
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// System instruction, carries the financial context block
    pub system: String,
    /// Prior conversation, oldest first
    pub history: Vec<ChatTurn>,
    /// The current user message
    pub message: String,
    pub image: Option<InlineImage>,
    /// Tools the service may invoke
    pub tools: Vec<ToolDecl>,
    /// Allow grounding answers in live web search
    pub live_search: bool,
    pub temperature: f32,
    /// Use the backend's elevated model
    pub elevated: bool,
}

impl GenerateRequest {
    /// A bare single-message request with no tools
    pub fn simple(system: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            history: Vec::new(),
            message: message.into(),
            image: None,
            tools: Vec::new(),
            live_search: false,
            temperature: 0.5,
            elevated: false,
        }
    }
}

/// A tool call as returned by the service, before validation
#[derive(Debug, Clone)]
pub struct RawToolCall {
    pub name: String,
    pub args: serde_json::Value,
}

/// What came back from the generative service
#[derive(Debug, Clone, Default)]
pub struct GenerateReply {
    pub text: String,
    pub tool_calls: Vec<RawToolCall>,
    /// Grounding citation URLs, present when live search was used
    pub citations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_image_encodes_base64() {
        let image = InlineImage::from_bytes(b"abc", "image/png");
        assert_eq!(image.data, "YWJj");
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_chat_mode_transcript_selection() {
        assert!(!ChatMode::Standard.is_pro_transcript());
        assert!(ChatMode::Architect.is_pro_transcript());
    }
}
