use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::llm_client::ChatMessage;

/// Field name → value pairs extracted from one assistant turn.
pub type FieldUpdates = BTreeMap<String, String>;

/// A prior turn supplied by the client. Roles are limited to system, user and assistant.
pub type ConversationMessage = ChatMessage;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Latest user message.
    pub message: String,
    /// Chronological history, oldest first.
    #[serde(default)]
    pub history: Vec<ConversationMessage>,
    /// Overrides the configured default voice.
    pub voice_id: Option<String>,
    /// Current builder section; drives structured extraction.
    pub section: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub audio_base64: Option<String>,
    pub field_updates: Option<FieldUpdates>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SynthesisResponse {
    pub audio_base64: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionResponse {
    pub text: String,
}
