//! Conversational assist: forwards a chat turn to the completion service,
//! extracts structured form updates for the active builder section, and
//! attaches synthesized speech when it is available.
//!
//! Flow: build messages → completion (worker pool) → parse reply →
//!       filter updates to the section allow-list → best-effort synthesis.

use serde_json::Value;
use tracing::{info, warn};

use crate::assist::models::{ChatRequest, ChatResponse, ConversationMessage, FieldUpdates};
use crate::assist::prompts::field_extraction_instruction;
use crate::assist::sections::{section_config, SectionFieldConfig};
use crate::assist::speech::SpeechClient;
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, CompletionPool};

/// Runs one assist turn.
///
/// A failed completion is fatal. A failed synthesis only drops the audio,
/// except for a missing speech credential, which is propagated.
pub async fn run_chat(
    pool: &CompletionPool,
    speech: &SpeechClient,
    request: ChatRequest,
) -> Result<ChatResponse, AppError> {
    let section = request.section.and_then(section_config);
    let messages = build_messages(&request.history, section, &request.message);

    let raw_reply = pool.submit(messages).await?;
    let (message, updates) = parse_structured_reply(&raw_reply);
    let field_updates = filter_to_section(updates, section);

    if let Some(updates) = &field_updates {
        info!("Assist extracted {} field update(s)", updates.len());
    }

    let audio_base64 = match speech
        .synthesize(&message, request.voice_id.as_deref())
        .await
        .map_err(AppError::from)
    {
        Ok(audio) => Some(audio),
        Err(e @ AppError::Configuration(_)) => return Err(e),
        Err(e) => {
            warn!("Speech synthesis failed, replying without audio: {e}");
            None
        }
    };

    Ok(ChatResponse {
        message,
        audio_base64,
        field_updates,
    })
}

/// History in order, then the extraction instruction for a known section, then the new message.
pub fn build_messages(
    history: &[ConversationMessage],
    section: Option<&SectionFieldConfig>,
    message: &str,
) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = history.to_vec();
    if let Some(section) = section {
        messages.push(ChatMessage::system(field_extraction_instruction(section)));
    }
    messages.push(ChatMessage::user(message));
    messages
}

/// Splits a model reply into the user-facing text and any field updates.
///
/// A surrounding code fence is removed (backticks stripped, then the first line
/// dropped). If the remainder is not JSON the raw reply is the message. A missing
/// or blank `chat_reply` also falls back to the raw reply.
pub fn parse_structured_reply(content: &str) -> (String, Option<FieldUpdates>) {
    let mut stripped = content.trim();
    if stripped.starts_with("```") {
        stripped = stripped.trim_matches('`');
        if let Some((_, rest)) = stripped.split_once('\n') {
            stripped = rest;
        }
    }

    let payload: Value = match serde_json::from_str(stripped) {
        Ok(v) => v,
        Err(_) => return (content.to_string(), None),
    };

    let chat_reply = payload
        .get("chat_reply")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
        .unwrap_or_else(|| content.to_string());

    let field_updates = payload
        .get("field_updates")
        .and_then(Value::as_object)
        .map(|raw| {
            raw.iter()
                .filter_map(|(key, value)| {
                    let value = value.as_str()?.trim();
                    (!value.is_empty()).then(|| (key.clone(), value.to_string()))
                })
                .collect::<FieldUpdates>()
        })
        .filter(|updates| !updates.is_empty());

    (chat_reply, field_updates)
}

/// Keeps only keys the section allows. With no known section, updates pass through.
pub fn filter_to_section(
    updates: Option<FieldUpdates>,
    section: Option<&SectionFieldConfig>,
) -> Option<FieldUpdates> {
    let updates = updates?;
    let Some(section) = section else {
        return Some(updates);
    };

    let filtered: FieldUpdates = updates
        .into_iter()
        .filter(|(key, _)| section.allows(key))
        .collect();
    (!filtered.is_empty()).then_some(filtered)
}
