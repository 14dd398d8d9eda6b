//! Draft analysis: pluggable, trait-based analyzers over extracted proposal text.
//!
//! `CompletionAnalyzer` asks the completion service for a scored breakdown and
//! falls back to the keyword heuristic on any upstream or shape failure.
//! `HeuristicAnalyzer` runs the heuristic directly.
//!
//! `AppState` holds an `Arc<dyn DraftAnalyzer>`, chosen at startup from `ANALYSIS_BACKEND`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, ChatMessage, CompletionPool};
use crate::proposals::heuristic::score_sections;
use crate::proposals::models::DraftAnalysis;
use crate::proposals::prompts::{analysis_system_prompt, analysis_user_prompt};

/// Characters of draft text sent to the completion service.
pub const MAX_ANALYSIS_CHARS: usize = 15_000;

const UNKNOWN_SECTION: &str = "Unknown Section";

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Turns normalized draft text into per-section findings.
#[async_trait]
pub trait DraftAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Vec<DraftAnalysis>, AppError>;

    /// Short label for logs: "heuristic" | "llm".
    fn backend(&self) -> &'static str;
}

pub struct HeuristicAnalyzer;

#[async_trait]
impl DraftAnalyzer for HeuristicAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Vec<DraftAnalysis>, AppError> {
        Ok(score_sections(text))
    }

    fn backend(&self) -> &'static str {
        "heuristic"
    }
}

/// Completion-backed analyzer. `pool` is `None` when no credential is configured,
/// which is reported as a configuration error before any remote call.
pub struct CompletionAnalyzer {
    pool: Option<CompletionPool>,
}

impl CompletionAnalyzer {
    pub fn new(pool: Option<CompletionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DraftAnalyzer for CompletionAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Vec<DraftAnalysis>, AppError> {
        let pool = self
            .pool
            .as_ref()
            .ok_or_else(|| AppError::Configuration("OPENAI_API_KEY not configured.".to_string()))?;

        let messages = vec![
            ChatMessage::system(analysis_system_prompt()),
            ChatMessage::user(analysis_user_prompt(truncate_chars(text, MAX_ANALYSIS_CHARS))),
        ];

        let sections = match pool.submit(messages).await {
            Ok(reply) => parse_analysis_reply(&reply),
            Err(e) => {
                warn!("Draft analysis completion failed: {e}");
                None
            }
        };

        match sections {
            Some(sections) => {
                info!("Draft analysis produced {} sections", sections.len());
                Ok(sections)
            }
            None => {
                warn!("Falling back to heuristic draft analysis");
                Ok(score_sections(text))
            }
        }
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reply parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parses the model's reply into validated sections.
///
/// Returns `None` when the reply is not JSON, has no `sections` array, or yields
/// no usable entries. Non-object entries are skipped.
pub fn parse_analysis_reply(reply: &str) -> Option<Vec<DraftAnalysis>> {
    let payload: Value = match serde_json::from_str(strip_json_fences(reply)) {
        Ok(v) => v,
        Err(e) => {
            warn!("Draft analysis reply is not JSON: {e}");
            return None;
        }
    };

    let sections: Vec<DraftAnalysis> = payload
        .get("sections")?
        .as_array()?
        .iter()
        .filter(|item| item.is_object())
        .map(coerce_section)
        .collect();

    (!sections.is_empty()).then_some(sections)
}

fn coerce_section(item: &Value) -> DraftAnalysis {
    let name = [item.get("section"), item.get("name")]
        .into_iter()
        .flatten()
        .find_map(non_empty_text)
        .unwrap_or_else(|| UNKNOWN_SECTION.to_string());

    let summary = item
        .get("summary")
        .and_then(non_empty_text)
        .unwrap_or_default();

    DraftAnalysis::new(
        name,
        summary,
        coerce_recommendations(item.get("recommendations")),
        coerce_score(item.get("score")),
    )
}

/// Renders a scalar as trimmed text; `null` and blank strings yield `None`.
fn non_empty_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Arrays keep their non-blank entries; a bare value becomes a single entry.
fn coerce_recommendations(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(non_empty_text).collect(),
        Some(other) => non_empty_text(other).into_iter().collect(),
    }
}

/// Float-then-integer coercion: `"87.6"` → 87, anything non-numeric → 0.
fn coerce_score(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .map(|f| f.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
        .unwrap_or(0)
}

/// The first `max` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
