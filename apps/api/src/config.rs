use anyhow::{bail, Context, Result};
use tokio::sync::Semaphore;

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

/// Which implementation backs `POST /api/proposals/analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisBackend {
    /// Remote completion service, falling back to the heuristic on failure.
    Llm,
    /// Keyword heuristic only. No remote calls.
    Heuristic,
}

/// Application configuration loaded from environment variables.
///
/// Credentials are optional at start-up: a missing key only becomes an error
/// when an endpoint that needs it is called.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_chat_model: String,
    pub openai_base_url: String,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_voice_id: String,
    pub elevenlabs_tts_model_id: String,
    pub elevenlabs_tts_base_url: String,
    pub elevenlabs_stt_model_id: String,
    pub elevenlabs_stt_endpoint: String,
    pub allowed_origins: Vec<String>,
    pub analysis_backend: AnalysisBackend,
    pub completion_workers: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let completion_workers = var_or("COMPLETION_WORKERS", "8")
            .parse::<usize>()
            .context("COMPLETION_WORKERS must be a positive integer")?
            .clamp(1, Semaphore::MAX_PERMITS);
        let max_upload_bytes = var_or("MAX_UPLOAD_MB", "25")
            .parse::<usize>()
            .context("MAX_UPLOAD_MB must be a positive integer")?
            .checked_mul(1024 * 1024)
            .context("MAX_UPLOAD_MB is too large")?;

        Ok(Config {
            openai_api_key: non_blank(lookup("OPENAI_API_KEY")),
            openai_chat_model: var_or("OPENAI_CHAT_MODEL", "gpt-4o-mini"),
            openai_base_url: var_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            elevenlabs_api_key: non_blank(lookup("ELEVENLABS_API_KEY")),
            elevenlabs_voice_id: var_or("ELEVENLABS_VOICE_ID", "Rachel"),
            elevenlabs_tts_model_id: var_or("ELEVENLABS_TTS_MODEL_ID", "eleven_multilingual_v2"),
            elevenlabs_tts_base_url: var_or(
                "ELEVENLABS_TTS_BASE_URL",
                "https://api.elevenlabs.io/v1/text-to-speech",
            ),
            elevenlabs_stt_model_id: var_or("ELEVENLABS_STT_MODEL_ID", "eleven_multilingual_v2"),
            elevenlabs_stt_endpoint: var_or(
                "ELEVENLABS_STT_ENDPOINT",
                "https://api.elevenlabs.io/v1/speech-to-text",
            ),
            allowed_origins: parse_origins(lookup("CORS_ALLOWED_ORIGINS").as_deref()),
            analysis_backend: parse_analysis_backend(&var_or("ANALYSIS_BACKEND", "llm"))?,
            completion_workers,
            max_upload_bytes,
            port: var_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var_or("RUST_LOG", "info"),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Splits a comma-separated origin list. Falls back to the local dev origins
/// when the variable is unset or contains nothing usable.
fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() {
        DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
    } else {
        origins
    }
}

fn parse_analysis_backend(raw: &str) -> Result<AnalysisBackend> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "llm" | "openai" => Ok(AnalysisBackend::Llm),
        "heuristic" | "keyword" => Ok(AnalysisBackend::Heuristic),
        other => bail!("ANALYSIS_BACKEND must be 'llm' or 'heuristic', got '{other}'"),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration with defaults and no credentials, independent of the host environment.
    pub fn for_tests() -> Self {
        Self::from_lookup(|_| None).expect("defaults are valid")
    }
}
