//! Text-to-speech and speech-to-text pass-through to the speech service.
//!
//! Both calls use a 60 second timeout and are never retried.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{multipart, Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

const SPEECH_TIMEOUT: Duration = Duration::from_secs(60);
const API_KEY_VAR: &str = "ELEVENLABS_API_KEY";
const DEFAULT_AUDIO_NAME: &str = "audio.webm";
const DEFAULT_AUDIO_TYPE: &str = "audio/webm";

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Malformed(String),
}

#[derive(Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[derive(Deserialize)]
struct TranscriptionBody {
    text: Option<String>,
}

/// Audio submitted for transcription.
pub struct AudioUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Clone)]
pub struct SpeechClient {
    client: Client,
    api_key: Option<String>,
    default_voice_id: String,
    tts_model_id: String,
    tts_base_url: String,
    stt_model_id: String,
    stt_endpoint: String,
}

impl SpeechClient {
    pub fn from_config(config: &Config) -> Result<Self, SpeechError> {
        Ok(Self {
            client: Client::builder().timeout(SPEECH_TIMEOUT).build()?,
            api_key: config.elevenlabs_api_key.clone(),
            default_voice_id: config.elevenlabs_voice_id.clone(),
            tts_model_id: config.elevenlabs_tts_model_id.clone(),
            tts_base_url: config.elevenlabs_tts_base_url.clone(),
            stt_model_id: config.elevenlabs_stt_model_id.clone(),
            stt_endpoint: config.elevenlabs_stt_endpoint.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, SpeechError> {
        self.api_key
            .as_deref()
            .ok_or(SpeechError::NotConfigured(API_KEY_VAR))
    }

    /// Synthesis URL for a voice; an empty override uses the default voice.
    fn synthesis_url(&self, voice_id: Option<&str>) -> String {
        let voice = voice_id
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.default_voice_id);
        format!("{}/{}", self.tts_base_url.trim_end_matches('/'), voice)
    }

    /// Synthesizes `text` and returns the audio base64-encoded.
    pub async fn synthesize(&self, text: &str, voice_id: Option<&str>) -> Result<String, SpeechError> {
        let api_key = self.api_key()?;
        let url = self.synthesis_url(voice_id);

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .header("Accept", "audio/mpeg")
            .json(&SynthesisBody {
                text,
                model_id: &self.tts_model_id,
            })
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Upstream(format!("Text-to-speech failed: {body}")));
        }

        let audio = response.bytes().await?;
        debug!("Synthesized {} bytes of audio", audio.len());
        Ok(BASE64.encode(&audio))
    }

    /// Transcribes uploaded audio and returns the recognised text.
    pub async fn transcribe(&self, audio: AudioUpload) -> Result<String, SpeechError> {
        let api_key = self.api_key()?;

        let file_name = audio
            .file_name
            .unwrap_or_else(|| DEFAULT_AUDIO_NAME.to_string());
        let content_type = audio
            .content_type
            .unwrap_or_else(|| DEFAULT_AUDIO_TYPE.to_string());
        let file_part = multipart::Part::bytes(audio.content)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| SpeechError::Malformed(format!("Invalid audio content type: {e}")))?;
        let form = multipart::Form::new()
            .text("model_id", self.stt_model_id.clone())
            .part("file", file_part);

        let response = self
            .client
            .post(&self.stt_endpoint)
            .header("xi-api-key", api_key)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Upstream(format!("Speech-to-text failed: {body}")));
        }

        let body = response.text().await?;
        parse_transcription(&body)
    }
}

fn parse_transcription(body: &str) -> Result<String, SpeechError> {
    let parsed: TranscriptionBody = serde_json::from_str(body).map_err(|e| {
        SpeechError::Malformed(format!("Speech-to-text response is not valid JSON: {e}"))
    })?;
    parsed
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SpeechError::Upstream("Speech-to-text response missing text field.".to_string()))
}
