use std::sync::Arc;

use anyhow::Result;

use crate::assist::speech::SpeechClient;
use crate::config::{AnalysisBackend, Config};
use crate::errors::AppError;
use crate::llm_client::{CompletionPool, LlmClient};
use crate::proposals::analysis::{CompletionAnalyzer, DraftAnalyzer, HeuristicAnalyzer};

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing in here is mutated after start-up.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when `OPENAI_API_KEY` is unset.
    pub completions: Option<CompletionPool>,
    pub speech: SpeechClient,
    /// Pluggable draft analyzer. Chosen via `ANALYSIS_BACKEND`.
    pub analyzer: Arc<dyn DraftAnalyzer>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let completions = match &config.openai_api_key {
            Some(key) => {
                let client = LlmClient::new(
                    key.clone(),
                    config.openai_chat_model.clone(),
                    &config.openai_base_url,
                )?;
                Some(CompletionPool::new(Arc::new(client), config.completion_workers))
            }
            None => None,
        };
        let speech = SpeechClient::from_config(&config)?;

        Ok(Self::assemble(config, completions, speech))
    }

    /// Wires the analyzer from already-built clients.
    pub fn assemble(config: Config, completions: Option<CompletionPool>, speech: SpeechClient) -> Self {
        let analyzer: Arc<dyn DraftAnalyzer> = match config.analysis_backend {
            AnalysisBackend::Llm => Arc::new(CompletionAnalyzer::new(completions.clone())),
            AnalysisBackend::Heuristic => Arc::new(HeuristicAnalyzer),
        };

        Self {
            config,
            completions,
            speech,
            analyzer,
        }
    }

    /// The completion pool, or a configuration error when no credential is set.
    pub fn completions(&self) -> Result<&CompletionPool, AppError> {
        self.completions
            .as_ref()
            .ok_or_else(|| AppError::Configuration("OPENAI_API_KEY not configured.".to_string()))
    }
}
