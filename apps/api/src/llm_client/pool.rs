//! Bounded completion worker pool.
//!
//! Every completion call is submitted as its own spawned task. A semaphore caps
//! how many run at once; excess submissions wait for a permit. Tasks share no
//! state, so the only coordination is the permit itself.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use super::{ChatMessage, CompletionBackend, LlmError};

#[derive(Clone)]
pub struct CompletionPool {
    backend: Arc<dyn CompletionBackend>,
    permits: Arc<Semaphore>,
}

impl CompletionPool {
    pub fn new(backend: Arc<dyn CompletionBackend>, workers: usize) -> Self {
        Self {
            backend,
            permits: Arc::new(Semaphore::new(workers.clamp(1, Semaphore::MAX_PERMITS))),
        }
    }

    /// Runs one completion on the pool and waits for its result.
    pub async fn submit(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| LlmError::Worker(e.to_string()))?;

        let backend = Arc::clone(&self.backend);
        debug!("Submitting completion task ({} messages)", messages.len());

        let handle = tokio::spawn(async move {
            let _permit = permit;
            backend.complete(messages).await
        });

        handle
            .await
            .map_err(|e| LlmError::Worker(format!("completion task aborted: {e}")))?
    }

    #[cfg(test)]
    pub fn available_workers(&self) -> usize {
        self.permits.available_permits()
    }
}
