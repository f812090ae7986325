//! Mock generation backend for deterministic testing.
//!
//! Responses come from, in order of precedence: the scripted queue, the
//! responder closure, then the fixed default response.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scribe_core::GenerationBackend;
//! use scribe_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_scripted_response("first")
//!     .with_fixed_response("after that");
//!
//! assert_eq!(backend.generate("a").await.unwrap(), "first");
//! assert_eq!(backend.generate("b").await.unwrap(), "after that");
//! assert_eq!(backend.generate_call_count(), 2);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use scribe_core::{Error, GenerationBackend, Result};

type Responder = dyn Fn(&str, &str) -> std::result::Result<String, String> + Send + Sync;

/// A recorded generation call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: String,
    pub prompt: String,
}

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    model: String,
    default_response: String,
    responder: Option<Arc<Responder>>,
    script: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    latency: Option<Duration>,
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            model: "mock-gen".to_string(),
            default_response: "Mock response".to_string(),
            responder: None,
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_log: Arc::new(Mutex::new(Vec::new())),
            latency: None,
        }
    }

    /// Set the response used when nothing else applies.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Queue a response returned by the next unscripted call.
    pub fn with_scripted_response(self, response: impl Into<String>) -> Self {
        lock(&self.script).push_back(Ok(response.into()));
        self
    }

    /// Queue a failure returned by the next unscripted call.
    pub fn with_scripted_failure(self, message: impl Into<String>) -> Self {
        lock(&self.script).push_back(Err(message.into()));
        self
    }

    /// Compute responses from the system and user prompt.
    ///
    /// `Err` strings become inference errors.
    pub fn with_responder<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) -> std::result::Result<String, String> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(f));
        self
    }

    /// Delay every call, for exercising timeouts.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.call_log).clone()
    }

    /// Get number of generation calls.
    pub fn generate_call_count(&self) -> usize {
        lock(&self.call_log).len()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        lock(&self.call_log).clear()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        lock(&self.call_log).push(MockCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = lock(&self.script).pop_front();
        let outcome = match scripted {
            Some(outcome) => outcome,
            None => match &self.responder {
                Some(responder) => responder(system, prompt),
                None => Ok(self.default_response.clone()),
            },
        };
        outcome.map_err(Error::Inference)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_response() {
        let backend = MockGenerationBackend::new().with_fixed_response("hello");
        assert_eq!(backend.generate("x").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_script_precedes_responder() {
        let backend = MockGenerationBackend::new()
            .with_scripted_response("scripted")
            .with_responder(|system, _| Ok(format!("system={}", system)));

        assert_eq!(
            backend.generate_with_system("s", "p").await.unwrap(),
            "scripted"
        );
        assert_eq!(
            backend.generate_with_system("s", "p").await.unwrap(),
            "system=s"
        );
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let backend = MockGenerationBackend::new().with_scripted_failure("nope");
        let err = backend.generate("x").await.unwrap_err();
        assert!(matches!(err, Error::Inference(ref m) if m == "nope"));
        assert!(backend.generate("x").await.is_ok());
    }

    #[tokio::test]
    async fn test_call_log() {
        let backend = MockGenerationBackend::new();
        backend.generate_with_system("sys", "prompt").await.unwrap();
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, "sys");
        assert_eq!(calls[0].prompt, "prompt");

        backend.clear_calls();
        assert_eq!(backend.generate_call_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_log() {
        let backend = MockGenerationBackend::new();
        let clone = backend.clone();
        clone.generate("x").await.unwrap();
        assert_eq!(backend.generate_call_count(), 1);
    }
}
