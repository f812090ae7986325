//! Shared services for transformation routines.
//!
//! A [`Pipeline`] bundles the generation backend, the tokenizer and the
//! chunking policy. Every model call goes through [`Pipeline::complete`],
//! which bounds it with the configured timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use scribe_core::{
    defaults, normalize_whitespace, Error, GenerationBackend, Result, TiktokenTokenizer,
    Tokenizer,
};

use crate::chunker::ChunkPolicy;
use crate::parse::parse_json_lenient;
use crate::prompts;

/// Configuration for the transformation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunk_policy: ChunkPolicy,
    /// Upper bound on a single model call.
    pub llm_timeout: Duration,
    /// Model name used to pick the tokenizer encoding.
    pub tokenizer_model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_policy: ChunkPolicy::default(),
            llm_timeout: Duration::from_secs(defaults::GEN_TIMEOUT_SECS),
            tokenizer_model: defaults::TOKENIZER_MODEL.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `LLM_TIMEOUT_SECS` | `120` | Per-call generation timeout |
    /// | `TOKENIZER_MODEL` | `gpt-4o` | Encoding used for token counts |
    ///
    /// Chunking variables are documented on [`ChunkPolicy::from_env`].
    pub fn from_env() -> Self {
        let llm_timeout = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::GEN_TIMEOUT_SECS);

        Self {
            chunk_policy: ChunkPolicy::from_env(),
            llm_timeout: Duration::from_secs(llm_timeout),
            tokenizer_model: std::env::var("TOKENIZER_MODEL")
                .unwrap_or_else(|_| defaults::TOKENIZER_MODEL.to_string()),
        }
    }

    pub fn with_chunk_policy(mut self, policy: ChunkPolicy) -> Self {
        self.chunk_policy = policy;
        self
    }

    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }
}

/// Generation backend, tokenizer and chunk policy shared by the routines.
#[derive(Clone)]
pub struct Pipeline {
    backend: Arc<dyn GenerationBackend>,
    tokenizer: Arc<dyn Tokenizer>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        tokenizer: Arc<dyn Tokenizer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            backend,
            tokenizer,
            config,
        }
    }

    /// Build with a tiktoken tokenizer for the configured model.
    pub fn with_default_tokenizer(
        backend: Arc<dyn GenerationBackend>,
        config: PipelineConfig,
    ) -> Result<Self> {
        let tokenizer = TiktokenTokenizer::for_model_or_default(&config.tokenizer_model)?;
        Ok(Self::new(backend, Arc::new(tokenizer), config))
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// One bounded generation call.
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let call = self.backend.generate_with_system(system, prompt);
        let response = tokio::time::timeout(self.config.llm_timeout, call)
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "Model call exceeded {}s",
                    self.config.llm_timeout.as_secs()
                ))
            })??;

        debug!(
            subsystem = "jobs",
            component = "pipeline",
            op = "complete",
            model = %self.backend.model_name(),
            prompt_len = prompt.len(),
            response_len = response.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Model call finished"
        );
        Ok(response)
    }

    /// Bounded generation call whose response is decoded as JSON.
    pub async fn complete_json<T: DeserializeOwned>(&self, system: &str, prompt: &str) -> Result<T> {
        let raw = self.complete(system, prompt).await?;
        parse_json_lenient(&raw)
    }

    /// Reduce arbitrarily long text to something that fits one model call.
    ///
    /// Each chunk is summarized independently and the summaries are joined
    /// with a single space. Text under the chunk threshold is still
    /// summarized once.
    pub async fn condense(&self, text: &str) -> Result<String> {
        let normalized = normalize_whitespace(text);
        let chunks = self
            .config
            .chunk_policy
            .apply(self.tokenizer.as_ref(), &normalized)?;

        info!(
            subsystem = "jobs",
            component = "pipeline",
            op = "condense",
            token_count = chunks.last().map(|c| c.end_token).unwrap_or(0),
            chunk_count = chunks.len(),
            "Condensing source text"
        );

        let mut summaries = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let summary = self
                .complete(prompts::SUMMARY_SYSTEM, &prompts::summary(&chunk.text))
                .await?;
            summaries.push(summary);
        }

        Ok(normalize_whitespace(&summaries.join(" ")))
    }
}
