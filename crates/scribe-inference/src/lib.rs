//! # scribe-inference
//!
//! LLM generation backends for scribe.
//!
//! This crate provides:
//! - OpenAI-compatible chat-completion backend (feature `openai`, default)
//! - Deterministic mock backend for tests (feature `mock`)
//!
//! Both implement [`scribe_core::GenerationBackend`].

#[cfg(feature = "openai")]
pub mod openai;

// Mock generation backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use scribe_core::{Error, GenerationBackend, Result};

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockGenerationBackend;
