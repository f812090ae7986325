//! Token counting and encoding for LLM context management.
//!
//! The chunker needs exact token positions, so everything here goes through
//! a real BPE encoder rather than a character heuristic.

use crate::error::{Error, Result};
use tracing::debug;

/// Trait for tokenization operations.
///
/// Implementations must be thread-safe; one tokenizer is shared by every
/// routine in the process.
pub trait Tokenizer: Send + Sync {
    /// Count the number of tokens in the given text.
    fn count_tokens(&self, text: &str) -> usize;

    /// Encode text into token IDs.
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Decode token IDs back into text.
    fn decode(&self, tokens: &[u32]) -> String;

    /// Get the name/identifier of this tokenizer.
    fn name(&self) -> &str;
}

/// Tiktoken-based tokenizer implementation.
pub struct TiktokenTokenizer {
    bpe: tiktoken_rs::CoreBPE,
    name: String,
}

impl TiktokenTokenizer {
    /// Create a new tokenizer for the specified model.
    ///
    /// # Errors
    /// Returns an error if the model is not recognized or BPE initialization fails.
    pub fn new(model: &str) -> Result<Self> {
        let bpe = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|e| Error::Internal(format!("Failed to initialize tokenizer: {}", e)))?;

        Ok(Self {
            bpe,
            name: model.to_string(),
        })
    }

    /// Create a `cl100k_base` tokenizer.
    pub fn cl100k() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| Error::Internal(format!("Failed to initialize cl100k_base: {}", e)))?;

        Ok(Self {
            bpe,
            name: "cl100k_base".to_string(),
        })
    }

    /// Tokenizer for `model`, falling back to `cl100k_base` when the model
    /// is unknown to tiktoken.
    pub fn for_model_or_default(model: &str) -> Result<Self> {
        match Self::new(model) {
            Ok(t) => Ok(t),
            Err(e) => {
                debug!(model, error = %e, "Unknown tokenizer model, using cl100k_base");
                Self::cl100k()
            }
        }
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe
            .encode_ordinary(text)
            .into_iter()
            .map(|t| t as u32)
            .collect()
    }

    fn decode(&self, tokens: &[u32]) -> String {
        let token_vec: Vec<usize> = tokens.iter().map(|&t| t as usize).collect();
        match self.bpe.decode(token_vec) {
            Ok(text) => text,
            // A window boundary can split a multi-byte character; decode what
            // we can token by token instead of dropping the whole window.
            Err(_) => tokens
                .iter()
                .filter_map(|&t| self.bpe.decode(vec![t as usize]).ok())
                .collect(),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_ENGLISH: &str = "The quick brown fox jumps over the lazy dog.";

    #[test]
    fn test_cl100k_initialization() {
        let tokenizer = TiktokenTokenizer::cl100k().unwrap();
        assert_eq!(tokenizer.name(), "cl100k_base");
    }

    #[test]
    fn test_fallback_for_unknown_model() {
        let tokenizer = TiktokenTokenizer::for_model_or_default("not-a-real-model").unwrap();
        assert_eq!(tokenizer.name(), "cl100k_base");
    }

    #[test]
    fn test_known_model_keeps_name() {
        let tokenizer = TiktokenTokenizer::for_model_or_default("gpt-4").unwrap();
        assert_eq!(tokenizer.name(), "gpt-4");
    }

    #[test]
    fn test_count_tokens_simple_english() {
        let tokenizer = TiktokenTokenizer::cl100k().unwrap();
        let count = tokenizer.count_tokens(SIMPLE_ENGLISH);
        assert!(
            (8..=12).contains(&count),
            "Expected ~10 tokens, got {}",
            count
        );
    }

    #[test]
    fn test_count_tokens_empty_string() {
        let tokenizer = TiktokenTokenizer::cl100k().unwrap();
        assert_eq!(tokenizer.count_tokens(""), 0);
    }

    #[test]
    fn test_encode_matches_count() {
        let tokenizer = TiktokenTokenizer::cl100k().unwrap();
        let tokens = tokenizer.encode(SIMPLE_ENGLISH);
        assert_eq!(tokens.len(), tokenizer.count_tokens(SIMPLE_ENGLISH));
    }

    #[test]
    fn test_encode_decode_preserves_text() {
        let tokenizer = TiktokenTokenizer::cl100k().unwrap();
        let tokens = tokenizer.encode(SIMPLE_ENGLISH);
        assert_eq!(tokenizer.decode(&tokens), SIMPLE_ENGLISH);
    }

    #[test]
    fn test_decode_empty_tokens() {
        let tokenizer = TiktokenTokenizer::cl100k().unwrap();
        assert_eq!(tokenizer.decode(&[]), "");
    }

    #[test]
    fn test_tokenizer_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let tokenizer = Arc::new(TiktokenTokenizer::cl100k().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let t = Arc::clone(&tokenizer);
                thread::spawn(move || t.count_tokens(&format!("Thread {} tokenizing", i)))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap() > 0);
        }
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n\nb\t c  "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }
}
