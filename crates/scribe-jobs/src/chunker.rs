//! Token-bounded chunking of long source text.
//!
//! Windows are cut on token boundaries, each starting `max - overlap` tokens
//! after the previous one. The last window may be shorter. Splitting is pure
//! and deterministic for a given tokenizer.

use scribe_core::{defaults, Comment, Error, Result, Tokenizer};

/// One window of a chunked text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenChunk {
    pub text: String,
    /// First token index (inclusive).
    pub start_token: usize,
    /// Last token index (exclusive).
    pub end_token: usize,
}

impl TokenChunk {
    pub fn token_len(&self) -> usize {
        self.end_token - self.start_token
    }
}

/// When and how to split text before sending it to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    /// Texts with more tokens than this are chunked.
    pub threshold: usize,
    pub max_tokens: usize,
    pub overlap_tokens: usize,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            threshold: defaults::CHUNK_THRESHOLD_TOKENS,
            max_tokens: defaults::CHUNK_MAX_TOKENS,
            overlap_tokens: defaults::CHUNK_OVERLAP_TOKENS,
        }
    }
}

impl ChunkPolicy {
    /// Load from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CHUNK_THRESHOLD_TOKENS` | `10000` |
    /// | `CHUNK_MAX_TOKENS` | `10000` |
    /// | `CHUNK_OVERLAP_TOKENS` | `1000` |
    pub fn from_env() -> Self {
        let read = |key: &str, default: usize| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(default)
        };
        Self {
            threshold: read("CHUNK_THRESHOLD_TOKENS", defaults::CHUNK_THRESHOLD_TOKENS),
            max_tokens: read("CHUNK_MAX_TOKENS", defaults::CHUNK_MAX_TOKENS),
            overlap_tokens: read("CHUNK_OVERLAP_TOKENS", defaults::CHUNK_OVERLAP_TOKENS),
        }
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_window(mut self, max_tokens: usize, overlap_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self.overlap_tokens = overlap_tokens;
        self
    }

    /// Split `text` when it exceeds the threshold, otherwise return it whole.
    pub fn apply(&self, tokenizer: &dyn Tokenizer, text: &str) -> Result<Vec<TokenChunk>> {
        let count = tokenizer.count_tokens(text);
        if count > self.threshold {
            split_into_chunks(tokenizer, text, self.max_tokens, self.overlap_tokens)
        } else {
            Ok(vec![TokenChunk {
                text: text.to_string(),
                start_token: 0,
                end_token: count,
            }])
        }
    }
}

/// Split `text` into windows of at most `max_tokens` tokens, consecutive
/// windows sharing exactly `overlap_tokens` tokens.
///
/// Empty text yields no chunks.
///
/// # Errors
/// `InvalidInput` when `max_tokens` is zero or `overlap_tokens >= max_tokens`.
pub fn split_into_chunks(
    tokenizer: &dyn Tokenizer,
    text: &str,
    max_tokens: usize,
    overlap_tokens: usize,
) -> Result<Vec<TokenChunk>> {
    if max_tokens == 0 {
        return Err(Error::InvalidInput(
            "max_tokens must be greater than zero".to_string(),
        ));
    }
    if overlap_tokens >= max_tokens {
        return Err(Error::InvalidInput(format!(
            "overlap ({}) must be smaller than max_tokens ({})",
            overlap_tokens, max_tokens
        )));
    }

    let tokens = tokenizer.encode(text);
    let step = max_tokens - overlap_tokens;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < tokens.len() {
        let end = (start + max_tokens).min(tokens.len());
        chunks.push(TokenChunk {
            text: tokenizer.decode(&tokens[start..end]),
            start_token: start,
            end_token: end,
        });
        if end == tokens.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}

/// Group comments into consecutive batches whose rendered text stays within
/// `budget` tokens. A single comment larger than the budget gets a batch of
/// its own.
pub fn batch_comments(
    tokenizer: &dyn Tokenizer,
    comments: &[Comment],
    budget: usize,
) -> Vec<Vec<Comment>> {
    let mut batches = Vec::new();
    let mut current: Vec<Comment> = Vec::new();
    let mut used = 0;

    for comment in comments {
        // "- " prefix and trailing newline as rendered into prompts
        let cost = tokenizer.count_tokens(&comment.text) + 2;
        if !current.is_empty() && used + cost > budget {
            batches.push(std::mem::take(&mut current));
            used = 0;
        }
        used += cost;
        current.push(comment.clone());
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One token per byte; makes window arithmetic easy to read.
    struct ByteTokenizer;

    impl Tokenizer for ByteTokenizer {
        fn count_tokens(&self, text: &str) -> usize {
            text.len()
        }
        fn encode(&self, text: &str) -> Vec<u32> {
            text.bytes().map(u32::from).collect()
        }
        fn decode(&self, tokens: &[u32]) -> String {
            tokens.iter().map(|&t| t as u8 as char).collect()
        }
        fn name(&self) -> &str {
            "bytes"
        }
    }

    #[test]
    fn test_windows_and_overlap() {
        let chunks = split_into_chunks(&ByteTokenizer, "abcdefghij", 4, 1).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "defg", "ghij"]);
        assert_eq!(chunks[1].start_token, 3);
        assert_eq!(chunks[2].end_token, 10);
    }

    #[test]
    fn test_last_window_may_be_shorter() {
        let chunks = split_into_chunks(&ByteTokenizer, "abcdefgh", 4, 1).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].text, "gh");
        assert_eq!(chunks[2].token_len(), 2);
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = split_into_chunks(&ByteTokenizer, "abc", 10, 2).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "abc");
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(split_into_chunks(&ByteTokenizer, "", 10, 2)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_window() {
        assert!(matches!(
            split_into_chunks(&ByteTokenizer, "abc", 0, 0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            split_into_chunks(&ByteTokenizer, "abc", 4, 4),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_policy_threshold() {
        let policy = ChunkPolicy::default().with_threshold(5).with_window(4, 1);
        assert_eq!(policy.apply(&ByteTokenizer, "abcde").unwrap().len(), 1);
        assert_eq!(policy.apply(&ByteTokenizer, "abcdef").unwrap().len(), 2);
    }

    #[test]
    fn test_policy_defaults() {
        let policy = ChunkPolicy::default();
        assert_eq!(policy.threshold, 10_000);
        assert_eq!(policy.max_tokens, 10_000);
        assert_eq!(policy.overlap_tokens, 1_000);
    }

    #[test]
    fn test_batch_comments_respects_budget() {
        let comments: Vec<Comment> = ["aaaa", "bbbb", "cccc", "dddddddddddd"]
            .iter()
            .map(|t| Comment {
                text: t.to_string(),
                author: "x".into(),
            })
            .collect();

        // cost per short comment is 6
        let batches = batch_comments(&ByteTokenizer, &comments, 12);
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
        assert_eq!(batches[2][0].text, "dddddddddddd");
    }
}
