//! Chunking properties with the real BPE tokenizer.

use scribe_jobs::{split_into_chunks, ChunkPolicy, TiktokenTokenizer, Tokenizer};

fn long_text() -> String {
    let sentences = [
        "Ownership is the set of rules that govern how a Rust program manages memory.",
        "Each value has a single owner and is dropped when the owner goes out of scope.",
        "References let you use a value without taking ownership of it.",
        "The borrow checker rejects programs with dangling references.",
    ];
    (0..60)
        .map(|i| sentences[i % sentences.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_windows_overlap_and_cover_the_sequence() {
    let tokenizer = TiktokenTokenizer::cl100k().unwrap();
    let text = long_text();
    let tokens = tokenizer.encode(&text);
    let (max, overlap) = (200, 40);

    let chunks = split_into_chunks(&tokenizer, &text, max, overlap).unwrap();
    assert!(chunks.len() >= 2, "expected several chunks, got {}", chunks.len());

    assert_eq!(chunks[0].start_token, 0);
    assert_eq!(chunks.last().unwrap().end_token, tokens.len());
    for chunk in &chunks {
        assert!(chunk.token_len() <= max);
        assert!(chunk.token_len() > 0);
    }
    for pair in chunks.windows(2) {
        assert_eq!(pair[0].end_token - pair[1].start_token, overlap);
        assert_eq!(pair[1].start_token - pair[0].start_token, max - overlap);
    }

    // Dropping each window's leading overlap rebuilds the original token stream.
    let mut rebuilt: Vec<u32> = Vec::with_capacity(tokens.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let skip = if i == 0 { 0 } else { overlap };
        rebuilt.extend_from_slice(&tokens[chunk.start_token + skip..chunk.end_token]);
    }
    assert_eq!(rebuilt, tokens);
}

#[test]
fn test_chunking_is_deterministic() {
    let tokenizer = TiktokenTokenizer::cl100k().unwrap();
    let text = long_text();

    let a = split_into_chunks(&tokenizer, &text, 128, 16).unwrap();
    let b = split_into_chunks(&tokenizer, &text, 128, 16).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_policy_below_threshold_returns_whole_text() {
    let tokenizer = TiktokenTokenizer::cl100k().unwrap();
    let text = "A short transcript.";

    let chunks = ChunkPolicy::default().apply(&tokenizer, text).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, text);
}

#[test]
fn test_policy_above_threshold_splits() {
    let tokenizer = TiktokenTokenizer::cl100k().unwrap();
    let text = long_text();
    let policy = ChunkPolicy::default()
        .with_threshold(100)
        .with_window(100, 10);

    let chunks = policy.apply(&tokenizer, &text).unwrap();
    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.token_len() <= 100));
}
