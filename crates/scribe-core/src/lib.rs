//! # scribe-core
//!
//! Core types, traits, and abstractions for scribe.
//!
//! This crate provides the domain model (content sources, the job ledger,
//! comments, artifacts), the repository and collaborator traits the other
//! crates implement, and the shared tokenizer.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod tokenizer;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use markdown::clean_markdown;
pub use models::*;
pub use tokenizer::*;
pub use traits::*;
pub use uuid_utils::{is_v7, new_v7};
