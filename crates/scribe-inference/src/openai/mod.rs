//! OpenAI-compatible generation backend.
//!
//! Works with any endpoint that speaks the chat-completions protocol:
//! OpenAI itself, Azure OpenAI, Ollama in compatibility mode, vLLM, LM Studio.
//!
//! # Example
//!
//! ```rust,no_run
//! use scribe_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use scribe_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::new(OpenAIConfig::from_env()).unwrap();
//!     let summary = backend
//!         .generate_with_system("Summarize the following text.", "Long transcript...")
//!         .await
//!         .unwrap();
//!     println!("{}", summary);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig};
pub use error::{to_scribe_error, OpenAIErrorCode};
pub use types::*;
