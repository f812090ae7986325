//! # scribe-jobs
//!
//! Job orchestration and content transformation for scribe.
//!
//! This crate provides:
//! - Ingestion of links into content sources and pending jobs
//! - A polling scheduler that claims and runs one job per tick
//! - Dispatch by job context to the transformation routines
//! - Token-bounded chunking and condensing of long transcripts
//! - YouTube caption and comment adapters
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use scribe_db::Database;
//! use scribe_jobs::{Ingestor, Pipeline, PipelineConfig, Router, Scheduler, SchedulerConfig};
//!
//! let db = Database::connect("postgres://...").await?;
//! let youtube = Arc::new(YoutubeClient::from_env()?);
//! let pipeline = Pipeline::with_default_tokenizer(backend, PipelineConfig::from_env())?;
//!
//! let router = Router::standard(db.clone(), pipeline, youtube.clone()).await;
//! let scheduler = Scheduler::new(db.clone(), router, SchedulerConfig::from_env());
//! scheduler.start().await;
//!
//! let ingestor = Ingestor::new(db, youtube);
//! let response = ingestor.ingest("user-1", request).await?;
//!
//! scheduler.shutdown().await?;
//! ```

pub mod adapters;
pub mod chunker;
pub mod handler;
pub mod ingest;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod router;
pub mod routines;
pub mod worker;

// Re-export core types
pub use scribe_core::*;

pub use adapters::{YoutubeClient, YoutubeConfig};
pub use chunker::{split_into_chunks, ChunkPolicy, TokenChunk};
pub use handler::{HandlerContext, JobHandler, JobResult};
pub use ingest::Ingestor;
pub use pipeline::{Pipeline, PipelineConfig};
pub use router::Router;
pub use worker::{Scheduler, SchedulerConfig, SchedulerEvent, TickOutcome};
