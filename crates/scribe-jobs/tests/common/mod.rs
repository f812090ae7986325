//! Shared harness for scribe-jobs integration tests.
//!
//! Wires the in-memory store, the mock generation backend and fake YouTube
//! sources into a real router, scheduler and ingestor.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use scribe_db::{Database, MemoryStore};
use scribe_inference::MockGenerationBackend;
use scribe_jobs::{
    ChunkPolicy, Comment, CommentSource, Ingestor, Pipeline, PipelineConfig, Result, Router,
    Scheduler, SchedulerConfig, Transcript, TranscriptSource,
};

pub const LINK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const USER: &str = "user-1";

pub const BLOG_JSON: &str = r#"{
  "title": "Test Post",
  "sections": [
    {"type": "heading", "level": 2, "text": "Intro"},
    {"type": "paragraph", "text": "Body text."}
  ]
}"#;

/// Transcript source returning fixed text and counting calls.
pub struct StaticTranscripts {
    pub text: String,
    pub calls: AtomicUsize,
}

impl StaticTranscripts {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptSource for StaticTranscripts {
    async fn fetch(&self, _link: &str) -> Result<Transcript> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Transcript {
            text: self.text.clone(),
            method: "static".to_string(),
        })
    }
}

/// Comment source returning fixed comments and counting acquisitions.
pub struct CountingComments {
    pub comments: Vec<Comment>,
    pub calls: AtomicUsize,
}

impl CountingComments {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            comments: texts
                .iter()
                .enumerate()
                .map(|(i, t)| Comment {
                    text: t.to_string(),
                    author: format!("viewer-{}", i),
                })
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommentSource for CountingComments {
    async fn fetch_all(&self, _video_id: &str) -> Result<Vec<Comment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.comments.clone())
    }
}

/// Number following "Generate exactly" in a social prompt.
fn requested_posts(prompt: &str) -> usize {
    prompt
        .split("Generate exactly ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}

/// Mock backend that answers every routine prompt with well-formed output.
pub fn scripted_backend() -> MockGenerationBackend {
    MockGenerationBackend::new().with_responder(|_system, prompt| {
        if prompt.contains("Summarize the following text") {
            Ok("A concise summary of the video.".to_string())
        } else if prompt.contains("Create a detailed outline") {
            Ok("1. Intro\n2. Body\n3. Conclusion".to_string())
        } else if prompt.contains("Write a complete blog post") {
            Ok(BLOG_JSON.to_string())
        } else if prompt.contains("Generate exactly") {
            let n = requested_posts(prompt);
            let posts: Vec<_> = (0..n)
                .map(|i| {
                    json!({
                        "content": format!("post number {}", i),
                        "hashtags": ["#rust"],
                        "tone": "informative"
                    })
                })
                .collect();
            Ok(json!({ "posts": posts, "count": n }).to_string())
        } else if prompt.contains("analyzed in batches") {
            Ok(json!({
                "summary": "Overall viewers are happy.",
                "top_positive": ["alpha alpha"],
                "top_negative": ["beta beta"]
            })
            .to_string())
        } else if prompt.contains("Classify each comment") {
            let dist = if prompt.contains("alpha") {
                json!({"positive": 70, "neutral": 20, "negative": 10})
            } else {
                json!({"positive": 50, "neutral": 30, "negative": 20})
            };
            Ok(json!({
                "summary": "Mostly positive.",
                "distribution": dist,
                "top_positive": ["great", "love it", "thanks", "more please"],
                "top_negative": ["too quiet"]
            })
            .to_string())
        } else if prompt.contains("Merge duplicates") {
            Ok(json!({"ideas": ["Merged idea one", "Merged idea two"]}).to_string())
        } else if prompt.contains("ideas for future videos") {
            let ideas: Vec<String> = (0..12).map(|i| format!("Idea {}", i % 11)).collect();
            Ok(json!({ "ideas": ideas }).to_string())
        } else {
            Err(format!(
                "unexpected prompt: {}",
                prompt.chars().take(80).collect::<String>()
            ))
        }
    })
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub db: Database,
    pub mock: MockGenerationBackend,
    pub transcripts: Arc<StaticTranscripts>,
    pub comments: Arc<CountingComments>,
    pub router: Router,
    pub scheduler: Scheduler,
    pub ingestor: Ingestor,
}

pub struct HarnessBuilder {
    mock: MockGenerationBackend,
    policy: ChunkPolicy,
    scheduler: SchedulerConfig,
    transcript: String,
    comments: Vec<&'static str>,
    standard_routes: bool,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            mock: scripted_backend(),
            policy: ChunkPolicy::default(),
            scheduler: SchedulerConfig::default(),
            transcript: "This is the transcript of a video about Rust ownership.".to_string(),
            comments: vec!["great video", "audio was too quiet"],
            standard_routes: true,
        }
    }
}

impl HarnessBuilder {
    pub fn mock(mut self, mock: MockGenerationBackend) -> Self {
        self.mock = mock;
        self
    }

    pub fn policy(mut self, policy: ChunkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn scheduler(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = config;
        self
    }

    pub fn transcript(mut self, text: &str) -> Self {
        self.transcript = text.to_string();
        self
    }

    pub fn comments(mut self, comments: Vec<&'static str>) -> Self {
        self.comments = comments;
        self
    }

    /// Start with an empty router instead of the built-in routines.
    pub fn empty_router(mut self) -> Self {
        self.standard_routes = false;
        self
    }

    pub async fn build(self) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let db = Database::from_memory(store.clone());
        let transcripts = Arc::new(StaticTranscripts::new(&self.transcript));
        let comments = Arc::new(CountingComments::new(&self.comments));

        let pipeline = Pipeline::with_default_tokenizer(
            Arc::new(self.mock.clone()),
            PipelineConfig::default().with_chunk_policy(self.policy),
        )
        .expect("tokenizer");

        let router = if self.standard_routes {
            Router::standard(db.clone(), pipeline, comments.clone()).await
        } else {
            Router::new()
        };
        let scheduler = Scheduler::new(db.clone(), router.clone(), self.scheduler);
        let ingestor = Ingestor::new(db.clone(), transcripts.clone());

        Harness {
            store,
            db,
            mock: self.mock,
            transcripts,
            comments,
            router,
            scheduler,
            ingestor,
        }
    }
}

pub async fn harness() -> Harness {
    HarnessBuilder::default().build().await
}
