//! Process-wide context: the one scheduler and ingestor shared by every
//! request handler.

use std::sync::Arc;

use tracing::info;

use scribe_db::Database;
use scribe_inference::OpenAIBackend;
use scribe_jobs::{
    Ingestor, Pipeline, PipelineConfig, Router, Scheduler, SchedulerConfig, YoutubeClient,
};

use crate::config::{AppConfig, StoreKind};

#[derive(Clone)]
pub struct AppContext {
    pub db: Database,
    pub scheduler: Scheduler,
    pub ingestor: Arc<Ingestor>,
}

impl AppContext {
    pub fn new(db: Database, scheduler: Scheduler, ingestor: Ingestor) -> Self {
        Self {
            db,
            scheduler,
            ingestor: Arc::new(ingestor),
        }
    }

    /// Wire the production collaborators from the environment.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let db = match config.store {
            StoreKind::Postgres => {
                info!("Connecting to database...");
                let db = Database::connect(&config.database_url).await?;
                info!("Running database migrations...");
                db.migrate().await?;
                db
            }
            StoreKind::Memory => {
                info!("Using in-memory store; data will not survive a restart");
                Database::in_memory()
            }
        };

        let youtube = Arc::new(YoutubeClient::from_env()?);
        let backend = Arc::new(OpenAIBackend::from_env()?);
        let pipeline = Pipeline::with_default_tokenizer(backend, PipelineConfig::from_env())?;
        info!(model = %pipeline.model_name(), "Inference backend initialized");

        let router = Router::standard(db.clone(), pipeline, youtube.clone()).await;
        let scheduler = Scheduler::new(db.clone(), router, SchedulerConfig::from_env());
        let ingestor = Ingestor::new(db.clone(), youtube);

        Ok(Self::new(db, scheduler, ingestor))
    }
}
