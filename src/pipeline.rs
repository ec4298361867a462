//! Room analysis pipeline.
//!
//! # Architecture
//!
//! ```text
//! Catalog ──pick──► ImageRecord
//!                        │
//!                        ▼
//!               ImageFetcher::fetch ──► RetrievedImage
//!                                             │
//!                                             ▼
//!                               AnalysisRequest::build
//!                                             │
//!                                             ▼
//!                            VisionService::analyze_raw
//!                                             │
//!                                             ▼
//!                              parse_analysis ──► Analysis
//! ```
//!
//! Each stage either succeeds or aborts the run with that stage's error.
//! Nothing is substituted on failure: no fallback image, no default analysis.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::{
    parse_analysis, Analysis, AnalysisError, AnalysisRequest, GeminiClient, InvalidImageError,
    VisionService, DEFAULT_ANALYSIS_PROMPT,
};
use crate::catalog::{Catalog, CatalogError, ImageRecord};
use crate::config::{AppConfig, ParseMode, RetryConfig};
use crate::media::{ImageFetcher, ImageRetriever, RetrievalError};
use crate::retry::RetryExecutor;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Select,
    Fetch,
    Build,
    Analyze,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Select => write!(f, "select"),
            Stage::Fetch => write!(f, "fetch"),
            Stage::Build => write!(f, "build"),
            Stage::Analyze => write!(f, "analyze"),
        }
    }
}

/// Flat classification of every failure the pipeline can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyCatalog,
    InvalidCatalog,
    Retrieval,
    InvalidImage,
    ServiceUnavailable,
    Authentication,
    RateLimit,
    SchemaMismatch,
    Rejected,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("select failed: {0}")]
    Catalog(#[from] CatalogError),
    #[error("fetch failed: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("build failed: {0}")]
    InvalidImage(#[from] InvalidImageError),
    #[error("analyze failed: {0}")]
    Analysis(#[from] AnalysisError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Catalog(_) => Stage::Select,
            PipelineError::Retrieval(_) => Stage::Fetch,
            PipelineError::InvalidImage(_) => Stage::Build,
            PipelineError::Analysis(_) => Stage::Analyze,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Catalog(CatalogError::Empty) => ErrorKind::EmptyCatalog,
            PipelineError::Catalog(_) => ErrorKind::InvalidCatalog,
            PipelineError::Retrieval(_) => ErrorKind::Retrieval,
            PipelineError::InvalidImage(_) => ErrorKind::InvalidImage,
            PipelineError::Analysis(err) => match err {
                AnalysisError::ServiceUnavailable { .. } | AnalysisError::ClientInit(_) => {
                    ErrorKind::ServiceUnavailable
                }
                AnalysisError::Authentication { .. } => ErrorKind::Authentication,
                AnalysisError::RateLimited { .. } => ErrorKind::RateLimit,
                AnalysisError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
                AnalysisError::Rejected { .. } => ErrorKind::Rejected,
            },
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub record: ImageRecord,
    pub mime_type: String,
    pub image_bytes: usize,
    pub dimensions: Option<(u32, u32)>,
    #[serde(flatten)]
    pub analysis: Analysis,
}

pub struct RoomAnalysisPipeline {
    catalog: Arc<Catalog>,
    fetcher: Arc<dyn ImageFetcher>,
    vision: Arc<dyn VisionService>,
    prompt: String,
    parse_mode: ParseMode,
    retry: RetryConfig,
}

impl RoomAnalysisPipeline {
    /// Single attempt per stage, strict parsing, default prompt.
    pub fn new(
        catalog: Arc<Catalog>,
        fetcher: Arc<dyn ImageFetcher>,
        vision: Arc<dyn VisionService>,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            vision,
            prompt: DEFAULT_ANALYSIS_PROMPT.to_string(),
            parse_mode: ParseMode::Strict,
            retry: RetryConfig::default(),
        }
    }

    /// Wire the built-in catalog, an HTTP retriever and the Gemini client from config.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let catalog = Arc::new(Catalog::builtin()?);
        let fetcher = Arc::new(ImageRetriever::new(&config.fetch)?);
        let vision = Arc::new(GeminiClient::new(config.vision.clone())?);
        Ok(Self::new(catalog, fetcher, vision)
            .with_parse_mode(config.parse_mode)
            .with_retry(config.effective_retry_config()))
    }

    /// Override the instruction prompt. `None` or a blank string keeps the default.
    pub fn with_prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = prompt
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ANALYSIS_PROMPT.to_string());
        self
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Pick a random record with `rng` and analyze it.
    pub async fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PipelineOutput, PipelineError> {
        let record = self.catalog.pick_random(rng)?.clone();
        info!(record = %record.id, "Selected sample image");
        self.run_for_record(&record).await
    }

    /// Analyze the catalog record with the given id.
    pub async fn run_for_id(&self, id: &str) -> Result<PipelineOutput, PipelineError> {
        let record = self.catalog.require(id)?.clone();
        self.run_for_record(&record).await
    }

    /// Fetch, build and analyze one record.
    pub async fn run_for_record(
        &self,
        record: &ImageRecord,
    ) -> Result<PipelineOutput, PipelineError> {
        let result = self.execute(record).await;
        if let Err(err) = &result {
            warn!(
                record = %record.id,
                stage = %err.stage(),
                kind = ?err.kind(),
                error = %err,
                "Room analysis failed"
            );
        }
        result
    }

    async fn execute(&self, record: &ImageRecord) -> Result<PipelineOutput, PipelineError> {
        let fetcher: &dyn ImageFetcher = self.fetcher.as_ref();
        let image = RetryExecutor::execute_with_retry(
            &self.retry,
            move |_| fetcher.fetch(record),
            |err: &RetrievalError, _| err.is_retryable(),
        )
        .await?;

        let request = AnalysisRequest::build(&image, &self.prompt)?;

        let vision: &dyn VisionService = self.vision.as_ref();
        let request = &request;
        let reply = RetryExecutor::execute_with_retry(
            &self.retry,
            move |_| vision.analyze_raw(request),
            |err: &AnalysisError, _| err.is_retryable(),
        )
        .await?;

        let analysis = match (parse_analysis(&reply), self.parse_mode) {
            (Ok(result), _) => Analysis::Structured(result),
            (Err(err), ParseMode::Lenient) => {
                warn!(
                    record = %record.id,
                    error = %err,
                    "Reply did not match schema, returning raw text"
                );
                Analysis::Raw(reply)
            }
            (Err(err), ParseMode::Strict) => return Err(err.into()),
        };

        info!(
            record = %record.id,
            service = self.vision.name(),
            structured = !analysis.is_raw(),
            "Room analysis complete"
        );

        Ok(PipelineOutput {
            record: image.record,
            mime_type: image.mime_type,
            image_bytes: image.bytes.len(),
            dimensions: image.dimensions,
            analysis,
        })
    }
}
