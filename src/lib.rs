pub mod analysis;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod media;
pub mod pipeline;
pub mod retry;

pub use analysis::{Analysis, AnalysisError, AnalysisRequest, AnalysisResult, VisionService};
pub use catalog::{Catalog, CatalogError, ImageRecord};
pub use media::{ImageFetcher, ImageRetriever, RetrievalError, RetrievedImage};
pub use pipeline::{ErrorKind, PipelineError, PipelineOutput, RoomAnalysisPipeline, Stage};
