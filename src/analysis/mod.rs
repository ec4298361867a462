//! Vision analysis: request packaging, the service client and reply validation.

pub mod client;
pub mod error;
pub mod protocol;
pub mod request;
pub mod result;

pub use client::{GeminiClient, VisionService};
pub use error::AnalysisError;
pub use request::{AnalysisRequest, InvalidImageError, ResponseFormat, DEFAULT_ANALYSIS_PROMPT};
pub use result::{parse_analysis, Analysis, AnalysisResult, RECOMMENDATION_COUNT};
