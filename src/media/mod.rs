pub mod error;
pub mod format;
pub mod retriever;

pub use error::{RetrievalError, RetrievalResult};
pub use format::{resolve_mime_type, sniff_mime_type, DEFAULT_IMAGE_MIME};
pub use retriever::{ImageFetcher, ImageRetriever, RetrievedImage};
