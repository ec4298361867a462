use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::RetrievedImage;

/// Instruction sent with every image unless the caller overrides it.
pub const DEFAULT_ANALYSIS_PROMPT: &str = "Analyze this photograph of an empty room for interior design. \
Return ONLY a JSON object with exactly these fields:\n\
- \"room_type\": the kind of room, e.g. \"living_room\", \"bedroom\", \"office\", \"kitchen\"\n\
- \"detected_style\": the architectural or interior style the room suggests, e.g. \"scandinavian\", \"industrial\", \"minimalist\"\n\
- \"recommendations\": an array of exactly 3 strings, each naming one piece of furniture that would suit the room\n\
Be precise and objective. The room is empty, so focus on its potential.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid image for analysis: {reason}")]
pub struct InvalidImageError {
    pub reason: String,
}

/// Output format demanded from the vision service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    StructuredJson,
}

impl ResponseFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ResponseFormat::StructuredJson => "application/json",
        }
    }
}

/// One image plus one prompt, ready for the vision service.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    image_bytes: Bytes,
    mime_type: String,
    instruction_prompt: String,
    response_format: ResponseFormat,
}

impl AnalysisRequest {
    /// Package a retrieved image with a prompt. A blank prompt selects
    /// [`DEFAULT_ANALYSIS_PROMPT`].
    pub fn build(image: &RetrievedImage, prompt: &str) -> Result<Self, InvalidImageError> {
        if image.bytes.is_empty() {
            return Err(InvalidImageError {
                reason: format!("image '{}' has no bytes", image.record.id),
            });
        }

        let prompt = if prompt.trim().is_empty() {
            DEFAULT_ANALYSIS_PROMPT
        } else {
            prompt
        };

        Ok(Self {
            image_bytes: image.bytes.clone(),
            mime_type: image.mime_type.clone(),
            instruction_prompt: prompt.to_string(),
            response_format: ResponseFormat::StructuredJson,
        })
    }

    pub fn build_default(image: &RetrievedImage) -> Result<Self, InvalidImageError> {
        Self::build(image, DEFAULT_ANALYSIS_PROMPT)
    }

    pub fn image_bytes(&self) -> &[u8] {
        &self.image_bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn instruction_prompt(&self) -> &str {
        &self.instruction_prompt
    }

    pub fn response_format(&self) -> ResponseFormat {
        self.response_format
    }
}
