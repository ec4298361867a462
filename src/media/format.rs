//! Mime type and dimension detection from raw image bytes.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};

/// Fallback when neither the transport nor the bytes tell us the format.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Formats the vision service accepts as inline image data.
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// Detect the image format from its magic bytes.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(bytes).ok()?;
    SUPPORTED_FORMATS
        .contains(&format)
        .then(|| format.to_mime_type())
}

/// Read width and height from the image header without decoding pixels.
pub fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Normalize a Content-Type header value: strip parameters and lowercase.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Pick the mime type for a body: a declared `image/*` type wins, then sniffing,
/// then [`DEFAULT_IMAGE_MIME`].
pub fn resolve_mime_type(declared: Option<&str>, bytes: &[u8]) -> String {
    if let Some(declared) = declared.map(essence) {
        if declared.starts_with("image/") {
            return declared;
        }
    }
    sniff_mime_type(bytes)
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_string()
}
