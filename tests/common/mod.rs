// Shared by several integration test binaries; not every helper is used by each
#![allow(dead_code)]

pub mod mock_gemini_server;
pub mod mock_image_server;

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

/// Encode a gradient JPEG of the given size.
pub fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 180])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg)
        .expect("Failed to encode JPEG fixture");
    out.into_inner()
}

/// A localhost URL nothing is listening on.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/photo.jpg", port)
}

/// Reply text of a well-formed bedroom analysis.
pub const BEDROOM_ANALYSIS: &str = r#"{
  "room_type": "bedroom",
  "detected_style": "scandinavian",
  "recommendations": ["platform bed", "linen curtains", "wool rug"]
}"#;
