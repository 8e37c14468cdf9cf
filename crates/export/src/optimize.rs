//! Per-image optimization
//!
//! Before generation, image payloads are downsampled to a bounded pixel
//! density and recompressed. Opaque images become JPEG; images with an alpha
//! channel stay PNG so transparency survives. A payload that fails to decode
//! is left untouched by the caller rather than failing the export.

use std::io::Cursor;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

/// JPEG recompression quality for optimized payloads.
pub const JPEG_QUALITY: u8 = 80;

/// Pixel density headroom kept above the on-page size, so moderate zoom in a
/// PDF viewer stays sharp.
pub const DENSITY_HEADROOM: f32 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("payload is not a data URI")]
    MalformedDataUri,
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image decode failed: {0}")]
    Decode(#[source] image::ImageError),
    #[error("image encode failed: {0}")]
    Encode(#[source] image::ImageError),
}

/// Extract the raw bytes from a `data:<mime>;base64,<payload>` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, OptimizeError> {
    let payload = uri.split_once(',').ok_or(OptimizeError::MalformedDataUri)?.1;
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{payload}")
}

fn bounded(image: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if image.width() <= max_width && image.height() <= max_height {
        return image;
    }
    image.resize(max_width, max_height, FilterType::Triangle)
}

/// Downsample and recompress one data-URI payload.
///
/// `max_width`/`max_height` bound the output pixel dimensions; callers derive
/// them from the on-page size times [`DENSITY_HEADROOM`]. Aspect ratio is
/// preserved. The result is a fresh data URI; the input is never modified.
pub fn optimize_data_uri(
    uri: &str,
    max_width: u32,
    max_height: u32,
    jpeg_quality: u8,
) -> Result<String, OptimizeError> {
    let bytes = decode_data_uri(uri)?;
    let decoded = image::load_from_memory(&bytes).map_err(OptimizeError::Decode)?;
    let resized = bounded(decoded, max_width.max(1), max_height.max(1));

    let mut out = Vec::new();
    if resized.color().has_alpha() {
        resized
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .map_err(OptimizeError::Encode)?;
        Ok(encode_data_uri("image/png", &out))
    } else {
        let mut cursor = Cursor::new(&mut out);
        let encoder = JpegEncoder::new_with_quality(&mut cursor, jpeg_quality);
        resized.to_rgb8().write_with_encoder(encoder).map_err(OptimizeError::Encode)?;
        drop(cursor);
        Ok(encode_data_uri("image/jpeg", &out))
    }
}
