//! Upload validation and data-URI encoding
//!
//! Validation happens at the point of interaction: a rejected file produces
//! an error and no state mutation. Formats are sniffed from the bytes, never
//! trusted from a filename.

use base64::Engine;
use image::ImageFormat;

/// Upper bound on accepted file size.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("unsupported image type{}", .0.as_deref().map(|f| format!(" {f}")).unwrap_or_default())]
    UnsupportedType(Option<String>),
    #[error("file is {size} bytes, above the {max} byte limit")]
    TooLarge { size: usize, max: usize },
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Validate an uploaded file and encode it as a data URI.
///
/// Accepts JPEG, PNG and WebP up to [`MAX_UPLOAD_BYTES`].
pub fn validate_and_encode(bytes: &[u8]) -> Result<String, UploadError> {
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size: bytes.len(), max: MAX_UPLOAD_BYTES });
    }

    let format = image::guess_format(bytes).map_err(|_| UploadError::UnsupportedType(None))?;
    let mime = mime_for(format)
        .ok_or_else(|| UploadError::UnsupportedType(Some(format!("{format:?}"))))?;

    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{mime};base64,{payload}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0, 0];

    #[test]
    fn png_bytes_encode_with_png_mime() {
        let uri = validate_and_encode(PNG_MAGIC).expect("png accepted");
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn jpeg_bytes_encode_with_jpeg_mime() {
        let uri = validate_and_encode(JPEG_MAGIC).expect("jpeg accepted");
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn unknown_bytes_are_rejected() {
        let err = validate_and_encode(b"definitely not an image").expect_err("rejected");
        assert_eq!(err, UploadError::UnsupportedType(None));
    }

    #[test]
    fn disallowed_format_is_rejected_by_name() {
        // GIF sniffs fine but is not on the allow list.
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";
        let err = validate_and_encode(gif).expect_err("rejected");
        assert!(matches!(err, UploadError::UnsupportedType(Some(_))));
    }

    #[test]
    fn oversized_files_are_rejected_before_sniffing() {
        let huge = vec![0u8; MAX_UPLOAD_BYTES + 1];
        let err = validate_and_encode(&huge).expect_err("rejected");
        assert_eq!(
            err,
            UploadError::TooLarge { size: MAX_UPLOAD_BYTES + 1, max: MAX_UPLOAD_BYTES }
        );
    }

    #[test]
    fn payload_round_trips_through_base64() {
        let uri = validate_and_encode(PNG_MAGIC).expect("png accepted");
        let payload = uri.split_once(',').expect("has payload").1;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .expect("valid base64");
        assert_eq!(decoded, PNG_MAGIC);
    }
}
