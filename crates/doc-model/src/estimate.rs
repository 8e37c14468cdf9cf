//! Pre-export size estimate
//!
//! A non-authoritative byte-size prediction shown before export. Derived
//! from base64 payload lengths: decoded size is 3/4 of the encoded length,
//! scaled by the expected recompression ratio. Monotonic in the number and
//! size of embedded images; not required to match the final blob exactly.

use crate::document::{Document, SectionContent};

/// Fixed structural overhead of an empty PDF (catalog, fonts, xref).
pub const PDF_BASE_OVERHEAD_BYTES: u64 = 50 * 1024;

/// Expected ratio of recompressed image bytes to original decoded bytes.
pub const IMAGE_COMPRESSION_FACTOR: f64 = 0.8;

/// Byte contribution of one data URI payload.
fn payload_estimate(data_uri: &str) -> u64 {
    // Only the part after the comma is base64 data.
    let base64_len = match data_uri.split_once(',') {
        Some((_, payload)) => payload.len(),
        None => data_uri.len(),
    };
    (base64_len as f64 * 0.75 * IMAGE_COMPRESSION_FACTOR).ceil() as u64
}

/// Estimate the exported PDF size for a document.
///
/// Sums the base overhead, every non-empty image section payload, every text
/// section (small fixed cost), and every page background.
pub fn estimate_pdf_size(document: &Document) -> u64 {
    let section_bytes: u64 = document
        .sections
        .iter()
        .map(|section| match &section.content {
            SectionContent::Image { data_uri: Some(uri) } => payload_estimate(uri),
            SectionContent::Image { data_uri: None } => 0,
            SectionContent::Text { text, .. } => text.len() as u64,
        })
        .sum();

    let background_bytes: u64 = document
        .pages
        .iter()
        .filter_map(|page| page.background.as_deref())
        .map(payload_estimate)
        .sum();

    PDF_BASE_OVERHEAD_BYTES + section_bytes + background_bytes
}
