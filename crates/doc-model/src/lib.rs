//! DocMosaic document model
//!
//! Pure value types for the composed document: measurement units and paper
//! sizes, rectangle geometry, the Document/Page/Section aggregate, and the
//! pre-export size estimate. No I/O lives here.

pub mod document;
pub mod estimate;
pub mod geometry;
pub mod units;

pub use document::{
    Color, Document, DocumentError, DocumentId, DocumentResult, Page, PageId, Section,
    SectionContent, SectionId, TextAlign, DEFAULT_SECTION_SIZE, DUPLICATE_OFFSET,
    MIN_SECTION_SIZE,
};
pub use estimate::{estimate_pdf_size, PDF_BASE_OVERHEAD_BYTES};
pub use geometry::Rect;
pub use units::{
    convert_dimensions, page_dimensions, page_dimensions_with_orientation, px_to_pt,
    Orientation, PageDimensions, PaperSize, Unit,
};
