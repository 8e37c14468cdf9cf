//! DocMosaic export pipeline
//!
//! Turns a document snapshot into a PDF byte blob: image payloads are
//! optionally downsampled/recompressed (concurrently, recombined by index),
//! then pages are drawn sequentially through the `printpdf` builder.
//! Progress is reported per stage and cancellation is polled cooperatively.

pub mod optimize;
pub mod pipeline;
pub mod text;

pub use optimize::{optimize_data_uri, OptimizeError, DENSITY_HEADROOM, JPEG_QUALITY};
pub use pipeline::{export_pdf, ExportError, ExportOptions};
