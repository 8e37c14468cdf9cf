//! Cooperative cancellation and progress reporting for long-running work.

pub mod cancel;
pub mod progress;

pub use cancel::CancellationToken;
pub use progress::{ExportStage, ProgressEvent, ProgressReporter};
