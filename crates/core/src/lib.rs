//! DocMosaic editing core
//!
//! Owns the live document: a linear undo/redo history, the geometry
//! mutations driven by pointer input (drag, resize, zoom, pan), upload
//! validation, and the fire-and-forget analytics seam. Everything reads the
//! current snapshot and writes back only through [`session::EditingSession`].

pub mod analytics;
pub mod manipulation;
pub mod session;
pub mod upload;
pub mod viewport;

pub use analytics::{AnalyticsEvent, AnalyticsSink, LogAnalytics, NoopAnalytics};
pub use manipulation::{HandleType, ManipulationState};
pub use session::{EditingSession, SessionError, SessionResult};
pub use upload::{validate_and_encode, UploadError, MAX_UPLOAD_BYTES};
pub use viewport::{Viewport, MAX_ZOOM, MIN_ZOOM, PINCH_THRESHOLD_PX, ZOOM_STEP};
