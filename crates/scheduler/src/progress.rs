//! Stage-scoped progress reporting
//!
//! Progress flows through an explicit reporter object instead of ad-hoc
//! callbacks buried in the concurrency primitive. Values are clamped
//! monotonic per stage, so out-of-order completion of parallel work can
//! never make a progress bar move backwards.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Coarse stage of an export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportStage {
    /// Downsampling/recompressing backgrounds and section images.
    Optimizing,
    /// Drawing pages into the PDF builder.
    Generating,
    /// Blob serialized.
    Complete,
}

impl ExportStage {
    fn index(self) -> usize {
        match self {
            ExportStage::Optimizing => 0,
            ExportStage::Generating => 1,
            ExportStage::Complete => 2,
        }
    }
}

/// One progress observation: 0–100 within the given stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub stage: ExportStage,
    pub percent: u8,
}

type ProgressFn = dyn Fn(ProgressEvent) + Send + Sync;

struct Inner {
    callback: Option<Box<ProgressFn>>,
    // Highest percent reported so far, per stage.
    high_water: [AtomicU8; 3],
}

/// Cloneable, thread-safe progress channel.
///
/// `report` may be called from parallel workers; each stage's reported value
/// only ever increases.
#[derive(Clone)]
pub struct ProgressReporter {
    inner: Arc<Inner>,
}

impl ProgressReporter {
    /// Reporter that invokes `callback` for every effective advance.
    pub fn new(callback: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                callback: Some(Box::new(callback)),
                high_water: [AtomicU8::new(0), AtomicU8::new(0), AtomicU8::new(0)],
            }),
        }
    }

    /// Reporter that discards all events.
    pub fn noop() -> Self {
        Self {
            inner: Arc::new(Inner {
                callback: None,
                high_water: [AtomicU8::new(0), AtomicU8::new(0), AtomicU8::new(0)],
            }),
        }
    }

    /// Report progress within a stage. Values at or below the stage's
    /// high-water mark are dropped.
    pub fn report(&self, stage: ExportStage, percent: u8) {
        let percent = percent.min(100);
        let slot = &self.inner.high_water[stage.index()];

        let mut current = slot.load(Ordering::Acquire);
        loop {
            if percent <= current {
                return;
            }
            match slot.compare_exchange_weak(
                current,
                percent,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }

        if let Some(callback) = &self.inner.callback {
            callback(ProgressEvent { stage, percent });
        }
    }

    /// Latest value reported for a stage.
    pub fn stage_percent(&self, stage: ExportStage) -> u8 {
        self.inner.high_water[stage.index()].load(Ordering::Acquire)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_reporter() -> (ProgressReporter, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reporter = ProgressReporter::new(move |event| {
            sink.lock().expect("event log should lock").push(event);
        });
        (reporter, events)
    }

    #[test]
    fn progress_is_monotonic_within_a_stage() {
        let (reporter, events) = recording_reporter();

        reporter.report(ExportStage::Optimizing, 40);
        reporter.report(ExportStage::Optimizing, 20);
        reporter.report(ExportStage::Optimizing, 70);

        let seen: Vec<u8> = events
            .lock()
            .expect("event log should lock")
            .iter()
            .map(|event| event.percent)
            .collect();
        assert_eq!(seen, vec![40, 70]);
        assert_eq!(reporter.stage_percent(ExportStage::Optimizing), 70);
    }

    #[test]
    fn stages_track_progress_independently() {
        let (reporter, _) = recording_reporter();

        reporter.report(ExportStage::Optimizing, 100);
        reporter.report(ExportStage::Generating, 10);

        assert_eq!(reporter.stage_percent(ExportStage::Optimizing), 100);
        assert_eq!(reporter.stage_percent(ExportStage::Generating), 10);
        assert_eq!(reporter.stage_percent(ExportStage::Complete), 0);
    }

    #[test]
    fn percent_is_capped_at_100() {
        let (reporter, events) = recording_reporter();
        reporter.report(ExportStage::Generating, 250);
        assert_eq!(
            events.lock().expect("event log should lock")[0].percent,
            100
        );
    }

    #[test]
    fn noop_reporter_still_tracks_high_water() {
        let reporter = ProgressReporter::noop();
        reporter.report(ExportStage::Complete, 100);
        assert_eq!(reporter.stage_percent(ExportStage::Complete), 100);
    }
}
