//! Fire-and-forget analytics seam
//!
//! The core emits events and never depends on delivery, a return value, or
//! the sink's success. The default sink does nothing.

/// Events the editing core reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    SectionAdded,
    SectionDeleted,
    SectionDuplicated,
    PageAdded,
    PageDeleted,
    PagesReordered,
    ZoomChanged,
    DocumentExported { pages: usize, sections: usize, bytes: usize },
}

/// Receives events; must never block or fail visibly.
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: AnalyticsEvent);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn record(&self, _event: AnalyticsEvent) {}
}

/// Writes events to the log facade at debug level.
#[derive(Debug, Default)]
pub struct LogAnalytics;

impl AnalyticsSink for LogAnalytics {
    fn record(&self, event: AnalyticsEvent) {
        log::debug!("analytics: {event:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink(AtomicUsize);

    impl AnalyticsSink for CountingSink {
        fn record(&self, _event: AnalyticsEvent) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn session_mutations_reach_the_sink() {
        use crate::session::EditingSession;
        use docmosaic_model::Section;

        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let mut session =
            EditingSession::new().with_analytics(Arc::clone(&sink) as Arc<dyn AnalyticsSink>);

        session.add_section(Section::new_image(0.0, 0.0, 1));
        session.add_page();

        assert_eq!(sink.0.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn noop_sink_accepts_all_events() {
        let sink = NoopAnalytics;
        sink.record(AnalyticsEvent::ZoomChanged);
        sink.record(AnalyticsEvent::DocumentExported { pages: 1, sections: 2, bytes: 3 });
    }
}
