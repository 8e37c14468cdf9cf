//! Editing session: the single source of truth for the live document
//!
//! Wraps the document in a linear history of immutable snapshots plus a
//! cursor. Every exposed mutation goes through `commit`, which clones the
//! current snapshot, applies the change, truncates any redo tail, appends,
//! and stamps `updated_at` / refreshes the size estimate. Undo and redo only
//! move the cursor; they never create snapshots.
//!
//! The session is an owned, explicitly passed object — there is no ambient
//! singleton. The canvas and the export pipeline receive read-only views and
//! feed changes back exclusively through this API.

use crate::analytics::{AnalyticsEvent, AnalyticsSink, NoopAnalytics};
use docmosaic_model::{
    estimate_pdf_size, Document, Orientation, Page, PaperSize, Section, SectionId,
};
use std::sync::Arc;

/// Structural invariant violations rejected synchronously; the document is
/// left unchanged.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a document must keep at least one page")]
    LastPage,
    #[error("page {page} out of range (page count {count})")]
    PageOutOfRange { page: usize, count: usize },
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Undo/redo state manager over [`Document`] snapshots.
pub struct EditingSession {
    history: Vec<Document>,
    cursor: usize,
    analytics: Arc<dyn AnalyticsSink>,
}

impl EditingSession {
    /// Session seeded with a fresh initial document.
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    pub fn with_document(document: Document) -> Self {
        Self { history: vec![document], cursor: 0, analytics: Arc::new(NoopAnalytics) }
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    /// The current snapshot.
    pub fn document(&self) -> &Document {
        &self.history[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    /// Step back one snapshot. Returns `false` (no-op) at the beginning.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Step forward one snapshot. Returns `false` (no-op) at the end.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Apply a mutation to a clone of the current document and push the
    /// result, discarding any redo entries.
    fn commit(&mut self, mutate: impl FnOnce(&mut Document)) {
        let mut next = self.history[self.cursor].clone();
        mutate(&mut next);
        next.estimated_size = estimate_pdf_size(&next);
        next.touch();
        debug_assert!(next.invariants_hold());

        self.history.truncate(self.cursor + 1);
        self.history.push(next);
        self.cursor += 1;
    }

    pub fn add_section(&mut self, section: Section) {
        self.commit(|doc| doc.sections.push(section));
        self.analytics.record(AnalyticsEvent::SectionAdded);
    }

    /// Full replace-by-id. Dropped (no history entry) when the id is
    /// unknown. Returns whether the update was applied.
    pub fn update_section(&mut self, section: Section) -> bool {
        let exists = self.document().section(section.id).is_some();
        if !exists {
            return false;
        }
        self.commit(|doc| {
            if let Some(slot) = doc.sections.iter_mut().find(|s| s.id == section.id) {
                *slot = section;
            }
        });
        true
    }

    /// Remove a section. Idempotent: an absent id is a no-op and produces no
    /// history entry.
    pub fn delete_section(&mut self, id: SectionId) {
        if self.document().section(id).is_none() {
            return;
        }
        self.commit(|doc| doc.sections.retain(|s| s.id != id));
        self.analytics.record(AnalyticsEvent::SectionDeleted);
    }

    /// Clone a section with a fresh id at an offset position on the same
    /// page. Returns the new section's id, or `None` if the source id is
    /// unknown.
    pub fn duplicate_section(&mut self, id: SectionId) -> Option<SectionId> {
        let copy = self.document().section(id)?.duplicated();
        let new_id = copy.id;
        self.commit(|doc| doc.sections.push(copy));
        self.analytics.record(AnalyticsEvent::SectionDuplicated);
        Some(new_id)
    }

    /// Append a new page at the end. Returns its 1-based page number.
    pub fn add_page(&mut self) -> u32 {
        self.commit(|doc| doc.pages.push(Page::new()));
        self.analytics.record(AnalyticsEvent::PageAdded);
        self.document().pages.len() as u32
    }

    /// Delete the page with the given 1-based number.
    ///
    /// Refuses to delete the last remaining page. Sections on the deleted
    /// page are dropped; sections on later pages are renumbered down by one;
    /// `current_page` is clamped back into range.
    pub fn delete_page(&mut self, page: u32) -> SessionResult<()> {
        let count = self.document().pages.len();
        if count == 1 {
            return Err(SessionError::LastPage);
        }
        if page == 0 || page as usize > count {
            return Err(SessionError::PageOutOfRange { page: page as usize, count });
        }

        self.commit(|doc| {
            doc.pages.remove(page as usize - 1);
            doc.sections.retain(|s| s.page != page);
            for section in &mut doc.sections {
                if section.page > page {
                    section.page -= 1;
                }
            }
            doc.clamp_current_page();
        });
        self.analytics.record(AnalyticsEvent::PageDeleted);
        Ok(())
    }

    /// Move the page at 0-based `from` to 0-based `to` (remove + insert).
    ///
    /// Sections are renumbered to track their page's new position: the moved
    /// page's sections get `to + 1`, sections strictly between the two
    /// positions shift by one toward the vacated slot. Reversible via
    /// `reorder_pages(to, from)`.
    pub fn reorder_pages(&mut self, from: usize, to: usize) -> SessionResult<()> {
        let count = self.document().pages.len();
        if from >= count {
            return Err(SessionError::PageOutOfRange { page: from, count });
        }
        if to >= count {
            return Err(SessionError::PageOutOfRange { page: to, count });
        }
        if from == to {
            return Ok(());
        }

        let from_page = from as u32 + 1;
        let to_page = to as u32 + 1;

        self.commit(|doc| {
            let page = doc.pages.remove(from);
            doc.pages.insert(to, page);

            for section in &mut doc.sections {
                if section.page == from_page {
                    section.page = to_page;
                } else if from_page < to_page
                    && section.page > from_page
                    && section.page <= to_page
                {
                    section.page -= 1;
                } else if from_page > to_page
                    && section.page >= to_page
                    && section.page < from_page
                {
                    section.page += 1;
                }
            }

            // Keep the user's current page pointing at the same sheet.
            if doc.current_page == from_page {
                doc.current_page = to_page;
            } else if from_page < to_page
                && doc.current_page > from_page
                && doc.current_page <= to_page
            {
                doc.current_page -= 1;
            } else if from_page > to_page
                && doc.current_page >= to_page
                && doc.current_page < from_page
            {
                doc.current_page += 1;
            }
        });
        self.analytics.record(AnalyticsEvent::PagesReordered);
        Ok(())
    }

    /// Switch the current page (1-based). Out-of-range values are clamped
    /// defensively rather than trusted.
    pub fn change_page(&mut self, page: u32) {
        self.commit(|doc| {
            doc.current_page = page;
            doc.clamp_current_page();
        });
    }

    /// Set or clear the full-bleed background of a 1-based page.
    pub fn set_page_background(
        &mut self,
        page: u32,
        background: Option<String>,
    ) -> SessionResult<()> {
        let count = self.document().pages.len();
        if page == 0 || page as usize > count {
            return Err(SessionError::PageOutOfRange { page: page as usize, count });
        }
        self.commit(|doc| doc.pages[page as usize - 1].background = background);
        Ok(())
    }

    pub fn update_page_size(&mut self, size: PaperSize) {
        self.commit(|doc| doc.page_size = size);
    }

    pub fn update_orientation(&mut self, orientation: Orientation) {
        self.commit(|doc| doc.orientation = orientation);
    }

    pub fn update_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.commit(|doc| doc.name = name);
    }

    /// Recompute the cached size estimate. Commits already refresh it; this
    /// exists for callers that changed payloads out of band.
    pub fn update_estimated_size(&mut self) {
        self.commit(|_| {});
    }
}

impl Default for EditingSession {
    fn default() -> Self {
        Self::new()
    }
}
