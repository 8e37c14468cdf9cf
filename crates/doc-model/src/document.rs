//! Document aggregate: pages, sections, metadata
//!
//! The document is a plain value type; it is cloned wholesale into the
//! editing history on every mutation. Page membership of a section is
//! derived from its 1-based `page` field rather than pages owning lists —
//! structural mutations (delete, reorder) renumber sections to keep every
//! reference valid.

use crate::geometry::Rect;
use crate::units::{page_dimensions_with_orientation, Orientation, PageDimensions, PaperSize};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Unique identifier for a document, assigned at creation.
pub type DocumentId = uuid::Uuid;

/// Unique identifier for a page.
pub type PageId = uuid::Uuid;

/// Unique identifier for a section.
pub type SectionId = uuid::Uuid;

/// Minimum width/height of a section in working-unit pixels. Prevents
/// degenerate, effectively invisible sections.
pub const MIN_SECTION_SIZE: f32 = 50.0;

/// Default edge length of a freshly placed section.
pub const DEFAULT_SECTION_SIZE: f32 = 200.0;

/// Position offset applied when duplicating a section.
pub const DUPLICATE_OFFSET: f32 = 20.0;

/// Horizontal alignment of a text section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// RGB color for text sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub fn to_normalized(self) -> (f32, f32, f32) {
        (self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0)
    }
}

/// Content of a section. Matched exhaustively at every consumption site so a
/// new kind is a compile-time exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SectionContent {
    /// An embedded image, or an empty upload slot when `data_uri` is `None`.
    Image { data_uri: Option<String> },
    /// Word-wrapped text drawn at export time.
    Text { text: String, font_size: f32, align: TextAlign, color: Color },
}

/// A positioned rectangular content unit placed on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    /// Geometry in working-unit pixels, top-left origin.
    pub rect: Rect,
    /// 1-based page number; always within `[1, document.pages.len()]`.
    pub page: u32,
    pub content: SectionContent,
}

impl Section {
    /// New empty image slot at the given position with the default size.
    pub fn new_image(x: f32, y: f32, page: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            rect: Rect::new(x, y, DEFAULT_SECTION_SIZE, DEFAULT_SECTION_SIZE),
            page,
            content: SectionContent::Image { data_uri: None },
        }
    }

    pub fn new_text(x: f32, y: f32, page: u32, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            rect: Rect::new(x, y, DEFAULT_SECTION_SIZE, DEFAULT_SECTION_SIZE),
            page,
            content: SectionContent::Text {
                text: text.into(),
                font_size: 14.0,
                align: TextAlign::Left,
                color: Color::BLACK,
            },
        }
    }

    /// Clone with a fresh id and an offset position, same page.
    pub fn duplicated(&self) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            rect: self.rect.translated(DUPLICATE_OFFSET, DUPLICATE_OFFSET),
            page: self.page,
            content: self.content.clone(),
        }
    }
}

/// One output sheet of the final PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    /// Optional full-bleed background image (data URI).
    pub background: Option<String>,
}

impl Page {
    pub fn new() -> Self {
        Self { id: uuid::Uuid::new_v4(), background: None }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised by structural invariant guards.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("a document must keep at least one page")]
    LastPage,
    #[error("page index {index} out of range (page count {count})")]
    PageOutOfRange { index: usize, count: usize },
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// The aggregate root: ordered pages, flat section collection, metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub page_size: PaperSize,
    pub orientation: Orientation,
    /// Order is output page order. Never empty.
    pub pages: Vec<Page>,
    /// Flat collection; membership derives from `Section::page`.
    pub sections: Vec<Section>,
    /// 1-based, always within `[1, pages.len()]`.
    pub current_page: u32,
    /// Cached byte-size estimate, refreshed whenever sections/pages change.
    pub estimated_size: u64,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl Document {
    /// The initial document: one A4 portrait page, no sections.
    pub fn new() -> Self {
        let now = SystemTime::now();
        Self {
            id: uuid::Uuid::new_v4(),
            name: "Untitled Document".to_owned(),
            page_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            pages: vec![Page::new()],
            sections: Vec::new(),
            current_page: 1,
            estimated_size: crate::estimate::PDF_BASE_OVERHEAD_BYTES,
            created_at: now,
            updated_at: now,
        }
    }

    /// Dimensions of every page in working-unit pixels.
    pub fn page_dimensions_px(&self) -> PageDimensions {
        page_dimensions_with_orientation(self.page_size, self.orientation)
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Sections belonging to a 1-based page number, in insertion order.
    pub fn sections_on_page(&self, page: u32) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |section| section.page == page)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Clamp `current_page` back into range after a structural change.
    pub fn clamp_current_page(&mut self) {
        self.current_page = self.current_page.clamp(1, self.pages.len() as u32);
    }

    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }

    /// Check the structural invariants; used by debug assertions and tests.
    pub fn invariants_hold(&self) -> bool {
        let count = self.pages.len() as u32;
        !self.pages.is_empty()
            && (1..=count).contains(&self.current_page)
            && self.sections.iter().all(|s| (1..=count).contains(&s.page))
            && self
                .sections
                .iter()
                .all(|s| s.rect.width >= MIN_SECTION_SIZE && s.rect.height >= MIN_SECTION_SIZE)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;

    #[test]
    fn initial_document_has_one_page_and_no_sections() {
        let doc = Document::new();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.current_page, 1);
        assert!(doc.sections.is_empty());
        assert_eq!(doc.name, "Untitled Document");
        assert_eq!(doc.page_size, PaperSize::A4);
        assert_eq!(doc.orientation, Orientation::Portrait);
        assert!(doc.invariants_hold());
    }

    #[test]
    fn new_sections_have_default_size_and_fresh_ids() {
        let a = Section::new_image(10.0, 20.0, 1);
        let b = Section::new_image(10.0, 20.0, 1);
        assert_ne!(a.id, b.id);
        assert_eq!(a.rect.width, DEFAULT_SECTION_SIZE);
        assert_eq!(a.rect.height, DEFAULT_SECTION_SIZE);
        assert!(matches!(a.content, SectionContent::Image { data_uri: None }));
    }

    #[test]
    fn duplicated_section_gets_new_id_and_offset_position() {
        let original = Section::new_image(100.0, 100.0, 2);
        let copy = original.duplicated();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.page, 2);
        assert_eq!(copy.rect.x, 120.0);
        assert_eq!(copy.rect.y, 120.0);
        assert_eq!(copy.content, original.content);
    }

    #[test]
    fn sections_on_page_filters_by_page_number() {
        let mut doc = Document::new();
        doc.pages.push(Page::new());
        doc.sections.push(Section::new_image(0.0, 0.0, 1));
        doc.sections.push(Section::new_image(0.0, 0.0, 2));
        doc.sections.push(Section::new_image(0.0, 0.0, 2));

        assert_eq!(doc.sections_on_page(1).count(), 1);
        assert_eq!(doc.sections_on_page(2).count(), 2);
        assert_eq!(doc.sections_on_page(3).count(), 0);
    }

    #[test]
    fn page_dimensions_follow_size_and_orientation() {
        let mut doc = Document::new();
        let portrait = doc.page_dimensions_px();
        doc.orientation = Orientation::Landscape;
        let landscape = doc.page_dimensions_px();
        assert_eq!(portrait.unit, Unit::Px);
        assert_eq!(portrait.width, landscape.height);
        assert_eq!(portrait.height, landscape.width);
    }

    #[test]
    fn document_round_trips_through_json() {
        let mut doc = Document::new();
        doc.sections.push(Section::new_text(5.0, 5.0, 1, "hello"));

        let json = serde_json::to_string(&doc).expect("document should serialize");
        let back: Document = serde_json::from_str(&json).expect("document should deserialize");
        assert_eq!(back, doc);
    }
}
