//! Section manipulation: drag and eight-direction resize
//!
//! Pure geometry: pointer deltas come in already divided by the display
//! scale (see [`crate::viewport`]), so everything here works in the
//! document's working unit. Minimum size and page bounds are clamped on
//! every intermediate computation, not only on release.

use docmosaic_model::{Rect, SectionId, MIN_SECTION_SIZE};

/// Which part of a section the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleType {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    /// Whole-section drag.
    Move,
}

impl HandleType {
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            HandleType::TopLeft
                | HandleType::TopRight
                | HandleType::BottomLeft
                | HandleType::BottomRight
        )
    }
}

/// State of an in-progress drag or resize.
///
/// Captures the rect at pointer-down; every pointer move resolves a fresh
/// rect from the original plus the accumulated delta, so intermediate
/// clamping never compounds.
#[derive(Debug, Clone)]
pub struct ManipulationState {
    pub section_id: SectionId,
    pub handle: HandleType,
    original: Rect,
    /// Aspect ratio captured at resize start; corner handles preserve it
    /// when the section holds an image.
    locked_aspect: Option<f32>,
}

impl ManipulationState {
    pub fn new(section_id: SectionId, handle: HandleType, original: Rect) -> Self {
        Self { section_id, handle, original, locked_aspect: None }
    }

    /// Preserve the start aspect ratio on corner resizes.
    pub fn with_locked_aspect(mut self) -> Self {
        if self.original.height > 0.0 {
            self.locked_aspect = Some(self.original.aspect_ratio());
        }
        self
    }

    pub fn original(&self) -> Rect {
        self.original
    }

    /// Resolve the rect for the accumulated pointer delta (working units),
    /// clamped to the page and to the minimum section size.
    pub fn resolve(&self, dx: f32, dy: f32, page_width: f32, page_height: f32) -> Rect {
        let o = self.original;

        let rect = match self.handle {
            HandleType::Move => return o.translated(dx, dy).clamped_within(page_width, page_height),

            // Edge handles adjust one dimension; the opposite edge is fixed.
            HandleType::Right => Rect::new(o.x, o.y, o.width + dx, o.height),
            HandleType::Bottom => Rect::new(o.x, o.y, o.width, o.height + dy),
            HandleType::Left => {
                let width = (o.width - dx).max(MIN_SECTION_SIZE);
                Rect::new(o.x + o.width - width, o.y, width, o.height)
            }
            HandleType::Top => {
                let height = (o.height - dy).max(MIN_SECTION_SIZE);
                Rect::new(o.x, o.y + o.height - height, o.width, height)
            }

            HandleType::BottomRight => self.corner(o.width + dx, o.height + dy, false, false),
            HandleType::BottomLeft => self.corner(o.width - dx, o.height + dy, true, false),
            HandleType::TopRight => self.corner(o.width + dx, o.height - dy, false, true),
            HandleType::TopLeft => self.corner(o.width - dx, o.height - dy, true, true),
        };

        rect.with_min_size(MIN_SECTION_SIZE).clamped_within(page_width, page_height)
    }

    /// Corner resize: width drives height when the aspect is locked; anchor
    /// edges move so the opposite corner stays fixed.
    fn corner(&self, width: f32, height: f32, anchor_right: bool, anchor_bottom: bool) -> Rect {
        let o = self.original;
        let width = width.max(MIN_SECTION_SIZE);
        let height = match self.locked_aspect {
            Some(aspect) => (width / aspect).max(MIN_SECTION_SIZE),
            None => height.max(MIN_SECTION_SIZE),
        };
        let width = match self.locked_aspect {
            Some(aspect) => height * aspect,
            None => width,
        };

        let x = if anchor_right { o.x + o.width - width } else { o.x };
        let y = if anchor_bottom { o.y + o.height - height } else { o.y };
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmosaic_model::Section;

    const PAGE_W: f32 = 794.0;
    const PAGE_H: f32 = 1123.0;

    fn state(handle: HandleType) -> ManipulationState {
        let section = Section::new_image(100.0, 100.0, 1);
        ManipulationState::new(section.id, handle, section.rect)
    }

    #[test]
    fn move_translates_and_clamps_to_page() {
        let rect = state(HandleType::Move).resolve(50.0, -500.0, PAGE_W, PAGE_H);
        assert_eq!(rect.x, 150.0);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rect.width, 200.0);
    }

    #[test]
    fn move_cannot_push_section_past_right_edge() {
        let rect = state(HandleType::Move).resolve(10_000.0, 0.0, PAGE_W, PAGE_H);
        assert_eq!(rect.x, PAGE_W - rect.width);
    }

    #[test]
    fn right_edge_grows_width_only() {
        let rect = state(HandleType::Right).resolve(80.0, 999.0, PAGE_W, PAGE_H);
        assert_eq!(rect.width, 280.0);
        assert_eq!(rect.height, 200.0);
        assert_eq!(rect.x, 100.0);
    }

    #[test]
    fn left_edge_moves_x_and_keeps_right_edge_fixed() {
        let rect = state(HandleType::Left).resolve(-60.0, 0.0, PAGE_W, PAGE_H);
        assert_eq!(rect.x, 40.0);
        assert_eq!(rect.width, 260.0);
        assert_eq!(rect.x + rect.width, 300.0);
    }

    #[test]
    fn edge_handles_never_shrink_below_minimum() {
        for handle in [HandleType::Left, HandleType::Right, HandleType::Top, HandleType::Bottom] {
            let rect = state(handle).resolve(-5_000.0, 5_000.0, PAGE_W, PAGE_H);
            assert!(rect.width >= MIN_SECTION_SIZE, "{handle:?} width");
            assert!(rect.height >= MIN_SECTION_SIZE, "{handle:?} height");

            let rect = state(handle).resolve(5_000.0, -5_000.0, PAGE_W, PAGE_H);
            assert!(rect.width >= MIN_SECTION_SIZE, "{handle:?} width");
            assert!(rect.height >= MIN_SECTION_SIZE, "{handle:?} height");
        }
    }

    #[test]
    fn corner_handles_never_shrink_below_minimum() {
        for handle in [
            HandleType::TopLeft,
            HandleType::TopRight,
            HandleType::BottomLeft,
            HandleType::BottomRight,
        ] {
            let rect = state(handle).resolve(-10_000.0, -10_000.0, PAGE_W, PAGE_H);
            assert!(rect.width >= MIN_SECTION_SIZE, "{handle:?} width");
            assert!(rect.height >= MIN_SECTION_SIZE, "{handle:?} height");
        }
    }

    #[test]
    fn bottom_right_corner_grows_both_dimensions() {
        let rect = state(HandleType::BottomRight).resolve(50.0, 100.0, PAGE_W, PAGE_H);
        assert_eq!(rect.width, 250.0);
        assert_eq!(rect.height, 300.0);
        assert_eq!(rect.x, 100.0);
        assert_eq!(rect.y, 100.0);
    }

    #[test]
    fn top_left_corner_keeps_bottom_right_anchored() {
        let rect = state(HandleType::TopLeft).resolve(-50.0, -50.0, PAGE_W, PAGE_H);
        assert_eq!(rect.x + rect.width, 300.0);
        assert_eq!(rect.y + rect.height, 300.0);
        assert_eq!(rect.width, 250.0);
    }

    #[test]
    fn locked_aspect_derives_height_from_width() {
        let section = Section::new_image(0.0, 0.0, 1);
        let mut wide = section.rect;
        wide.width = 400.0; // 2:1
        let state =
            ManipulationState::new(section.id, HandleType::BottomRight, wide).with_locked_aspect();

        let rect = state.resolve(100.0, 0.0, PAGE_W, PAGE_H);
        assert_eq!(rect.width, 500.0);
        assert_eq!(rect.height, 250.0);
    }

    #[test]
    fn locked_aspect_respects_minimum_on_both_axes() {
        let section = Section::new_image(0.0, 0.0, 1);
        let mut wide = section.rect;
        wide.width = 400.0; // 2:1
        let state =
            ManipulationState::new(section.id, HandleType::BottomRight, wide).with_locked_aspect();

        let rect = state.resolve(-10_000.0, -10_000.0, PAGE_W, PAGE_H);
        assert!(rect.height >= MIN_SECTION_SIZE);
        assert!(rect.width >= MIN_SECTION_SIZE);
        // 2:1 ratio held even at the floor
        assert!((rect.width - rect.height * 2.0).abs() < 1e-3);
    }
}
