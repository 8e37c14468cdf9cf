//! Measurement units and paper-size lookups
//!
//! Millimeter dimensions are the source of truth for every paper size;
//! pixels (96 DPI) and inches are derived through fixed factors. Values stay
//! floating point end to end — callers round at presentation or export
//! boundaries only, so repeated conversions do not compound rounding error.

use serde::{Deserialize, Serialize};

/// Pixels per millimeter at 96 DPI.
pub const PX_PER_MM: f32 = 96.0 / 25.4;

/// Inches per millimeter.
pub const IN_PER_MM: f32 = 1.0 / 25.4;

/// Pixels per inch of the working unit.
pub const PX_PER_IN: f32 = 96.0;

/// PDF points per inch.
pub const PT_PER_IN: f32 = 72.0;

/// Convert working-unit pixels (96 DPI) to PDF points.
///
/// Applied identically by the canvas display math and the export geometry so
/// on-screen placement and printed placement cannot drift apart.
pub fn px_to_pt(px: f32) -> f32 {
    px * PT_PER_IN / PX_PER_IN
}

/// Measurement unit for page dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Mm,
    In,
    Px,
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Supported paper sizes (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperSize {
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    B4,
    B5,
    Letter,
    Legal,
    Tabloid,
    Executive,
    Statement,
    Folio,
}

impl PaperSize {
    /// All supported sizes, for enumeration in UIs and tests.
    pub const ALL: [PaperSize; 14] = [
        PaperSize::A0,
        PaperSize::A1,
        PaperSize::A2,
        PaperSize::A3,
        PaperSize::A4,
        PaperSize::A5,
        PaperSize::B4,
        PaperSize::B5,
        PaperSize::Letter,
        PaperSize::Legal,
        PaperSize::Tabloid,
        PaperSize::Executive,
        PaperSize::Statement,
        PaperSize::Folio,
    ];

    /// Portrait (width, height) in millimeters.
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A0 => (841.0, 1189.0),
            PaperSize::A1 => (594.0, 841.0),
            PaperSize::A2 => (420.0, 594.0),
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::B4 => (250.0, 353.0),
            PaperSize::B5 => (176.0, 250.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Executive => (184.1, 266.7),
            PaperSize::Statement => (139.7, 215.9),
            PaperSize::Folio => (210.0, 330.0),
        }
    }
}

/// Page dimensions tagged with their unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
    pub unit: Unit,
}

/// Look up the portrait dimensions of a paper size in the requested unit.
pub fn page_dimensions(size: PaperSize, unit: Unit) -> PageDimensions {
    let (width_mm, height_mm) = size.dimensions_mm();
    convert_dimensions(
        PageDimensions { width: width_mm, height: height_mm, unit: Unit::Mm },
        unit,
    )
}

/// Convert dimensions between units.
///
/// Identity when the units match. Every (from, to) pair is enumerated
/// explicitly; there is no computed factor table to fall through.
pub fn convert_dimensions(dims: PageDimensions, target: Unit) -> PageDimensions {
    let factor = match (dims.unit, target) {
        (Unit::Mm, Unit::Mm) | (Unit::In, Unit::In) | (Unit::Px, Unit::Px) => {
            return dims;
        }
        (Unit::Mm, Unit::Px) => PX_PER_MM,
        (Unit::Mm, Unit::In) => IN_PER_MM,
        (Unit::In, Unit::Mm) => 25.4,
        (Unit::In, Unit::Px) => PX_PER_IN,
        (Unit::Px, Unit::Mm) => 1.0 / PX_PER_MM,
        (Unit::Px, Unit::In) => 1.0 / PX_PER_IN,
    };

    PageDimensions { width: dims.width * factor, height: dims.height * factor, unit: target }
}

/// Dimensions of a paper size honoring orientation, in the working unit (px).
///
/// Landscape swaps width and height.
pub fn page_dimensions_with_orientation(
    size: PaperSize,
    orientation: Orientation,
) -> PageDimensions {
    let dims = page_dimensions(size, Unit::Px);
    match orientation {
        Orientation::Portrait => dims,
        Orientation::Landscape => {
            PageDimensions { width: dims.height, height: dims.width, unit: dims.unit }
        }
    }
}
