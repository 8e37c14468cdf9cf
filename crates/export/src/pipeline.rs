//! PDF generation pipeline
//!
//! Two stages run against an immutable document snapshot: image optimization
//! (parallel per image, results recombined by index) and page generation
//! (sequential through the `printpdf` builder). A failed asset is logged and
//! skipped; only builder failures and cancellation abort the export.
//!
//! Geometry: working-unit pixels (96 DPI, top-left origin) are converted to
//! millimeters, and the y axis is flipped into PDF space with
//! `y_pdf = page_height - y - height`.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use docmosaic_model::{
    convert_dimensions, Document, Rect, Section, SectionContent, TextAlign, Unit,
};
use docmosaic_scheduler::{CancellationToken, ExportStage, ProgressReporter};
use printpdf::{
    image_crate, BuiltinFont, Color as PdfColor, Image, ImageTransform, IndirectFontRef, Mm,
    PdfDocument, PdfLayerReference, Rgb,
};

use crate::optimize::{decode_data_uri, optimize_data_uri, DENSITY_HEADROOM, JPEG_QUALITY};
use crate::text::{line_height_px, line_width_px, wrap_text};

/// Knobs for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Downsample and recompress images before embedding.
    pub optimize_images: bool,
    /// JPEG quality used by the optimization stage.
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { optimize_images: true, jpeg_quality: JPEG_QUALITY }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export cancelled")]
    Cancelled,
    #[error("PDF builder error: {0}")]
    Builder(String),
}

const MM_PER_PX: f32 = 25.4 / 96.0;

fn px_to_mm(px: f32) -> f32 {
    px * MM_PER_PX
}

/// Which slot an optimization result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum JobKey {
    /// Index into `document.pages`.
    Background(usize),
    /// Index into `document.sections`.
    Section(usize),
}

struct OptimizeJob {
    key: JobKey,
    uri: String,
    max_width: u32,
    max_height: u32,
}

/// Backgrounds carry this share of the optimizing stage; section images the
/// rest. Backgrounds are fewer but full-page, so they get a fixed slice.
const BACKGROUND_WEIGHT: f32 = 30.0;
const SECTION_WEIGHT: f32 = 70.0;

fn optimizing_percent(
    backgrounds_done: usize,
    backgrounds_total: usize,
    sections_done: usize,
    sections_total: usize,
) -> u8 {
    let backgrounds = if backgrounds_total == 0 {
        BACKGROUND_WEIGHT
    } else {
        backgrounds_done as f32 / backgrounds_total as f32 * BACKGROUND_WEIGHT
    };
    let sections = if sections_total == 0 {
        SECTION_WEIGHT
    } else {
        sections_done as f32 / sections_total as f32 * SECTION_WEIGHT
    };
    (backgrounds + sections).round() as u8
}

fn optimize_jobs(document: &Document) -> Vec<OptimizeJob> {
    let page_px = document.page_dimensions_px();
    let page_max_w = (page_px.width * DENSITY_HEADROOM).ceil() as u32;
    let page_max_h = (page_px.height * DENSITY_HEADROOM).ceil() as u32;

    let mut jobs = Vec::new();
    for (index, page) in document.pages.iter().enumerate() {
        if let Some(uri) = &page.background {
            jobs.push(OptimizeJob {
                key: JobKey::Background(index),
                uri: uri.clone(),
                max_width: page_max_w,
                max_height: page_max_h,
            });
        }
    }
    for (index, section) in document.sections.iter().enumerate() {
        if let SectionContent::Image { data_uri: Some(uri) } = &section.content {
            jobs.push(OptimizeJob {
                key: JobKey::Section(index),
                uri: uri.clone(),
                max_width: (section.rect.width * DENSITY_HEADROOM).ceil() as u32,
                max_height: (section.rect.height * DENSITY_HEADROOM).ceil() as u32,
            });
        }
    }
    jobs
}

/// Run the optimization stage. Returns replacement URIs keyed by slot; a slot
/// without an entry keeps its original payload.
fn run_optimization(
    document: &Document,
    options: &ExportOptions,
    progress: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<HashMap<JobKey, String>, ExportError> {
    if !options.optimize_images {
        progress.report(ExportStage::Optimizing, 100);
        return Ok(HashMap::new());
    }

    let jobs = optimize_jobs(document);
    let backgrounds_total =
        jobs.iter().filter(|job| matches!(job.key, JobKey::Background(_))).count();
    let sections_total = jobs.len() - backgrounds_total;

    let backgrounds_done = AtomicUsize::new(0);
    let sections_done = AtomicUsize::new(0);
    let quality = options.jpeg_quality;

    let mut optimized = HashMap::new();
    std::thread::scope(|scope| -> Result<(), ExportError> {
        let mut handles = Vec::with_capacity(jobs.len());
        for job in &jobs {
            let backgrounds_done = &backgrounds_done;
            let sections_done = &sections_done;
            handles.push(scope.spawn(move || {
                if cancel.is_cancelled() {
                    return (job.key, None);
                }
                let result = optimize_data_uri(&job.uri, job.max_width, job.max_height, quality);

                let counter = match job.key {
                    JobKey::Background(_) => backgrounds_done,
                    JobKey::Section(_) => sections_done,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                progress.report(
                    ExportStage::Optimizing,
                    optimizing_percent(
                        backgrounds_done.load(Ordering::Relaxed),
                        backgrounds_total,
                        sections_done.load(Ordering::Relaxed),
                        sections_total,
                    ),
                );

                match result {
                    Ok(uri) => (job.key, Some(uri)),
                    Err(err) => {
                        log::warn!("image optimization failed, keeping original payload: {err}");
                        (job.key, None)
                    }
                }
            }));
        }

        for handle in handles {
            let (key, replacement) = handle
                .join()
                .map_err(|_| ExportError::Builder("image optimization worker panicked".into()))?;
            if let Some(uri) = replacement {
                optimized.insert(key, uri);
            }
        }
        Ok(())
    })?;

    if cancel.is_cancelled() {
        return Err(ExportError::Cancelled);
    }
    progress.report(ExportStage::Optimizing, 100);
    Ok(optimized)
}

/// Build an embeddable image from raw payload bytes.
///
/// JPEG and opaque PNG embed directly. Anything else (alpha layouts the
/// builder rejects, other formats) is flattened to an RGB JPEG first; a
/// payload the bundled decoder cannot read at all is an error and the caller
/// skips it.
fn embed_image(bytes: &[u8]) -> Result<Image, String> {
    match image_crate::guess_format(bytes) {
        Ok(image_crate::ImageFormat::Jpeg) => {
            let decoder = image_crate::codecs::jpeg::JpegDecoder::new(Cursor::new(bytes))
                .map_err(|err| err.to_string())?;
            Image::try_from(decoder).map_err(|err| err.to_string())
        }
        Ok(image_crate::ImageFormat::Png) => {
            let decoder = image_crate::codecs::png::PngDecoder::new(Cursor::new(bytes))
                .map_err(|err| err.to_string())?;
            Image::try_from(decoder).or_else(|_| flatten_to_jpeg(bytes))
        }
        _ => flatten_to_jpeg(bytes),
    }
}

fn flatten_to_jpeg(bytes: &[u8]) -> Result<Image, String> {
    let decoded = image_crate::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let mut jpeg = Vec::new();
    let mut cursor = Cursor::new(&mut jpeg);
    let mut encoder = image_crate::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, 90);
    encoder.encode_image(&decoded.to_rgb8()).map_err(|err| err.to_string())?;
    drop(cursor);
    let decoder = image_crate::codecs::jpeg::JpegDecoder::new(Cursor::new(jpeg.as_slice()))
        .map_err(|err| err.to_string())?;
    Image::try_from(decoder).map_err(|err| err.to_string())
}

/// Place one image payload into `rect` (working px, top-left origin).
fn draw_image(layer: &PdfLayerReference, uri: &str, rect: Rect, page_height_mm: f32) {
    let bytes = match decode_data_uri(uri) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("skipping image with unreadable payload: {err}");
            return;
        }
    };
    let image = match embed_image(&bytes) {
        Ok(image) => image,
        Err(err) => {
            log::warn!("skipping image the PDF builder cannot embed: {err}");
            return;
        }
    };

    let natural_width_px = image.image.width.0 as f32;
    let natural_height_px = image.image.height.0 as f32;
    if natural_width_px <= 0.0 || natural_height_px <= 0.0 {
        log::warn!("skipping image with zero pixel dimensions");
        return;
    }

    let width_mm = px_to_mm(rect.width);
    let height_mm = px_to_mm(rect.height);
    let x_mm = px_to_mm(rect.x);
    let y_mm = page_height_mm - px_to_mm(rect.y) - height_mm;

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x_mm)),
            translate_y: Some(Mm(y_mm)),
            scale_x: Some(width_mm / px_to_mm(natural_width_px)),
            scale_y: Some(height_mm / px_to_mm(natural_height_px)),
            dpi: Some(96.0),
            ..Default::default()
        },
    );
}

/// Word-wrap and place a text section. Lines past the section's height are
/// dropped rather than spilling onto neighbours.
fn draw_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    section: &Section,
    page_height_mm: f32,
) {
    let SectionContent::Text { text, font_size, align, color } = &section.content else {
        return;
    };

    let (r, g, b) = color.to_normalized();
    layer.set_fill_color(PdfColor::Rgb(Rgb::new(r, g, b, None)));

    let rect = section.rect;
    let lines = wrap_text(text, rect.width, *font_size);
    let line_height = line_height_px(*font_size);
    let max_lines = ((rect.height / line_height).floor() as usize).max(1);

    for (index, line) in lines.iter().take(max_lines).enumerate() {
        if line.is_empty() {
            continue;
        }
        let width = line_width_px(line, *font_size);
        let x_px = match align {
            TextAlign::Left => rect.x,
            TextAlign::Center => rect.x + ((rect.width - width) / 2.0).max(0.0),
            TextAlign::Right => rect.x + (rect.width - width).max(0.0),
        };
        // Baseline sits 80% into each line box.
        let baseline_px = rect.y + (index as f32 + 0.8) * line_height;
        let y_mm = page_height_mm - px_to_mm(baseline_px);
        layer.use_text(line, *font_size, Mm(px_to_mm(x_px)), Mm(y_mm), font);
    }
}

/// Export a document snapshot to a PDF byte blob.
///
/// Optimizes image payloads (unless disabled), then draws every page in
/// order. Cancellation is honored between images and between pages; a
/// cancelled run returns [`ExportError::Cancelled`] and no blob.
pub fn export_pdf(
    document: &Document,
    options: &ExportOptions,
    progress: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, ExportError> {
    if cancel.is_cancelled() {
        return Err(ExportError::Cancelled);
    }

    let optimized = run_optimization(document, options, progress, cancel)?;

    let page_px = document.page_dimensions_px();
    let page_mm = convert_dimensions(page_px, Unit::Mm);
    let (page_width_mm, page_height_mm) = (page_mm.width, page_mm.height);

    let (pdf, first_page, first_layer) = PdfDocument::new(
        &document.name,
        Mm(page_width_mm),
        Mm(page_height_mm),
        "Page 1",
    );

    let has_text = document
        .sections
        .iter()
        .any(|section| matches!(section.content, SectionContent::Text { .. }));
    let font = if has_text {
        Some(
            pdf.add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|err| ExportError::Builder(err.to_string()))?,
        )
    } else {
        None
    };

    let page_count = document.pages.len();
    for (page_index, page) in document.pages.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }

        let (page_ref, layer_ref) = if page_index == 0 {
            (first_page, first_layer)
        } else {
            pdf.add_page(
                Mm(page_width_mm),
                Mm(page_height_mm),
                format!("Page {}", page_index + 1),
            )
        };
        let layer = pdf.get_page(page_ref).get_layer(layer_ref);

        if let Some(original) = &page.background {
            let uri = optimized.get(&JobKey::Background(page_index)).unwrap_or(original);
            let full_page = Rect::new(0.0, 0.0, page_px.width, page_px.height);
            draw_image(&layer, uri, full_page, page_height_mm);
        }

        let page_number = page_index as u32 + 1;
        for (section_index, section) in document.sections.iter().enumerate() {
            if section.page != page_number {
                continue;
            }
            if cancel.is_cancelled() {
                return Err(ExportError::Cancelled);
            }
            match &section.content {
                SectionContent::Image { data_uri: Some(original) } => {
                    let uri =
                        optimized.get(&JobKey::Section(section_index)).unwrap_or(original);
                    draw_image(&layer, uri, section.rect, page_height_mm);
                }
                // Empty slots render as nothing.
                SectionContent::Image { data_uri: None } => {}
                SectionContent::Text { .. } => {
                    if let Some(font) = &font {
                        draw_text(&layer, font, section, page_height_mm);
                    }
                }
            }
        }

        progress.report(
            ExportStage::Generating,
            ((page_index + 1) * 100 / page_count) as u8,
        );
    }

    let bytes = pdf.save_to_bytes().map_err(|err| ExportError::Builder(err.to_string()))?;
    progress.report(ExportStage::Complete, 100);
    Ok(bytes)
}
