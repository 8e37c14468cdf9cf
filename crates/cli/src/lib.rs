use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docmosaic_core::{validate_and_encode, EditingSession, LogAnalytics};
use docmosaic_export::{export_pdf, ExportOptions};
use docmosaic_model::{
    Orientation, PaperSize, Rect, Section, SectionContent, MIN_SECTION_SIZE,
};
use docmosaic_scheduler::{CancellationToken, ProgressReporter};
use image::GenericImageView;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "docmosaic")]
#[command(about = "DocMosaic CLI: compose images into a PDF")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compose images into a PDF, one page per image.
    Compose {
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,
        #[arg(short, long, default_value = "output.pdf")]
        output: PathBuf,
        #[arg(long, value_parser = parse_paper_size, default_value = "a4")]
        page_size: PaperSize,
        #[arg(long, value_parser = parse_orientation, default_value = "portrait")]
        orientation: Orientation,
        /// Full-bleed background image applied to every page.
        #[arg(long)]
        background: Option<PathBuf>,
        /// Document title embedded in the PDF.
        #[arg(long)]
        title: Option<String>,
        /// Embed images as-is, skipping downsampling and recompression.
        #[arg(long)]
        no_optimize: bool,
    },
    /// Print a machine-readable size estimate without generating a PDF.
    Estimate {
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,
        #[arg(long, value_parser = parse_paper_size, default_value = "a4")]
        page_size: PaperSize,
        #[arg(long, value_parser = parse_orientation, default_value = "portrait")]
        orientation: Orientation,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct EstimateOutput {
    pages: usize,
    sections: usize,
    estimated_bytes: u64,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).try_init();
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Compose {
            images,
            output,
            page_size,
            orientation,
            background,
            title,
            no_optimize,
        } => run_compose(
            &images,
            &output,
            page_size,
            orientation,
            background.as_deref(),
            title,
            no_optimize,
        ),
        Commands::Estimate { images, page_size, orientation } => {
            run_estimate(&images, page_size, orientation)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn parse_paper_size(value: &str) -> std::result::Result<PaperSize, String> {
    match value.to_ascii_lowercase().as_str() {
        "a0" => Ok(PaperSize::A0),
        "a1" => Ok(PaperSize::A1),
        "a2" => Ok(PaperSize::A2),
        "a3" => Ok(PaperSize::A3),
        "a4" => Ok(PaperSize::A4),
        "a5" => Ok(PaperSize::A5),
        "b4" => Ok(PaperSize::B4),
        "b5" => Ok(PaperSize::B5),
        "letter" => Ok(PaperSize::Letter),
        "legal" => Ok(PaperSize::Legal),
        "tabloid" => Ok(PaperSize::Tabloid),
        "executive" => Ok(PaperSize::Executive),
        "statement" => Ok(PaperSize::Statement),
        "folio" => Ok(PaperSize::Folio),
        other => Err(format!("unknown paper size: {other}")),
    }
}

fn parse_orientation(value: &str) -> std::result::Result<Orientation, String> {
    match value.to_ascii_lowercase().as_str() {
        "portrait" => Ok(Orientation::Portrait),
        "landscape" => Ok(Orientation::Landscape),
        other => Err(format!("unknown orientation: {other}")),
    }
}

/// Horizontal/vertical page margin around placed images (10mm at 96 DPI).
const PAGE_MARGIN_PX: f32 = 37.8;

/// Center an image on the page, scaled down to fit inside the margins.
/// Images smaller than the available area keep their natural size.
fn fit_rect(image_width: u32, image_height: u32, page_width: f32, page_height: f32) -> Rect {
    let avail_width = (page_width - 2.0 * PAGE_MARGIN_PX).max(MIN_SECTION_SIZE);
    let avail_height = (page_height - 2.0 * PAGE_MARGIN_PX).max(MIN_SECTION_SIZE);

    let scale = (avail_width / image_width as f32)
        .min(avail_height / image_height as f32)
        .min(1.0);
    let width = (image_width as f32 * scale).max(MIN_SECTION_SIZE);
    let height = (image_height as f32 * scale).max(MIN_SECTION_SIZE);

    Rect::new((page_width - width) / 2.0, (page_height - height) / 2.0, width, height)
}

fn encode_image_file(path: &Path) -> Result<(String, u32, u32)> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read image {}", path.display()))?;
    let (width, height) = image::load_from_memory(&bytes)
        .with_context(|| format!("failed to decode image {}", path.display()))?
        .dimensions();
    let uri = validate_and_encode(&bytes)
        .with_context(|| format!("rejected image {}", path.display()))?;
    Ok((uri, width, height))
}

/// Build a one-image-per-page document from the given files.
fn build_session(
    images: &[PathBuf],
    page_size: PaperSize,
    orientation: Orientation,
    background: Option<&Path>,
    title: Option<String>,
) -> Result<EditingSession> {
    let mut session =
        EditingSession::new().with_analytics(std::sync::Arc::new(LogAnalytics));
    session.update_page_size(page_size);
    session.update_orientation(orientation);
    if let Some(title) = title {
        session.update_name(title);
    }

    let background_uri = match background {
        Some(path) => Some(encode_image_file(path)?.0),
        None => None,
    };

    let page_px = session.document().page_dimensions_px();
    for (index, path) in images.iter().enumerate() {
        let page = if index == 0 { 1 } else { session.add_page() };
        if let Some(uri) = &background_uri {
            session.set_page_background(page, Some(uri.clone()))?;
        }

        let (uri, width, height) = encode_image_file(path)?;
        let rect = fit_rect(width, height, page_px.width, page_px.height);
        let mut section = Section::new_image(rect.x, rect.y, page);
        section.rect = rect;
        section.content = SectionContent::Image { data_uri: Some(uri) };
        session.add_section(section);
    }

    Ok(session)
}

fn run_compose(
    images: &[PathBuf],
    output: &Path,
    page_size: PaperSize,
    orientation: Orientation,
    background: Option<&Path>,
    title: Option<String>,
    no_optimize: bool,
) -> Result<()> {
    let session = build_session(images, page_size, orientation, background, title)?;

    let progress = ProgressReporter::new(|event| {
        log::debug!("export progress: {:?} {}%", event.stage, event.percent);
    });
    let options = ExportOptions { optimize_images: !no_optimize, ..ExportOptions::default() };
    let bytes = export_pdf(session.document(), &options, &progress, &CancellationToken::new())
        .context("PDF export failed")?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, &bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("{}", output.display());
    Ok(())
}

fn run_estimate(images: &[PathBuf], page_size: PaperSize, orientation: Orientation) -> Result<()> {
    let session = build_session(images, page_size, orientation, None, None)?;
    let document = session.document();

    let payload = EstimateOutput {
        pages: document.pages.len(),
        sections: document.sections.len(),
        estimated_bytes: document.estimated_size,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_sizes_parse_case_insensitively() {
        assert_eq!(parse_paper_size("A4"), Ok(PaperSize::A4));
        assert_eq!(parse_paper_size("letter"), Ok(PaperSize::Letter));
        assert!(parse_paper_size("a9").is_err());
    }

    #[test]
    fn orientation_parses_both_values() {
        assert_eq!(parse_orientation("portrait"), Ok(Orientation::Portrait));
        assert_eq!(parse_orientation("LANDSCAPE"), Ok(Orientation::Landscape));
        assert!(parse_orientation("sideways").is_err());
    }

    #[test]
    fn fit_rect_scales_large_images_down_and_centers() {
        let rect = fit_rect(4000, 2000, 794.0, 1123.0);
        assert!(rect.width <= 794.0 - 2.0 * PAGE_MARGIN_PX + 0.01);
        assert!((rect.x - (794.0 - rect.width) / 2.0).abs() < 0.01);
        // Aspect ratio is preserved.
        assert!((rect.width / rect.height - 2.0).abs() < 0.01);
    }

    #[test]
    fn fit_rect_keeps_small_images_at_natural_size() {
        let rect = fit_rect(100, 120, 794.0, 1123.0);
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 120.0);
    }
}
