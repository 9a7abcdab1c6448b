// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Belegwerk — command-line receipt scanner.
//
// Entry point. Initialises logging, builds the detection pipeline and the
// optional OCR engine, then scans a single image or a directory batch.

mod batch;
mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use belegwerk_core::error::BelegwerkError;
use belegwerk_core::human_errors::humanize_error;
use belegwerk_core::{RecognitionMode, ScanConfig};
use belegwerk_scan::debug::{DEFAULT_VIEWER_RETRIES, DebugImages, select_and_render};
use belegwerk_scan::{Detection, ReceiptDetector};

use render::PngFileRenderer;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Detects a receipt in a photograph, flattens it, and extracts its text."
)]
struct Args {
    /// Image file, or directory of images, to scan
    input: PathBuf,

    /// Directory where rectified images and debug dumps are written
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON settings file overriding the default detection parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Layout assumption for text recognition (overrides the config file)
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Directory containing the OCR model files
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Skip text recognition; only detect and rectify
    #[arg(long)]
    no_ocr: bool,

    /// Interactively inspect intermediate pipeline images (single image only)
    #[arg(long)]
    debug_viewer: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ModeArg {
    /// Assume a single uniform block of text
    SingleBlock,
    /// Layout-aware line extraction
    Columns,
}

impl From<ModeArg> for RecognitionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::SingleBlock => RecognitionMode::SingleBlock,
            ModeArg::Columns => RecognitionMode::Columns,
        }
    }
}

/// Everything the per-image scan path needs. The detector is pure and
/// shareable across the batch pool.
pub(crate) struct ScanContext {
    detector: ReceiptDetector,
    mode: RecognitionMode,
    output_dir: Option<PathBuf>,
}

/// Holds the OCR engine when the `ocr` feature is compiled in and models
/// loaded; recognition silently degrades to "none" otherwise.
pub(crate) struct OcrContext {
    #[cfg(feature = "ocr")]
    engine: Option<belegwerk_scan::OcrEngine>,
}

impl OcrContext {
    /// Recognize text on a rectified receipt, if an engine is available.
    pub(crate) fn recognize(
        &self,
        detection: &Detection,
        mode: RecognitionMode,
    ) -> Option<Result<String, BelegwerkError>> {
        #[cfg(feature = "ocr")]
        {
            self.engine
                .as_ref()
                .map(|engine| engine.recognize(&detection.normalized, mode))
        }
        #[cfg(not(feature = "ocr"))]
        {
            let _ = (detection, mode);
            None
        }
    }
}

#[cfg(feature = "ocr")]
fn build_ocr(args: &Args) -> OcrContext {
    use belegwerk_scan::{OcrConfig, OcrEngine};

    if args.no_ocr {
        return OcrContext { engine: None };
    }
    let config = match &args.models_dir {
        Some(dir) => OcrConfig::from_dir(dir),
        None => OcrConfig::default(),
    };
    match OcrEngine::new(config) {
        Ok(engine) => OcrContext {
            engine: Some(engine),
        },
        Err(err) => {
            warn!(%err, "OCR unavailable; continuing without text recognition");
            OcrContext { engine: None }
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn build_ocr(args: &Args) -> OcrContext {
    if !args.no_ocr || args.models_dir.is_some() {
        warn!("belegwerk was built without the `ocr` feature; text recognition is disabled");
    }
    OcrContext {}
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let scan_config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            ScanConfig::from_json(&json)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => ScanConfig::default(),
    };

    let mode = args.mode.map(Into::into).unwrap_or(scan_config.mode);
    let detector = ReceiptDetector::new(scan_config.detect)?;
    let ctx = ScanContext {
        detector,
        mode,
        output_dir: args.output_dir.clone(),
    };
    let ocr = build_ocr(&args);

    if args.input.is_dir() {
        anyhow::ensure!(
            !args.debug_viewer,
            "--debug-viewer inspects a single image, not a directory"
        );
        batch::scan_directory(&args.input, &ctx, &ocr)
    } else {
        scan_single(&args.input, &ctx, &ocr, args.debug_viewer)
    }
}

/// Scan one image, optionally dropping into the interactive viewer.
fn scan_single(
    path: &Path,
    ctx: &ScanContext,
    ocr: &OcrContext,
    use_viewer: bool,
) -> anyhow::Result<()> {
    println!("Processing {}...", path.display());

    if use_viewer {
        let image = load_image(path)?;
        let mut capture = DebugImages::default();
        let result = ctx.detector.detect_with_debug(&image, &mut capture);

        // The viewer runs over whatever was captured — inspecting the edge
        // map of a failed detection is usually the point.
        let out_dir = ctx
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let mut renderer = PngFileRenderer::new(out_dir);
        let stdin = std::io::stdin();
        select_and_render(
            &capture,
            stdin.lock(),
            std::io::stdout(),
            &mut renderer,
            DEFAULT_VIEWER_RETRIES,
        )?;

        let detection = match result {
            Ok(detection) => detection,
            Err(err) => {
                report_failure(path, &err);
                return Err(err.into());
            }
        };
        if let Some(dir) = &ctx.output_dir {
            let saved = save_rectified(dir, path, &detection)?;
            println!("  Rectified image saved to {}", saved.display());
        }
        emit_text(path, ctx, ocr, &detection);
        Ok(())
    } else {
        match detect_and_save(path, ctx) {
            Ok(detection) => {
                emit_text(path, ctx, ocr, &detection);
                Ok(())
            }
            Err(err) => {
                report_failure(path, &err);
                Err(err.into())
            }
        }
    }
}

/// Load, detect, and (when an output directory is set) save the rectified
/// image. Shared between the single-image path and the batch pool.
pub(crate) fn detect_and_save(
    path: &Path,
    ctx: &ScanContext,
) -> Result<Detection, BelegwerkError> {
    let image = load_image(path)?;
    let detection = ctx.detector.detect(&image)?;
    if let Some(dir) = &ctx.output_dir {
        let saved = save_rectified(dir, path, &detection)?;
        println!("  Rectified image saved to {}", saved.display());
    }
    Ok(detection)
}

/// Run recognition and print the extracted text, reporting failures without
/// aborting.
pub(crate) fn emit_text(path: &Path, ctx: &ScanContext, ocr: &OcrContext, detection: &Detection) {
    match ocr.recognize(detection, ctx.mode) {
        Some(Ok(text)) => {
            if text.trim().is_empty() {
                println!("  (no text recognized)");
            } else {
                println!("{text}");
            }
        }
        Some(Err(err)) => report_failure(path, &err),
        None => {}
    }
}

/// Image source collaborator: decode a raster image from disk.
pub(crate) fn load_image(path: &Path) -> Result<image::DynamicImage, BelegwerkError> {
    image::open(path).map_err(|err| {
        BelegwerkError::Decode(format!("failed to open {}: {}", path.display(), err))
    })
}

fn save_rectified(
    dir: &Path,
    input_path: &Path,
    detection: &Detection,
) -> Result<PathBuf, BelegwerkError> {
    fs::create_dir_all(dir)?;
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");
    let out = dir.join(format!("{stem}-rectified.png"));
    detection.normalized.save(&out).map_err(|err| {
        BelegwerkError::Image(format!(
            "failed to save rectified image to {}: {}",
            out.display(),
            err
        ))
    })?;
    Ok(out)
}

/// Print an operator-facing explanation of a per-image failure.
pub(crate) fn report_failure(path: &Path, err: &BelegwerkError) {
    let human = humanize_error(err);
    eprintln!("  Failed on {}: {}", path.display(), human.message);
    eprintln!("  Hint: {}", human.suggestion);
}

pub(crate) fn is_image_file(path: &Path) -> bool {
    const EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_image_extensions() {
        assert!(is_image_file(Path::new("receipt.JPG")));
        assert!(is_image_file(Path::new("scan.png")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("archive")));
    }

    #[test]
    fn mode_arg_maps_to_recognition_mode() {
        assert_eq!(
            RecognitionMode::from(ModeArg::SingleBlock),
            RecognitionMode::SingleBlock
        );
        assert_eq!(
            RecognitionMode::from(ModeArg::Columns),
            RecognitionMode::Columns
        );
    }

    #[test]
    fn load_image_reports_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not-an-image.png");
        fs::write(&bogus, b"definitely not a png").unwrap();
        let result = load_image(&bogus);
        assert!(matches!(result, Err(BelegwerkError::Decode(_))));
    }
}
