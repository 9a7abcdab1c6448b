// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR (Optical Character Recognition) for rectified receipts.
//
// Wraps the `ocrs` crate, a pure-Rust OCR engine backed by neural network
// models executed via `rten`. Only available when the `ocr` feature is
// enabled.
//
// # Model Setup
//
// The engine requires two model files:
//
// - **Detection model** (`text-detection.rten`) — locates text regions.
// - **Recognition model** (`text-recognition.rten`) — decodes characters.
//
// Models can be downloaded from the ocrs-models releases, or obtained
// automatically by running `ocrs-cli` once (they land in `~/.cache/ocrs`).
// Model paths are explicit configuration passed in at construction; there is
// no process-global engine path.

use std::path::{Path, PathBuf};

use belegwerk_core::RecognitionMode;
use belegwerk_core::error::{BelegwerkError, Result};
use image::RgbImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

/// Default directory for cached OCR model files.
///
/// Follows the XDG Base Directory specification: `$XDG_CACHE_HOME/ocrs`,
/// falling back to `~/.cache/ocrs` when `XDG_CACHE_HOME` is unset.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        // Last resort — current directory.
        PathBuf::from("ocrs-models")
    }
}

/// Well-known filenames for the detection and recognition models.
const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Configuration for constructing an [`OcrEngine`].
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Path to the text-detection model file (`.rten`).
    pub detection_model_path: PathBuf,
    /// Path to the text-recognition model file (`.rten`).
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    /// Returns a config pointing at the default model cache directory.
    fn default() -> Self {
        let dir = default_model_dir();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }
}

impl OcrConfig {
    /// Create a config with an explicit model directory.
    ///
    /// Expects the directory to contain `text-detection.rten` and
    /// `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        if !self.detection_model_path.exists() {
            return Err(BelegwerkError::Recognition(format!(
                "detection model not found at {}; run `ocrs-cli` once to download models",
                self.detection_model_path.display()
            )));
        }
        if !self.recognition_model_path.exists() {
            return Err(BelegwerkError::Recognition(format!(
                "recognition model not found at {}; run `ocrs-cli` once to download models",
                self.recognition_model_path.display()
            )));
        }
        Ok(())
    }
}

/// Text-recognition engine for rectified receipt images.
///
/// Model loading is the expensive step — keep the engine around and call
/// [`recognize`](Self::recognize) per image. Debug builds of `ocrs`/`rten`
/// are 10-100x slower than release builds.
pub struct OcrEngine {
    engine: OcrsEngine,
}

impl OcrEngine {
    /// Create an engine, loading models from the paths in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BelegwerkError::Recognition`] if model files are missing or
    /// corrupt.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
            BelegwerkError::Recognition(format!(
                "failed to load detection model from {}: {}",
                config.detection_model_path.display(),
                err
            ))
        })?;

        info!("Loading OCR recognition model");
        let recognition_model =
            Model::load_file(&config.recognition_model_path).map_err(|err| {
                BelegwerkError::Recognition(format!(
                    "failed to load recognition model from {}: {}",
                    config.recognition_model_path.display(),
                    err
                ))
            })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| {
            BelegwerkError::Recognition(format!("failed to initialise OCR engine: {}", err))
        })?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }

    /// Create an engine using the default model cache directory.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OcrConfig::default())
    }

    /// Extract text from a rectified, color-normalized receipt image.
    ///
    /// `mode` selects the layout assumption: [`RecognitionMode::SingleBlock`]
    /// treats the receipt as one uniform block of text,
    /// [`RecognitionMode::Columns`] runs layout-aware line extraction.
    ///
    /// # Errors
    ///
    /// Returns [`BelegwerkError::Recognition`] if preprocessing or
    /// recognition fails.
    #[instrument(skip_all, fields(width = image.width(), height = image.height(), ?mode))]
    pub fn recognize(&self, image: &RgbImage, mode: RecognitionMode) -> Result<String> {
        let (width, height) = image.dimensions();
        let source = ImageSource::from_bytes(image.as_raw(), (width, height)).map_err(|err| {
            BelegwerkError::Recognition(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let input = self.engine.prepare_input(source).map_err(|err| {
            BelegwerkError::Recognition(format!("OCR preprocessing failed: {}", err))
        })?;

        let text = match mode {
            RecognitionMode::SingleBlock => self.engine.get_text(&input).map_err(|err| {
                BelegwerkError::Recognition(format!("OCR text recognition failed: {}", err))
            })?,
            RecognitionMode::Columns => {
                let word_rects = self.engine.detect_words(&input).map_err(|err| {
                    BelegwerkError::Recognition(format!("word detection failed: {}", err))
                })?;
                debug!(word_count = word_rects.len(), "Words detected");

                let line_rects = self.engine.find_text_lines(&input, &word_rects);
                let line_texts =
                    self.engine
                        .recognize_text(&input, &line_rects)
                        .map_err(|err| {
                            BelegwerkError::Recognition(format!(
                                "line recognition failed: {}",
                                err
                            ))
                        })?;

                let mut lines = Vec::with_capacity(line_texts.len());
                for line in line_texts.iter().flatten() {
                    let text = line.to_string();
                    if !text.trim().is_empty() {
                        lines.push(text);
                    }
                }
                lines.join("\n")
            }
        };

        debug!(
            line_count = text.lines().count(),
            char_count = text.len(),
            "OCR recognition complete"
        );
        Ok(text)
    }
}

/// Check whether OCR model files exist in the default cache location.
pub fn models_available() -> bool {
    let config = OcrConfig::default();
    config.detection_model_path.exists() && config.recognition_model_path.exists()
}
