// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch scanning: every image under a directory, geometry across the rayon
// pool, recognition sequentially on one shared engine.

use std::path::{Path, PathBuf};

use belegwerk_core::error::BelegwerkError;
use belegwerk_scan::Detection;
use rayon::prelude::*;
use tracing::info;
use walkdir::WalkDir;

use crate::{OcrContext, ScanContext, detect_and_save, emit_text, is_image_file, report_failure};

/// Scan every image file under `dir`.
///
/// Each pipeline run owns its buffers exclusively, so detection is a
/// parallel map over independent images with no synchronization beyond
/// collecting results. A per-image failure is reported and counted, never
/// aborts the batch.
pub(crate) fn scan_directory(
    dir: &Path,
    ctx: &ScanContext,
    ocr: &OcrContext,
) -> anyhow::Result<()> {
    let files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_image_file(p))
        .collect();

    if files.is_empty() {
        println!("No image files found under {}", dir.display());
        return Ok(());
    }
    info!(count = files.len(), "Scanning image batch");

    let detections: Vec<(PathBuf, Result<Detection, BelegwerkError>)> = files
        .into_par_iter()
        .map(|path| {
            let result = detect_and_save(&path, ctx);
            (path, result)
        })
        .collect();

    let mut detected = 0usize;
    let mut failed = 0usize;
    for (path, result) in &detections {
        match result {
            Ok(detection) => {
                detected += 1;
                println!("{}:", path.display());
                emit_text(path, ctx, ocr, detection);
            }
            Err(err) => {
                failed += 1;
                report_failure(path, err);
            }
        }
    }

    println!("Scanned {detected} receipts, {failed} failed");
    Ok(())
}
