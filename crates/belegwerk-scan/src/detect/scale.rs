// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Analysis downscaling. Detection runs on a fixed-width copy of the input;
// the scale ratio maps detected coordinates back to full resolution.

use belegwerk_core::ScaleRatio;
use image::DynamicImage;
use tracing::debug;

/// The fixed-width copy of the input image the detection stages run on,
/// together with the ratio mapping its coordinates back to the original.
pub struct AnalysisImage {
    pub image: DynamicImage,
    pub ratio: ScaleRatio,
}

/// Produce the analysis copy of `original` at `analysis_width`, preserving
/// aspect ratio. The image is never upscaled: when the original is already
/// at or below the analysis width it is used as-is with an identity ratio.
pub fn downscale(original: &DynamicImage, analysis_width: u32) -> AnalysisImage {
    let (orig_w, orig_h) = (original.width(), original.height());

    if orig_w <= analysis_width {
        debug!(orig_w, analysis_width, "Original at or below analysis width; not resizing");
        return AnalysisImage {
            image: original.clone(),
            ratio: ScaleRatio::IDENTITY,
        };
    }

    let ratio = ScaleRatio::new(orig_w, analysis_width);
    let target_h = (f64::from(orig_h) / ratio.factor()).round().max(1.0) as u32;

    // resize_exact pins the width so the ratio stays exactly orig_w / analysis_width.
    let resized = original.resize_exact(
        analysis_width,
        target_h,
        image::imageops::FilterType::Lanczos3,
    );

    debug!(
        orig_w,
        orig_h,
        analysis_w = resized.width(),
        analysis_h = resized.height(),
        ratio = ratio.factor(),
        "Analysis copy produced"
    );

    AnalysisImage {
        image: resized,
        ratio,
    }
}
