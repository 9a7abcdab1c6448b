// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Receipt detection pipeline — an explicit ordered sequence of pure stages:
// downscale → edge map → contours → quadrilateral → corner order →
// rectification → color normalization. Debug-image capture is an optional
// side-channel, never mandatory state.

pub mod contour;
pub mod edges;
pub mod quad;
pub mod rectify;
pub mod scale;

use belegwerk_core::error::Result;
use belegwerk_core::{DetectConfig, OrderedQuad, ScaleRatio};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use tracing::{info, instrument};

use crate::debug::DebugImages;

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct Detection {
    /// The receipt's corners in analysis-image coordinates.
    pub corners: OrderedQuad,
    /// Ratio mapping analysis coordinates to the original image.
    pub ratio: ScaleRatio,
    /// The rectified receipt in the channel layout the recognition engine
    /// expects.
    pub normalized: RgbImage,
}

/// Runs the geometric detection pipeline on photographed receipts.
///
/// Each run owns its buffers exclusively and performs no I/O, so processing
/// a batch of images is embarrassingly parallel across independent
/// `detect` calls.
pub struct ReceiptDetector {
    config: DetectConfig,
}

impl ReceiptDetector {
    /// Create a detector with the given parameters.
    ///
    /// # Errors
    ///
    /// Returns [`belegwerk_core::BelegwerkError::Config`] when the
    /// parameters are unusable (see [`DetectConfig::validate`]).
    pub fn new(config: DetectConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Detector with default parameters.
    pub fn with_defaults() -> Self {
        Self {
            config: DetectConfig::default(),
        }
    }

    /// The active detection parameters.
    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Run the pipeline on a decoded image.
    ///
    /// Fail-fast: the first failing stage surfaces its error and no later
    /// stage executes for this image.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &DynamicImage) -> Result<Detection> {
        self.run(image, None)
    }

    /// Run the pipeline, capturing each stage's intermediate image into
    /// `capture`. On failure the stages that did run remain captured, which
    /// is usually the point of asking for them.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect_with_debug(
        &self,
        image: &DynamicImage,
        capture: &mut DebugImages,
    ) -> Result<Detection> {
        self.run(image, Some(capture))
    }

    fn run(
        &self,
        image: &DynamicImage,
        mut capture: Option<&mut DebugImages>,
    ) -> Result<Detection> {
        info!("Starting receipt detection");

        let analysis = scale::downscale(image, self.config.analysis_width);
        if let Some(c) = capture.as_deref_mut() {
            c.analysis = Some(analysis.image.clone());
        }

        let edge_map = edges::edge_map(&analysis.image, &self.config);
        if let Some(c) = capture.as_deref_mut() {
            c.edges = Some(DynamicImage::ImageLuma8(edge_map.clone()));
        }

        let contours = contour::outer_contours(&edge_map);
        let quad = quad::locate_quadrilateral(&contours, self.config.approx_epsilon_ratio)?;
        let corners = OrderedQuad::from_unordered(quad)?;
        if let Some(c) = capture.as_deref_mut() {
            c.contours = Some(boundary_overlay(&analysis.image, &corners));
        }

        let rectified = rectify::rectify(image, &corners, analysis.ratio)?;
        if let Some(c) = capture.as_deref_mut() {
            c.rectified = Some(DynamicImage::ImageRgba8(rectified.clone()));
        }

        let normalized = rectify::normalize_colors(rectified);
        if let Some(c) = capture.as_deref_mut() {
            c.normalized = Some(DynamicImage::ImageRgb8(normalized.clone()));
        }

        info!(
            top_left = %corners.top_left,
            bottom_right = %corners.bottom_right,
            out_w = normalized.width(),
            out_h = normalized.height(),
            "Receipt detected and rectified"
        );

        Ok(Detection {
            corners,
            ratio: analysis.ratio,
            normalized,
        })
    }
}

/// Draw the accepted boundary over the analysis image.
fn boundary_overlay(analysis: &DynamicImage, corners: &OrderedQuad) -> DynamicImage {
    let mut canvas = analysis.to_rgb8();
    let green = Rgb([0u8, 255, 0]);
    let pts = corners.corners();
    for i in 0..4 {
        let a = pts[i];
        let b = pts[(i + 1) % 4];
        draw_line_segment_mut(
            &mut canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            green,
        );
    }
    DynamicImage::ImageRgb8(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use belegwerk_core::BelegwerkError;
    use image::{Luma, GrayImage};

    /// Dark canvas with a bright axis-aligned receipt.
    fn synthetic_receipt(
        canvas_w: u32,
        canvas_h: u32,
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
    ) -> DynamicImage {
        let mut img = GrayImage::from_pixel(canvas_w, canvas_h, Luma([25u8]));
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Luma([235u8]));
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn detects_receipt_without_downscaling() {
        let img = synthetic_receipt(400, 520, 60, 80, 340, 460);
        let detector = ReceiptDetector::with_defaults();
        let detection = detector.detect(&img).unwrap();

        assert_eq!(detection.ratio.factor(), 1.0);
        // Destination tracks the 280x380 receipt to within edge-localization
        // error.
        assert!((detection.normalized.width() as i64 - 280).abs() <= 8);
        assert!((detection.normalized.height() as i64 - 380).abs() <= 8);
    }

    #[test]
    fn detects_receipt_through_downscaling() {
        let img = synthetic_receipt(1000, 1300, 200, 260, 800, 1040);
        let detector = ReceiptDetector::with_defaults();
        let detection = detector.detect(&img).unwrap();

        assert_eq!(detection.ratio.factor(), 2.0);
        // Corners are reported in analysis space.
        assert!((detection.corners.top_left.x - 100.0).abs() <= 5.0);
        assert!((detection.corners.top_left.y - 130.0).abs() <= 5.0);
        // Rectified output is at full resolution: ~600x780.
        assert!((detection.normalized.width() as i64 - 600).abs() <= 16);
        assert!((detection.normalized.height() as i64 - 780).abs() <= 16);
    }

    #[test]
    fn featureless_image_reports_boundary_not_found() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 300, Luma([128u8])));
        let detector = ReceiptDetector::with_defaults();
        let result = detector.detect(&img);
        assert!(matches!(result, Err(BelegwerkError::BoundaryNotFound)));
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = DetectConfig {
            analysis_width: 0,
            ..DetectConfig::default()
        };
        assert!(ReceiptDetector::new(config).is_err());
    }

    #[test]
    fn debug_capture_records_every_stage_on_success() {
        let img = synthetic_receipt(400, 520, 60, 80, 340, 460);
        let detector = ReceiptDetector::with_defaults();
        let mut capture = DebugImages::default();
        detector.detect_with_debug(&img, &mut capture).unwrap();

        assert!(capture.analysis.is_some());
        assert!(capture.edges.is_some());
        assert!(capture.contours.is_some());
        assert!(capture.rectified.is_some());
        assert!(capture.normalized.is_some());
    }

    #[test]
    fn debug_capture_keeps_early_stages_on_failure() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 300, Luma([128u8])));
        let detector = ReceiptDetector::with_defaults();
        let mut capture = DebugImages::default();
        let result = detector.detect_with_debug(&img, &mut capture);

        assert!(result.is_err());
        assert!(capture.analysis.is_some());
        assert!(capture.edges.is_some());
        assert!(capture.contours.is_none());
        assert!(capture.rectified.is_none());
        assert!(capture.normalized.is_none());
    }

    #[test]
    fn overlay_keeps_analysis_dimensions() {
        let img = synthetic_receipt(400, 520, 60, 80, 340, 460);
        let detector = ReceiptDetector::with_defaults();
        let mut capture = DebugImages::default();
        detector.detect_with_debug(&img, &mut capture).unwrap();

        let overlay = capture.contours.unwrap();
        assert_eq!(overlay.width(), 400);
        assert_eq!(overlay.height(), 520);
    }
}
