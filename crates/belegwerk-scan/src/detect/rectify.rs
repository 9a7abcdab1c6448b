// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: map the detected quadrilateral onto an
// axis-aligned rectangle at full resolution, then normalize the channel
// layout for the recognition engine.

use belegwerk_core::error::{BelegwerkError, Result};
use belegwerk_core::{OrderedQuad, ScaleRatio};
use image::{DynamicImage, RgbImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::debug;

/// Near-zero quad areas (in squared full-resolution pixels) are rejected
/// before attempting a homography.
const MIN_QUAD_AREA: f64 = 1.0;

/// Warp the full-resolution image so the detected quadrilateral becomes an
/// axis-aligned rectangle.
///
/// The corners are in analysis-image coordinates and are scaled by `ratio`
/// into original-image space first. The destination width is the longer of
/// the top and bottom edges, the height the longer of the left and right
/// edges, both rounded to whole pixels.
///
/// # Errors
///
/// [`BelegwerkError::DegenerateGeometry`] when the destination rectangle
/// would have zero area or no projective transform exists for the corners.
pub fn rectify(
    original: &DynamicImage,
    corners: &OrderedQuad,
    ratio: ScaleRatio,
) -> Result<RgbaImage> {
    let scaled = corners.scaled(ratio.factor());

    let area = scaled.area();
    if area < MIN_QUAD_AREA {
        return Err(BelegwerkError::DegenerateGeometry(format!(
            "quadrilateral area {area:.3} px² is below the minimum {MIN_QUAD_AREA}"
        )));
    }

    let (width_f, height_f) = scaled.target_dimensions();
    let out_w = width_f.round();
    let out_h = height_f.round();
    if out_w < 1.0 || out_h < 1.0 {
        return Err(BelegwerkError::DegenerateGeometry(format!(
            "destination rectangle {out_w}x{out_h} collapses to zero"
        )));
    }
    let (out_w, out_h) = (out_w as u32, out_h as u32);

    let src: [(f32, f32); 4] = [
        (scaled.top_left.x as f32, scaled.top_left.y as f32),
        (scaled.top_right.x as f32, scaled.top_right.y as f32),
        (scaled.bottom_right.x as f32, scaled.bottom_right.y as f32),
        (scaled.bottom_left.x as f32, scaled.bottom_left.y as f32),
    ];
    let dest: [(f32, f32); 4] = [
        (0.0, 0.0),
        (out_w as f32, 0.0),
        (out_w as f32, out_h as f32),
        (0.0, out_h as f32),
    ];

    let projection = Projection::from_control_points(src, dest).ok_or_else(|| {
        BelegwerkError::DegenerateGeometry(
            "no projective transform exists for the detected corners".into(),
        )
    })?;

    let rgba_input = original.to_rgba8();
    let mut output = RgbaImage::new(out_w, out_h);
    warp_into(
        &rgba_input,
        &projection,
        Interpolation::Bilinear,
        Rgba([255u8, 255, 255, 255]),
        &mut output,
    );

    debug!(out_w, out_h, "Perspective rectification applied");
    Ok(output)
}

/// Convert the rectified image into the 8-bit RGB layout the recognition
/// engine consumes.
pub fn normalize_colors(rectified: RgbaImage) -> RgbImage {
    DynamicImage::ImageRgba8(rectified).to_rgb8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use belegwerk_core::PointF;
    use image::{Rgb, RgbImage};

    fn quad(tl: (f64, f64), tr: (f64, f64), br: (f64, f64), bl: (f64, f64)) -> OrderedQuad {
        OrderedQuad {
            top_left: PointF::new(tl.0, tl.1),
            top_right: PointF::new(tr.0, tr.1),
            bottom_right: PointF::new(br.0, br.1),
            bottom_left: PointF::new(bl.0, bl.1),
        }
    }

    fn canvas_with_rect() -> DynamicImage {
        let mut img = RgbImage::from_pixel(500, 400, Rgb([40u8, 40, 40]));
        for y in 100..300 {
            for x in 150..450 {
                img.put_pixel(x, y, Rgb([250u8, 250, 250]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn axis_aligned_rectangle_round_trips_dimensions() {
        let img = canvas_with_rect();
        let corners = quad(
            (150.0, 100.0),
            (450.0, 100.0),
            (450.0, 300.0),
            (150.0, 300.0),
        );
        let rectified = rectify(&img, &corners, ScaleRatio::IDENTITY).unwrap();
        assert!((rectified.width() as i64 - 300).abs() <= 1);
        assert!((rectified.height() as i64 - 200).abs() <= 1);
    }

    #[test]
    fn analysis_corners_are_scaled_before_warping() {
        // Corners in 500-wide analysis space; the original is 2000 wide.
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            2000,
            1600,
            Rgb([128u8, 128, 128]),
        ));
        let corners = quad((50.0, 60.0), (250.0, 60.0), (250.0, 210.0), (50.0, 210.0));
        let ratio = ScaleRatio::new(2000, 500);
        let rectified = rectify(&img, &corners, ratio).unwrap();
        // 200x150 analysis-space rectangle → 800x600 at full resolution.
        assert!((rectified.width() as i64 - 800).abs() <= 1);
        assert!((rectified.height() as i64 - 600).abs() <= 1);
    }

    #[test]
    fn rectified_content_comes_from_the_source_quad() {
        let img = canvas_with_rect();
        let corners = quad(
            (150.0, 100.0),
            (450.0, 100.0),
            (450.0, 300.0),
            (150.0, 300.0),
        );
        let rectified = rectify(&img, &corners, ScaleRatio::IDENTITY).unwrap();
        // A pixel well inside the destination maps to the bright rectangle.
        let center = rectified.get_pixel(rectified.width() / 2, rectified.height() / 2);
        assert!(center.0[0] > 200, "expected bright interior, got {center:?}");
    }

    #[test]
    fn colinear_corners_are_degenerate() {
        let img = canvas_with_rect();
        let corners = quad((10.0, 10.0), (50.0, 50.0), (90.0, 90.0), (130.0, 130.0));
        let result = rectify(&img, &corners, ScaleRatio::IDENTITY);
        assert!(matches!(
            result,
            Err(BelegwerkError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn zero_area_quad_is_degenerate() {
        let img = canvas_with_rect();
        let corners = quad((20.0, 20.0), (20.0, 20.0), (20.0, 20.0), (20.0, 20.0));
        let result = rectify(&img, &corners, ScaleRatio::IDENTITY);
        assert!(matches!(
            result,
            Err(BelegwerkError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn normalize_colors_produces_rgb() {
        let rgba = RgbaImage::from_pixel(10, 8, Rgba([10u8, 20, 30, 255]));
        let rgb = normalize_colors(rgba);
        assert_eq!(rgb.dimensions(), (10, 8));
        assert_eq!(rgb.get_pixel(5, 4), &Rgb([10u8, 20, 30]));
    }
}
