// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge extraction: grayscale → Gaussian blur → Canny.

use belegwerk_core::DetectConfig;
use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

/// Convert the analysis image into a binary edge map of the same dimensions.
///
/// The blur suppresses high-frequency noise that would otherwise fragment
/// the receipt's border into disconnected edge runs. Deterministic for a
/// fixed input and parameter set.
pub fn edge_map(analysis: &DynamicImage, config: &DetectConfig) -> GrayImage {
    let gray = analysis.to_luma8();
    let blurred = gaussian_blur_f32(&gray, config.blur_sigma);
    let edges = canny(&blurred, config.canny_low, config.canny_high);
    debug!(
        width = edges.width(),
        height = edges.height(),
        blur_sigma = config.blur_sigma,
        low = config.canny_low,
        high = config.canny_high,
        "Edge map computed"
    );
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn white_square_image() -> DynamicImage {
        let mut img = GrayImage::from_pixel(100, 100, Luma([20u8]));
        for y in 25..75 {
            for x in 25..75 {
                img.put_pixel(x, y, Luma([230u8]));
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn edge_map_preserves_dimensions() {
        let img = white_square_image();
        let edges = edge_map(&img, &DetectConfig::default());
        assert_eq!(edges.dimensions(), (100, 100));
    }

    #[test]
    fn edge_map_is_binary() {
        let img = white_square_image();
        let edges = edge_map(&img, &DetectConfig::default());
        assert!(edges.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn strong_boundary_produces_edge_pixels() {
        let img = white_square_image();
        let edges = edge_map(&img, &DetectConfig::default());
        let edge_count = edges.pixels().filter(|p| p.0[0] == 255).count();
        assert!(edge_count > 0, "square boundary should produce edges");
    }

    #[test]
    fn uniform_image_has_no_edges() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(80, 80, Luma([128u8])));
        let edges = edge_map(&img, &DetectConfig::default());
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn edge_map_is_deterministic() {
        let img = white_square_image();
        let config = DetectConfig::default();
        let a = edge_map(&img, &config);
        let b = edge_map(&img, &config);
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
