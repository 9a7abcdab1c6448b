// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour discovery: outer boundaries of the edge map, ranked by enclosed
// area.

use image::GrayImage;
use imageproc::contours::{self, BorderType};
use imageproc::point::Point;
use tracing::debug;

/// A closed boundary traced on the edge map, with its enclosed area.
#[derive(Debug, Clone)]
pub struct Contour {
    /// Boundary points in tracing order.
    pub points: Vec<Point<i32>>,
    /// Shoelace area of the point sequence.
    pub enclosed_area: f64,
}

/// Find the externally-visible closed boundaries of the edge map, largest
/// enclosed area first. Interior holes are ignored.
///
/// An empty result is a valid outcome (a featureless edge map), not an
/// error; the caller decides what a missing boundary means.
pub fn outer_contours(edges: &GrayImage) -> Vec<Contour> {
    let traced = contours::find_contours::<i32>(edges);

    let mut found: Vec<Contour> = traced
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| {
            let enclosed_area = shoelace_area(&c.points);
            Contour {
                points: c.points,
                enclosed_area,
            }
        })
        .collect();

    found.sort_by(|a, b| {
        b.enclosed_area
            .partial_cmp(&a.enclosed_area)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(contour_count = found.len(), "Outer contours traced");
    found
}

/// Enclosed area of a closed point sequence via the shoelace formula.
pub fn shoelace_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f64;
    for i in 0..n {
        let j = (i + 1) % n;
        area += f64::from(points[i].x) * f64::from(points[j].y);
        area -= f64::from(points[j].x) * f64::from(points[i].y);
    }
    area.abs() / 2.0
}
