// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral location: simplify ranked contours until one reduces to
// exactly four vertices.

use belegwerk_core::error::{BelegwerkError, Result};
use belegwerk_core::{PointF, Quad};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use tracing::{debug, trace};

use super::contour::Contour;

/// Scan the area-ranked contours and return the first one whose
/// Douglas–Peucker simplification has exactly four vertices.
///
/// Larger contours are tried first on the assumption that the receipt
/// occupies the largest closed boundary in the frame. This is a greedy
/// policy, not a proof: when several 4-vertex contours exist (background
/// clutter, noise), the largest wins and no further candidates are
/// considered. The simplification tolerance is `epsilon_ratio` of each
/// contour's own perimeter.
///
/// # Errors
///
/// [`BelegwerkError::BoundaryNotFound`] when no contour simplifies to four
/// vertices. Terminal for the image: retrying is only useful with different
/// edge-detection parameters.
pub fn locate_quadrilateral(contours: &[Contour], epsilon_ratio: f64) -> Result<Quad> {
    for (rank, contour) in contours.iter().enumerate() {
        // Fewer than four boundary points can never simplify to a quad.
        if contour.points.len() < 4 {
            continue;
        }

        let perimeter = arc_length(&contour.points, true);
        let epsilon = epsilon_ratio * perimeter;
        let approx = approximate_polygon_dp(&contour.points, epsilon, true);

        trace!(
            rank,
            area = contour.enclosed_area,
            perimeter,
            vertices = approx.len(),
            "Contour simplified"
        );

        if approx.len() == 4 {
            debug!(
                rank,
                area = contour.enclosed_area,
                "Quadrilateral boundary accepted"
            );
            let points = [
                PointF::new(f64::from(approx[0].x), f64::from(approx[0].y)),
                PointF::new(f64::from(approx[1].x), f64::from(approx[1].y)),
                PointF::new(f64::from(approx[2].x), f64::from(approx[2].y)),
                PointF::new(f64::from(approx[3].x), f64::from(approx[3].y)),
            ];
            return Ok(Quad::new(points));
        }
    }

    Err(BelegwerkError::BoundaryNotFound)
}
