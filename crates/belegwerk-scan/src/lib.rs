// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// belegwerk-scan — Receipt scanning for Belegwerk.
//
// Provides the geometric detection pipeline (downscale, edge extraction,
// contour discovery, quadrilateral location, corner ordering, perspective
// rectification, color normalization), an optional debug-image side-channel
// with an interactive selection loop, and an OCR engine wrapper.

pub mod debug;
pub mod detect;

#[cfg(feature = "ocr")]
pub mod ocr;

// Re-export the primary types so callers can use `belegwerk_scan::ReceiptDetector` etc.
pub use debug::{DebugImages, DebugRenderer};
pub use detect::{Detection, ReceiptDetector};

#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrEngine};
