// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Belegwerk.

use thiserror::Error;

/// Top-level error type for all Belegwerk operations.
#[derive(Debug, Error)]
pub enum BelegwerkError {
    // -- Image source boundary --
    #[error("image could not be decoded: {0}")]
    Decode(String),

    // -- Detection pipeline --
    /// No contour in the edge map simplified to a 4-vertex polygon. Terminal
    /// for the image: callers must skip or flag it, not re-run the same
    /// pipeline with the same parameters.
    #[error("could not find the receipt outline in the image")]
    BoundaryNotFound,

    /// Corner ordering or rectification would produce a zero- or
    /// negative-area destination rectangle.
    #[error("detected quadrilateral is degenerate: {0}")]
    DegenerateGeometry(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Recognition boundary --
    #[error("text recognition failed: {0}")]
    Recognition(String),

    // -- Debug viewer --
    #[error("viewer selection failed: {0}")]
    Viewer(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BelegwerkError>;
