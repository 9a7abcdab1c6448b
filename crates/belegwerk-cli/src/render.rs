// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debug-image renderer for the CLI: writes the selected intermediate as a
// PNG and prints its path.

use std::path::PathBuf;

use belegwerk_core::error::{BelegwerkError, Result};
use belegwerk_scan::DebugRenderer;
use image::DynamicImage;
use tracing::info;

/// Renders debug images by saving them as PNG files under a directory.
pub struct PngFileRenderer {
    out_dir: PathBuf,
}

impl PngFileRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

impl DebugRenderer for PngFileRenderer {
    fn render(&mut self, name: &str, image: &DynamicImage) -> Result<()> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("debug-{name}.png"));
        image.save(&path).map_err(|err| {
            BelegwerkError::Image(format!(
                "failed to save debug image to {}: {}",
                path.display(),
                err
            ))
        })?;
        info!(path = %path.display(), "Debug image written");
        println!("{}", path.display());
        Ok(())
    }
}
