// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debug-image side-channel and the interactive selection loop.
//
// The pipeline fills a `DebugImages` capture on request; an operator can
// then pick one intermediate by name and hand it to a renderer. Selection
// re-prompts on bad input inside a bounded loop — never recursion, never
// unbounded retries.

use std::io::{BufRead, Write};

use belegwerk_core::error::{BelegwerkError, Result};
use image::DynamicImage;
use tracing::warn;

/// How many times a bad selection is re-prompted before giving up.
pub const DEFAULT_VIEWER_RETRIES: u32 = 3;

/// Intermediate images captured from one pipeline run. Stages that did not
/// execute (or were not reached before a failure) stay `None`.
#[derive(Debug, Default)]
pub struct DebugImages {
    /// The downscaled analysis copy.
    pub analysis: Option<DynamicImage>,
    /// Binary edge map.
    pub edges: Option<DynamicImage>,
    /// Analysis image with the accepted boundary drawn over it.
    pub contours: Option<DynamicImage>,
    /// Full-resolution rectified receipt.
    pub rectified: Option<DynamicImage>,
    /// Channel-normalized image handed to recognition.
    pub normalized: Option<DynamicImage>,
}

impl DebugImages {
    /// Captured images with their selection names, in pipeline order.
    pub fn entries(&self) -> Vec<(&'static str, &DynamicImage)> {
        [
            ("analysis", self.analysis.as_ref()),
            ("edges", self.edges.as_ref()),
            ("contours", self.contours.as_ref()),
            ("rectified", self.rectified.as_ref()),
            ("normalized", self.normalized.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, image)| image.map(|img| (name, img)))
        .collect()
    }
}

/// Renders a selected debug image — a window, a file on disk, a test fake.
pub trait DebugRenderer {
    fn render(&mut self, name: &str, image: &DynamicImage) -> Result<()>;
}

/// Prompt the operator to pick a captured image by name and render it.
///
/// Invalid selections re-prompt up to `max_retries` times; exhausting the
/// retries (or end of input) returns [`BelegwerkError::Viewer`] instead of
/// looping forever.
pub fn select_and_render<R, W, D>(
    images: &DebugImages,
    mut input: R,
    mut output: W,
    renderer: &mut D,
    max_retries: u32,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    D: DebugRenderer,
{
    let entries = images.entries();
    if entries.is_empty() {
        return Err(BelegwerkError::Viewer(
            "no debug images were captured".into(),
        ));
    }

    writeln!(output, "Available images:")?;
    for (i, (name, _)) in entries.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, name)?;
    }

    let mut attempts_left = max_retries + 1;
    while attempts_left > 0 {
        write!(output, "Select image from list above: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(BelegwerkError::Viewer(
                "input closed before a valid selection".into(),
            ));
        }

        let selection = line.trim().to_ascii_lowercase();
        if let Some((name, image)) = entries.iter().find(|(name, _)| *name == selection) {
            renderer.render(name, image)?;
            return Ok(());
        }

        warn!(%selection, "Unrecognized debug image name");
        writeln!(output, "ERROR: Wrong image name passed. Try again.")?;
        attempts_left -= 1;
    }

    Err(BelegwerkError::Viewer(format!(
        "no valid selection after {} attempts",
        max_retries + 1
    )))
}
