// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration. All parameters are passed in explicitly at pipeline
// construction; there is no process-global mutable state.

use serde::{Deserialize, Serialize};

use crate::error::{BelegwerkError, Result};

/// Parameters of the geometric detection pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Fixed width of the analysis copy the detection stages run on.
    /// The original image is never upscaled to reach it.
    pub analysis_width: u32,
    /// Gaussian blur sigma applied before edge detection. The default
    /// matches a 5×5 kernel.
    pub blur_sigma: f32,
    /// Lower hysteresis threshold of the Canny edge detector.
    pub canny_low: f32,
    /// Upper hysteresis threshold of the Canny edge detector.
    pub canny_high: f32,
    /// Polygon simplification tolerance as a fraction of each contour's
    /// perimeter.
    pub approx_epsilon_ratio: f64,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            analysis_width: 500,
            blur_sigma: 1.1,
            canny_low: 75.0,
            canny_high: 200.0,
            approx_epsilon_ratio: 0.02,
        }
    }
}

impl DetectConfig {
    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.analysis_width == 0 {
            return Err(BelegwerkError::Config(
                "analysis_width must be at least 1".into(),
            ));
        }
        if !self.blur_sigma.is_finite() || self.blur_sigma <= 0.0 {
            return Err(BelegwerkError::Config(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if !(self.canny_low < self.canny_high) {
            return Err(BelegwerkError::Config(format!(
                "canny_low ({}) must be below canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if !(self.approx_epsilon_ratio > 0.0 && self.approx_epsilon_ratio < 1.0) {
            return Err(BelegwerkError::Config(format!(
                "approx_epsilon_ratio must be in (0, 1), got {}",
                self.approx_epsilon_ratio
            )));
        }
        Ok(())
    }
}

/// Layout assumption handed to the text-recognition engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionMode {
    /// Assume a single uniform block of text.
    #[default]
    SingleBlock,
    /// Extract layout-aware text lines ordered top to bottom.
    Columns,
}

/// Complete scanner settings: detection parameters plus the recognition
/// mode handed to the OCR collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub detect: DetectConfig,
    #[serde(default)]
    pub mode: RecognitionMode,
}

impl ScanConfig {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScanConfig = serde_json::from_str(json)?;
        config.detect.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        DetectConfig::default().validate().unwrap();
    }

    #[test]
    fn default_analysis_width_is_500() {
        assert_eq!(DetectConfig::default().analysis_width, 500);
    }

    #[test]
    fn zero_analysis_width_is_rejected() {
        let config = DetectConfig {
            analysis_width: 0,
            ..DetectConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BelegwerkError::Config(_))
        ));
    }

    #[test]
    fn inverted_canny_thresholds_are_rejected() {
        let config = DetectConfig {
            canny_low: 200.0,
            canny_high: 75.0,
            ..DetectConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn epsilon_ratio_must_be_a_fraction() {
        let config = DetectConfig {
            approx_epsilon_ratio: 1.5,
            ..DetectConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn scan_config_parses_partial_json() {
        let config = ScanConfig::from_json(r#"{"detect": {"analysis_width": 640,
            "blur_sigma": 1.1, "canny_low": 50.0, "canny_high": 150.0,
            "approx_epsilon_ratio": 0.02}}"#)
            .unwrap();
        assert_eq!(config.detect.analysis_width, 640);
        assert_eq!(config.mode, RecognitionMode::SingleBlock);
    }

    #[test]
    fn scan_config_rejects_invalid_detect_params() {
        let result = ScanConfig::from_json(r#"{"detect": {"analysis_width": 0,
            "blur_sigma": 1.1, "canny_low": 50.0, "canny_high": 150.0,
            "approx_epsilon_ratio": 0.02}}"#);
        assert!(result.is_err());
    }
}
