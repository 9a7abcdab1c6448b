// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for scan operators.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::BelegwerkError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Retaking the photo or adjusting parameters may help.
    ActionRequired,
    /// Cannot be fixed by retrying — bad file, bad configuration.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `BelegwerkError` into a `HumanError` an operator can act on.
pub fn humanize_error(err: &BelegwerkError) -> HumanError {
    match err {
        BelegwerkError::Decode(_) => HumanError {
            message: "This image couldn't be read.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::Permanent,
        },

        BelegwerkError::BoundaryNotFound => HumanError {
            message: "We couldn't find the receipt's outline in this photo.".into(),
            suggestion: "Retake the photo on a contrasting background with all four corners of the receipt visible, or adjust the edge-detection thresholds.".into(),
            severity: Severity::ActionRequired,
        },

        BelegwerkError::DegenerateGeometry(_) => HumanError {
            message: "The detected outline was too distorted to flatten.".into(),
            suggestion: "Retake the photo from a less extreme angle so the receipt looks roughly rectangular.".into(),
            severity: Severity::ActionRequired,
        },

        BelegwerkError::Image(_) => HumanError {
            message: "There was a problem processing this image.".into(),
            suggestion: "Try a different copy of the photo. If this keeps happening, please report it.".into(),
            severity: Severity::Permanent,
        },

        BelegwerkError::Recognition(_) => HumanError {
            message: "Text recognition didn't work on this scan.".into(),
            suggestion: "Try scanning again with better lighting, making sure the text is clear and in focus.".into(),
            severity: Severity::ActionRequired,
        },

        BelegwerkError::Viewer(_) => HumanError {
            message: "No valid preview was selected.".into(),
            suggestion: "Run again with --debug-viewer and type one of the listed image names.".into(),
            severity: Severity::ActionRequired,
        },

        BelegwerkError::Config(detail) => HumanError {
            message: "The scanner settings are invalid.".into(),
            suggestion: format!("Fix the configuration and try again. ({detail})"),
            severity: Severity::Permanent,
        },

        BelegwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Check permissions and free disk space, then try again.".into(),
                    severity: Severity::ActionRequired,
                }
            }
        }

        BelegwerkError::Serialization(_) => HumanError {
            message: "The configuration file couldn't be parsed.".into(),
            suggestion: "Check the JSON syntax and field names against the documentation.".into(),
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_not_found_is_action_required() {
        let human = humanize_error(&BelegwerkError::BoundaryNotFound);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("corners"));
    }

    #[test]
    fn decode_is_permanent() {
        let human = humanize_error(&BelegwerkError::Decode("bad magic".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn missing_file_mentions_the_path_problem() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let human = humanize_error(&BelegwerkError::Io(io));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("found"));
    }
}
