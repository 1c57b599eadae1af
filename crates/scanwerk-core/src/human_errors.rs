// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every failure shown to the user is mapped to plain English with a clear
// suggestion. Severity drives the colour of the notification.

use crate::error::ScanwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Try again and it will probably work (bad lighting, shaky frame).
    Transient,
    /// User must do something first (grant access, move a corner).
    ActionRequired,
    /// Cannot be fixed by retrying — wrong file, missing hardware.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether simply repeating the action may succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

impl HumanError {
    /// Heading and suggestion joined for a single-line status bar.
    pub fn one_line(&self) -> String {
        format!("{} {}", self.message, self.suggestion)
    }
}

/// Convert a `ScanwerkError` into a `HumanError`.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        ScanwerkError::Permission(_) => HumanError {
            message: "We couldn't use the camera.".into(),
            suggestion: "Allow camera access for this app, or make sure no other app is using the camera, then press Start Camera again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::NoFrame => HumanError {
            message: "The camera is still starting.".into(),
            suggestion: "Wait until the live picture appears, then press Capture again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::Decode(_) => HumanError {
            message: "That file doesn't look like a picture we can read.".into(),
            suggestion: "Choose a JPEG or PNG photo of the document.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::Detection(_) => HumanError {
            message: "We couldn't find the edges of the page.".into(),
            suggestion: "Place the page on a darker, plain surface with all four corners visible, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::Extraction(_) => HumanError {
            message: "The page corners don't form a usable shape.".into(),
            suggestion: "Move the corner points so they sit on the four corners of the page and don't overlap, then apply again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Encode(_) => HumanError {
            message: "We couldn't save the scanned image.".into(),
            suggestion: "Try saving again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::AdapterTimeout(_) => HumanError {
            message: "The scanner is taking too long to start.".into(),
            suggestion: "Close and reopen the app.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::NoSession(kind) => HumanError {
            message: format!("There is no {kind} scan yet."),
            suggestion: "Scan a page first, then edit its corners.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::EditorBusy => HumanError {
            message: "Another scan is already being edited.".into(),
            suggestion: "Apply or cancel that edit first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::NoEditor => HumanError {
            message: "There is no corner edit to apply.".into(),
            suggestion: "Choose \"Edit corners\" on a scan first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::StaleSession => HumanError {
            message: "This scan was replaced by a newer one.".into(),
            suggestion: "Your corner changes were not applied. Edit the new scan instead.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::InvalidConfig(detail) => HumanError {
            message: "The scanner settings are not valid.".into(),
            suggestion: format!("Check the SCANWERK_* settings. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::Bridge(_) => HumanError {
            message: "A device feature didn't work.".into(),
            suggestion: "Try again. If this keeps happening, restart the app.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::PlatformUnavailable => HumanError {
            message: "No camera is available on this device.".into(),
            suggestion: "Use Scan From File with a photo of the page instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or pick a different location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanwerkError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
