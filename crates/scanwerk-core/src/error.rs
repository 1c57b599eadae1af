// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use std::time::Duration;

use thiserror::Error;

use crate::types::CaptureKind;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Capture errors --
    #[error("camera access denied or unavailable: {0}")]
    Permission(String),

    #[error("the camera has not delivered a frame yet")]
    NoFrame,

    #[error("failed to decode image: {0}")]
    Decode(String),

    // -- Vision errors --
    #[error("no document outline found: {0}")]
    Detection(String),

    #[error("perspective extraction failed: {0}")]
    Extraction(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("vision adapter not ready after {0:?}")]
    AdapterTimeout(Duration),

    // -- Session errors --
    #[error("no {0} scan to edit")]
    NoSession(CaptureKind),

    #[error("another corner edit is already open")]
    EditorBusy,

    #[error("no corner edit is open")]
    NoEditor,

    #[error("the scan being edited was replaced by a newer capture")]
    StaleSession,

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- I/O --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
