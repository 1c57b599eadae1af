// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture flows: turn a captured surface into a ready `ScanSession`.
//
// Detection runs once and strictly precedes extraction. Uploads additionally
// keep a copy of the source with the detected outline drawn on it.

use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{CaptureKind, TargetSize};
use scanwerk_vision::{RasterSurface, SharedAdapter, VisionAdapter};
use tracing::{info, instrument};

use crate::session::ScanSession;

/// Run detection and extraction on `source`.
///
/// The corners found by detection are passed to extraction as the override,
/// so the session's corners are exactly the ones its output was cut from.
#[instrument(skip_all, fields(%kind, adapter = adapter.name(), width = source.width(), height = source.height()))]
pub fn run_capture(
    adapter: &dyn VisionAdapter,
    kind: CaptureKind,
    source: RasterSurface,
    target: TargetSize,
) -> Result<ScanSession> {
    let corners = adapter.detect_corners(&source)?;
    let highlighted = match kind {
        CaptureKind::Upload => Some(adapter.highlight_corners(&source, &corners)?),
        CaptureKind::Camera => None,
    };
    let output = adapter.extract(&source, target, Some(&corners))?;

    info!(?corners, "Document extracted");
    Ok(ScanSession::new(kind, source, highlighted, corners, output, target))
}

/// [`run_capture`] on the blocking thread pool.
pub async fn run_capture_blocking(
    adapter: SharedAdapter,
    kind: CaptureKind,
    source: RasterSurface,
    target: TargetSize,
) -> Result<ScanSession> {
    tokio::task::spawn_blocking(move || run_capture(adapter.as_ref(), kind, source, target))
        .await
        .map_err(|e| ScanwerkError::Detection(format!("capture task failed: {e}")))?
}
