// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Presentation helpers: surfaces become `data:` URLs the webview can show
// directly, sessions become plain display models.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use scanwerk_core::error::Result;
use scanwerk_core::types::{CaptureKind, SessionId};
use scanwerk_session::ScanSession;
use scanwerk_session::export::corners_json;
use scanwerk_vision::RasterSurface;

/// Encode a surface as a PNG `data:` URL.
pub fn data_url(surface: &RasterSurface) -> Result<String> {
    let png = surface.to_png_bytes()?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Everything the scan card shows for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanView {
    pub kind: CaptureKind,
    pub session_id: SessionId,
    pub highlighted_url: Option<String>,
    pub output_url: String,
    pub corners_json: String,
    pub output_size: (u32, u32),
    /// Applied corner edits; with `session_id` this identifies the rendering.
    pub revision: u32,
    /// Capture time, `HH:MM:SS` UTC.
    pub captured_at: String,
}

impl ScanView {
    pub fn from_session(session: &ScanSession) -> Result<Self> {
        Ok(Self {
            kind: session.kind(),
            session_id: session.id(),
            highlighted_url: session.highlighted().map(data_url).transpose()?,
            output_url: data_url(session.output())?,
            corners_json: corners_json(session.corners())?,
            output_size: session.output().dimensions(),
            revision: session.revision(),
            captured_at: session.created_at().format("%H:%M:%S").to_string(),
        })
    }
}
