// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — reactive signals for the Dioxus UI.

use scanwerk_core::types::CaptureKind;

use crate::services::display::ScanView;

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Latest scan from a chosen file.
    pub upload: Option<ScanView>,
    /// Latest scan from the camera.
    pub camera: Option<ScanView>,
    /// Which scan the corner editor is open on.
    pub editing: Option<CaptureKind>,
    /// Status message for user feedback.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn scan(&self, kind: CaptureKind) -> Option<&ScanView> {
        match kind {
            CaptureKind::Upload => self.upload.as_ref(),
            CaptureKind::Camera => self.camera.as_ref(),
        }
    }

    /// Store a scan in the slot matching its kind.
    pub fn set_scan(&mut self, view: ScanView) {
        match view.kind {
            CaptureKind::Upload => self.upload = Some(view),
            CaptureKind::Camera => self.camera = Some(view),
        }
    }
}
