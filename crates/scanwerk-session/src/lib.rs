// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — scan sessions, the interactive corner editor, and the live
// preview loop.

pub mod capture;
pub mod editor;
pub mod export;
pub mod frame_source;
pub mod preview;
pub mod session;

pub use editor::{EditorSession, PointerEvent, PointerKind, Redraw};
pub use frame_source::{CameraSource, FrameSource, StillFrame};
pub use preview::{LivePreview, PreviewFrame};
pub use session::{ScanSession, SessionState, Workbench};
