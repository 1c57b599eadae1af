// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — Native platform bridge abstractions.
//
// This crate defines the camera capture boundary: a platform hands out a
// `CameraStream` that yields RGBA frames until it is stopped. The rest of the
// workspace only sees the traits in `traits`.

pub mod desktop;
pub mod replay;
pub mod traits;
#[cfg(target_os = "linux")]
pub mod webcam;

use scanwerk_core::ScannerConfig;

pub use traits::{CameraFrame, CameraStream, NativeCamera, PlatformBridge};

/// Build the bridge for the current platform.
///
/// A configured replay directory wins over real hardware. Otherwise Linux
/// opens a V4L2 webcam and other desktops report no camera.
pub fn platform_bridge(config: &ScannerConfig) -> Box<dyn PlatformBridge> {
    Box::new(
        desktop::DesktopBridge::new(config.camera_replay_dir.clone()).with_device(config.camera_device),
    )
}
