// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capture capabilities.

use scanwerk_core::error::Result;
use scanwerk_core::types::CameraFacing;

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge: NativeCamera + Send + Sync {
    /// Human-readable platform name (e.g. "Linux desktop").
    fn platform_name(&self) -> &str;
}

/// Live video capture.
pub trait NativeCamera {
    /// Ask for a video stream, preferring the given camera.
    ///
    /// A user refusing access, or no camera existing, is reported as
    /// `ScanwerkError::Permission` or `ScanwerkError::PlatformUnavailable`.
    fn open_camera(&self, facing: CameraFacing) -> Result<Box<dyn CameraStream>>;
}

/// An open camera stream.
///
/// Frames are pulled on demand; the stream keeps the device busy until
/// [`CameraStream::stop`] is called.
pub trait CameraStream: Send {
    /// Grab the most recent frame.
    fn next_frame(&mut self) -> Result<CameraFrame>;

    /// Release the device. Calling it again is a no-op.
    fn stop(&mut self);

    /// Whether the stream still holds the device.
    fn is_live(&self) -> bool;
}

/// One video frame as tightly packed RGBA8 pixels.
#[derive(Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl CameraFrame {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl std::fmt::Debug for CameraFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}
