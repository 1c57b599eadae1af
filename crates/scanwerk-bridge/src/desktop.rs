// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop bridge. A replayed directory of stills stands in for the camera
// when configured; otherwise Linux uses a V4L2 webcam and other desktops
// have no camera.

use std::path::PathBuf;

use scanwerk_core::error::Result;
use scanwerk_core::types::CameraFacing;

use crate::replay::ReplayCamera;
use crate::traits::*;

/// Bridge returned on desktop and CI builds.
#[derive(Debug, Default)]
pub struct DesktopBridge {
    replay_dir: Option<PathBuf>,
    device: Option<usize>,
}

impl DesktopBridge {
    pub fn new(replay_dir: Option<PathBuf>) -> Self {
        Self {
            replay_dir,
            device: None,
        }
    }

    /// Pin the webcam to a device index instead of choosing by facing.
    pub fn with_device(mut self, device: Option<usize>) -> Self {
        self.device = device;
        self
    }
}

impl PlatformBridge for DesktopBridge {
    fn platform_name(&self) -> &str {
        if self.replay_dir.is_some() {
            "Desktop (replay camera)"
        } else if cfg!(target_os = "linux") {
            "Linux (V4L2 webcam)"
        } else {
            "Desktop"
        }
    }
}

impl NativeCamera for DesktopBridge {
    fn open_camera(&self, facing: CameraFacing) -> Result<Box<dyn CameraStream>> {
        if let Some(dir) = &self.replay_dir {
            tracing::info!(?facing, dir = %dir.display(), "Opening replay camera");
            return Ok(Box::new(ReplayCamera::from_dir(dir)?));
        }
        open_webcam(facing, self.device)
    }
}

#[cfg(target_os = "linux")]
fn open_webcam(facing: CameraFacing, device: Option<usize>) -> Result<Box<dyn CameraStream>> {
    Ok(Box::new(crate::webcam::WebcamCamera::open(facing, device)?))
}

#[cfg(not(target_os = "linux"))]
fn open_webcam(_facing: CameraFacing, _device: Option<usize>) -> Result<Box<dyn CameraStream>> {
    tracing::warn!("NativeCamera::open_camera called without a camera source");
    Err(scanwerk_core::error::ScanwerkError::PlatformUnavailable)
}
