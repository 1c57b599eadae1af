// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Replay camera: loops over still images on disk as if they were a live feed.

use std::path::Path;

use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, info, warn};

use crate::traits::{CameraFrame, CameraStream};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// A camera stream backed by decoded stills, returned in file-name order and
/// repeated forever.
pub struct ReplayCamera {
    frames: Vec<CameraFrame>,
    cursor: usize,
    live: bool,
}

impl ReplayCamera {
    /// Decode every image in `dir`.
    ///
    /// Files that fail to decode are skipped. A directory with no usable images
    /// is `PlatformUnavailable`, the same as having no camera.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            })
            .collect();
        paths.sort();

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            match image::open(path) {
                Ok(img) => {
                    let rgba = img.into_rgba8();
                    let (width, height) = rgba.dimensions();
                    frames.push(CameraFrame::new(width, height, rgba.into_raw()));
                }
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping unreadable replay frame"),
            }
        }

        if frames.is_empty() {
            warn!(dir = %dir.display(), "Replay directory has no usable images");
            return Err(ScanwerkError::PlatformUnavailable);
        }
        info!(count = frames.len(), "Replay camera loaded");
        Ok(Self::from_frames(frames))
    }

    /// Replay frames already in memory. An empty list yields a stream that
    /// is immediately stopped.
    pub fn from_frames(frames: Vec<CameraFrame>) -> Self {
        let live = !frames.is_empty();
        Self {
            frames,
            cursor: 0,
            live,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl CameraStream for ReplayCamera {
    fn next_frame(&mut self) -> Result<CameraFrame> {
        if !self.live {
            return Err(ScanwerkError::Bridge("camera stream is stopped".into()));
        }
        let frame = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(frame)
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            debug!("Replay camera released");
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(width: u32, height: u32, shade: u8) -> CameraFrame {
        let img = RgbaImage::from_pixel(width, height, Rgba([shade, shade, shade, 255]));
        CameraFrame::new(width, height, img.into_raw())
    }

    #[test]
    fn frames_cycle_in_order() {
        let mut cam = ReplayCamera::from_frames(vec![solid(2, 2, 10), solid(2, 2, 20)]);
        let shades: Vec<u8> = (0..5)
            .map(|_| cam.next_frame().expect("frame").rgba[0])
            .collect();
        assert_eq!(shades, vec![10, 20, 10, 20, 10]);
    }

    #[test]
    fn stop_is_idempotent_and_ends_the_stream() {
        let mut cam = ReplayCamera::from_frames(vec![solid(2, 2, 10)]);
        cam.stop();
        cam.stop();
        assert!(!cam.is_live());
        assert!(matches!(cam.next_frame(), Err(ScanwerkError::Bridge(_))));
    }

    #[test]
    fn directory_is_read_in_name_order_and_skips_other_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        RgbaImage::from_pixel(3, 3, Rgba([200, 0, 0, 255]))
            .save(dir.path().join("b.png"))
            .expect("write b");
        RgbaImage::from_pixel(3, 3, Rgba([100, 0, 0, 255]))
            .save(dir.path().join("a.png"))
            .expect("write a");
        std::fs::write(dir.path().join("notes.txt"), "not an image").expect("write txt");
        std::fs::write(dir.path().join("broken.png"), b"garbage").expect("write broken");

        let mut cam = ReplayCamera::from_dir(dir.path()).expect("camera");
        assert_eq!(cam.frame_count(), 2);
        assert_eq!(cam.next_frame().expect("frame").rgba[0], 100);
        assert_eq!(cam.next_frame().expect("frame").rgba[0], 200);
    }

    #[test]
    fn empty_directory_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            ReplayCamera::from_dir(dir.path()),
            Err(ScanwerkError::PlatformUnavailable)
        ));
    }
}
