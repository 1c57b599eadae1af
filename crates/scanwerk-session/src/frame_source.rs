// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame sources — where the next raster surface comes from.

use std::path::PathBuf;
use std::sync::Arc;

use scanwerk_bridge::CameraStream;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_vision::RasterSurface;
use tracing::{debug, instrument};

/// Produces raster surfaces on demand.
pub trait FrameSource: Send {
    /// The next surface to process.
    fn next_surface(&mut self) -> Result<RasterSurface>;

    /// Release whatever device backs the source. Must be idempotent.
    fn stop(&mut self) {}

    fn is_live(&self) -> bool {
        true
    }
}

/// A single decoded image, returned on every call.
pub struct StillFrame {
    surface: Arc<RasterSurface>,
}

impl StillFrame {
    pub fn new(surface: RasterSurface) -> Self {
        Self {
            surface: Arc::new(surface),
        }
    }
}

impl FrameSource for StillFrame {
    fn next_surface(&mut self) -> Result<RasterSurface> {
        Ok(self.surface.as_ref().clone())
    }
}

/// Frames sampled from a live camera stream.
pub struct CameraSource {
    stream: Box<dyn CameraStream>,
}

impl CameraSource {
    pub fn new(stream: Box<dyn CameraStream>) -> Self {
        Self { stream }
    }
}

impl FrameSource for CameraSource {
    fn next_surface(&mut self) -> Result<RasterSurface> {
        let frame = self.stream.next_frame()?;
        RasterSurface::from_raw(frame.width, frame.height, frame.rgba)
    }

    fn stop(&mut self) {
        self.stream.stop();
    }

    fn is_live(&self) -> bool {
        self.stream.is_live()
    }
}

/// Decode an uploaded file's bytes without blocking the async executor.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub async fn decode_upload(bytes: Vec<u8>) -> Result<RasterSurface> {
    let surface = tokio::task::spawn_blocking(move || RasterSurface::decode(&bytes))
        .await
        .map_err(|e| ScanwerkError::Decode(format!("decode task failed: {e}")))??;
    debug!(width = surface.width(), height = surface.height(), "Upload decoded");
    Ok(surface)
}

/// Read and decode an uploaded file from disk.
pub async fn load_upload(path: PathBuf) -> Result<RasterSurface> {
    let bytes = tokio::fs::read(&path).await?;
    decode_upload(bytes).await
}
