// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster surface — an in-memory RGBA image with known pixel dimensions.
// Created by frame sources, read by the vision adapter and the corner editor.

use image::{DynamicImage, GrayImage, ImageFormat, RgbaImage};
use scanwerk_core::error::ScanwerkError;
use tracing::{debug, info, instrument};

/// A decoded image or captured video frame.
///
/// Surfaces are never mutated in place once handed to a session; operations
/// that change pixels return a new surface.
#[derive(Clone)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

impl RasterSurface {
    // -- Construction ---------------------------------------------------------

    /// Decode raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<Self, ScanwerkError> {
        let img = image::load_from_memory(data)
            .map_err(|err| ScanwerkError::Decode(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Self::from_dynamic(img)
    }

    /// Load and decode an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, ScanwerkError> {
        let img = image::open(path.as_ref()).map_err(|err| match err {
            image::ImageError::IoError(io) => ScanwerkError::Io(io),
            other => ScanwerkError::Decode(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                other
            )),
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Self::from_dynamic(img)
    }

    /// Wrap an already-decoded image. Empty images are rejected.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, ScanwerkError> {
        Self::from_rgba(image.into_rgba8())
    }

    /// Wrap an RGBA buffer. Empty images are rejected.
    pub fn from_rgba(image: RgbaImage) -> Result<Self, ScanwerkError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScanwerkError::Decode("image has no pixels".into()));
        }
        Ok(Self { image })
    }

    /// Build a surface from a tightly packed RGBA8 frame buffer.
    pub fn from_raw(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ScanwerkError> {
        let expected = width as usize * height as usize * 4;
        let actual = rgba.len();
        let image = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
            ScanwerkError::Decode(format!(
                "frame buffer holds {actual} bytes, {width}x{height} RGBA needs {expected}"
            ))
        })?;
        Self::from_rgba(image)
    }

    // -- Accessors ------------------------------------------------------------

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Borrow the underlying RGBA buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the surface and return the underlying RGBA buffer.
    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }

    /// Grayscale copy for edge detection.
    pub fn to_luma(&self) -> GrayImage {
        DynamicImage::ImageRgba8(self.image.clone()).to_luma8()
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the surface as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ScanwerkError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ScanwerkError::Encode(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_round_trip_keeps_dimensions() {
        let surface =
            RasterSurface::from_rgba(RgbaImage::from_pixel(31, 17, Rgba([10, 20, 30, 255])))
                .expect("surface");
        let png = surface.to_png_bytes().expect("encode");
        assert_eq!(&png[1..4], b"PNG");

        let decoded = RasterSurface::decode(&png).expect("decode");
        assert_eq!(decoded.dimensions(), (31, 17));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = RasterSurface::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ScanwerkError::Decode(_)));
    }

    #[test]
    fn short_frame_buffer_is_rejected() {
        let err = RasterSurface::from_raw(4, 4, vec![0u8; 10]).unwrap_err();
        assert!(matches!(err, ScanwerkError::Decode(_)));
    }

    #[test]
    fn empty_image_is_rejected() {
        assert!(RasterSurface::from_rgba(RgbaImage::new(0, 10)).is_err());
    }

    #[test]
    fn open_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("page.png");
        RgbaImage::from_pixel(8, 6, Rgba([255, 255, 255, 255]))
            .save(&path)
            .expect("write png");

        let surface = RasterSurface::open(&path).expect("open");
        assert_eq!(surface.dimensions(), (8, 6));
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = RasterSurface::open(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, ScanwerkError::Io(_)));
    }
}
