// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Webcam capture over Video4Linux2.
//
// Frames are pulled from a memory-mapped buffer queue. YUYV is preferred so no
// JPEG decode runs per tick; cameras that only stream MJPG are decoded with
// `image`.

use std::io;
use std::time::Duration;

use image::ImageFormat;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::CameraFacing;
use tracing::{debug, info, instrument, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::traits::{CameraFrame, CameraStream};

const BUFFER_COUNT: u32 = 4;
const FRAME_TIMEOUT: Duration = Duration::from_secs(2);
const REQUESTED_SIZE: (u32, u32) = (1280, 720);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelLayout {
    Yuyv,
    Mjpeg,
}

impl PixelLayout {
    fn from_fourcc(fourcc: FourCC) -> Option<Self> {
        match &fourcc.repr {
            b"YUYV" => Some(Self::Yuyv),
            b"MJPG" => Some(Self::Mjpeg),
            _ => None,
        }
    }
}

/// A V4L2 capture device streaming into mapped buffers.
pub struct WebcamCamera {
    index: usize,
    stream: Option<Stream<'static>>,
    width: u32,
    height: u32,
    stride: u32,
    layout: PixelLayout,
}

impl WebcamCamera {
    /// Open the first usable webcam for `facing`, or exactly `device` when set.
    ///
    /// A denied or busy device is reported as `Permission` even if a later
    /// candidate fails differently.
    #[instrument]
    pub fn open(facing: CameraFacing, device: Option<usize>) -> Result<Self> {
        let available: Vec<usize> = v4l::context::enum_devices().iter().map(|node| node.index()).collect();
        let candidates = device_order(&available, facing, device);
        debug!(?candidates, "Webcam candidates");

        let mut failure = ScanwerkError::PlatformUnavailable;
        for index in candidates {
            match Self::open_index(index) {
                Ok(camera) => return Ok(camera),
                Err(err) => {
                    warn!(index, error = %err, "Webcam unusable");
                    if !matches!(failure, ScanwerkError::Permission(_)) {
                        failure = err;
                    }
                }
            }
        }
        Err(failure)
    }

    fn open_index(index: usize) -> Result<Self> {
        let device = Device::new(index).map_err(camera_error)?;

        let mut format = device.format().map_err(camera_error)?;
        format.width = REQUESTED_SIZE.0;
        format.height = REQUESTED_SIZE.1;
        format.fourcc = FourCC::new(b"YUYV");
        let mut format = device.set_format(&format).map_err(camera_error)?;

        let layout = match PixelLayout::from_fourcc(format.fourcc) {
            Some(layout) => layout,
            None => {
                format.fourcc = FourCC::new(b"MJPG");
                format = device.set_format(&format).map_err(camera_error)?;
                PixelLayout::from_fourcc(format.fourcc).ok_or_else(|| {
                    ScanwerkError::Bridge(format!(
                        "camera {index} streams {} (need YUYV or MJPG)",
                        format.fourcc
                    ))
                })?
            }
        };

        let mut stream =
            Stream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT).map_err(camera_error)?;
        stream.set_timeout(FRAME_TIMEOUT);

        info!(
            index,
            width = format.width,
            height = format.height,
            ?layout,
            "Webcam opened"
        );
        Ok(Self {
            index,
            stream: Some(stream),
            width: format.width,
            height: format.height,
            stride: format.stride,
            layout,
        })
    }
}

impl CameraStream for WebcamCamera {
    fn next_frame(&mut self) -> Result<CameraFrame> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ScanwerkError::Bridge("camera stream is stopped".into()))?;
        let (buf, meta) = stream.next().map_err(camera_error)?;

        // Some drivers leave bytesused at zero for uncompressed formats.
        let used = match meta.bytesused as usize {
            0 => buf.len(),
            n => n.min(buf.len()),
        };
        let data = &buf[..used];

        match self.layout {
            PixelLayout::Yuyv => {
                let rgba = yuyv_to_rgba(data, self.width, self.height, self.stride)?;
                Ok(CameraFrame::new(self.width, self.height, rgba))
            }
            PixelLayout::Mjpeg => {
                let rgba = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
                    .map_err(|e| ScanwerkError::Decode(format!("webcam frame: {e}")))?
                    .into_rgba8();
                let (width, height) = rgba.dimensions();
                Ok(CameraFrame::new(width, height, rgba.into_raw()))
            }
        }
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            info!(index = self.index, "Webcam released");
        }
    }

    fn is_live(&self) -> bool {
        self.stream.is_some()
    }
}

/// Device indices to try, best first.
///
/// Built-in cameras enumerate before external ones, so the user-facing camera
/// is taken to be the lowest index and the environment-facing one the highest.
fn device_order(available: &[usize], facing: CameraFacing, preferred: Option<usize>) -> Vec<usize> {
    if let Some(index) = preferred {
        return vec![index];
    }
    let mut order = available.to_vec();
    order.sort_unstable();
    order.dedup();
    if facing == CameraFacing::Environment {
        order.reverse();
    }
    order
}

fn camera_error(err: io::Error) -> ScanwerkError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => ScanwerkError::Permission("camera access was denied".into()),
        io::ErrorKind::ResourceBusy => {
            ScanwerkError::Permission("camera is in use by another application".into())
        }
        io::ErrorKind::NotFound => ScanwerkError::PlatformUnavailable,
        _ => ScanwerkError::Bridge(format!("camera: {err}")),
    }
}

/// Convert packed YUYV (BT.601, limited range) to RGBA8.
///
/// `stride` is the byte length of one row; zero means tightly packed.
fn yuyv_to_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Result<Vec<u8>> {
    let (width, height) = (width as usize, height as usize);
    let row_bytes = width.div_ceil(2) * 4;
    let stride = match stride as usize {
        0 => row_bytes,
        s => s.max(row_bytes),
    };
    let needed = match height {
        0 => 0,
        h => stride * (h - 1) + row_bytes,
    };
    if data.len() < needed {
        return Err(ScanwerkError::Bridge(format!(
            "short YUYV frame: {} bytes, expected {needed}",
            data.len()
        )));
    }

    let mut rgba = Vec::with_capacity(width * height * 4);
    for row in data.chunks(stride).take(height) {
        for x in 0..width {
            let pair = &row[(x / 2) * 4..(x / 2) * 4 + 4];
            let y = pair[(x % 2) * 2];
            let [r, g, b] = yuv_to_rgb(y, pair[1], pair[3]);
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }
    Ok(rgba)
}

fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = 298 * (i32::from(y) - 16);
    let d = i32::from(u) - 128;
    let e = i32::from(v) - 128;
    let clamp = |n: i32| ((n + 128) >> 8).clamp(0, 255) as u8;
    [clamp(c + 409 * e), clamp(c - 100 * d - 208 * e), clamp(c + 516 * d)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yuyv_white_and_black() {
        let rgba = yuyv_to_rgba(&[235, 128, 16, 128], 2, 1, 0).expect("convert");
        assert_eq!(rgba, vec![255, 255, 255, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn yuyv_red_stays_red() {
        let rgba = yuyv_to_rgba(&[81, 90, 81, 240], 2, 1, 0).expect("convert");
        assert_eq!(&rgba[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn yuyv_skips_row_padding() {
        // Two rows of one pixel pair, each padded to 6 bytes.
        let data = [235, 128, 235, 128, 9, 9, 16, 128, 16, 128];
        let rgba = yuyv_to_rgba(&data, 2, 2, 6).expect("convert");
        assert_eq!(rgba.len(), 2 * 2 * 4);
        assert_eq!(&rgba[..4], &[255, 255, 255, 255]);
        assert_eq!(&rgba[8..12], &[0, 0, 0, 255]);
    }

    #[test]
    fn short_yuyv_frame_is_rejected() {
        let err = yuyv_to_rgba(&[235, 128], 2, 1, 0).unwrap_err();
        assert!(matches!(err, ScanwerkError::Bridge(_)));
    }

    #[test]
    fn denied_and_busy_devices_are_permission_errors() {
        let denied = camera_error(io::Error::from_raw_os_error(13));
        assert!(matches!(denied, ScanwerkError::Permission(_)));

        let busy = camera_error(io::Error::from_raw_os_error(16));
        assert!(matches!(busy, ScanwerkError::Permission(ref m) if m.contains("in use")));

        let missing = camera_error(io::Error::from_raw_os_error(2));
        assert!(matches!(missing, ScanwerkError::PlatformUnavailable));

        let other = camera_error(io::Error::other("ioctl failed"));
        assert!(matches!(other, ScanwerkError::Bridge(_)));
    }

    #[test]
    fn facing_picks_device_order() {
        let available = [2, 0, 1];
        assert_eq!(device_order(&available, CameraFacing::User, None), vec![0, 1, 2]);
        assert_eq!(device_order(&available, CameraFacing::Environment, None), vec![2, 1, 0]);
        assert_eq!(device_order(&available, CameraFacing::User, Some(7)), vec![7]);
        assert!(device_order(&[], CameraFacing::Environment, None).is_empty());
    }

    #[test]
    fn missing_device_index_is_unavailable() {
        let err = WebcamCamera::open(CameraFacing::User, Some(9_999)).err().expect("no such device");
        assert!(matches!(err, ScanwerkError::PlatformUnavailable));
    }
}
