// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// Scanwerk keeps nothing on disk. Defaults can be overridden per launch with
// `SCANWERK_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};
use crate::types::{CameraFacing, TargetSize};

/// Options for the interactive corner editor.
///
/// Radii are in source-surface pixels for a surface whose longer edge is
/// [`EditorOptions::REFERENCE_EDGE`]; larger surfaces scale them up so that
/// handles stay finger-sized after the image is shrunk to fit the screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorOptions {
    /// Radius of the drawn touch target.
    pub handle_radius: f32,
    /// Maximum pointer distance that still grabs a handle. Never below `handle_radius`.
    pub hit_threshold: f32,
    /// Redraw on every pointer move during a drag. When false the view only
    /// refreshes on grab and release.
    pub redraw_on_drag: bool,
    /// Draw a zoomed inset around the dragged corner.
    pub magnifier_enabled: bool,
    /// Zoom factor of the magnifier inset.
    pub magnifier_zoom: f32,
    /// Clamp dragged corners to the surface bounds. Off by default: corners may
    /// leave the image and extraction fills the outside area with white.
    pub clamp_to_surface: bool,
}

impl EditorOptions {
    /// Longer surface edge at which radii are used unscaled.
    pub const REFERENCE_EDGE: f32 = 1000.0;

    /// Scale factor applied to radii for a surface of the given size.
    pub fn scale_for(&self, width: u32, height: u32) -> f32 {
        (width.max(height) as f32 / Self::REFERENCE_EDGE).max(1.0)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.handle_radius > 0.0) {
            return Err(ScanwerkError::InvalidConfig(format!(
                "handle_radius must be positive, got {}",
                self.handle_radius
            )));
        }
        if !(self.hit_threshold >= self.handle_radius) {
            return Err(ScanwerkError::InvalidConfig(format!(
                "hit_threshold ({}) must be at least handle_radius ({})",
                self.hit_threshold, self.handle_radius
            )));
        }
        if !(self.magnifier_zoom >= 1.0) {
            return Err(ScanwerkError::InvalidConfig(format!(
                "magnifier_zoom must be >= 1.0, got {}",
                self.magnifier_zoom
            )));
        }
        Ok(())
    }
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            handle_radius: 20.0,
            hit_threshold: 40.0,
            redraw_on_drag: true,
            magnifier_enabled: false,
            magnifier_zoom: 2.5,
            clamp_to_surface: false,
        }
    }
}

/// Tuning for the bundled paper detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionOptions {
    /// Gaussian blur sigma applied before edge detection.
    pub blur_sigma: f32,
    /// Canny low hysteresis threshold.
    pub canny_low: f32,
    /// Canny high hysteresis threshold.
    pub canny_high: f32,
    /// Smallest accepted contour area as a fraction of the frame area.
    pub min_area_ratio: f32,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            blur_sigma: 1.5,
            canny_low: 50.0,
            canny_high: 200.0,
            min_area_ratio: 0.05,
        }
    }
}

/// Per-launch scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Width of the extracted output in pixels.
    pub target_width: u32,
    /// Height of the extracted output in pixels.
    pub target_height: u32,
    /// Live preview sampling period in milliseconds.
    pub preview_interval_ms: u64,
    /// Preferred camera.
    pub camera_facing: CameraFacing,
    /// File name offered when saving a scan.
    pub download_filename: String,
    /// How long to wait for the vision adapter to become ready.
    pub adapter_ready_timeout_ms: u64,
    /// Directory of still images replayed as a camera feed on desktop.
    pub camera_replay_dir: Option<PathBuf>,
    /// Webcam index (`/dev/videoN`) to use instead of choosing by facing.
    pub camera_device: Option<usize>,
    pub editor: EditorOptions,
    pub detection: DetectionOptions,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            target_width: 500,
            target_height: 700,
            preview_interval_ms: 200,
            camera_facing: CameraFacing::Environment,
            download_filename: "scanned.png".into(),
            adapter_ready_timeout_ms: 5_000,
            camera_replay_dir: None,
            camera_device: None,
            editor: EditorOptions::default(),
            detection: DetectionOptions::default(),
        }
    }
}

impl ScannerConfig {
    /// Defaults overridden by `SCANWERK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each known key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, "SCANWERK_TARGET_WIDTH")? {
            config.target_width = v;
        }
        if let Some(v) = parse_var(&lookup, "SCANWERK_TARGET_HEIGHT")? {
            config.target_height = v;
        }
        if let Some(v) = parse_var(&lookup, "SCANWERK_PREVIEW_INTERVAL_MS")? {
            config.preview_interval_ms = v;
        }
        if let Some(v) = lookup("SCANWERK_CAMERA_FACING") {
            config.camera_facing = match v.to_ascii_lowercase().as_str() {
                "environment" | "rear" | "back" => CameraFacing::Environment,
                "user" | "front" => CameraFacing::User,
                other => {
                    return Err(ScanwerkError::InvalidConfig(format!(
                        "SCANWERK_CAMERA_FACING: unknown facing '{other}'"
                    )));
                }
            };
        }
        if let Some(v) = lookup("SCANWERK_DOWNLOAD_FILENAME") {
            config.download_filename = v;
        }
        if let Some(v) = parse_var(&lookup, "SCANWERK_ADAPTER_READY_TIMEOUT_MS")? {
            config.adapter_ready_timeout_ms = v;
        }
        if let Some(v) = lookup("SCANWERK_CAMERA_REPLAY_DIR") {
            config.camera_replay_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = parse_var(&lookup, "SCANWERK_CAMERA_DEVICE")? {
            config.camera_device = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "SCANWERK_HANDLE_RADIUS")? {
            config.editor.handle_radius = v;
        }
        if let Some(v) = parse_var(&lookup, "SCANWERK_HIT_THRESHOLD")? {
            config.editor.hit_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "SCANWERK_REDRAW_ON_DRAG")? {
            config.editor.redraw_on_drag = v;
        }
        if let Some(v) = parse_var(&lookup, "SCANWERK_MAGNIFIER")? {
            config.editor.magnifier_enabled = v;
        }
        if let Some(v) = parse_var(&lookup, "SCANWERK_CLAMP_TO_SURFACE")? {
            config.editor.clamp_to_surface = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ScanwerkError::InvalidConfig(format!(
                "target size must be non-zero, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        if self.preview_interval_ms == 0 {
            return Err(ScanwerkError::InvalidConfig(
                "preview_interval_ms must be non-zero".into(),
            ));
        }
        if self.download_filename.trim().is_empty() {
            return Err(ScanwerkError::InvalidConfig(
                "download_filename must not be empty".into(),
            ));
        }
        self.editor.validate()
    }

    pub fn target_size(&self) -> TargetSize {
        TargetSize::new(self.target_width, self.target_height)
    }

    pub fn preview_interval(&self) -> Duration {
        Duration::from_millis(self.preview_interval_ms)
    }

    pub fn adapter_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_ready_timeout_ms)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ScanwerkError::InvalidConfig(format!("{key}='{raw}': {e}"))),
    }
}
