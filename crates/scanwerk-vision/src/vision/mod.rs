// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vision adapter boundary — the only way the rest of Scanwerk reaches paper
// detection and perspective extraction.

pub mod detect;
pub mod extract;
pub mod imageproc_adapter;
pub mod ready;

use std::sync::Arc;

use scanwerk_core::error::Result;
use scanwerk_core::types::{CornerSet, Point, TargetSize};

use crate::raster::draw::draw_page_highlight;
use crate::raster::surface::RasterSurface;

/// An opaque document boundary produced by [`VisionAdapter::detect_contour`].
///
/// Only meant to be fed back into [`VisionAdapter::corners_from_contour`].
/// Any resources it holds are released when it is dropped.
#[derive(Debug, Clone)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub(crate) fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub(crate) fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of boundary points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Typed wrapper over a paper-detection library.
///
/// Implementations hold no per-call state; every call is an independent,
/// synchronous, CPU-bound request. Library failures are converted to
/// `ScanwerkError::Detection` or `ScanwerkError::Extraction` before they leave
/// the adapter.
pub trait VisionAdapter: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Return a copy of `surface` with the detected page outline drawn on it.
    fn detect_and_highlight(&self, surface: &RasterSurface) -> Result<RasterSurface>;

    /// Return a copy of `surface` with the outline of already-known
    /// `corners` drawn on it. No detection runs.
    fn highlight_corners(&self, surface: &RasterSurface, corners: &CornerSet) -> Result<RasterSurface> {
        RasterSurface::from_rgba(draw_page_highlight(surface.as_rgba(), corners))
    }

    /// Find the document boundary.
    fn detect_contour(&self, surface: &RasterSurface) -> Result<Contour>;

    /// Derive the four corners of a contour. Deterministic for a given contour.
    fn corners_from_contour(&self, contour: &Contour) -> CornerSet;

    /// Warp the document quadrilateral onto a `target`-sized rectangle.
    ///
    /// With `corners` supplied, exactly those four points are used and no
    /// detection runs. Without them the quadrilateral is detected first.
    fn extract(
        &self,
        surface: &RasterSurface,
        target: TargetSize,
        corners: Option<&CornerSet>,
    ) -> Result<RasterSurface>;

    /// Detect the contour, derive its corners, and release the contour.
    fn detect_corners(&self, surface: &RasterSurface) -> Result<CornerSet> {
        let contour = self.detect_contour(surface)?;
        let corners = self.corners_from_contour(&contour);
        drop(contour);
        Ok(corners)
    }
}

/// Adapter handle shared between the capture flows, the editor, and the
/// preview loop.
pub type SharedAdapter = Arc<dyn VisionAdapter>;
