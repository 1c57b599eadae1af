// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `VisionAdapter` backed by the `imageproc` crate.

use scanwerk_core::config::DetectionOptions;
use scanwerk_core::error::Result;
use scanwerk_core::types::{CornerSet, TargetSize};
use tracing::{debug, info, instrument};

use super::detect::{corners_from_points, find_document_contour};
use super::extract::warp_quadrilateral;
use super::{Contour, VisionAdapter};
use crate::raster::surface::RasterSurface;

/// Paper detector built on edge detection and contour tracing.
#[derive(Debug, Clone, Default)]
pub struct ImageprocAdapter {
    options: DetectionOptions,
}

impl ImageprocAdapter {
    pub fn new(options: DetectionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DetectionOptions {
        &self.options
    }
}

impl VisionAdapter for ImageprocAdapter {
    fn name(&self) -> &str {
        "imageproc"
    }

    #[instrument(skip_all, fields(width = surface.width(), height = surface.height()))]
    fn detect_and_highlight(&self, surface: &RasterSurface) -> Result<RasterSurface> {
        let corners = self.detect_corners(surface)?;
        debug!("Paper outline highlighted");
        self.highlight_corners(surface, &corners)
    }

    #[instrument(skip_all, fields(width = surface.width(), height = surface.height()))]
    fn detect_contour(&self, surface: &RasterSurface) -> Result<Contour> {
        let gray = surface.to_luma();
        let points = find_document_contour(&gray, &self.options)?;
        Ok(Contour::new(points))
    }

    fn corners_from_contour(&self, contour: &Contour) -> CornerSet {
        corners_from_points(contour.points())
    }

    #[instrument(skip_all, fields(target_w = target.width, target_h = target.height, manual = corners.is_some()))]
    fn extract(
        &self,
        surface: &RasterSurface,
        target: TargetSize,
        corners: Option<&CornerSet>,
    ) -> Result<RasterSurface> {
        let quad = match corners {
            Some(manual) => *manual,
            None => self.detect_corners(surface)?,
        };
        info!(?quad, "Extracting document");

        let output = warp_quadrilateral(surface.as_rgba(), &quad, target)?;
        RasterSurface::from_rgba(output)
    }
}
