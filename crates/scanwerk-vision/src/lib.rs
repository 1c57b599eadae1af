// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-vision — Raster surfaces and paper detection for Scanwerk.
//
// Provides the `RasterSurface` image handle (decode, encode, raw frames), the
// `VisionAdapter` trait that the rest of the workspace talks to, and an
// `imageproc`-backed implementation of it (highlight, contour, corners,
// perspective extraction).

pub mod raster;
pub mod vision;

// Re-export the primary types so callers can use `scanwerk_vision::RasterSurface` etc.
pub use raster::surface::RasterSurface;
pub use vision::imageproc_adapter::ImageprocAdapter;
pub use vision::ready::{AdapterReadiness, ReadySignal, readiness_channel, spawn_imageproc_adapter};
pub use vision::{Contour, SharedAdapter, VisionAdapter};
