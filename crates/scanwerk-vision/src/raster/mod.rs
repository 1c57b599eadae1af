// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — decoded images and camera frames with known pixel size, plus
// the overlay drawing helpers used on them.

pub mod draw;
pub mod surface;

pub use surface::RasterSurface;
