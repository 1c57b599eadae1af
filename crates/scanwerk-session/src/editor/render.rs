// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor overlay: source image at 1:1, the quadrilateral outline, and one
// touch handle per corner.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use scanwerk_core::types::{Corner, CornerSet};
use scanwerk_vision::raster::draw::draw_closed_outline_mut;

const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 200, 83, 255]);
const HANDLE_COLOR: Rgba<u8> = Rgba([30, 144, 255, 255]);
const ACTIVE_HANDLE_COLOR: Rgba<u8> = Rgba([255, 64, 64, 255]);
const HANDLE_RING_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Sizes used when drawing, already scaled to the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub handle_radius: f32,
    pub line_thickness: u32,
}

/// Draw `corners` over a copy of `source`. The `active` corner gets a larger
/// red handle; the rest are blue.
pub fn render_overlay(
    source: &RgbaImage,
    corners: &CornerSet,
    active: Option<Corner>,
    style: OverlayStyle,
) -> RgbaImage {
    let mut canvas = source.clone();
    draw_closed_outline_mut(&mut canvas, &corners.outline(), style.line_thickness, OUTLINE_COLOR);

    // Active handle last so it sits on top of any overlapping neighbour.
    let order = Corner::ALL
        .into_iter()
        .filter(|c| Some(*c) != active)
        .chain(active);
    for corner in order {
        let p = corners.get(corner);
        let center = (p.x.round() as i32, p.y.round() as i32);
        let (radius, color) = if Some(corner) == active {
            (style.handle_radius * 1.25, ACTIVE_HANDLE_COLOR)
        } else {
            (style.handle_radius, HANDLE_COLOR)
        };
        let radius = radius.round().max(1.0) as i32;
        draw_filled_circle_mut(&mut canvas, center, radius, color);
        draw_hollow_circle_mut(&mut canvas, center, radius, HANDLE_RING_COLOR);
    }
    canvas
}
