// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay drawing helpers shared by the paper highlighter and the corner
// editor renderer.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use scanwerk_core::types::{CornerSet, Point};

/// Colour of the highlighted page outline.
pub const HIGHLIGHT_COLOR: Rgba<u8> = Rgba([255, 140, 0, 255]);

/// Line thickness that stays visible once a surface is scaled down to fit a
/// screen: roughly 1% of the longer edge, between 2 and 12 pixels.
pub fn outline_thickness(width: u32, height: u32) -> u32 {
    (width.max(height) / 100).clamp(2, 12)
}

/// Draw a segment `thickness` pixels wide.
///
/// `imageproc` only draws one-pixel lines, so the segment is stamped once per
/// offset across a square brush.
pub fn draw_thick_segment_mut(
    image: &mut RgbaImage,
    start: Point,
    end: Point,
    thickness: u32,
    color: Rgba<u8>,
) {
    let half = thickness as i32 / 2;
    let span = thickness.max(1) as i32;
    for dy in 0..span {
        for dx in 0..span {
            let ox = (dx - half) as f32;
            let oy = (dy - half) as f32;
            draw_line_segment_mut(
                image,
                (start.x + ox, start.y + oy),
                (end.x + ox, end.y + oy),
                color,
            );
        }
    }
}

/// Draw a closed polygon through `points` in order.
pub fn draw_closed_outline_mut(
    image: &mut RgbaImage,
    points: &[Point],
    thickness: u32,
    color: Rgba<u8>,
) {
    if points.len() < 2 {
        return;
    }
    for (i, start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        draw_thick_segment_mut(image, *start, end, thickness, color);
    }
}

/// Copy of `image` with the page outline and a dot on each corner.
pub fn draw_page_highlight(image: &RgbaImage, corners: &CornerSet) -> RgbaImage {
    let mut annotated = image.clone();
    let thickness = outline_thickness(image.width(), image.height());
    draw_closed_outline_mut(&mut annotated, &corners.outline(), thickness, HIGHLIGHT_COLOR);
    for (_, p) in corners.iter() {
        draw_filled_circle_mut(
            &mut annotated,
            (p.x.round() as i32, p.y.round() as i32),
            (thickness * 2) as i32,
            HIGHLIGHT_COLOR,
        );
    }
    annotated
}
