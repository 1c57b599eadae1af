// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Magnifier pass: a round zoomed inset of the source around the dragged
// corner, drawn on top of the editor overlay.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use scanwerk_core::types::Point;

const BACKDROP: Rgba<u8> = Rgba([0, 0, 0, 230]);
const BORDER: Rgba<u8> = Rgba([255, 64, 64, 255]);
const CROSSHAIR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Where the inset goes: up and to the right of the focus, pulled back
/// inside the canvas where possible.
pub fn inset_center(canvas: (u32, u32), focus: Point, radius: f32) -> Point {
    let offset = radius + 20.0;
    let margin = 5.0;
    let (w, h) = (canvas.0 as f32, canvas.1 as f32);
    let x = (focus.x + offset).min(w - radius - margin).max(radius);
    let y = (focus.y - offset).max(radius + margin).min(h - radius).max(radius);
    Point::new(x, y)
}

/// Draw a magnified view of `source` around `focus` onto `canvas`.
///
/// Sampling is nearest-neighbour from the unannotated source so the inset
/// shows the paper edge, not the handle covering it. Area beyond the source
/// is dark.
pub fn draw_magnifier_mut(
    canvas: &mut RgbaImage,
    source: &RgbaImage,
    focus: Point,
    zoom: f32,
    radius: f32,
) {
    if !(zoom > 0.0 && radius >= 1.0) {
        return;
    }
    let center = inset_center(canvas.dimensions(), focus, radius);
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    let (sw, sh) = (source.width() as i64, source.height() as i64);
    let r = radius.ceil() as i64;
    let (cx, cy) = (center.x.round() as i64, center.y.round() as i64);

    for oy in -r..=r {
        for ox in -r..=r {
            if ((ox * ox + oy * oy) as f32).sqrt() > radius {
                continue;
            }
            let (tx, ty) = (cx + ox, cy + oy);
            if tx < 0 || ty < 0 || tx >= cw || ty >= ch {
                continue;
            }
            let sx = (focus.x + ox as f32 / zoom).round() as i64;
            let sy = (focus.y + oy as f32 / zoom).round() as i64;
            let pixel = if sx >= 0 && sy >= 0 && sx < sw && sy < sh {
                *source.get_pixel(sx as u32, sy as u32)
            } else {
                BACKDROP
            };
            canvas.put_pixel(tx as u32, ty as u32, pixel);
        }
    }

    let arm = 8.0;
    draw_line_segment_mut(canvas, (center.x - arm, center.y), (center.x + arm, center.y), CROSSHAIR);
    draw_line_segment_mut(canvas, (center.x, center.y - arm), (center.x, center.y + arm), CROSSHAIR);
    draw_hollow_circle_mut(canvas, (cx as i32, cy as i32), r as i32, BORDER);
}
