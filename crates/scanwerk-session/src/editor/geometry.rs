// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Viewport-to-surface coordinate mapping and corner hit-testing.

use scanwerk_core::types::{Corner, CornerSet, Point};

/// Relation between a surface's native pixel size and the size it is
/// currently displayed at.
///
/// Built fresh for every pointer event; the displayed size changes with
/// window resizes and zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMapping {
    native_width: f32,
    native_height: f32,
    displayed_width: f32,
    displayed_height: f32,
}

impl ViewportMapping {
    pub fn new(native: (u32, u32), displayed: (f32, f32)) -> Self {
        Self {
            native_width: native.0 as f32,
            native_height: native.1 as f32,
            displayed_width: displayed.0,
            displayed_height: displayed.1,
        }
    }

    /// Map a viewport position to native surface pixels:
    /// `(px * nw / dw, py * nh / dh)`.
    ///
    /// An axis with an unusable displayed extent (zero, negative, NaN) is
    /// treated as shown at 1:1.
    pub fn to_native(&self, viewport: Point) -> Point {
        Point::new(
            scale_axis(viewport.x, self.native_width, self.displayed_width),
            scale_axis(viewport.y, self.native_height, self.displayed_height),
        )
    }
}

fn scale_axis(value: f32, to: f32, from: f32) -> f32 {
    if from.is_finite() && from > 0.0 && to.is_finite() && to > 0.0 {
        value * to / from
    } else {
        value
    }
}

/// The corner closest to `at`, if it lies strictly within `threshold`.
///
/// Corners are visited in [`Corner::ALL`] order and only a strictly smaller
/// distance replaces the current pick, so equidistant corners resolve to the
/// one listed first.
pub fn hit_test(corners: &CornerSet, at: Point, threshold: f32) -> Option<Corner> {
    let mut best: Option<(Corner, f32)> = None;
    for (corner, point) in corners.iter() {
        let distance = point.distance_to(at);
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((corner, distance)),
        }
    }
    best.filter(|(_, d)| *d < threshold).map(|(corner, _)| corner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_maps_by_size_ratio() {
        // 1000x800 surface shown at 500x200.
        let mapping = ViewportMapping::new((1000, 800), (500.0, 200.0));
        assert_eq!(mapping.to_native(Point::new(100.0, 50.0)), Point::new(200.0, 200.0));
        assert_eq!(mapping.to_native(Point::new(0.0, 0.0)), Point::new(0.0, 0.0));
    }

    #[test]
    fn collapsed_viewport_falls_back_to_identity() {
        let mapping = ViewportMapping::new((640, 480), (0.0, f32::NAN));
        assert_eq!(mapping.to_native(Point::new(12.0, 34.0)), Point::new(12.0, 34.0));
    }

    #[test]
    fn exact_corner_position_selects_that_corner() {
        let corners = CornerSet::new(
            Point::new(10.0, 12.0),
            Point::new(90.0, 8.0),
            Point::new(14.0, 95.0),
            Point::new(88.0, 91.0),
        );
        for (corner, point) in corners.iter() {
            assert_eq!(hit_test(&corners, point, 5.0), Some(corner));
        }
    }

    #[test]
    fn equidistant_corners_resolve_in_iteration_order() {
        // Symmetric square; (50, 0) is 50 px from both top corners.
        let corners = CornerSet::from_rect(100.0, 100.0);
        let pick = hit_test(&corners, Point::new(50.0, 0.0), 60.0);
        assert_eq!(pick, Some(Corner::TopLeft));

        // (100, 50) is equidistant from the two right-hand corners.
        let pick = hit_test(&corners, Point::new(100.0, 50.0), 60.0);
        assert_eq!(pick, Some(Corner::TopRight));
    }

    #[test]
    fn miss_outside_threshold() {
        let corners = CornerSet::from_rect(100.0, 100.0);
        assert_eq!(hit_test(&corners, Point::new(50.0, 50.0), 40.0), None);
        // Distance exactly equal to the threshold is not a hit.
        assert_eq!(hit_test(&corners, Point::new(30.0, 0.0), 30.0), None);
    }
}
