// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective extraction — map a document quadrilateral onto an upright
// rectangle of a fixed size.

use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{CornerSet, Corner, Point, TargetSize};
use tracing::{debug, info};

/// Corners closer than this (in pixels) count as the same point.
const MIN_CORNER_SEPARATION: f32 = 1.0;

/// Triangles with less area than this (in square pixels) count as collinear.
const MIN_TRIANGLE_AREA: f32 = 1.0;

/// Fill colour for output pixels that sample outside the source image.
const OUTSIDE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Reject quadrilaterals a projective transform cannot map sensibly.
///
/// Fails with `Extraction` if any coordinate is not finite, if two corners
/// coincide, or if any three corners are collinear.
pub fn check_quadrilateral(corners: &CornerSet) -> Result<()> {
    for (name, p) in corners.iter() {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(ScanwerkError::Extraction(format!(
                "{name} corner has a non-finite coordinate"
            )));
        }
    }

    let named: Vec<(Corner, Point)> = corners.iter().collect();
    for i in 0..named.len() {
        for j in (i + 1)..named.len() {
            if named[i].1.distance_to(named[j].1) < MIN_CORNER_SEPARATION {
                return Err(ScanwerkError::Extraction(format!(
                    "{} and {} corners coincide",
                    named[i].0, named[j].0
                )));
            }
        }
    }

    let outline = corners.outline();
    for skip in 0..outline.len() {
        let tri: Vec<Point> = outline
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, p)| *p)
            .collect();
        if triangle_area(tri[0], tri[1], tri[2]) < MIN_TRIANGLE_AREA {
            return Err(ScanwerkError::Extraction(
                "three of the corners lie on one line".into(),
            ));
        }
    }

    Ok(())
}

/// Warp the quadrilateral `corners` of `source` onto a `target`-sized image.
///
/// Corners map top-left → (0, 0), top-right → (w, 0), bottom-right → (w, h),
/// bottom-left → (0, h). Samples falling outside `source` are white.
pub fn warp_quadrilateral(
    source: &RgbaImage,
    corners: &CornerSet,
    target: TargetSize,
) -> Result<RgbaImage> {
    if target.width == 0 || target.height == 0 {
        return Err(ScanwerkError::Extraction(format!(
            "target size {}x{} has no area",
            target.width, target.height
        )));
    }
    check_quadrilateral(corners)?;

    let (out_w, out_h) = (target.width as f32, target.height as f32);
    let dest: [(f32, f32); 4] = [
        (0.0, 0.0),     // top-left
        (out_w, 0.0),   // top-right
        (out_w, out_h), // bottom-right
        (0.0, out_h),   // bottom-left
    ];
    let outline = corners.outline();
    let src: [(f32, f32); 4] = [
        outline[0].as_tuple(),
        outline[1].as_tuple(),
        outline[2].as_tuple(),
        outline[3].as_tuple(),
    ];

    // from_control_points computes the mapping from `src` to `dest`.
    let projection = Projection::from_control_points(src, dest).ok_or_else(|| {
        ScanwerkError::Extraction("corners do not define an invertible projection".into())
    })?;
    debug!(?src, out_w, out_h, "Projection computed");

    let mut output = RgbaImage::new(target.width, target.height);
    warp_into(source, &projection, Interpolation::Bilinear, OUTSIDE_FILL, &mut output);

    info!(out_w = target.width, out_h = target.height, "Perspective extraction applied");
    Ok(output)
}

fn triangle_area(a: Point, b: Point, c: Point) -> f32 {
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() / 2.0
}
