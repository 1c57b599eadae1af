// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paper outline detection — edge map, outer contours, and corner selection.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;
use scanwerk_core::config::DetectionOptions;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{CornerSet, Point};
use tracing::{debug, warn};

/// Find the outline of the largest paper-like region in a grayscale frame.
///
/// ## Pipeline
///
/// 1. Gaussian blur for noise reduction
/// 2. Canny edge detection
/// 3. One-pixel dilation so hairline gaps in the page border close up
/// 4. Trace outer contours of the edge map
/// 5. Keep the contour enclosing the largest area
///
/// Fails with `Detection` when no contour covers at least
/// `options.min_area_ratio` of the frame.
pub fn find_document_contour(gray: &GrayImage, options: &DetectionOptions) -> Result<Vec<Point>> {
    let (width, height) = gray.dimensions();

    let blurred = gaussian_blur_f32(gray, options.blur_sigma);
    let edges = canny(&blurred, options.canny_low, options.canny_high);
    let closed = dilate(&edges, Norm::LInf, 1);
    debug!(width, height, "Edge map computed");

    let contours = find_contours::<i32>(&closed);
    debug!(contour_count = contours.len(), "Contours traced");

    let best = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.points.len() >= 4)
        .map(|c| {
            let points: Vec<Point> = c
                .points
                .iter()
                .map(|p| Point::new(p.x as f32, p.y as f32))
                .collect();
            let area = shoelace_area(&points);
            (area, points)
        })
        .fold(None::<(f32, Vec<Point>)>, |best, candidate| match best {
            Some(current) if current.0 >= candidate.0 => Some(current),
            _ => Some(candidate),
        });

    let frame_area = width as f32 * height as f32;
    let min_area = frame_area * options.min_area_ratio;

    match best {
        Some((area, points)) if area >= min_area => {
            debug!(area, points = points.len(), "Document contour selected");
            Ok(points)
        }
        Some((area, _)) => {
            warn!(area, min_area, "Largest contour too small for a page");
            Err(ScanwerkError::Detection(format!(
                "largest outline covers {:.1}% of the frame",
                100.0 * area / frame_area
            )))
        }
        None => Err(ScanwerkError::Detection("no closed outline in frame".into())),
    }
}

/// Pick the four page corners from a contour.
///
/// The contour's bounding box centre splits the plane into quadrants; in each
/// quadrant the point farthest from the centre becomes that corner. The first
/// such point in contour order wins ties. A quadrant with no points falls back
/// to the matching bounding box corner so the result is always complete.
pub fn corners_from_points(points: &[Point]) -> CornerSet {
    if points.is_empty() {
        return CornerSet::from_rect(0.0, 0.0);
    }

    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let center = Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    // [top-left, top-right, bottom-left, bottom-right]
    let mut picks: [Option<(f32, Point)>; 4] = [None; 4];
    for p in points {
        let slot = match (p.x < center.x, p.y < center.y, p.x > center.x, p.y > center.y) {
            (true, true, _, _) => 0,
            (_, true, true, _) => 1,
            (true, _, _, true) => 2,
            (_, _, true, true) => 3,
            _ => continue,
        };
        let dist = p.distance_to(center);
        match picks[slot] {
            Some((best, _)) if best >= dist => {}
            _ => picks[slot] = Some((dist, *p)),
        }
    }

    let pick = |slot: usize, fallback: Point| picks[slot].map(|(_, p)| p).unwrap_or(fallback);
    CornerSet::new(
        pick(0, Point::new(min_x, min_y)),
        pick(1, Point::new(max_x, min_y)),
        pick(2, Point::new(min_x, max_y)),
        pick(3, Point::new(max_x, max_y)),
    )
}

/// Area of a simple polygon via the shoelace formula. Vertices in order
/// (CW or CCW).
pub fn shoelace_area(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area.abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_polygon_mut;

    fn close_to(actual: Point, expected: (f32, f32), tolerance: f32) -> bool {
        (actual.x - expected.0).abs() <= tolerance && (actual.y - expected.1).abs() <= tolerance
    }

    #[test]
    fn shoelace_area_rectangle() {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(0.0, 5.0),
        ];
        let area = shoelace_area(&corners);
        assert!((area - 50.0).abs() < 1e-3, "Expected 50.0, got {}", area);
    }

    #[test]
    fn blank_frame_has_no_document() {
        let gray = GrayImage::from_pixel(200, 300, Luma([200u8]));
        let err = find_document_contour(&gray, &DetectionOptions::default()).unwrap_err();
        assert!(matches!(err, ScanwerkError::Detection(_)));
    }

    #[test]
    fn tiny_blob_is_rejected() {
        let mut gray = GrayImage::from_pixel(300, 300, Luma([30u8]));
        for y in 140..150 {
            for x in 140..150 {
                gray.put_pixel(x, y, Luma([240u8]));
            }
        }
        let err = find_document_contour(&gray, &DetectionOptions::default()).unwrap_err();
        assert!(matches!(err, ScanwerkError::Detection(_)));
    }

    #[test]
    fn synthetic_page_corners_are_found() {
        let mut gray = GrayImage::from_pixel(400, 500, Luma([30u8]));
        for y in 60..440 {
            for x in 50..350 {
                gray.put_pixel(x, y, Luma([240u8]));
            }
        }

        let contour = find_document_contour(&gray, &DetectionOptions::default()).expect("page");
        let corners = corners_from_points(&contour);

        assert!(close_to(corners.top_left, (50.0, 60.0), 6.0), "{:?}", corners);
        assert!(close_to(corners.top_right, (349.0, 60.0), 6.0), "{:?}", corners);
        assert!(close_to(corners.bottom_left, (50.0, 439.0), 6.0), "{:?}", corners);
        assert!(close_to(corners.bottom_right, (349.0, 439.0), 6.0), "{:?}", corners);
    }

    #[test]
    fn tilted_page_corners_are_found() {
        let mut gray = GrayImage::from_pixel(400, 400, Luma([20u8]));
        let quad = [
            imageproc::point::Point::new(80, 50),
            imageproc::point::Point::new(330, 80),
            imageproc::point::Point::new(310, 350),
            imageproc::point::Point::new(60, 320),
        ];
        draw_polygon_mut(&mut gray, &quad, Luma([235u8]));

        let contour = find_document_contour(&gray, &DetectionOptions::default()).expect("page");
        let corners = corners_from_points(&contour);

        assert!(close_to(corners.top_left, (80.0, 50.0), 8.0), "{:?}", corners);
        assert!(close_to(corners.top_right, (330.0, 80.0), 8.0), "{:?}", corners);
        assert!(close_to(corners.bottom_right, (310.0, 350.0), 8.0), "{:?}", corners);
        assert!(close_to(corners.bottom_left, (60.0, 320.0), 8.0), "{:?}", corners);
    }

    #[test]
    fn corner_selection_is_deterministic() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(5.0, 0.0),
        ];
        assert_eq!(corners_from_points(&points), corners_from_points(&points));
    }

    #[test]
    fn empty_quadrant_falls_back_to_bounding_box() {
        // A triangle has nothing in its bottom-right quadrant.
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        let corners = corners_from_points(&points);
        assert_eq!(corners.top_left, Point::new(0.0, 0.0));
        assert_eq!(corners.bottom_right, Point::new(10.0, 10.0));
    }
}
