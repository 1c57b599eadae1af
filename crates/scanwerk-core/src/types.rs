// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Scanwerk.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A position in the pixel space of one raster surface (not screen pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Tuple form used by `imageproc` projections and drawing helpers.
    pub fn as_tuple(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// One of the four named document corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All corners in their canonical iteration order.
    ///
    /// Hit-testing walks this order and keeps the first strict minimum, so a
    /// tie between two corners resolves to the one listed first here.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Short label drawn next to a handle.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TopLeft => "TL",
            Self::TopRight => "TR",
            Self::BottomLeft => "BL",
            Self::BottomRight => "BR",
        }
    }
}

impl std::fmt::Display for Corner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        };
        f.write_str(name)
    }
}

/// Exactly four named points describing a document quadrilateral.
///
/// No ordering or convexity constraint is enforced here; degenerate shapes are
/// rejected by extraction instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerSet {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl CornerSet {
    pub fn new(top_left: Point, top_right: Point, bottom_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// Axis-aligned rectangle covering `(0, 0)`..`(width, height)`.
    pub fn from_rect(width: f32, height: f32) -> Self {
        Self::new(
            Point::new(0.0, 0.0),
            Point::new(width, 0.0),
            Point::new(0.0, height),
            Point::new(width, height),
        )
    }

    pub fn get(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
        }
    }

    /// Overwrite a single corner, leaving the other three untouched.
    pub fn set(&mut self, corner: Corner, point: Point) {
        match corner {
            Corner::TopLeft => self.top_left = point,
            Corner::TopRight => self.top_right = point,
            Corner::BottomLeft => self.bottom_left = point,
            Corner::BottomRight => self.bottom_right = point,
        }
    }

    /// Iterate `(name, point)` pairs in [`Corner::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Corner, Point)> + '_ {
        Corner::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Points in outline order: top-left, top-right, bottom-right, bottom-left.
    ///
    /// This is the winding used for drawing the closed quadrilateral and for
    /// mapping onto the output rectangle.
    pub fn outline(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// Which capture flow produced a scan. At most one live session per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureKind {
    /// A still image chosen from disk.
    Upload,
    /// A snapshot of the live camera feed.
    Camera,
}

impl std::fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload => f.write_str("uploaded"),
            Self::Camera => f.write_str("camera"),
        }
    }
}

/// Requested camera orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    /// Rear camera, pointed away from the user.
    #[default]
    Environment,
    /// Front camera.
    User,
}

/// Output rectangle size for perspective extraction, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        Self::new(500, 700)
    }
}

/// Unique identifier for a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_only_touches_named_corner() {
        let mut corners = CornerSet::from_rect(100.0, 50.0);
        let before = corners;
        corners.set(Corner::BottomLeft, Point::new(-5.0, 70.0));

        assert_eq!(corners.bottom_left, Point::new(-5.0, 70.0));
        assert_eq!(corners.top_left, before.top_left);
        assert_eq!(corners.top_right, before.top_right);
        assert_eq!(corners.bottom_right, before.bottom_right);
    }

    #[test]
    fn outline_winds_clockwise_from_top_left() {
        let corners = CornerSet::from_rect(10.0, 20.0);
        let outline = corners.outline();
        assert_eq!(outline[0], Point::new(0.0, 0.0));
        assert_eq!(outline[1], Point::new(10.0, 0.0));
        assert_eq!(outline[2], Point::new(10.0, 20.0));
        assert_eq!(outline[3], Point::new(0.0, 20.0));
    }

    #[test]
    fn corner_set_serializes_with_camel_case_names() {
        let corners = CornerSet::from_rect(1.0, 2.0);
        let json = serde_json::to_value(corners).expect("serialize");
        assert_eq!(json["topLeft"]["x"], 0.0);
        assert_eq!(json["bottomRight"]["y"], 2.0);
        assert!(json.get("bottomLeft").is_some());
        assert!(json.get("topRight").is_some());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-6);
    }
}
