// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner editor — direct manipulation of a scan's four corner points.
//
// The editor works on a copy of the session's corners. Pointer events arrive
// in viewport coordinates together with the size the image is displayed at;
// they are remapped into surface pixels on every event, hit-tested against
// the handles, and a grabbed corner follows the pointer until release.
// Committing the copy back to the session is done by the `Workbench`.

pub mod geometry;
pub mod magnifier;
pub mod render;

use std::sync::Arc;

use scanwerk_core::config::EditorOptions;
use scanwerk_core::types::{CaptureKind, Corner, CornerSet, Point, SessionId};
use scanwerk_vision::RasterSurface;
use scanwerk_vision::raster::draw::outline_thickness;
use tracing::{debug, trace};

use self::geometry::{ViewportMapping, hit_test};
use self::magnifier::draw_magnifier_mut;
use self::render::{OverlayStyle, render_overlay};
use crate::session::ScanSession;

/// Magnifier inset radius as a multiple of the handle radius.
const MAGNIFIER_RADIUS_FACTOR: f32 = 3.0;

/// Pointer gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    /// Movement with a button or finger pressed.
    Move,
    /// Movement with nothing pressed. Ends a drag whose release was lost.
    Hover,
    Up,
    Cancel,
}

/// A pointer event as delivered by the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Position relative to the displayed image's top-left corner.
    pub position: Point,
    /// Size the image is currently displayed at.
    pub displayed: (f32, f32),
}

impl PointerEvent {
    pub fn new(kind: PointerKind, position: Point, displayed: (f32, f32)) -> Self {
        Self {
            kind,
            position,
            displayed,
        }
    }
}

/// Whether the view needs repainting after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    /// Nothing visible changed, or intermediate frames are skipped.
    Skip,
    /// Repaint from [`EditorSession::render`].
    Full,
}

/// The corner currently held by the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub corner: Corner,
    /// Pointer position (surface pixels) at grab time.
    pub grab_start: Point,
}

/// Working state of an open corner editor.
pub struct EditorSession {
    session_id: SessionId,
    kind: CaptureKind,
    source: Arc<RasterSurface>,
    original: CornerSet,
    working: CornerSet,
    drag: Option<DragState>,
    options: EditorOptions,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("session_id", &self.session_id)
            .field("kind", &self.kind)
            .field("working", &self.working)
            .field("drag", &self.drag)
            .finish()
    }
}

impl EditorSession {
    /// Open an editor on `session`, starting from `corners` (normally the
    /// session's own).
    pub(crate) fn open(session: &ScanSession, corners: CornerSet, options: EditorOptions) -> Self {
        debug!(session = %session.id(), kind = %session.kind(), "Corner editor opened");
        Self {
            session_id: session.id(),
            kind: session.kind(),
            source: session.source_arc(),
            original: *session.corners(),
            working: corners,
            drag: None,
            options,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn source(&self) -> &RasterSurface {
        &self.source
    }

    pub(crate) fn source_arc(&self) -> Arc<RasterSurface> {
        Arc::clone(&self.source)
    }

    /// The edited corners.
    pub fn working_corners(&self) -> &CornerSet {
        &self.working
    }

    /// Whether the working copy differs from the session's corners.
    pub fn is_modified(&self) -> bool {
        self.working != self.original
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    fn scale(&self) -> f32 {
        self.options.scale_for(self.source.width(), self.source.height())
    }

    /// Handle radius in surface pixels.
    pub fn handle_radius(&self) -> f32 {
        self.options.handle_radius * self.scale()
    }

    /// Grab distance in surface pixels.
    pub fn hit_threshold(&self) -> f32 {
        self.options.hit_threshold * self.scale()
    }

    /// Feed one pointer event through the editor.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Redraw {
        let mapping = ViewportMapping::new(self.source.dimensions(), event.displayed);
        let at = mapping.to_native(event.position);
        match event.kind {
            PointerKind::Down => self.pointer_down(at),
            PointerKind::Move => self.pointer_move(at),
            PointerKind::Up | PointerKind::Cancel | PointerKind::Hover => self.pointer_release(),
        }
    }

    /// Start a drag if `at` (surface pixels) is on a handle.
    pub fn pointer_down(&mut self, at: Point) -> Redraw {
        if self.drag.is_some() {
            // A second pointer while dragging is ignored.
            return Redraw::Skip;
        }
        match hit_test(&self.working, at, self.hit_threshold()) {
            Some(corner) => {
                debug!(%corner, x = at.x, y = at.y, "Corner grabbed");
                self.drag = Some(DragState {
                    corner,
                    grab_start: at,
                });
                Redraw::Full
            }
            None => Redraw::Skip,
        }
    }

    /// Move the grabbed corner to `at` (surface pixels).
    pub fn pointer_move(&mut self, at: Point) -> Redraw {
        let Some(drag) = self.drag else {
            return Redraw::Skip;
        };
        let target = if self.options.clamp_to_surface {
            Point::new(
                at.x.clamp(0.0, self.source.width() as f32),
                at.y.clamp(0.0, self.source.height() as f32),
            )
        } else {
            at
        };
        self.working.set(drag.corner, target);
        trace!(corner = %drag.corner, x = target.x, y = target.y, "Corner moved");

        if self.options.redraw_on_drag {
            Redraw::Full
        } else {
            Redraw::Skip
        }
    }

    /// End the current drag, wherever the pointer is.
    pub fn pointer_release(&mut self) -> Redraw {
        match self.drag.take() {
            Some(drag) => {
                let at = self.working.get(drag.corner);
                debug!(corner = %drag.corner, x = at.x, y = at.y, "Corner released");
                Redraw::Full
            }
            None => Redraw::Skip,
        }
    }

    /// Paint the source with the working corners. While a drag is active the
    /// grabbed handle is highlighted and, when enabled, the magnifier pass runs.
    pub fn render(&self) -> RasterSurface {
        let active = self.drag.map(|d| d.corner);
        let style = OverlayStyle {
            handle_radius: self.handle_radius(),
            line_thickness: outline_thickness(self.source.width(), self.source.height()),
        };
        let mut canvas = render_overlay(self.source.as_rgba(), &self.working, active, style);

        if let (Some(corner), true) = (active, self.options.magnifier_enabled) {
            draw_magnifier_mut(
                &mut canvas,
                self.source.as_rgba(),
                self.working.get(corner),
                self.options.magnifier_zoom,
                self.handle_radius() * MAGNIFIER_RADIUS_FACTOR,
            );
        }
        // Same dimensions as the source, which is never empty.
        RasterSurface::from_rgba(canvas).unwrap_or_else(|_| self.source.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use scanwerk_core::types::TargetSize;

    fn session(width: u32, height: u32) -> ScanSession {
        let source = RasterSurface::from_rgba(RgbaImage::from_pixel(width, height, Rgba([90, 90, 90, 255])))
            .expect("surface");
        let output = RasterSurface::from_rgba(RgbaImage::from_pixel(5, 7, Rgba([255, 255, 255, 255])))
            .expect("output");
        ScanSession::new(
            CaptureKind::Upload,
            source,
            None,
            CornerSet::new(
                Point::new(100.0, 100.0),
                Point::new(700.0, 100.0),
                Point::new(100.0, 500.0),
                Point::new(700.0, 500.0),
            ),
            output,
            TargetSize::new(5, 7),
        )
    }

    fn editor(options: EditorOptions) -> EditorSession {
        let s = session(800, 600);
        EditorSession::open(&s, *s.corners(), options)
    }

    fn at(kind: PointerKind, x: f32, y: f32) -> PointerEvent {
        // Displayed at native size.
        PointerEvent::new(kind, Point::new(x, y), (800.0, 600.0))
    }

    #[test]
    fn drag_moves_only_grabbed_corner() {
        let mut ed = editor(EditorOptions::default());
        let before = *ed.working_corners();

        assert_eq!(ed.handle_pointer(at(PointerKind::Down, 110.0, 95.0)), Redraw::Full);
        assert_eq!(ed.drag().map(|d| d.corner), Some(Corner::TopLeft));
        ed.handle_pointer(at(PointerKind::Move, 150.0, 160.0));
        ed.handle_pointer(at(PointerKind::Move, 160.0, 170.0));
        ed.handle_pointer(at(PointerKind::Up, 999.0, 999.0));

        let after = *ed.working_corners();
        assert_eq!(after.top_left, Point::new(160.0, 170.0));
        assert_eq!(after.top_right, before.top_right);
        assert_eq!(after.bottom_left, before.bottom_left);
        assert_eq!(after.bottom_right, before.bottom_right);
        assert!(ed.drag().is_none());
        assert!(ed.is_modified());
    }

    #[test]
    fn grab_then_cancel_leaves_corners_identical() {
        let mut ed = editor(EditorOptions::default());
        let before = *ed.working_corners();

        ed.handle_pointer(at(PointerKind::Down, 700.0, 500.0));
        assert!(ed.drag().is_some());
        ed.handle_pointer(at(PointerKind::Cancel, 700.0, 500.0));

        assert!(ed.drag().is_none());
        assert_eq!(*ed.working_corners(), before);
        assert!(!ed.is_modified());
    }

    #[test]
    fn quick_tap_then_hover_leaves_corners_alone() {
        let mut ed = editor(EditorOptions::default());
        let before = *ed.working_corners();

        ed.handle_pointer(at(PointerKind::Down, 100.0, 100.0));
        ed.handle_pointer(at(PointerKind::Up, 100.0, 100.0));
        assert!(ed.drag().is_none());
        assert_eq!(ed.handle_pointer(at(PointerKind::Hover, 300.0, 250.0)), Redraw::Skip);
        assert_eq!(ed.handle_pointer(at(PointerKind::Move, 320.0, 260.0)), Redraw::Skip);
        assert_eq!(*ed.working_corners(), before);
    }

    #[test]
    fn hover_without_buttons_ends_a_stale_drag() {
        let mut ed = editor(EditorOptions::default());
        ed.handle_pointer(at(PointerKind::Down, 100.0, 100.0));
        ed.handle_pointer(at(PointerKind::Move, 120.0, 110.0));

        // The release never arrived; the next buttonless move ends the drag
        // without moving the corner.
        assert_eq!(ed.handle_pointer(at(PointerKind::Hover, 400.0, 400.0)), Redraw::Full);
        assert!(ed.drag().is_none());
        assert_eq!(ed.working_corners().top_left, Point::new(120.0, 110.0));

        ed.handle_pointer(at(PointerKind::Move, 500.0, 500.0));
        assert_eq!(ed.working_corners().top_left, Point::new(120.0, 110.0));
    }

    #[test]
    fn captured_drag_follows_pointer_past_the_image_edge() {
        let mut ed = editor(EditorOptions::default());
        // Shown at half size; positions left of and below the displayed image.
        let half = (400.0, 300.0);
        ed.handle_pointer(PointerEvent::new(PointerKind::Down, Point::new(50.0, 250.0), half));
        assert_eq!(ed.drag().map(|d| d.corner), Some(Corner::BottomLeft));
        ed.handle_pointer(PointerEvent::new(PointerKind::Move, Point::new(-20.0, 330.0), half));
        ed.handle_pointer(PointerEvent::new(PointerKind::Up, Point::new(-20.0, 330.0), half));

        assert_eq!(ed.working_corners().bottom_left, Point::new(-40.0, 660.0));
    }

    #[test]
    fn miss_is_not_a_drag() {
        let mut ed = editor(EditorOptions::default());
        assert_eq!(ed.handle_pointer(at(PointerKind::Down, 400.0, 300.0)), Redraw::Skip);
        assert_eq!(ed.handle_pointer(at(PointerKind::Move, 410.0, 310.0)), Redraw::Skip);
        assert!(!ed.is_modified());
    }

    #[test]
    fn pointer_positions_are_remapped_from_viewport() {
        let mut ed = editor(EditorOptions::default());
        // Shown at half size: viewport (350, 250) is surface (700, 500).
        let half = (400.0, 300.0);
        ed.handle_pointer(PointerEvent::new(PointerKind::Down, Point::new(350.0, 250.0), half));
        assert_eq!(ed.drag().map(|d| d.corner), Some(Corner::BottomRight));

        // Layout changes mid-drag; the new size is honoured.
        ed.handle_pointer(PointerEvent::new(PointerKind::Move, Point::new(100.0, 100.0), (200.0, 150.0)));
        assert_eq!(ed.working_corners().bottom_right, Point::new(400.0, 400.0));
    }

    #[test]
    fn corners_may_leave_the_surface_unless_clamped() {
        let mut ed = editor(EditorOptions::default());
        ed.handle_pointer(at(PointerKind::Down, 100.0, 100.0));
        ed.handle_pointer(at(PointerKind::Move, -30.0, -40.0));
        assert_eq!(ed.working_corners().top_left, Point::new(-30.0, -40.0));

        let mut ed = editor(EditorOptions {
            clamp_to_surface: true,
            ..EditorOptions::default()
        });
        ed.handle_pointer(at(PointerKind::Down, 100.0, 100.0));
        ed.handle_pointer(at(PointerKind::Move, -30.0, 900.0));
        assert_eq!(ed.working_corners().top_left, Point::new(0.0, 600.0));
    }

    #[test]
    fn skipped_redraws_still_update_state() {
        let mut ed = editor(EditorOptions {
            redraw_on_drag: false,
            ..EditorOptions::default()
        });
        assert_eq!(ed.handle_pointer(at(PointerKind::Down, 100.0, 100.0)), Redraw::Full);
        assert_eq!(ed.handle_pointer(at(PointerKind::Move, 120.0, 130.0)), Redraw::Skip);
        assert_eq!(ed.working_corners().top_left, Point::new(120.0, 130.0));
        assert_eq!(ed.handle_pointer(at(PointerKind::Up, 120.0, 130.0)), Redraw::Full);
    }

    #[test]
    fn second_grab_during_drag_is_ignored() {
        let mut ed = editor(EditorOptions::default());
        ed.handle_pointer(at(PointerKind::Down, 100.0, 100.0));
        assert_eq!(ed.handle_pointer(at(PointerKind::Down, 700.0, 100.0)), Redraw::Skip);
        assert_eq!(ed.drag().map(|d| d.corner), Some(Corner::TopLeft));
    }

    #[test]
    fn radii_scale_with_large_surfaces() {
        let s = session(3000, 2000);
        let ed = EditorSession::open(&s, *s.corners(), EditorOptions::default());
        assert!((ed.handle_radius() - 60.0).abs() < 1e-3);
        assert!((ed.hit_threshold() - 120.0).abs() < 1e-3);
    }

    #[test]
    fn magnifier_only_while_dragging() {
        let options = EditorOptions {
            magnifier_enabled: true,
            ..EditorOptions::default()
        };
        let mut ed = editor(options.clone());
        let idle = ed.render();

        let mut plain = editor(EditorOptions::default());
        assert_eq!(idle.as_rgba(), plain.render().as_rgba());

        ed.handle_pointer(at(PointerKind::Down, 100.0, 100.0));
        plain.handle_pointer(at(PointerKind::Down, 100.0, 100.0));
        let magnified = ed.render();
        assert_eq!(magnified.dimensions(), (800, 600));
        assert_ne!(magnified.as_rgba(), plain.render().as_rgba());
    }
}
