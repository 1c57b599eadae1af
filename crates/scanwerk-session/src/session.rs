// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan sessions and the workbench that holds at most one per capture kind.
//
// State per kind:
//
//   Empty -> Detecting -> Ready -> Editing -> Ready (updated)
//
// A completed capture replaces whatever session of the same kind existed.
// A failed capture leaves the previous session (if any) in place. Only one
// corner editor can be open across both kinds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use scanwerk_core::config::EditorOptions;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{CaptureKind, CornerSet, SessionId, TargetSize};
use scanwerk_vision::{RasterSurface, VisionAdapter};
use tracing::{debug, info, instrument, warn};

use crate::editor::EditorSession;

/// The result of one detect-and-extract cycle.
#[derive(Debug, Clone)]
pub struct ScanSession {
    id: SessionId,
    kind: CaptureKind,
    source: Arc<RasterSurface>,
    highlighted: Option<Arc<RasterSurface>>,
    corners: CornerSet,
    output: Arc<RasterSurface>,
    target: TargetSize,
    created_at: DateTime<Utc>,
    revision: u32,
}

impl ScanSession {
    pub fn new(
        kind: CaptureKind,
        source: RasterSurface,
        highlighted: Option<RasterSurface>,
        corners: CornerSet,
        output: RasterSurface,
        target: TargetSize,
    ) -> Self {
        Self {
            id: SessionId::new(),
            kind,
            source: Arc::new(source),
            highlighted: highlighted.map(Arc::new),
            corners,
            output: Arc::new(output),
            target,
            created_at: Utc::now(),
            revision: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    /// The captured image, kept for re-extraction.
    pub fn source(&self) -> &RasterSurface {
        &self.source
    }

    pub(crate) fn source_arc(&self) -> Arc<RasterSurface> {
        Arc::clone(&self.source)
    }

    /// Source with the detected outline drawn on it (uploads only).
    pub fn highlighted(&self) -> Option<&RasterSurface> {
        self.highlighted.as_deref()
    }

    pub fn corners(&self) -> &CornerSet {
        &self.corners
    }

    /// The extracted, perspective-corrected page.
    pub fn output(&self) -> &RasterSurface {
        &self.output
    }

    pub fn target(&self) -> TargetSize {
        self.target
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of applied corner edits.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Swap in corrected corners and their extraction together.
    fn replace_result(&mut self, corners: CornerSet, output: RasterSurface) {
        self.corners = corners;
        self.output = Arc::new(output);
        self.revision += 1;
    }
}

/// Lifecycle state of one capture kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Detecting,
    Ready,
    Editing,
}

#[derive(Debug, Default)]
struct Slot {
    session: Option<ScanSession>,
    detecting: bool,
}

/// Holds the live upload and camera sessions and the open editor, if any.
#[derive(Debug, Default)]
pub struct Workbench {
    upload: Slot,
    camera: Slot,
    editor: Option<EditorSession>,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: CaptureKind) -> &Slot {
        match kind {
            CaptureKind::Upload => &self.upload,
            CaptureKind::Camera => &self.camera,
        }
    }

    fn slot_mut(&mut self, kind: CaptureKind) -> &mut Slot {
        match kind {
            CaptureKind::Upload => &mut self.upload,
            CaptureKind::Camera => &mut self.camera,
        }
    }

    pub fn session(&self, kind: CaptureKind) -> Option<&ScanSession> {
        self.slot(kind).session.as_ref()
    }

    pub fn state(&self, kind: CaptureKind) -> SessionState {
        let slot = self.slot(kind);
        if slot.detecting {
            return SessionState::Detecting;
        }
        match &slot.session {
            Some(session) if self.editor_targets(session) => SessionState::Editing,
            Some(_) => SessionState::Ready,
            None => SessionState::Empty,
        }
    }

    fn editor_targets(&self, session: &ScanSession) -> bool {
        self.editor
            .as_ref()
            .is_some_and(|ed| ed.session_id() == session.id())
    }

    fn editor_is_stale(&self) -> bool {
        self.editor.as_ref().is_some_and(|ed| {
            self.session(ed.kind())
                .is_none_or(|current| current.id() != ed.session_id())
        })
    }

    /// Mark a capture of `kind` as in progress.
    pub fn begin_capture(&mut self, kind: CaptureKind) {
        debug!(%kind, "Capture started");
        self.slot_mut(kind).detecting = true;
    }

    /// Record the outcome of a capture started with [`Workbench::begin_capture`].
    ///
    /// Success replaces the previous session of that kind. Failure is handed
    /// back unchanged and the previous session stays.
    pub fn finish_capture(
        &mut self,
        kind: CaptureKind,
        outcome: Result<ScanSession>,
    ) -> Result<&ScanSession> {
        let slot = self.slot_mut(kind);
        slot.detecting = false;
        match outcome {
            Ok(session) => {
                if let Some(old) = slot.session.replace(session) {
                    info!(%kind, replaced = %old.id(), "Previous scan replaced");
                }
                let current = slot.session.as_ref().ok_or(ScanwerkError::NoSession(kind))?;
                info!(%kind, session = %current.id(), "Scan ready");
                Ok(current)
            }
            Err(err) => {
                warn!(%kind, error = %err, "Capture failed; no new scan");
                Err(err)
            }
        }
    }

    /// Open the corner editor on the current session of `kind`.
    ///
    /// Fails with `NoSession` when there is nothing to edit and with
    /// `EditorBusy` while another editor is open. An editor left behind by a
    /// replaced session is discarded first.
    pub fn open_editor(&mut self, kind: CaptureKind, options: EditorOptions) -> Result<&mut EditorSession> {
        if self.editor_is_stale() {
            debug!("Discarding editor of a replaced scan");
            self.editor = None;
        }
        if self.editor.is_some() {
            return Err(ScanwerkError::EditorBusy);
        }
        let session = self.session(kind).ok_or(ScanwerkError::NoSession(kind))?;
        let editor = EditorSession::open(session, *session.corners(), options);
        Ok(self.editor.insert(editor))
    }

    pub fn editor(&self) -> Option<&EditorSession> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditorSession> {
        self.editor.as_mut()
    }

    /// Commit the editor's corners: re-extract with them as the override and
    /// replace the session's corners and output.
    ///
    /// On extraction failure the session is untouched and the editor stays
    /// open with its working corners so the user can adjust and retry. If the
    /// session was replaced by a newer capture the editor is closed and
    /// `StaleSession` returned.
    #[instrument(skip_all)]
    pub fn apply_edit(&mut self, adapter: &dyn VisionAdapter) -> Result<&ScanSession> {
        let editor = self.editor.as_ref().ok_or(ScanwerkError::NoEditor)?;
        if self.editor_is_stale() {
            warn!(session = %editor.session_id(), "Edited scan was replaced; dropping edit");
            self.editor = None;
            return Err(ScanwerkError::StaleSession);
        }

        let kind = editor.kind();
        let corners = *editor.working_corners();
        let source = editor.source_arc();
        let target = self
            .session(kind)
            .map(ScanSession::target)
            .ok_or(ScanwerkError::NoSession(kind))?;

        match adapter.extract(&source, target, Some(&corners)) {
            Ok(output) => {
                self.editor = None;
                let session = self
                    .slot_mut(kind)
                    .session
                    .as_mut()
                    .ok_or(ScanwerkError::NoSession(kind))?;
                session.replace_result(corners, output);
                info!(%kind, session = %session.id(), revision = session.revision(), "Corner edit applied");
                Ok(session)
            }
            Err(err) => {
                warn!(%kind, error = %err, "Re-extraction failed; scan unchanged");
                Err(err)
            }
        }
    }

    /// Close the editor and discard its working corners. Returns whether an
    /// editor was open.
    pub fn cancel_edit(&mut self) -> bool {
        match self.editor.take() {
            Some(editor) => {
                debug!(session = %editor.session_id(), "Corner edit cancelled");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::editor::{PointerEvent, PointerKind};
    use image::{Rgba, RgbaImage};
    use scanwerk_core::types::Point;
    use scanwerk_vision::Contour;

    /// Adapter that records extraction overrides and can be told to fail.
    #[derive(Default)]
    struct RecordingAdapter {
        overrides: Mutex<Vec<Option<CornerSet>>>,
        fail_extract: bool,
    }

    impl VisionAdapter for RecordingAdapter {
        fn name(&self) -> &str {
            "recording"
        }

        fn detect_and_highlight(&self, surface: &RasterSurface) -> Result<RasterSurface> {
            Ok(surface.clone())
        }

        fn detect_contour(&self, _surface: &RasterSurface) -> Result<Contour> {
            Err(ScanwerkError::Detection("not used".into()))
        }

        fn corners_from_contour(&self, _contour: &Contour) -> CornerSet {
            CornerSet::from_rect(1.0, 1.0)
        }

        fn extract(
            &self,
            _surface: &RasterSurface,
            target: TargetSize,
            corners: Option<&CornerSet>,
        ) -> Result<RasterSurface> {
            self.overrides.lock().unwrap().push(corners.copied());
            if self.fail_extract {
                return Err(ScanwerkError::Extraction("degenerate".into()));
            }
            RasterSurface::from_rgba(RgbaImage::from_pixel(
                target.width,
                target.height,
                Rgba([1, 2, 3, 255]),
            ))
        }
    }

    fn corners_a() -> CornerSet {
        CornerSet::new(
            Point::new(50.0, 50.0),
            Point::new(350.0, 50.0),
            Point::new(50.0, 250.0),
            Point::new(350.0, 250.0),
        )
    }

    fn scan(kind: CaptureKind) -> ScanSession {
        let source = RasterSurface::from_rgba(RgbaImage::from_pixel(400, 300, Rgba([80, 80, 80, 255])))
            .expect("source");
        let output = RasterSurface::from_rgba(RgbaImage::from_pixel(10, 14, Rgba([0, 0, 0, 255])))
            .expect("output");
        ScanSession::new(kind, source, None, corners_a(), output, TargetSize::new(10, 14))
    }

    fn ready_workbench(kind: CaptureKind) -> Workbench {
        let mut bench = Workbench::new();
        bench.begin_capture(kind);
        bench.finish_capture(kind, Ok(scan(kind))).expect("ready");
        bench
    }

    /// Drag the top-left handle to `to` (displayed at native size).
    fn drag_top_left(editor: &mut EditorSession, to: Point) {
        let shown = (400.0, 300.0);
        editor.handle_pointer(PointerEvent::new(PointerKind::Down, Point::new(50.0, 50.0), shown));
        editor.handle_pointer(PointerEvent::new(PointerKind::Move, to, shown));
        editor.handle_pointer(PointerEvent::new(PointerKind::Up, to, shown));
    }

    #[test]
    fn lifecycle_states() {
        let mut bench = Workbench::new();
        assert_eq!(bench.state(CaptureKind::Upload), SessionState::Empty);
        bench.begin_capture(CaptureKind::Upload);
        assert_eq!(bench.state(CaptureKind::Upload), SessionState::Detecting);
        bench
            .finish_capture(CaptureKind::Upload, Ok(scan(CaptureKind::Upload)))
            .expect("ready");
        assert_eq!(bench.state(CaptureKind::Upload), SessionState::Ready);
        bench
            .open_editor(CaptureKind::Upload, EditorOptions::default())
            .expect("editor");
        assert_eq!(bench.state(CaptureKind::Upload), SessionState::Editing);
        assert_eq!(bench.state(CaptureKind::Camera), SessionState::Empty);
        assert!(bench.cancel_edit());
        assert_eq!(bench.state(CaptureKind::Upload), SessionState::Ready);
    }

    #[test]
    fn failed_first_capture_leaves_slot_empty() {
        let mut bench = Workbench::new();
        bench.begin_capture(CaptureKind::Camera);
        let err = bench
            .finish_capture(CaptureKind::Camera, Err(ScanwerkError::Detection("none".into())))
            .unwrap_err();
        assert!(matches!(err, ScanwerkError::Detection(_)));
        assert_eq!(bench.state(CaptureKind::Camera), SessionState::Empty);
    }

    #[test]
    fn cancel_keeps_original_corners() {
        let mut bench = ready_workbench(CaptureKind::Upload);
        let editor = bench
            .open_editor(CaptureKind::Upload, EditorOptions::default())
            .expect("editor");
        drag_top_left(editor, Point::new(70.0, 80.0));
        assert_eq!(editor.working_corners().top_left, Point::new(70.0, 80.0));

        bench.cancel_edit();
        assert_eq!(*bench.session(CaptureKind::Upload).expect("session").corners(), corners_a());
    }

    #[test]
    fn apply_commits_corners_and_reextracts_with_them() {
        let adapter = RecordingAdapter::default();
        let mut bench = ready_workbench(CaptureKind::Upload);
        let editor = bench
            .open_editor(CaptureKind::Upload, EditorOptions::default())
            .expect("editor");
        drag_top_left(editor, Point::new(70.0, 80.0));
        let expected = *editor.working_corners();

        let session = bench.apply_edit(&adapter).expect("apply");
        assert_eq!(*session.corners(), expected);
        assert_eq!(session.output().dimensions(), (10, 14));
        assert_eq!(session.output().as_rgba().get_pixel(0, 0).0, [1, 2, 3, 255]);
        assert_eq!(session.revision(), 1);
        assert!(bench.editor().is_none());

        let overrides = adapter.overrides.lock().unwrap();
        assert_eq!(overrides.as_slice(), &[Some(expected)]);
    }

    #[test]
    fn failed_apply_keeps_session_and_working_copy() {
        let adapter = RecordingAdapter {
            fail_extract: true,
            ..RecordingAdapter::default()
        };
        let mut bench = ready_workbench(CaptureKind::Camera);
        let before_output = bench.session(CaptureKind::Camera).expect("s").output().clone();
        let editor = bench
            .open_editor(CaptureKind::Camera, EditorOptions::default())
            .expect("editor");
        drag_top_left(editor, Point::new(51.0, 50.5));

        let err = bench.apply_edit(&adapter).unwrap_err();
        assert!(matches!(err, ScanwerkError::Extraction(_)));

        let session = bench.session(CaptureKind::Camera).expect("session");
        assert_eq!(*session.corners(), corners_a());
        assert_eq!(session.output().as_rgba(), before_output.as_rgba());
        assert_eq!(session.revision(), 0);
        let editor = bench.editor().expect("editor still open");
        assert_eq!(editor.working_corners().top_left, Point::new(51.0, 50.5));
    }

    #[test]
    fn only_one_editor_at_a_time() {
        let mut bench = ready_workbench(CaptureKind::Upload);
        bench
            .finish_capture(CaptureKind::Camera, Ok(scan(CaptureKind::Camera)))
            .expect("camera");
        bench
            .open_editor(CaptureKind::Upload, EditorOptions::default())
            .expect("first");
        let err = bench
            .open_editor(CaptureKind::Camera, EditorOptions::default())
            .unwrap_err();
        assert!(matches!(err, ScanwerkError::EditorBusy));
    }

    #[test]
    fn editing_nothing_is_reported() {
        let mut bench = Workbench::new();
        assert!(matches!(
            bench.open_editor(CaptureKind::Camera, EditorOptions::default()),
            Err(ScanwerkError::NoSession(CaptureKind::Camera))
        ));
        assert!(matches!(
            bench.apply_edit(&RecordingAdapter::default()),
            Err(ScanwerkError::NoEditor)
        ));
        assert!(!bench.cancel_edit());
    }

    #[test]
    fn new_capture_replaces_session_and_stales_editor() {
        let adapter = RecordingAdapter::default();
        let mut bench = ready_workbench(CaptureKind::Upload);
        let first_id = bench.session(CaptureKind::Upload).expect("s").id();
        bench
            .open_editor(CaptureKind::Upload, EditorOptions::default())
            .expect("editor");

        bench
            .finish_capture(CaptureKind::Upload, Ok(scan(CaptureKind::Upload)))
            .expect("replacement");
        let second_id = bench.session(CaptureKind::Upload).expect("s").id();
        assert_ne!(first_id, second_id);
        assert_eq!(bench.state(CaptureKind::Upload), SessionState::Ready);

        let err = bench.apply_edit(&adapter).unwrap_err();
        assert!(matches!(err, ScanwerkError::StaleSession));
        assert!(adapter.overrides.lock().unwrap().is_empty());
        assert!(bench.editor().is_none());
    }

    #[test]
    fn replacing_one_kind_leaves_the_other() {
        let mut bench = ready_workbench(CaptureKind::Upload);
        bench
            .finish_capture(CaptureKind::Camera, Ok(scan(CaptureKind::Camera)))
            .expect("camera");
        let upload_id = bench.session(CaptureKind::Upload).expect("u").id();
        bench
            .finish_capture(CaptureKind::Camera, Ok(scan(CaptureKind::Camera)))
            .expect("camera again");
        assert_eq!(bench.session(CaptureKind::Upload).expect("u").id(), upload_id);
    }
}
