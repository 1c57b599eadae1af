// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — owns the workbench, the camera preview, and the
// vision adapter, and exposes async-friendly methods for the Dioxus UI.
//
// Everything is `Arc`-wrapped so the struct can be cloned into event
// handlers and spawned tasks. Locks are only held for bookkeeping; the
// CPU-heavy vision work runs on the blocking pool without them, except for
// re-extraction on apply, which must see a consistent session.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scanwerk_bridge::{PlatformBridge, platform_bridge};
use scanwerk_core::ScannerConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::CaptureKind;
use scanwerk_session::capture::run_capture_blocking;
use scanwerk_session::editor::Redraw;
use scanwerk_session::export::{corners_json, png_file_name, save_output};
use scanwerk_session::frame_source::{CameraSource, load_upload};
use scanwerk_session::preview::{LivePreview, PreviewFrame};
use scanwerk_session::{PointerEvent, ScanSession, Workbench};
use scanwerk_vision::{RasterSurface, SharedAdapter, spawn_imageproc_adapter};
use tokio::sync::{OnceCell, watch};
use tracing::{info, instrument};

use super::display::ScanView;

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
#[derive(Clone)]
pub struct AppServices {
    config: Arc<ScannerConfig>,
    bridge: Arc<dyn PlatformBridge>,
    workbench: Arc<Mutex<Workbench>>,
    adapter: Arc<OnceCell<SharedAdapter>>,
    preview: Arc<Mutex<Option<LivePreview>>>,
}

impl AppServices {
    /// Initialise from `SCANWERK_*` environment overrides.
    pub fn init() -> Result<Self> {
        Ok(Self::with_config(ScannerConfig::from_env()?))
    }

    /// Services with default settings, used when the environment is invalid.
    pub fn fallback() -> Self {
        Self::with_config(ScannerConfig::default())
    }

    fn with_config(config: ScannerConfig) -> Self {
        let bridge: Arc<dyn PlatformBridge> = Arc::from(platform_bridge(&config));
        info!(
            platform = bridge.platform_name(),
            target_w = config.target_width,
            target_h = config.target_height,
            "app services initialised"
        );
        Self {
            config: Arc::new(config),
            bridge,
            workbench: Arc::new(Mutex::new(Workbench::new())),
            adapter: Arc::new(OnceCell::new()),
            preview: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    fn workbench(&self) -> MutexGuard<'_, Workbench> {
        self.workbench.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn preview_slot(&self) -> MutexGuard<'_, Option<LivePreview>> {
        self.preview.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- Vision adapter ------------------------------------------------------

    /// The ready vision adapter, initialising it on first use.
    ///
    /// A timed-out initialisation is retried on the next call.
    pub async fn adapter(&self) -> Result<SharedAdapter> {
        let adapter = self
            .adapter
            .get_or_try_init(|| async {
                spawn_imageproc_adapter(self.config.detection.clone())
                    .wait(self.config.adapter_ready_timeout())
                    .await
            })
            .await?;
        Ok(Arc::clone(adapter))
    }

    // -- Capture -------------------------------------------------------------

    /// Decode an image file, detect the page, and extract it.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn scan_upload(&self, path: PathBuf) -> Result<ScanView> {
        self.workbench().begin_capture(CaptureKind::Upload);
        let outcome = async {
            let adapter = self.adapter().await?;
            let source = load_upload(path).await?;
            run_capture_blocking(adapter, CaptureKind::Upload, source, self.config.target_size()).await
        }
        .await;
        self.finish_capture(CaptureKind::Upload, outcome)
    }

    /// Detect and extract the page in the latest raw camera frame.
    #[instrument(skip(self))]
    pub async fn capture_camera(&self) -> Result<ScanView> {
        let frame = self.preview_slot().as_ref().and_then(LivePreview::latest_raw);
        let Some(frame) = frame else {
            return Err(ScanwerkError::NoFrame);
        };

        self.workbench().begin_capture(CaptureKind::Camera);
        let outcome = async {
            let adapter = self.adapter().await?;
            let source = frame.as_ref().clone();
            run_capture_blocking(adapter, CaptureKind::Camera, source, self.config.target_size()).await
        }
        .await;
        self.finish_capture(CaptureKind::Camera, outcome)
    }

    fn finish_capture(&self, kind: CaptureKind, outcome: Result<ScanSession>) -> Result<ScanView> {
        let mut bench = self.workbench();
        let session = bench.finish_capture(kind, outcome)?;
        ScanView::from_session(session)
    }

    // -- Camera --------------------------------------------------------------

    /// Open the camera and start the live preview. Returns a receiver of
    /// preview frames; it closes when the preview stops.
    pub async fn start_camera(&self) -> Result<watch::Receiver<Option<PreviewFrame>>> {
        let adapter = self.adapter().await?;
        let mut slot = self.preview_slot();
        if let Some(preview) = slot.as_ref().filter(|p| p.is_running()) {
            return Ok(preview.subscribe());
        }

        let stream = self.bridge.open_camera(self.config.camera_facing)?;
        let preview = LivePreview::start(
            Box::new(CameraSource::new(stream)),
            adapter,
            self.config.preview_interval(),
        );
        let frames = preview.subscribe();
        *slot = Some(preview);
        Ok(frames)
    }

    /// Stop the preview and release the camera. Safe to call when stopped.
    pub fn stop_camera(&self) {
        if let Some(mut preview) = self.preview_slot().take() {
            preview.stop();
        }
    }

    // -- Corner editor -------------------------------------------------------

    /// Open the editor on the current scan of `kind`.
    pub fn open_editor(&self, kind: CaptureKind) -> Result<()> {
        self.workbench().open_editor(kind, self.config.editor.clone())?;
        Ok(())
    }

    /// Which scan the editor is open on, if any.
    pub fn editing(&self) -> Option<CaptureKind> {
        self.workbench().editor().map(|ed| ed.kind())
    }

    /// Current editor rendering.
    pub fn render_editor(&self) -> Option<RasterSurface> {
        self.workbench().editor().map(|ed| ed.render())
    }

    /// Working corners of the open editor as JSON.
    pub fn editor_corners_json(&self) -> Option<String> {
        let bench = self.workbench();
        let editor = bench.editor()?;
        corners_json(editor.working_corners()).ok()
    }

    /// Whether the open editor's corners differ from the scan's.
    pub fn editor_modified(&self) -> bool {
        self.workbench().editor().is_some_and(|ed| ed.is_modified())
    }

    /// Feed a pointer event to the editor. Returns a fresh rendering when the
    /// view should repaint.
    pub fn editor_pointer(&self, event: PointerEvent) -> Option<RasterSurface> {
        let mut bench = self.workbench();
        let editor = bench.editor_mut()?;
        match editor.handle_pointer(event) {
            Redraw::Full => Some(editor.render()),
            Redraw::Skip => None,
        }
    }

    /// Re-extract with the edited corners and commit them.
    pub async fn apply_edit(&self) -> Result<ScanView> {
        let adapter = self.adapter().await?;
        let workbench = Arc::clone(&self.workbench);
        tokio::task::spawn_blocking(move || {
            let mut bench = workbench.lock().unwrap_or_else(PoisonError::into_inner);
            let session = bench.apply_edit(adapter.as_ref())?;
            ScanView::from_session(session)
        })
        .await
        .map_err(|e| ScanwerkError::Extraction(format!("apply task failed: {e}")))?
    }

    /// Discard the editor's working corners.
    pub fn cancel_edit(&self) {
        self.workbench().cancel_edit();
    }

    // -- Output --------------------------------------------------------------

    /// File name offered in the save dialog.
    pub fn download_file_name(&self) -> String {
        png_file_name(&self.config.download_filename)
    }

    /// Write the extracted page of the current `kind` scan to `path`.
    pub async fn save_scan(&self, kind: CaptureKind, path: PathBuf) -> Result<()> {
        let session = self
            .workbench()
            .session(kind)
            .cloned()
            .ok_or(ScanwerkError::NoSession(kind))?;
        save_output(&session, &path).await
    }
}
