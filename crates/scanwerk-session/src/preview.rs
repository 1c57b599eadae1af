// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live preview loop — periodically samples a frame source, highlights the
// detected paper, and publishes the result.
//
// Ticks never overlap: each tick awaits its own detection before the next
// one is considered, and ticks that fall due while a slow detection is still
// running are skipped. The latest result is published through a `watch`
// channel, so a slow consumer only ever sees the newest frame.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use scanwerk_core::error::ScanwerkError;
use scanwerk_vision::{RasterSurface, SharedAdapter, VisionAdapter};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::frame_source::FrameSource;

/// One published preview tick.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    /// 1-based tick number.
    pub tick: u64,
    /// The frame as sampled.
    pub raw: Arc<RasterSurface>,
    /// The frame with the paper outline, when detection succeeded.
    pub annotated: Option<Arc<RasterSurface>>,
}

impl PreviewFrame {
    /// What to show: the annotated frame if there is one, else the raw frame.
    pub fn display(&self) -> &RasterSurface {
        self.annotated.as_deref().unwrap_or(&self.raw)
    }
}

type SharedSource = Arc<Mutex<Box<dyn FrameSource>>>;

/// Shortest accepted sampling period; `tokio::time::interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A running preview over one frame source.
///
/// The loop owns the frame source. [`LivePreview::stop`] halts the timer and
/// releases the source synchronously; results of a detection still running
/// at that moment are discarded. Dropping the preview stops it.
pub struct LivePreview {
    source: SharedSource,
    stopped: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    frames: watch::Receiver<Option<PreviewFrame>>,
}

impl LivePreview {
    /// Start sampling every `period` (at least 1 ms). Must be called inside a
    /// Tokio runtime.
    pub fn start(source: Box<dyn FrameSource>, adapter: SharedAdapter, period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let source: SharedSource = Arc::new(Mutex::new(source));
        let stopped = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU64::new(0));
        let (tx, rx) = watch::channel(None);

        let task = tokio::spawn(run_loop(
            Arc::clone(&source),
            adapter,
            period,
            Arc::clone(&stopped),
            Arc::clone(&ticks),
            tx,
        ));
        info!(period_ms = period.as_millis() as u64, "Live preview started");

        Self {
            source,
            stopped,
            ticks,
            task: Some(task),
            frames: rx,
        }
    }

    /// Receiver that yields every newly published frame.
    pub fn subscribe(&self) -> watch::Receiver<Option<PreviewFrame>> {
        self.frames.clone()
    }

    /// The most recently published frame.
    pub fn latest(&self) -> Option<PreviewFrame> {
        self.frames.borrow().clone()
    }

    /// The most recent unannotated frame, for snapshot capture.
    pub fn latest_raw(&self) -> Option<Arc<RasterSurface>> {
        self.frames.borrow().as_ref().map(|f| Arc::clone(&f.raw))
    }

    /// Ticks run so far, including failed ones.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    /// Stop the timer and release the frame source. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.source
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop();
        info!(ticks = self.ticks(), "Live preview stopped");
    }
}

impl Drop for LivePreview {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(
    source: SharedSource,
    adapter: SharedAdapter,
    period: Duration,
    stopped: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    tx: watch::Sender<Option<PreviewFrame>>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        if stopped.load(Ordering::SeqCst) {
            break;
        }
        let tick = ticks.fetch_add(1, Ordering::SeqCst) + 1;

        let source = Arc::clone(&source);
        let adapter = Arc::clone(&adapter);
        let halted = Arc::clone(&stopped);
        let outcome =
            tokio::task::spawn_blocking(move || run_tick(&source, adapter.as_ref(), &halted)).await;

        // A stop during the tick wins over its result.
        if stopped.load(Ordering::SeqCst) {
            break;
        }

        let (raw, annotated) = match outcome {
            Ok(Ok(pair)) => pair,
            Ok(Err(err)) => {
                warn!(tick, error = %err, "Preview frame unavailable");
                continue;
            }
            Err(join) => {
                warn!(tick, error = %join, "Preview tick aborted");
                continue;
            }
        };
        let frame = PreviewFrame {
            tick,
            raw: Arc::new(raw),
            annotated: annotated.map(Arc::new),
        };
        if tx.send(Some(frame)).is_err() {
            debug!("No preview subscribers left");
        }
    }
}

/// Grab a frame and try to highlight it. Only a frame grab failure is an
/// error; a detection miss yields the raw frame alone.
fn run_tick(
    source: &Mutex<Box<dyn FrameSource>>,
    adapter: &dyn VisionAdapter,
    stopped: &AtomicBool,
) -> Result<(RasterSurface, Option<RasterSurface>), ScanwerkError> {
    let raw = {
        let mut source = source.lock().unwrap_or_else(PoisonError::into_inner);
        // `stop` flags before it takes the lock, so no grab follows a release.
        if stopped.load(Ordering::SeqCst) {
            return Err(ScanwerkError::Bridge("preview stopped".into()));
        }
        source.next_surface()?
    };
    match adapter.detect_and_highlight(&raw) {
        Ok(annotated) => Ok((raw, Some(annotated))),
        Err(err) => {
            debug!(error = %err, "No paper in preview frame");
            Ok((raw, None))
        }
    }
}
