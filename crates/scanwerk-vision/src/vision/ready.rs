// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-shot readiness signal for the vision adapter.
//
// The UI must not run any capture flow before an adapter exists. Instead of
// polling for it, the initialiser fires a `ReadySignal` exactly once and the
// UI awaits the paired `AdapterReadiness` with a timeout.

use std::sync::Arc;
use std::time::Duration;

use scanwerk_core::config::DetectionOptions;
use scanwerk_core::error::{Result, ScanwerkError};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::SharedAdapter;
use super::imageproc_adapter::ImageprocAdapter;

/// Sending half: fired once the adapter is usable.
pub struct ReadySignal {
    tx: oneshot::Sender<SharedAdapter>,
}

/// Receiving half: resolves to the ready adapter.
pub struct AdapterReadiness {
    rx: oneshot::Receiver<SharedAdapter>,
}

/// Create a linked signal/readiness pair.
pub fn readiness_channel() -> (ReadySignal, AdapterReadiness) {
    let (tx, rx) = oneshot::channel();
    (ReadySignal { tx }, AdapterReadiness { rx })
}

impl ReadySignal {
    /// Hand the adapter to whoever is waiting.
    pub fn ready(self, adapter: SharedAdapter) {
        let name = adapter.name().to_string();
        if self.tx.send(adapter).is_err() {
            debug!(adapter = %name, "nobody waiting for vision adapter readiness");
        } else {
            info!(adapter = %name, "vision adapter ready");
        }
    }
}

impl AdapterReadiness {
    /// Wait up to `timeout` for the adapter.
    ///
    /// Fails with `AdapterTimeout` when the deadline passes, or `Bridge` when
    /// the initialiser was dropped without signalling.
    pub async fn wait(self, timeout: Duration) -> Result<SharedAdapter> {
        match tokio::time::timeout(timeout, self.rx).await {
            Ok(Ok(adapter)) => Ok(adapter),
            Ok(Err(_)) => Err(ScanwerkError::Bridge(
                "vision adapter initialisation was abandoned".into(),
            )),
            Err(_) => {
                warn!(?timeout, "vision adapter readiness timed out");
                Err(ScanwerkError::AdapterTimeout(timeout))
            }
        }
    }
}

/// Build the bundled `imageproc` adapter off the async executor and return
/// its readiness handle. Must be called inside a Tokio runtime.
pub fn spawn_imageproc_adapter(options: DetectionOptions) -> AdapterReadiness {
    let (signal, readiness) = readiness_channel();
    tokio::task::spawn_blocking(move || {
        let adapter: SharedAdapter = Arc::new(ImageprocAdapter::new(options));
        signal.ready(adapter);
    });
    readiness
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawned_adapter_becomes_ready() {
        let readiness = spawn_imageproc_adapter(DetectionOptions::default());
        let adapter = readiness
            .wait(Duration::from_secs(5))
            .await
            .expect("adapter ready");
        assert_eq!(adapter.name(), "imageproc");
    }

    #[tokio::test]
    async fn silent_initialiser_times_out() {
        let (_signal, readiness) = readiness_channel();
        let err = readiness
            .wait(Duration::from_millis(20))
            .await
            .err()
            .expect("should time out");
        assert!(matches!(err, ScanwerkError::AdapterTimeout(_)));
    }

    #[tokio::test]
    async fn dropped_initialiser_is_reported() {
        let (signal, readiness) = readiness_channel();
        drop(signal);
        let err = readiness
            .wait(Duration::from_secs(1))
            .await
            .err()
            .expect("should fail");
        assert!(matches!(err, ScanwerkError::Bridge(_)));
    }
}
