// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live detection — camera preview with the detected page outlined, and a
// capture button that scans the current frame.
//
// The camera is released when the user stops it and when this page unmounts.

use dioxus::prelude::*;

use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::types::CaptureKind;

use crate::pages::scan_card::{ScanPanel, StatusLine};
use crate::services::app_services::AppServices;
use crate::services::display::data_url;
use crate::state::AppState;

#[component]
pub fn Camera() -> Element {
    let svc = use_context::<AppServices>();
    let mut state = use_context::<Signal<AppState>>();
    let mut running = use_signal(|| false);
    let mut preview_url = use_signal(|| Option::<String>::None);
    let mut capturing = use_signal(|| false);

    use_drop({
        let svc = svc.clone();
        move || svc.stop_camera()
    });

    rsx! {
        div {
            h1 { "Live Detection" }
            p { style: "color: #666;", "Point the camera at a document. The detected page is outlined live." }

            div { style: "display: flex; gap: 8px; margin: 16px 0;",
                if !running() {
                    button {
                        style: "flex: 1; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white;",
                        onclick: {
                            let svc = svc.clone();
                            move |_| {
                                let svc = svc.clone();
                                spawn(async move {
                                    let mut frames = match svc.start_camera().await {
                                        Ok(frames) => frames,
                                        Err(e) => {
                                            state.write().status_message = Some(humanize_error(&e).one_line());
                                            return;
                                        }
                                    };
                                    running.set(true);
                                    state.write().status_message = None;

                                    while frames.changed().await.is_ok() {
                                        let latest = frames.borrow_and_update().clone();
                                        if let Some(frame) = latest {
                                            match data_url(frame.display()) {
                                                Ok(url) => preview_url.set(Some(url)),
                                                Err(e) => tracing::debug!(error = %e, "preview frame not shown"),
                                            }
                                        }
                                    }
                                    // Preview stopped.
                                    running.set(false);
                                    preview_url.set(None);
                                });
                            }
                        },
                        "Start Camera"
                    }
                } else {
                    button {
                        style: "flex: 1; padding: 12px; border-radius: 8px; border: none; background: #34c759; color: white;",
                        disabled: capturing() || state.read().editing.is_some(),
                        onclick: {
                            let svc = svc.clone();
                            move |_| {
                                capturing.set(true);
                                let svc = svc.clone();
                                spawn(async move {
                                    let result = svc.capture_camera().await;
                                    let mut s = state.write();
                                    match result {
                                        Ok(view) => {
                                            s.set_scan(view);
                                            s.status_message = None;
                                        }
                                        Err(e) => s.status_message = Some(humanize_error(&e).one_line()),
                                    }
                                    drop(s);
                                    capturing.set(false);
                                });
                            }
                        },
                        "Capture"
                    }
                    button {
                        style: "flex: 1; padding: 12px; border-radius: 8px; border: 1px solid #ff3b30; color: #ff3b30; background: white;",
                        onclick: {
                            let svc = svc.clone();
                            move |_| {
                                svc.stop_camera();
                                running.set(false);
                                preview_url.set(None);
                            }
                        },
                        "Stop Camera"
                    }
                }
            }

            if let Some(url) = preview_url() {
                img { src: "{url}", style: "width: 100%; border-radius: 8px; background: #000;" }
            }

            StatusLine {}
            ScanPanel { kind: CaptureKind::Camera }
        }
    }
}
