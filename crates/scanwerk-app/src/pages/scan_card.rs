// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan result card shared by the file and camera pages: detected outline,
// extracted page, save, corner editing, and the corner coordinates.

use dioxus::prelude::*;

use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::types::CaptureKind;

use crate::pages::corner_editor::CornerEditor;
use crate::services::app_services::AppServices;
use crate::services::display::ScanView;
use crate::state::AppState;

/// The scan of `kind`, or the corner editor when it is open on that scan.
#[component]
pub fn ScanPanel(kind: CaptureKind) -> Element {
    let state = use_context::<Signal<AppState>>();

    if state.read().editing == Some(kind) {
        return rsx! {
            CornerEditor { kind }
        };
    }
    let view = state.read().scan(kind).cloned();
    match view {
        // A replaced or re-edited scan gets a fresh card.
        Some(view) => rsx! {
            ScanCard { key: "{view.session_id}-{view.revision}", view }
        },
        None => rsx! {
            p { style: "text-align: center; color: #aaa; margin: 48px 0;",
                "No scan yet."
            }
        },
    }
}

#[component]
fn ScanCard(view: ScanView) -> Element {
    let svc = use_context::<AppServices>();
    let mut state = use_context::<Signal<AppState>>();
    let kind = view.kind;
    let (out_w, out_h) = view.output_size;

    rsx! {
        div { style: "border: 1px solid #e0e0e0; border-radius: 12px; padding: 12px; margin-top: 16px;",
            if let Some(url) = view.highlighted_url.clone() {
                h3 { "Detected outline" }
                img { src: "{url}", style: "max-width: 100%; border-radius: 4px;" }
            }

            h3 { "Scanned result ({out_w}\u{00D7}{out_h})" }
            p { style: "color: #888; font-size: 12px; margin: 0 0 8px;",
                "Captured {view.captured_at} UTC"
            }
            img { src: "{view.output_url}", style: "max-width: 100%; border: 1px solid #ccc;" }

            div { style: "display: flex; gap: 8px; margin-top: 12px;",
                button {
                    style: "flex: 1; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white;",
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let Some(path) = rfd::FileDialog::new()
                                .set_file_name(svc.download_file_name())
                                .add_filter("PNG image", &["png"])
                                .save_file()
                            else {
                                return;
                            };
                            let svc = svc.clone();
                            spawn(async move {
                                let msg = match svc.save_scan(kind, path.clone()).await {
                                    Ok(()) => format!("Saved to {}", path.display()),
                                    Err(e) => humanize_error(&e).one_line(),
                                };
                                state.write().status_message = Some(msg);
                            });
                        }
                    },
                    "Save PNG"
                }
                button {
                    style: "flex: 1; padding: 12px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                    onclick: {
                        let svc = svc.clone();
                        move |_| match svc.open_editor(kind) {
                            Ok(()) => {
                                let mut s = state.write();
                                s.editing = Some(kind);
                                s.status_message = None;
                            }
                            Err(e) => {
                                state.write().status_message = Some(humanize_error(&e).one_line());
                            }
                        }
                    },
                    "Edit corners"
                }
            }

            h4 { "Corner points" }
            pre { style: "background: #f6f6f6; padding: 8px; border-radius: 4px; font-size: 12px; overflow-x: auto;",
                "{view.corners_json}"
            }
        }
    }
}

/// Status line for the current page.
#[component]
pub fn StatusLine() -> Element {
    let state = use_context::<Signal<AppState>>();

    rsx! {
        if let Some(ref msg) = state.read().status_message {
            p { style: "margin-top: 12px; color: #666; font-size: 14px; text-align: center;",
                "{msg}"
            }
        }
    }
}
