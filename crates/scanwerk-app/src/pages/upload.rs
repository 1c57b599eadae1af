// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan from file — pick an image, detect the page, show the outline and the
// extracted result.

use dioxus::prelude::*;

use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::types::CaptureKind;

use crate::pages::scan_card::{ScanPanel, StatusLine};
use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Upload() -> Element {
    let svc = use_context::<AppServices>();
    let mut state = use_context::<Signal<AppState>>();
    let mut processing = use_signal(|| false);
    let target = svc.config().target_size();

    rsx! {
        div {
            h1 { "Scan From File" }
            p { style: "color: #666;",
                "Choose a photo of a document. The page is found, straightened and cropped to {target.width}\u{00D7}{target.height} pixels."
            }

            button {
                style: "width: 100%; padding: 16px; border-radius: 12px; border: 2px dashed #007aff; color: #007aff; background: white; font-size: 16px; margin: 16px 0;",
                disabled: processing() || state.read().editing.is_some(),
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "webp"])
                            .pick_file()
                        else {
                            return;
                        };
                        processing.set(true);
                        state.write().status_message = Some("Detecting document...".into());

                        let svc = svc.clone();
                        spawn(async move {
                            let result = svc.scan_upload(path).await;
                            let mut s = state.write();
                            match result {
                                Ok(view) => {
                                    s.set_scan(view);
                                    s.status_message = None;
                                }
                                Err(e) => {
                                    s.status_message = Some(humanize_error(&e).one_line());
                                }
                            }
                            drop(s);
                            processing.set(false);
                        });
                    }
                },
                "Choose Image"
            }

            StatusLine {}
            ScanPanel { kind: CaptureKind::Upload }
        }
    }
}
