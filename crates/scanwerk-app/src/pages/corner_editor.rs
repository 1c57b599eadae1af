// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner editor view — shows the editor rendering and forwards pointer
// events to the backend editor.
//
// Pointer positions are taken relative to the image element and sent with
// the size the element is currently displayed at, which is kept up to date
// from mount and resize events. Every event is forwarded in arrival order.
// The pointer is captured for the length of a drag so positions beyond the
// image edge still reach the editor.

use std::rc::Rc;

use dioxus::prelude::*;

use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::types::{CaptureKind, Corner, Point};
use scanwerk_session::{PointerEvent as EditorPointer, PointerKind};

use crate::services::app_services::AppServices;
use crate::services::display::data_url;
use crate::state::AppState;

const IMAGE_ID: &str = "scanwerk-corner-image";

fn rendered_url(svc: &AppServices) -> Option<String> {
    let surface = svc.render_editor()?;
    match data_url(&surface) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(error = %e, "editor frame could not be encoded");
            None
        }
    }
}

#[component]
pub fn CornerEditor(kind: CaptureKind) -> Element {
    let svc = use_context::<AppServices>();
    let mut state = use_context::<Signal<AppState>>();
    let mut frame = use_signal({
        let svc = svc.clone();
        move || rendered_url(&svc)
    });
    let mut corners = use_signal({
        let svc = svc.clone();
        move || svc.editor_corners_json()
    });
    let mut displayed = use_signal(|| (0.0f32, 0.0f32));
    let mut modified = use_signal({
        let svc = svc.clone();
        move || svc.editor_modified()
    });
    let mut applying = use_signal(|| false);

    let dispatch = {
        let svc = svc.clone();
        move |phase: PointerKind, at: Point| {
            let event = EditorPointer::new(phase, at, displayed());
            if let Some(surface) = svc.editor_pointer(event) {
                match data_url(&surface) {
                    Ok(url) => frame.set(Some(url)),
                    Err(e) => tracing::warn!(error = %e, "editor frame could not be encoded"),
                }
                corners.set(svc.editor_corners_json());
                modified.set(svc.editor_modified());
            }
        }
    };

    let legend = Corner::ALL
        .iter()
        .map(|c| format!("{} = {}", c.label(), c))
        .collect::<Vec<_>>()
        .join(", ");

    rsx! {
        div { style: "border: 2px solid #007aff; border-radius: 12px; padding: 12px; margin-top: 16px;",
            h3 { "Adjust corners of the {kind} scan" }
            p { style: "color: #666; font-size: 13px;",
                "Drag a handle onto the page corner. {legend}."
            }

            if let Some(url) = frame() {
                img {
                    src: "{url}",
                    draggable: "false",
                    style: "width: 100%; touch-action: none; user-select: none; cursor: crosshair;",
                    id: IMAGE_ID,
                    onmounted: move |evt: MountedEvent| {
                        let mounted: Rc<MountedData> = evt.data();
                        spawn(async move {
                            if let Ok(rect) = mounted.get_client_rect().await {
                                displayed.set((rect.width() as f32, rect.height() as f32));
                            }
                        });
                    },
                    onresize: move |evt: ResizeEvent| {
                        if let Ok(size) = evt.get_content_box_size() {
                            displayed.set((size.width as f32, size.height as f32));
                        }
                    },
                    onpointerdown: {
                        let mut dispatch = dispatch.clone();
                        move |evt: PointerEvent| {
                            let p = evt.element_coordinates();
                            dispatch(PointerKind::Down, Point::new(p.x as f32, p.y as f32));
                            let _ = document::eval(&format!(
                                "try {{ document.getElementById('{IMAGE_ID}').setPointerCapture({}); }} catch (e) {{}}",
                                evt.pointer_id()
                            ));
                        }
                    },
                    onpointermove: {
                        let mut dispatch = dispatch.clone();
                        move |evt: PointerEvent| {
                            let p = evt.element_coordinates();
                            let phase = if evt.held_buttons().is_empty() {
                                PointerKind::Hover
                            } else {
                                PointerKind::Move
                            };
                            dispatch(phase, Point::new(p.x as f32, p.y as f32));
                        }
                    },
                    onpointerup: {
                        let mut dispatch = dispatch.clone();
                        move |evt: PointerEvent| {
                            let p = evt.element_coordinates();
                            dispatch(PointerKind::Up, Point::new(p.x as f32, p.y as f32));
                        }
                    },
                    onpointercancel: {
                        let mut dispatch = dispatch.clone();
                        move |evt: PointerEvent| {
                            let p = evt.element_coordinates();
                            dispatch(PointerKind::Cancel, Point::new(p.x as f32, p.y as f32));
                        }
                    },
                }
            }

            if let Some(json) = corners() {
                pre { style: "background: #f6f6f6; padding: 8px; border-radius: 4px; font-size: 12px;",
                    "{json}"
                }
            }

            div { style: "display: flex; gap: 8px; margin-top: 12px;",
                button {
                    style: "flex: 1; padding: 12px; border-radius: 8px; border: none; background: #34c759; color: white;",
                    disabled: applying() || !modified(),
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            applying.set(true);
                            let svc = svc.clone();
                            spawn(async move {
                                let result = svc.apply_edit().await;
                                let mut s = state.write();
                                match result {
                                    Ok(view) => {
                                        s.set_scan(view);
                                        s.status_message = Some("Corners applied.".into());
                                    }
                                    Err(e) => {
                                        tracing::warn!(error = %e, "apply failed");
                                        s.status_message = Some(humanize_error(&e).one_line());
                                    }
                                }
                                s.editing = svc.editing();
                                drop(s);
                                applying.set(false);
                            });
                        }
                    },
                    "Apply"
                }
                button {
                    style: "flex: 1; padding: 12px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                    disabled: applying(),
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            svc.cancel_edit();
                            let mut s = state.write();
                            s.editing = None;
                            s.status_message = None;
                        }
                    },
                    "Cancel"
                }
            }
        }
    }
}
