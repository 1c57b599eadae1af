// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the Dioxus UI to the scanwerk backend crates.
//
// Each service wraps backend APIs in a way that is convenient for the UI to
// call (async-friendly, returns data the UI can display directly).

pub mod app_services;
pub mod display;
