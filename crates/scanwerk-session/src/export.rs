// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output boundary: PNG bytes for saving, corner JSON for display.

use std::path::{Path, PathBuf};

use scanwerk_core::error::Result;
use scanwerk_core::types::CornerSet;
use tracing::info;

use crate::session::ScanSession;

/// Encode a session's extracted page as PNG.
pub fn output_png(session: &ScanSession) -> Result<Vec<u8>> {
    session.output().to_png_bytes()
}

/// Write a session's extracted page to `path` as PNG.
pub async fn save_output(session: &ScanSession, path: &Path) -> Result<()> {
    let bytes = output_png(session)?;
    tokio::fs::write(path, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "Scan saved");
    Ok(())
}

/// `filename` with a `.png` extension, for the save dialog.
pub fn png_file_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("scanned");
    PathBuf::from(stem)
        .with_extension("png")
        .to_string_lossy()
        .into_owned()
}

/// Pretty-printed corner JSON with `topLeft`, `topRight`, `bottomLeft`,
/// `bottomRight` keys.
pub fn corners_json(corners: &CornerSet) -> Result<String> {
    Ok(serde_json::to_string_pretty(corners)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use scanwerk_core::types::{CaptureKind, Point, TargetSize};
    use scanwerk_vision::RasterSurface;

    fn session() -> ScanSession {
        let source =
            RasterSurface::from_rgba(RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]))).expect("source");
        let output =
            RasterSurface::from_rgba(RgbaImage::from_pixel(5, 7, Rgba([250, 250, 250, 255]))).expect("output");
        ScanSession::new(
            CaptureKind::Upload,
            source,
            None,
            CornerSet::from_rect(20.0, 20.0),
            output,
            TargetSize::new(5, 7),
        )
    }

    #[test]
    fn output_png_decodes_to_target_size() {
        let bytes = output_png(&session()).expect("png");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = RasterSurface::decode(&bytes).expect("decode");
        assert_eq!(decoded.dimensions(), (5, 7));
    }

    #[tokio::test]
    async fn save_writes_png_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scanned.png");
        save_output(&session(), &path).await.expect("save");
        let written = std::fs::read(&path).expect("read back");
        assert_eq!(RasterSurface::decode(&written).expect("decode").width(), 5);
    }

    #[test]
    fn file_name_always_ends_in_png() {
        assert_eq!(png_file_name("scanned.png"), "scanned.png");
        assert_eq!(png_file_name("receipt"), "receipt.png");
        assert_eq!(png_file_name("page.jpg"), "page.png");
        assert_eq!(png_file_name(""), "scanned.png");
    }

    #[test]
    fn corner_json_uses_named_keys() {
        let mut corners = CornerSet::from_rect(10.0, 20.0);
        corners.top_left = Point::new(1.5, 2.5);
        let json = corners_json(&corners).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

        assert_eq!(value["topLeft"]["x"], 1.5);
        assert_eq!(value["topLeft"]["y"], 2.5);
        assert_eq!(value["bottomRight"]["y"], 20.0);
        assert!(json.contains('\n'), "pretty printed");
    }
}
