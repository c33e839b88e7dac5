//! Pure Rust dimension probing.
//!
//! | Format | How |
//! |---|---|
//! | JPEG, PNG, GIF, WebP | `image::image_dimensions` (header only) |
//! | AVIF | `avif-parse` container metadata (no AV1 decode) |
//! | SVG | not probed; vector images have no intrinsic pixel size |
//!
//! The `image` crate's `"avif"` feature only enables the encoder, so AVIF
//! headers are read with `avif-parse` instead.

use super::backend::{Dimensions, ImageProbe, ProbeError};
use std::path::Path;

/// Extensions [`RustProbe`] can read dimensions from.
pub const PROBE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif"];

/// Probe backed by the `image` crate and `avif-parse`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustProbe;

impl RustProbe {
    pub fn new() -> Self {
        Self
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Extract dimensions from an AVIF file's container metadata.
fn identify_avif(path: &Path) -> Result<Dimensions, ProbeError> {
    let file_data = std::fs::read(path)?;
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(&file_data)).map_err(|e| {
        ProbeError::Decode(format!("Failed to parse AVIF {}: {e:?}", path.display()))
    })?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        ProbeError::Decode(format!(
            "Failed to read AVIF metadata {}: {e:?}",
            path.display()
        ))
    })?;
    Ok(Dimensions::new(
        meta.max_frame_width.get(),
        meta.max_frame_height.get(),
    ))
}

impl ImageProbe for RustProbe {
    fn identify(&self, path: &Path) -> Result<Dimensions, ProbeError> {
        let ext = extension(path);
        if !PROBE_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ProbeError::Unsupported(path.display().to_string()));
        }
        if ext == "avif" {
            return identify_avif(path);
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            ProbeError::Decode(format!("Failed to read {}: {e}", path.display()))
        })?;
        Ok(Dimensions::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn probes_png_dimensions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("wall.png");
        image::RgbImage::new(40, 25).save(&path).unwrap();

        let dims = RustProbe::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions::new(40, 25));
    }

    #[test]
    fn probes_jpeg_dimensions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("trim.jpg");
        image::RgbImage::new(32, 48).save(&path).unwrap();

        let dims = RustProbe::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions::new(32, 48));
    }

    #[test]
    fn svg_is_unsupported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("logo.svg");
        std::fs::write(&path, "<svg xmlns='http://www.w3.org/2000/svg'/>").unwrap();
        assert!(matches!(
            RustProbe::new().identify(&path),
            Err(ProbeError::Unsupported(_))
        ));
    }

    #[test]
    fn corrupt_avif_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.avif");
        std::fs::write(&path, b"not an avif").unwrap();
        assert!(matches!(
            RustProbe::new().identify(&path),
            Err(ProbeError::Decode(_))
        ));
    }

    #[test]
    fn missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(RustProbe::new().identify(&tmp.path().join("nope.png")).is_err());
    }
}
