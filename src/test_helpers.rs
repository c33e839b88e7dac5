//! Shared test utilities for the lazyframe test suite.
//!
//! Fixture builders that lay out an assets directory in a temp dir, plus
//! lookup helpers over scan-stage data.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! touch_all(tmp.path(), &["001-hero.jpg", "001-hero.avif"]);
//! let manifest = scan_with(tmp.path(), &probe).unwrap();
//!
//! let hero = find_image(&manifest, "001-hero.jpg");
//! assert_eq!(alt_texts(&manifest), vec!["hero"]);
//! ```

use std::fs;
use std::path::Path;

use crate::types::{Manifest, ScannedImage};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create empty files (and their parent directories) under `root`.
///
/// Contents don't matter when dimensions come from a `MockProbe`.
pub fn touch_all(root: &Path, rel_paths: &[&str]) {
    for rel in rel_paths {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"").unwrap();
    }
}

/// Write a real image of the given size; the format follows the extension.
pub fn write_image(root: &Path, rel: &str, width: u32, height: u32) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 180, 160]))
        .save(&path)
        .unwrap_or_else(|e| panic!("failed to write fixture {rel}: {e}"));
}

// =========================================================================
// Manifest lookups. These panic with a clear message on a miss.
// =========================================================================

/// Find an image by its source path. Panics if not found.
pub fn find_image<'a>(manifest: &'a Manifest, source_path: &str) -> &'a ScannedImage {
    manifest
        .images
        .iter()
        .find(|i| i.source_path == source_path)
        .unwrap_or_else(|| {
            let paths = source_paths(manifest);
            panic!("image '{source_path}' not found. Available: {paths:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All source paths in manifest order.
pub fn source_paths(manifest: &Manifest) -> Vec<&str> {
    manifest
        .images
        .iter()
        .map(|i| i.source_path.as_str())
        .collect()
}

/// All alt texts in manifest order.
pub fn alt_texts(manifest: &Manifest) -> Vec<&str> {
    manifest
        .images
        .iter()
        .map(|i| i.directive.alt.as_str())
        .collect()
}
