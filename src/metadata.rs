//! Per-image metadata from the filesystem.
//!
//! Two optional sidecar files sit next to an image and share its stem:
//!
//! - `001-porch.txt`: plain-text alt text.
//! - `001-porch.toml`: [`ImageOverrides`], per-image rendering options.
//!
//! ## Alt text resolution
//!
//! First non-empty value wins:
//!
//! ```text
//! alt: resolve(&[overrides.alt, sidecar_txt, filename_title])
//! ```
//!
//! An override in the `.toml` sidecar is the most deliberate choice, the
//! `.txt` file is next, and the filename title is the mechanical fallback.

use crate::directive::{ImageDirective, Loading};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverridesError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid overrides in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Return the first non-empty (after trimming) value.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| opt.map(str::trim).filter(|s| !s.is_empty()))
        .map(String::from)
        .next()
}

/// Read the `.txt` sidecar for an image, trimmed. `None` if missing or blank.
pub fn read_sidecar(image_path: &Path) -> Option<String> {
    std::fs::read_to_string(image_path.with_extension("txt"))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Rendering options from an image's `.toml` sidecar.
///
/// ```toml
/// alt = "Front porch after restoration"
/// loading = "eager"
/// priority = true
/// sizes = "(max-width: 768px) 100vw, 50vw"
/// class = "rounded-lg"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageOverrides {
    pub alt: Option<String>,
    pub loading: Option<Loading>,
    pub priority: Option<bool>,
    pub sizes: Option<String>,
    pub srcset: Option<String>,
    pub class: Option<String>,
    pub style: Option<String>,
    pub placeholder: Option<String>,
}

impl ImageOverrides {
    /// Apply every set field except `alt` (resolved separately).
    pub fn apply(&self, mut directive: ImageDirective) -> ImageDirective {
        if let Some(loading) = self.loading {
            directive.loading = loading;
        }
        if let Some(priority) = self.priority {
            directive.priority = priority;
        }
        if let Some(sizes) = &self.sizes {
            directive.sizes = sizes.clone();
        }
        if self.srcset.is_some() {
            directive.srcset = self.srcset.clone();
        }
        if self.class.is_some() {
            directive.class = self.class.clone();
        }
        if self.style.is_some() {
            directive.style = self.style.clone();
        }
        if self.placeholder.is_some() {
            directive.placeholder = self.placeholder.clone();
        }
        directive
    }
}

/// Read the `.toml` sidecar for an image. A missing file means no overrides.
pub fn read_overrides(image_path: &Path) -> Result<ImageOverrides, OverridesError> {
    let path = image_path.with_extension("toml");
    if !path.exists() {
        return Ok(ImageOverrides::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| OverridesError::Io {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| OverridesError::Toml { path, source })
}
