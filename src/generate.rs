//! Static page generation.
//!
//! Stage 2 of the lazyframe build pipeline. Takes the scan manifest and writes
//! a single gallery page plus copies of every referenced image.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # Gallery page, every image as a frame
//! └── images/                    # images.url_prefix
//!     ├── 001-hero.jpg
//!     ├── 001-hero.avif
//!     └── 010-kitchen/
//!         └── 001-cabinets.png
//! ```
//!
//! ## First Render
//!
//! Each directive becomes a [`LazyImage`] that is never mounted here: the page
//! holds its server-side first render. Eager and priority images are already
//! `Visible` and emit the real `<img>`; everything else emits a placeholder
//! frame whose in-view markup waits in a `<template>` until the embedded
//! script sees it scroll near the viewport.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: placeholder, fade and layout rules (custom properties
//!   injected from config)
//! - `static/lazy.js`: visibility observation, one-shot swap, load/error handling

use crate::config::{self, SiteConfig};
use crate::loader::{LazyImage, Phase};
use crate::markup::render_frame;
use crate::types::Manifest;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/lazy.js");

/// What a generate run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSite {
    pub index: PathBuf,
    /// Copied files, relative to the output directory.
    pub copied: Vec<String>,
    /// `(src, first-render phase)` per image, in page order.
    pub frames: Vec<(String, Phase)>,
}

impl GeneratedSite {
    pub fn deferred_count(&self) -> usize {
        self.frames
            .iter()
            .filter(|(_, phase)| *phase == Phase::Pending)
            .count()
    }
}

/// Read the manifest at `manifest_path` and generate the site.
pub fn generate(
    manifest_path: &Path,
    source_dir: &Path,
    output_dir: &Path,
) -> Result<GeneratedSite, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    generate_site(&manifest, source_dir, output_dir)
}

/// Generate the site from an in-memory manifest.
pub fn generate_site(
    manifest: &Manifest,
    source_dir: &Path,
    output_dir: &Path,
) -> Result<GeneratedSite, GenerateError> {
    fs::create_dir_all(output_dir)?;
    let copied = copy_images(manifest, source_dir, output_dir)?;

    let images: Vec<LazyImage> = manifest
        .images
        .iter()
        .map(|scanned| LazyImage::new(scanned.directive.clone(), &manifest.config))
        .collect();

    let css = format!("{}\n\n{}", config::generate_css(&manifest.config), CSS_STATIC);
    let page = render_page(&images, &manifest.config, &css);
    let index = output_dir.join("index.html");
    fs::write(&index, page.into_string())?;
    debug!(path = %index.display(), images = images.len(), "wrote page");

    Ok(GeneratedSite {
        index,
        copied,
        frames: images
            .iter()
            .map(|image| (image.directive().src.clone(), image.phase()))
            .collect(),
    })
}

/// Copy every primary and alternate file under `url_prefix` in the output.
fn copy_images(
    manifest: &Manifest,
    source_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<String>, GenerateError> {
    let prefix = manifest.config.images.url_prefix.trim_matches('/');
    let target_root = output_dir.join(prefix);
    let mut copied = Vec::new();

    for image in &manifest.images {
        for rel in image.files() {
            let dst = target_root.join(rel);
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(source_dir.join(rel), &dst)?;
            copied.push(if prefix.is_empty() {
                rel.to_string()
            } else {
                format!("{prefix}/{rel}")
            });
        }
    }
    Ok(copied)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(config: &SiteConfig, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(config.page.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (config.page.title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Renders the gallery page: one frame per image, in manifest order.
fn render_page(images: &[LazyImage], config: &SiteConfig, css: &str) -> Markup {
    let content = html! {
        header.lf-header {
            h1 { (config.page.title) }
        }
        main.lf-gallery {
            @for image in images {
                (render_frame(image))
            }
        }
    };
    base_document(config, css, content)
}
