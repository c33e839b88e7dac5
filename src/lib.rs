//! # lazyframe
//!
//! Deferred, format-negotiated image loading for static landing pages.
//!
//! Each image starts as a sized placeholder block. Once the block scrolls near
//! the viewport the real image is swapped in, offered through `<picture>` with
//! modern formats first, and faded from a loading opacity to full once it
//! settles. A failed load settles on the placeholder instead of a broken icon.
//!
//! # The Loader
//!
//! [`loader::LazyImage`] is a small state machine driven by host events:
//!
//! ```text
//! Pending ──intersecting──▶ Visible ──load──▶ Loaded
//!                              │
//!                              └────error───▶ Failed
//! ```
//!
//! Eager and priority images skip `Pending`. Visibility detection is injected
//! through [`visibility::VisibilityWatcher`]; a host without it swaps
//! immediately. Each mounted loader owns at most one
//! [`visibility::Observation`], which disconnects when dropped.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! The `lazyframe` binary builds a gallery page from an assets directory:
//!
//! ```text
//! 1. Scan      assets/   →  manifest.json    (files → image directives)
//! 2. Generate  manifest  →  dist/            (HTML + copied images)
//! ```
//!
//! The manifest is human-readable JSON, so each stage can be inspected and
//! tested on its own.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`directive`] | `ImageDirective`: what the caller asks for |
//! | [`formats`] | Alternate format names, MIME types, modern-first ordering |
//! | [`placeholder`] | Built-in SVG placeholder and placeholder box geometry |
//! | [`visibility`] | Visibility watcher trait, RAII observations, manual watcher |
//! | [`loader`] | `LazyImage` phase machine |
//! | [`markup`] | Maud rendering of every phase plus the static hydration frame |
//! | [`simulate`] | Scripted event runs against one loader |
//! | [`scan`] | Stage 1: walks assets, groups formats, probes dimensions |
//! | [`generate`] | Stage 2: writes the page and copies images |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Manifest types serialized between stages |
//! | [`naming`] | `NNN-name` filename convention |
//! | [`metadata`] | Alt text resolution and per-image sidecar overrides |
//! | [`imaging`] | Pure-Rust dimension probing |
//! | [`output`] | CLI output formatting |

pub mod config;
pub mod directive;
pub mod formats;
pub mod generate;
pub mod imaging;
pub mod loader;
pub mod markup;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod placeholder;
pub mod scan;
pub mod simulate;
pub mod types;
pub mod visibility;

#[cfg(test)]
pub(crate) mod test_helpers;
