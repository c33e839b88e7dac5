//! Filesystem scanning and manifest generation.
//!
//! Stage 1 of the lazyframe build pipeline. Walks the assets directory, groups
//! files that describe the same picture, and turns each group into an
//! [`ImageDirective`] with dimensions, alt text and alternate formats filled in.
//!
//! ## Directory Structure
//!
//! ```text
//! assets/                          # Source root
//! ├── config.toml                  # Site configuration (optional)
//! ├── 001-hero.jpg                 # Primary resource
//! ├── 001-hero.avif                # Alternate format of the same picture
//! ├── 001-hero.webp
//! ├── 001-hero.toml                # Per-image overrides (optional)
//! ├── 010-kitchen/
//! │   ├── 001-cabinets.png
//! │   ├── 001-cabinets.txt         # Alt text (optional)
//! │   └── 002-backsplash.jpg
//! └── logo.svg                     # Unnumbered: sorted after numbered images
//! ```
//!
//! ## Grouping
//!
//! Files sharing a directory and stem form one image. The primary is the
//! universally supported file (preference: jpg, jpeg, png, gif, svg); avif,
//! jxl and webp files become alternates offered ahead of it. A group with
//! alternates and no primary has nothing to fall back to and is rejected.
//!
//! ## Validation
//!
//! - Every group needs a primary ([`ScanError::NoFallback`])
//! - No duplicate image numbers within a directory ([`ScanError::DuplicateNumber`])
//! - Sidecar overrides must parse ([`ScanError::Overrides`])

use crate::config::{self, SiteConfig};
use crate::directive::{ImageDirective, Loading};
use crate::imaging::{Dimensions, ImageProbe, ProbeError, RustProbe};
use crate::metadata::{self, ImageOverrides, OverridesError};
use crate::naming::{self, ParsedStem};
use crate::types::{Manifest, ScannedImage};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Cannot read dimensions of {path}: {source}")]
    Probe { path: PathBuf, source: ProbeError },
    #[error("Alternate formats without a jpg/png/gif/svg fallback: {0}")]
    NoFallback(PathBuf),
    #[error("Duplicate image number {0} in {1}")]
    DuplicateNumber(u32, PathBuf),
    #[error("{0}")]
    Overrides(#[from] OverridesError),
}

/// Universally supported extensions, in preference order.
pub const PRIMARY_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg"];
/// Modern formats offered ahead of the primary.
pub const ALTERNATE_EXTENSIONS: &[&str] = &["avif", "jxl", "webp"];

/// Files sharing a directory and stem.
#[derive(Debug, Default)]
struct Group {
    primaries: Vec<PathBuf>,
    alternates: BTreeMap<String, PathBuf>,
}

/// A group with its primary chosen, ready to become a directive.
#[derive(Debug)]
struct Candidate {
    dir: PathBuf,
    parsed: ParsedStem,
    primary: PathBuf,
    alternates: BTreeMap<String, PathBuf>,
}

/// Scan `root` with the default dimension probe.
pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    scan_with(root, &RustProbe::new())
}

/// Scan `root`, reading dimensions through `probe`.
pub fn scan_with(root: &Path, probe: &dyn ImageProbe) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    let groups = collect_groups(root)?;
    let candidates = choose_primaries(groups)?;
    check_duplicate_numbers(&candidates)?;

    let images = candidates
        .par_iter()
        .enumerate()
        .map(|(idx, candidate)| build_image(root, candidate, idx, &config, probe))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Manifest { images, config })
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

fn collect_groups(root: &Path) -> Result<BTreeMap<(PathBuf, String), Group>, ScanError> {
    let mut groups: BTreeMap<(PathBuf, String), Group> = BTreeMap::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = extension_of(path);
        let is_primary = PRIMARY_EXTENSIONS.contains(&ext.as_str());
        if !is_primary && !ALTERNATE_EXTENSIONS.contains(&ext.as_str()) {
            // config.toml, sidecars and anything else
            continue;
        }
        let (Some(dir), Some(stem)) = (path.parent(), path.file_stem()) else {
            continue;
        };
        let group = groups
            .entry((dir.to_path_buf(), stem.to_string_lossy().to_string()))
            .or_default();
        if is_primary {
            group.primaries.push(path.to_path_buf());
        } else {
            group.alternates.insert(ext, path.to_path_buf());
        }
    }

    Ok(groups)
}

fn primary_rank(path: &Path) -> usize {
    let ext = extension_of(path);
    PRIMARY_EXTENSIONS
        .iter()
        .position(|e| *e == ext)
        .unwrap_or(PRIMARY_EXTENSIONS.len())
}

fn choose_primaries(
    groups: BTreeMap<(PathBuf, String), Group>,
) -> Result<Vec<Candidate>, ScanError> {
    let mut candidates = Vec::with_capacity(groups.len());

    for ((dir, stem), mut group) in groups {
        group.primaries.sort_by_key(|p| primary_rank(p));
        let mut primaries = group.primaries.into_iter();
        let Some(primary) = primaries.next() else {
            let orphan = group
                .alternates
                .into_values()
                .next()
                .unwrap_or_else(|| dir.join(&stem));
            return Err(ScanError::NoFallback(orphan));
        };
        for ignored in primaries {
            warn!(
                kept = %primary.display(),
                ignored = %ignored.display(),
                "multiple fallback files for one image, ignoring extra"
            );
        }
        candidates.push(Candidate {
            dir,
            parsed: naming::parse_stem(&stem),
            primary,
            alternates: group.alternates,
        });
    }

    candidates.sort_by(|a, b| {
        a.dir
            .cmp(&b.dir)
            .then_with(|| naming::compare_stems(&a.parsed, &b.parsed))
    });
    Ok(candidates)
}

fn check_duplicate_numbers(candidates: &[Candidate]) -> Result<(), ScanError> {
    let mut seen: HashSet<(&Path, u32)> = HashSet::new();
    for candidate in candidates {
        if let Some(number) = candidate.parsed.number
            && !seen.insert((candidate.dir.as_path(), number))
        {
            return Err(ScanError::DuplicateNumber(number, candidate.dir.clone()));
        }
    }
    Ok(())
}

/// `/`-separated path of `path` relative to `root`.
fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Public URL of a source-relative path.
pub fn image_url(url_prefix: &str, rel: &str) -> String {
    format!("{}/{}", url_prefix.trim_end_matches('/'), rel)
}

fn probe_dimensions(
    probe: &dyn ImageProbe,
    path: &Path,
) -> Result<Option<Dimensions>, ScanError> {
    if extension_of(path) == "svg" {
        return Ok(None);
    }
    probe
        .identify(path)
        .map(Some)
        .map_err(|source| ScanError::Probe {
            path: path.to_path_buf(),
            source,
        })
}

fn build_image(
    root: &Path,
    candidate: &Candidate,
    index: usize,
    config: &SiteConfig,
    probe: &dyn ImageProbe,
) -> Result<ScannedImage, ScanError> {
    let source_path = relative(root, &candidate.primary);
    let prefix = &config.images.url_prefix;

    let overrides: ImageOverrides = metadata::read_overrides(&candidate.primary)?;
    let sidecar = metadata::read_sidecar(&candidate.primary);
    let alt = metadata::resolve(&[
        overrides.alt.as_deref(),
        sidecar.as_deref(),
        Some(&candidate.parsed.title),
    ])
    .unwrap_or_default();

    let mut directive = ImageDirective::new(image_url(prefix, &source_path))
        .with_alt(alt)
        .with_sizes(config.images.sizes.clone());
    if let Some(dims) = probe_dimensions(probe, &candidate.primary)? {
        directive = directive.with_dimensions(dims.width, dims.height);
    }
    if index < config.images.eager_first {
        directive = directive.with_loading(Loading::Eager);
    }

    let alternates: BTreeMap<String, String> = candidate
        .alternates
        .iter()
        .map(|(format, path)| (format.clone(), relative(root, path)))
        .collect();
    for (format, rel) in &alternates {
        directive = directive.with_format(format.clone(), image_url(prefix, rel));
    }

    let directive = overrides.apply(directive);
    debug!(
        src = %directive.src,
        width = ?directive.width,
        height = ?directive.height,
        loading = %directive.loading,
        alternates = alternates.len(),
        "scanned image"
    );

    Ok(ScannedImage {
        source_path,
        alternates,
        number: candidate.parsed.number,
        directive,
    })
}

// ============================================================================
// Check: alternate formats must keep the primary's aspect ratio
// ============================================================================

/// Relative aspect-ratio difference tolerated between primary and alternate.
pub const ASPECT_TOLERANCE: f64 = 0.01;

/// An alternate whose shape differs from its primary.
#[derive(Debug, Clone, PartialEq)]
pub struct AspectMismatch {
    pub source_path: String,
    pub alternate_path: String,
    pub primary: Dimensions,
    pub alternate: Dimensions,
}

/// An alternate that could not be probed.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAlternate {
    pub alternate_path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub mismatches: Vec<AspectMismatch>,
    pub skipped: Vec<SkippedAlternate>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Probe every alternate in `manifest` and compare it with its primary.
///
/// Images without known primary dimensions (SVG) are not compared.
pub fn check_alternates(root: &Path, manifest: &Manifest, probe: &dyn ImageProbe) -> CheckReport {
    let results: Vec<Result<Option<AspectMismatch>, SkippedAlternate>> = manifest
        .images
        .par_iter()
        .flat_map_iter(|image| {
            let primary = image
                .directive
                .dimensions()
                .map(|(w, h)| Dimensions::new(w, h));
            image.alternates.values().filter_map(move |rel| {
                let primary = primary?;
                Some(compare_alternate(root, image, rel, primary, probe))
            })
        })
        .collect();

    let mut report = CheckReport::default();
    for result in results {
        match result {
            Ok(Some(mismatch)) => {
                warn!(
                    alternate = %mismatch.alternate_path,
                    primary = ?mismatch.primary,
                    actual = ?mismatch.alternate,
                    "alternate format has a different aspect ratio"
                );
                report.mismatches.push(mismatch);
            }
            Ok(None) => {}
            Err(skipped) => {
                debug!(alternate = %skipped.alternate_path, reason = %skipped.reason, "skipped");
                report.skipped.push(skipped);
            }
        }
    }
    report
}

fn compare_alternate(
    root: &Path,
    image: &ScannedImage,
    rel: &str,
    primary: Dimensions,
    probe: &dyn ImageProbe,
) -> Result<Option<AspectMismatch>, SkippedAlternate> {
    let alternate = probe
        .identify(&root.join(rel))
        .map_err(|e| SkippedAlternate {
            alternate_path: rel.to_string(),
            reason: e.to_string(),
        })?;
    Ok(primary
        .ratio_differs(&alternate, ASPECT_TOLERANCE)
        .then(|| AspectMismatch {
            source_path: image.source_path.clone(),
            alternate_path: rel.to_string(),
            primary,
            alternate,
        }))
}
