//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Every image is shown by its position on the page and its alt text, with
//! file paths as indented context lines. The output reads as an inventory of
//! the page rather than a file listing.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Images
//! 001 Front porch at dusk
//!     Source: 001-porch.jpg
//!     Size: 1600 x 1000
//!     Formats: avif, webp
//!     Loading: eager, priority
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Check
//!
//! ```text
//! Aspect mismatches
//!     001-porch.webp: 800 x 600, primary 001-porch.jpg is 1600 x 1000
//!
//! Checked 2 alternates, 1 mismatch
//! ```
//!
//! ## Generate
//!
//! ```text
//! Page → index.html
//! 001 /images/001-porch.jpg (visible)
//! 002 /images/002-deck.jpg (pending)
//!
//! Generated 2 images (1 deferred), copied 4 files
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::generate::GeneratedSite;
use crate::scan::CheckReport;
use crate::simulate::SimulationReport;
use crate::types::Manifest;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate to `max` characters, appending `...` when cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Image header: alt text when present, otherwise the filename in parens.
///
/// ```text
/// 001 Front porch
/// 002 (003.jpg)
/// ```
fn image_line(index: usize, alt: &str, filename: &str) -> String {
    if alt.trim().is_empty() {
        format!("{} ({})", format_index(index), filename)
    } else {
        format!("{} {}", format_index(index), truncate(alt, 60))
    }
}

fn count(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}

// ============================================================================
// Scan
// ============================================================================

pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];

    if manifest.images.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }

    for (idx, image) in manifest.images.iter().enumerate() {
        let d = &image.directive;
        let filename = image
            .source_path
            .rsplit('/')
            .next()
            .unwrap_or(&image.source_path);
        lines.push(image_line(idx + 1, &d.alt, filename));
        lines.push(format!("{}Source: {}", indent(1), image.source_path));
        if let Some((w, h)) = d.dimensions() {
            lines.push(format!("{}Size: {} x {}", indent(1), w, h));
        }
        if !image.alternates.is_empty() {
            let formats: Vec<&str> = image.alternates.keys().map(String::as_str).collect();
            lines.push(format!("{}Formats: {}", indent(1), formats.join(", ")));
        }
        let mut loading = vec![d.loading.as_str()];
        if d.priority {
            loading.push("priority");
        }
        lines.push(format!("{}Loading: {}", indent(1), loading.join(", ")));
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push(format!("{}config.toml", indent(1)));
    } else {
        lines.push(format!("{}(defaults)", indent(1)));
    }

    lines
}

pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(report: &CheckReport, alternates: usize) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.mismatches.is_empty() {
        lines.push("Aspect mismatches".to_string());
        for m in &report.mismatches {
            lines.push(format!(
                "{}{}: {} x {}, primary {} is {} x {}",
                indent(1),
                m.alternate_path,
                m.alternate.width,
                m.alternate.height,
                m.source_path,
                m.primary.width,
                m.primary.height
            ));
        }
        lines.push(String::new());
    }

    if !report.skipped.is_empty() {
        lines.push("Not checked".to_string());
        for s in &report.skipped {
            lines.push(format!("{}{}: {}", indent(1), s.alternate_path, s.reason));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Checked {}, {}",
        count(alternates, "alternate", "alternates"),
        count(report.mismatches.len(), "mismatch", "mismatches")
    ));
    lines
}

pub fn print_check_output(report: &CheckReport, alternates: usize) {
    for line in format_check_output(report, alternates) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_output(site: &GeneratedSite, output_dir: &Path) -> Vec<String> {
    let index = site
        .index
        .strip_prefix(output_dir)
        .unwrap_or(&site.index)
        .display()
        .to_string();
    let mut lines = vec![format!("Page → {}", index)];

    for (idx, (src, phase)) in site.frames.iter().enumerate() {
        lines.push(format!("{} {} ({})", format_index(idx + 1), src, phase));
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} ({} deferred), copied {}",
        count(site.frames.len(), "image", "images"),
        site.deferred_count(),
        count(site.copied.len(), "file", "files")
    ));
    lines
}

pub fn print_generate_output(site: &GeneratedSite, output_dir: &Path) {
    for line in format_generate_output(site, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Simulate
// ============================================================================

pub fn format_simulation(report: &SimulationReport) -> Vec<String> {
    let mut lines = vec![format!("Image {}", report.src)];
    lines.push(format!(
        "{}Observer: {}",
        indent(1),
        if report.observer_available {
            "available"
        } else {
            "unavailable"
        }
    ));

    lines.push(format!("Initial: {}", report.initial_phase));
    lines.push(format!("{}{}", indent(1), report.initial_markup));

    lines.push(match report.mount {
        Some(t) => format!("Mount: {}", t),
        None => "Mount: no change".to_string(),
    });

    for (idx, step) in report.steps.iter().enumerate() {
        let outcome = match step.transition {
            Some(t) => t.to_string(),
            None => "no change".to_string(),
        };
        let observing = if step.observing { " (observing)" } else { "" };
        lines.push(format!(
            "{} {}: {}{}",
            format_index(idx + 1),
            step.event,
            outcome,
            observing
        ));
    }

    lines.push(format!("Final: {}", report.final_phase));
    lines.push(format!("{}{}", indent(1), report.final_markup));
    lines
}

pub fn print_simulation(report: &SimulationReport) {
    for line in format_simulation(report) {
        println!("{}", line);
    }
}
