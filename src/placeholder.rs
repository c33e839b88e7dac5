//! Placeholder resource and placeholder block geometry.
//!
//! Until an image is in view, only a placeholder block is rendered. The block
//! reserves the image's layout footprint so the swap causes no layout shift:
//!
//! | Directive | `width` | `height` | `aspect-ratio` |
//! |---|---|---|---|
//! | 400 × 250 | `400px` | `250px` | `400 / 250` |
//! | width only | `400px` | `auto` | — |
//! | neither | `100%` | `auto` | — |
//!
//! A `min-height` floor always applies, so images without known dimensions
//! still occupy a visible loading area.

use crate::config::SiteConfig;
use crate::directive::ImageDirective;

/// Build the built-in placeholder: a flat inline SVG in the given color.
///
/// The SVG stretches (`preserveAspectRatio='none'`) so it fills any box it is
/// drawn into, including the `<img>` of a failed load.
pub fn svg_placeholder(color: &str) -> String {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 16 9' preserveAspectRatio='none'>\
         <rect width='16' height='9' fill='{color}'/></svg>"
    );
    format!("data:image/svg+xml,{}", encode_data_uri(&svg))
}

/// Percent-encode the characters that break an unquoted-safe SVG data URI.
fn encode_data_uri(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    for c in raw.chars() {
        match c {
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '#' => out.push_str("%23"),
            '"' => out.push_str("%22"),
            '%' => out.push_str("%25"),
            _ => out.push(c),
        }
    }
    out
}

/// Pick the placeholder resource for a directive.
///
/// Per-image override → site-wide `placeholder.image` → built-in SVG.
pub fn resolve_placeholder(directive: &ImageDirective, config: &SiteConfig) -> String {
    directive
        .placeholder
        .clone()
        .or_else(|| config.placeholder.image.clone())
        .unwrap_or_else(|| svg_placeholder(&config.placeholder.color))
}

/// Layout footprint of a placeholder block.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderBox {
    /// CSS width: `{w}px` or `100%`.
    pub width: String,
    /// CSS height: `{h}px` or `auto`.
    pub height: String,
    /// `(width, height)` when both are known and non-zero.
    pub aspect_ratio: Option<(u32, u32)>,
    /// CSS minimum height.
    pub min_height: String,
}

impl PlaceholderBox {
    pub fn for_directive(directive: &ImageDirective, min_height: &str) -> Self {
        Self {
            width: directive
                .width
                .map(|w| format!("{w}px"))
                .unwrap_or_else(|| "100%".to_string()),
            height: directive
                .height
                .map(|h| format!("{h}px"))
                .unwrap_or_else(|| "auto".to_string()),
            aspect_ratio: directive.dimensions().filter(|&(w, h)| w > 0 && h > 0),
            min_height: min_height.to_string(),
        }
    }

    /// Reserved aspect ratio as a number (`width / height`).
    pub fn ratio(&self) -> Option<f64> {
        self.aspect_ratio.map(|(w, h)| w as f64 / h as f64)
    }

    /// Inline style for the placeholder block.
    pub fn to_css(&self) -> String {
        let mut css = format!("width: {}; height: {};", self.width, self.height);
        if let Some((w, h)) = self.aspect_ratio {
            css.push_str(&format!(" aspect-ratio: {w} / {h};"));
        }
        css.push_str(&format!(" min-height: {};", self.min_height));
        css
    }
}
