//! Image directives: the caller-facing description of one deferred image.
//!
//! A directive is a plain value object. It is built once (by the scan stage,
//! by hand in a manifest, or in code via the builder methods) and never
//! mutated by the loader that renders it.
//!
//! ```json
//! {
//!   "src": "/images/010-kitchen/001-cabinets.jpg",
//!   "alt": "Repainted kitchen cabinets",
//!   "width": 1600,
//!   "height": 1000,
//!   "loading": "lazy",
//!   "priority": false,
//!   "sizes": "(max-width: 768px) 100vw, 50vw",
//!   "formats": {
//!     "avif": "/images/010-kitchen/001-cabinets.avif",
//!     "webp": "/images/010-kitchen/001-cabinets.webp"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Loading strategy requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loading {
    /// Render the real image immediately, never observe visibility.
    Eager,
    /// Defer until the placeholder scrolls near the viewport.
    #[default]
    Lazy,
}

impl Loading {
    pub fn as_str(self) -> &'static str {
        match self {
            Loading::Eager => "eager",
            Loading::Lazy => "lazy",
        }
    }
}

impl fmt::Display for Loading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Loading {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eager" => Ok(Loading::Eager),
            "lazy" => Ok(Loading::Lazy),
            other => Err(format!("unknown loading strategy '{other}' (expected eager or lazy)")),
        }
    }
}

pub fn default_sizes() -> String {
    "100vw".to_string()
}

/// One deferred image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDirective {
    /// Primary resource locator; the universally supported fallback.
    pub src: String,
    /// Human-readable description, used as `alt`.
    #[serde(default)]
    pub alt: String,
    /// Intrinsic width in pixels, used to reserve layout space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Intrinsic height in pixels, used to reserve layout space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Extra CSS class for the placeholder block and the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Extra inline style, appended after the generated geometry on the
    /// placeholder block and the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Placeholder resource override for this image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub loading: Loading,
    /// Responsive `sizes` hint, shared by every offered format.
    #[serde(default = "default_sizes")]
    pub sizes: String,
    /// Explicit `srcset` for the primary `<img>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcset: Option<String>,
    #[serde(default)]
    pub priority: bool,
    /// Alternate-format locators keyed by format name (`avif`, `webp`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub formats: BTreeMap<String, String>,
}

impl ImageDirective {
    /// A lazy, non-priority directive with default `sizes` and no alternates.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: String::new(),
            width: None,
            height: None,
            class: None,
            style: None,
            placeholder: None,
            loading: Loading::Lazy,
            sizes: default_sizes(),
            srcset: None,
            priority: false,
            formats: BTreeMap::new(),
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_loading(mut self, loading: Loading) -> Self {
        self.loading = loading;
        self
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = sizes.into();
        self
    }

    pub fn with_srcset(mut self, srcset: impl Into<String>) -> Self {
        self.srcset = Some(srcset.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Add an alternate-format locator, e.g. `("avif", "/a.avif")`.
    pub fn with_format(mut self, name: impl Into<String>, src: impl Into<String>) -> Self {
        self.formats.insert(name.into(), src.into());
        self
    }

    /// True when the directive requests the real image without deferral.
    pub fn is_eager(&self) -> bool {
        self.loading == Loading::Eager
    }

    /// Both intrinsic dimensions, when known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}
