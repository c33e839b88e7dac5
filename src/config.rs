//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the source (assets) root and is sparse: stock defaults are overridden by
//! whatever keys the user sets, and unknown keys are rejected to catch typos.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [loader]
//! threshold = 0.1                    # Visible fraction that counts as "in view"
//! root_margin = "50px"               # Pre-fetch margin around the viewport
//! priority_root_margin = "200px"     # Margin for observed priority images
//! priority_bypasses_observation = true
//!
//! [placeholder]
//! color = "#e5e7eb"                  # Fill of the built-in SVG placeholder
//! min_height = "100px"               # Floor for the placeholder block
//! # image = "/img/placeholder.svg"   # Site-wide placeholder override
//!
//! [fade]
//! loading_opacity = 0.5              # Opacity until the load settles
//! duration_ms = 300
//!
//! [images]
//! url_prefix = "/images"             # Where images are served from
//! sizes = "100vw"                    # Default responsive sizes hint
//! eager_first = 0                    # First N images load eagerly
//!
//! [page]
//! title = "Project Gallery"
//! lang = "en"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Visibility observation tuning.
    pub loader: LoaderConfig,
    /// Placeholder appearance.
    pub placeholder: PlaceholderConfig,
    /// Loading → loaded opacity transition.
    pub fade: FadeConfig,
    /// Scan and URL settings for discovered images.
    pub images: ImagesConfig,
    /// Generated page settings.
    pub page: PageConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.loader.threshold) {
            return Err(ConfigError::Validation(
                "loader.threshold must be between 0 and 1".into(),
            ));
        }
        if self.loader.root_margin.trim().is_empty()
            || self.loader.priority_root_margin.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "loader margins must not be empty (use \"0px\" for none)".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fade.loading_opacity) {
            return Err(ConfigError::Validation(
                "fade.loading_opacity must be between 0 and 1".into(),
            ));
        }
        if self.placeholder.min_height.trim().is_empty() {
            return Err(ConfigError::Validation(
                "placeholder.min_height must not be empty".into(),
            ));
        }
        if !self.images.url_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "images.url_prefix must start with '/'".into(),
            ));
        }
        if self.page.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "page.title must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Visibility observation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Fraction of the placeholder's area that must be visible.
    pub threshold: f64,
    /// Margin around the viewport for ordinary lazy images (CSS length).
    pub root_margin: String,
    /// Wider margin used when a priority image is observed.
    pub priority_root_margin: String,
    /// When true, `priority` alone skips observation like `loading = "eager"`.
    /// When false, lazy priority images are observed with `priority_root_margin`.
    pub priority_bypasses_observation: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "50px".to_string(),
            priority_root_margin: "200px".to_string(),
            priority_bypasses_observation: true,
        }
    }
}

/// Placeholder appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    /// Fill color of the built-in inline SVG placeholder.
    pub color: String,
    /// Minimum height of the placeholder block (CSS length).
    pub min_height: String,
    /// Site-wide placeholder resource; replaces the built-in SVG.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            color: "#e5e7eb".to_string(),
            min_height: "100px".to_string(),
            image: None,
        }
    }
}

/// Opacity transition between "loading" and "settled".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FadeConfig {
    pub loading_opacity: f64,
    pub duration_ms: u32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            loading_opacity: 0.5,
            duration_ms: 300,
        }
    }
}

/// Image discovery and URL settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// URL path images are served under.
    pub url_prefix: String,
    /// Default responsive `sizes` hint for scanned images.
    pub sizes: String,
    /// Number of leading images (in page order) that default to eager loading.
    pub eager_first: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            url_prefix: "/images".to_string(),
            sizes: "100vw".to_string(),
            eager_first: 0,
        }
    }
}

/// Generated page settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub title: String,
    pub lang: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Project Gallery".to_string(),
            lang: "en".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Used as the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# lazyframe configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Visibility observation
# ---------------------------------------------------------------------------
[loader]
# Fraction of the placeholder that must be on screen before the real
# image is swapped in (0 = any pixel, 1 = fully visible).
threshold = 0.1

# Margin around the viewport, so images start loading just before
# they scroll into view.
root_margin = "50px"

# Margin used for priority images that are still observed
# (only when priority_bypasses_observation = false).
priority_root_margin = "200px"

# Whether priority = true alone skips observation, like loading = "eager".
priority_bypasses_observation = true

# ---------------------------------------------------------------------------
# Placeholder
# ---------------------------------------------------------------------------
[placeholder]
# Fill color of the built-in SVG placeholder.
color = "#e5e7eb"

# Minimum height of the placeholder block, so images without known
# dimensions still show a visible loading area.
min_height = "100px"

# Site-wide placeholder image replacing the built-in SVG.
# image = "/img/placeholder.svg"

# ---------------------------------------------------------------------------
# Fade-in
# ---------------------------------------------------------------------------
[fade]
# Opacity of an image that is still loading (0-1).
loading_opacity = 0.5

# Duration of the fade to full opacity.
duration_ms = 300

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# URL path images are served from in the generated site.
url_prefix = "/images"

# Default responsive sizes hint, shared by every offered format.
sizes = "100vw"

# Number of leading images that load eagerly (above-the-fold content).
eager_first = 0

# ---------------------------------------------------------------------------
# Page
# ---------------------------------------------------------------------------
[page]
title = "Project Gallery"
lang = "en"
"##
}

/// Generate CSS custom properties from config.
pub fn generate_css(config: &SiteConfig) -> String {
    format!(
        r#":root {{
    --lf-placeholder-color: {color};
    --lf-placeholder-min-height: {min_height};
    --lf-loading-opacity: {opacity};
    --lf-fade-duration: {duration}ms;
}}"#,
        color = config.placeholder.color,
        min_height = config.placeholder.min_height,
        opacity = config.fade.loading_opacity,
        duration = config.fade.duration_ms,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_loader_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.loader.threshold, 0.1);
        assert_eq!(config.loader.root_margin, "50px");
        assert_eq!(config.loader.priority_root_margin, "200px");
        assert!(config.loader.priority_bypasses_observation);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[placeholder]
color = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.placeholder.color, "#fafafa");
        // Defaults preserved
        assert_eq!(config.placeholder.min_height, "100px");
        assert_eq!(config.loader.root_margin, "50px");
        assert_eq!(config.images.url_prefix, "/images");
    }

    #[test]
    fn parse_placeholder_image_override() {
        let toml = r#"
[placeholder]
image = "/img/blank.svg"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.placeholder.image.as_deref(), Some("/img/blank.svg"));
    }

    #[test]
    fn generate_css_uses_config_values() {
        let mut config = SiteConfig::default();
        config.placeholder.color = "#123456".to_string();
        config.fade.duration_ms = 500;
        let css = generate_css(&config);
        assert!(css.contains("--lf-placeholder-color: #123456"));
        assert!(css.contains("--lf-fade-duration: 500ms"));
        assert!(css.contains("--lf-loading-opacity: 0.5"));
        assert!(css.contains("--lf-placeholder-min-height: 100px"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[loader]
root_margin = "120px"

[page]
title = "Westside Painting Projects"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.loader.root_margin, "120px");
        assert_eq!(config.page.title, "Westside Painting Projects");
        // Unspecified values should be defaults
        assert_eq!(config.loader.threshold, 0.1);
        assert_eq!(config.page.lang, "en");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[loader]
threshold = 1.5
"#,
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"threshold = 0.1"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"threshold = 0.5"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("threshold").unwrap().as_float(), Some(0.5));
    }

    #[test]
    fn merge_toml_deep_nested_preserves_siblings() {
        let base: toml::Value = toml::from_str(
            r#"
[loader]
threshold = 0.1
root_margin = "50px"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[loader]
root_margin = "0px"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let loader = merged.get("loader").unwrap();
        assert_eq!(loader.get("root_margin").unwrap().as_str(), Some("0px"));
        assert_eq!(loader.get("threshold").unwrap().as_float(), Some(0.1));
    }

    // =========================================================================
    // Unknown key rejection
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
[loader]
treshold = 0.2
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
[lazy]
threshold = 0.2
"#,
        );
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_threshold_bounds() {
        let mut config = SiteConfig::default();
        config.loader.threshold = 0.0;
        assert!(config.validate().is_ok());
        config.loader.threshold = 1.0;
        assert!(config.validate().is_ok());
        config.loader.threshold = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn validate_opacity_bounds() {
        let mut config = SiteConfig::default();
        config.fade.loading_opacity = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_url_prefix_must_be_absolute() {
        let mut config = SiteConfig::default();
        config.images.url_prefix = "images".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_margin() {
        let mut config = SiteConfig::default();
        config.loader.priority_root_margin = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_title() {
        let mut config = SiteConfig::default();
        config.page.title = String::new();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[loader]", "[placeholder]", "[fade]", "[images]", "[page]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["loader", "placeholder", "fade", "images", "page"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}
