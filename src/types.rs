//! Shared types used across pipeline stages.
//!
//! The scan stage writes a [`Manifest`] as JSON to the temp directory and the
//! generate stage reads it back, so both sides must agree on these shapes.

use crate::config::SiteConfig;
use crate::directive::ImageDirective;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Output of the scan stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub images: Vec<ScannedImage>,
    pub config: SiteConfig,
}

/// One image group discovered on disk and the directive built for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedImage {
    /// Primary file, relative to the source root, `/`-separated.
    pub source_path: String,
    /// Alternate files keyed by format name, relative to the source root.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub alternates: BTreeMap<String, String>,
    /// Ordering prefix from the filename, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    pub directive: ImageDirective,
}

impl ScannedImage {
    /// Every source file this entry references, primary first.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.source_path.as_str()).chain(self.alternates.values().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_lists_primary_first() {
        let mut alternates = BTreeMap::new();
        alternates.insert("webp".to_string(), "a/001-x.webp".to_string());
        alternates.insert("avif".to_string(), "a/001-x.avif".to_string());
        let image = ScannedImage {
            source_path: "a/001-x.jpg".to_string(),
            alternates,
            number: Some(1),
            directive: ImageDirective::new("/images/a/001-x.jpg"),
        };
        let files: Vec<&str> = image.files().collect();
        assert_eq!(files, vec!["a/001-x.jpg", "a/001-x.avif", "a/001-x.webp"]);
    }

    #[test]
    fn manifest_json_omits_empty_fields() {
        let manifest = Manifest {
            images: vec![ScannedImage {
                source_path: "x.png".to_string(),
                alternates: BTreeMap::new(),
                number: None,
                directive: ImageDirective::new("/images/x.png"),
            }],
            config: SiteConfig::default(),
        };
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(!json.contains("alternates"));
        assert!(!json.contains("\"number\""));

        let back: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.images[0], manifest.images[0]);
        assert_eq!(back.config, manifest.config);
    }
}
