//! Alternate image formats offered through `<picture>`.
//!
//! A directive's alternates are keyed by format name (`"avif"`, `"webp"`, ...).
//! Browsers pick the first `<source>` whose type they support, so sources must
//! be emitted most-modern first and the primary resource always comes last as
//! the universally supported fallback:
//!
//! ```text
//! <picture>
//!   <source type="image/avif" ...>   rank 0
//!   <source type="image/jxl"  ...>   rank 1
//!   <source type="image/webp" ...>   rank 2
//!   <source type="image/heic" ...>   unknown formats, by name
//!   <img src="primary.jpg">          fallback
//! </picture>
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// A named alternate format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Avif,
    Jxl,
    Webp,
    /// Any other format name, lowercased.
    Other(String),
}

impl ImageFormat {
    /// Parse a format key as written in directives and sidecars.
    ///
    /// Case-insensitive. `"jpeg-xl"` and `"jpegxl"` are accepted for JPEG XL.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "avif" => Self::Avif,
            "jxl" | "jpeg-xl" | "jpegxl" => Self::Jxl,
            "webp" => Self::Webp,
            other => Self::Other(other.to_string()),
        }
    }

    /// Map a file extension to an alternate format.
    ///
    /// Returns `None` for extensions that are not alternates (universally
    /// supported fallbacks like `jpg` and `png`, or non-images).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "avif" => Some(Self::Avif),
            "jxl" => Some(Self::Jxl),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// MIME type used in `<source type=...>`.
    pub fn mime_type(&self) -> String {
        match self {
            Self::Avif => "image/avif".to_string(),
            Self::Jxl => "image/jxl".to_string(),
            Self::Webp => "image/webp".to_string(),
            Self::Other(name) => format!("image/{name}"),
        }
    }

    /// Preference rank: lower is offered earlier.
    fn rank(&self) -> u8 {
        match self {
            Self::Avif => 0,
            Self::Jxl => 1,
            Self::Webp => 2,
            Self::Other(_) => 3,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Avif => "avif",
            Self::Jxl => "jxl",
            Self::Webp => "webp",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Order alternates modern-first.
///
/// Known formats follow their rank; unknown formats come after them, sorted
/// by name. Empty locators are skipped. Keys naming the same format
/// (`jxl` and `jpeg-xl`) yield one source: the first key in map order wins.
pub fn ordered_alternates(formats: &BTreeMap<String, String>) -> Vec<(ImageFormat, &str)> {
    let mut ordered: Vec<(ImageFormat, &str)> = formats
        .iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .map(|(name, url)| (ImageFormat::from_name(name), url.as_str()))
        .collect();
    ordered.sort_by(|(a, _), (b, _)| a.rank().cmp(&b.rank()).then_with(|| a.name().cmp(b.name())));
    ordered.dedup_by(|(later, _), (earlier, _)| later == earlier);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn avif_is_offered_before_webp() {
        let map = formats(&[("webp", "/a.webp"), ("AVIF", "/a.avif")]);
        let ordered = ordered_alternates(&map);
        let names: Vec<&str> = ordered.iter().map(|(f, _)| f.name()).collect();
        assert_eq!(names, vec!["avif", "webp"]);
    }

    #[test]
    fn jxl_sits_between_avif_and_webp() {
        let map = formats(&[("webp", "/a.webp"), ("jpeg-xl", "/a.jxl"), ("avif", "/a.avif")]);
        let names: Vec<String> = ordered_alternates(&map)
            .iter()
            .map(|(f, _)| f.to_string())
            .collect();
        assert_eq!(names, vec!["avif", "jxl", "webp"]);
    }

    #[test]
    fn aliases_of_one_format_yield_one_source() {
        let map = formats(&[
            ("AVIF", "/upper.avif"),
            ("avif", "/lower.avif"),
            ("jpeg-xl", "/a.jxl"),
            ("jxl", "/b.jxl"),
        ]);
        let ordered = ordered_alternates(&map);
        assert_eq!(
            ordered,
            vec![(ImageFormat::Avif, "/upper.avif"), (ImageFormat::Jxl, "/a.jxl")]
        );
    }

    #[test]
    fn unknown_formats_follow_known_ones_by_name() {
        let map = formats(&[("heic", "/a.heic"), ("bmp2", "/a.bmp2"), ("webp", "/a.webp")]);
        let names: Vec<String> = ordered_alternates(&map)
            .iter()
            .map(|(f, _)| f.to_string())
            .collect();
        assert_eq!(names, vec!["webp", "bmp2", "heic"]);
    }

    #[test]
    fn empty_locators_are_skipped() {
        let map = formats(&[("avif", "  "), ("webp", "/a.webp")]);
        let ordered = ordered_alternates(&map);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].1, "/a.webp");
    }

    #[test]
    fn mime_types() {
        assert_eq!(ImageFormat::Avif.mime_type(), "image/avif");
        assert_eq!(ImageFormat::Webp.mime_type(), "image/webp");
        assert_eq!(ImageFormat::from_name("Heic").mime_type(), "image/heic");
    }

    #[test]
    fn extensions_only_map_alternates() {
        assert_eq!(ImageFormat::from_extension("AVIF"), Some(ImageFormat::Avif));
        assert_eq!(ImageFormat::from_extension("webp"), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::from_extension("jpg"), None);
        assert_eq!(ImageFormat::from_extension("png"), None);
    }
}
