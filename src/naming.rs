//! Filename convention for gallery images.
//!
//! Image stems may carry an ordering prefix: `NNN-name`. The number fixes the
//! position on the page, the rest becomes the default alt text with dashes
//! turned into spaces:
//!
//! - `010-Front-Porch.jpg` → position 10, alt "Front Porch"
//! - `Kitchen-Remodel.png` → unnumbered (sorted last), alt "Kitchen Remodel"
//! - `003.jpg` → position 3, no title

use std::cmp::Ordering;

/// Parsed form of an image stem.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStem {
    pub number: Option<u32>,
    /// Name after the prefix, dashes preserved.
    pub name: String,
    /// `name` with dashes as spaces. Used as fallback alt text.
    pub title: String,
}

/// Split a file stem into its ordering prefix and name.
pub fn parse_stem(stem: &str) -> ParsedStem {
    let (number, name) = match stem.split_once('-') {
        Some((prefix, rest)) => match prefix.parse::<u32>() {
            Ok(n) => (Some(n), rest),
            Err(_) => (None, stem),
        },
        None => match stem.parse::<u32>() {
            Ok(n) => (Some(n), ""),
            Err(_) => (None, stem),
        },
    };
    ParsedStem {
        number,
        name: name.to_string(),
        title: name.replace(['-', '_'], " ").trim().to_string(),
    }
}

/// Page order: numbered stems by number, unnumbered after them by name.
pub fn compare_stems(a: &ParsedStem, b: &ParsedStem) -> Ordering {
    match (a.number, b.number) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_stem_with_title() {
        let p = parse_stem("010-Front-Porch");
        assert_eq!(p.number, Some(10));
        assert_eq!(p.name, "Front-Porch");
        assert_eq!(p.title, "Front Porch");
    }

    #[test]
    fn number_only() {
        for stem in ["003", "003-"] {
            let p = parse_stem(stem);
            assert_eq!(p.number, Some(3));
            assert_eq!(p.title, "");
        }
    }

    #[test]
    fn unnumbered_keeps_whole_stem() {
        let p = parse_stem("Kitchen-Remodel");
        assert_eq!(p.number, None);
        assert_eq!(p.name, "Kitchen-Remodel");
        assert_eq!(p.title, "Kitchen Remodel");
    }

    #[test]
    fn underscores_become_spaces() {
        assert_eq!(parse_stem("deck_after_stain").title, "deck after stain");
    }

    #[test]
    fn non_numeric_prefix_is_not_a_number() {
        let p = parse_stem("v2-hero");
        assert_eq!(p.number, None);
        assert_eq!(p.title, "v2 hero");
    }

    #[test]
    fn ordering_numbered_then_unnumbered() {
        let mut stems: Vec<ParsedStem> = ["zeta", "020-b", "alpha", "003-a"]
            .iter()
            .map(|s| parse_stem(s))
            .collect();
        stems.sort_by(compare_stems);
        let names: Vec<&str> = stems.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "alpha", "zeta"]);
    }
}
