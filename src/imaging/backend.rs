//! Image probing trait and shared types.
//!
//! lazyframe never decodes pixels: it only needs intrinsic dimensions so the
//! placeholder can reserve the right footprint. The [`ImageProbe`] trait keeps
//! the scan stage independent of how those dimensions are read; the
//! production implementation is [`RustProbe`](super::rust_backend::RustProbe).

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported format for probing: {0}")]
    Unsupported(String),
    #[error("Failed to read dimensions: {0}")]
    Decode(String),
}

/// Intrinsic pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `None` for a zero height.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0).then(|| self.width as f64 / self.height as f64)
    }

    /// Whether two images' aspect ratios differ by more than `tolerance`
    /// (relative to `self`).
    pub fn ratio_differs(&self, other: &Dimensions, tolerance: f64) -> bool {
        match (self.aspect_ratio(), other.aspect_ratio()) {
            (Some(a), Some(b)) => ((a - b) / a).abs() > tolerance,
            _ => self != other,
        }
    }
}

/// Reads intrinsic dimensions from image files.
///
/// `Sync` so the scan stage can probe in parallel with rayon.
pub trait ImageProbe: Sync {
    fn identify(&self, path: &Path) -> Result<Dimensions, ProbeError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock probe answering from a table keyed by file name.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockProbe {
        sizes: HashMap<String, Dimensions>,
        probed: Mutex<Vec<String>>,
    }

    impl MockProbe {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_sizes(entries: &[(&str, (u32, u32))]) -> Self {
            Self {
                sizes: entries
                    .iter()
                    .map(|(name, (w, h))| (name.to_string(), Dimensions::new(*w, *h)))
                    .collect(),
                probed: Mutex::new(Vec::new()),
            }
        }

        /// File names probed so far, sorted (probing order is parallel).
        pub fn probed(&self) -> Vec<String> {
            let mut probed = self.probed.lock().unwrap().clone();
            probed.sort();
            probed
        }
    }

    impl ImageProbe for MockProbe {
        fn identify(&self, path: &Path) -> Result<Dimensions, ProbeError> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            self.probed.lock().unwrap().push(name.clone());
            self.sizes
                .get(&name)
                .copied()
                .ok_or_else(|| ProbeError::Decode(format!("no mock dimensions for {name}")))
        }
    }

    #[test]
    fn mock_records_probes() {
        let probe = MockProbe::with_sizes(&[("a.jpg", (800, 600))]);
        let dims = probe.identify(Path::new("/x/a.jpg")).unwrap();
        assert_eq!(dims, Dimensions::new(800, 600));
        assert!(probe.identify(Path::new("/x/b.jpg")).is_err());
        assert_eq!(probe.probed(), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn aspect_ratio_of_zero_height_is_none() {
        assert_eq!(Dimensions::new(10, 0).aspect_ratio(), None);
        assert_eq!(Dimensions::new(400, 250).aspect_ratio(), Some(1.6));
    }

    #[test]
    fn ratio_differs_with_tolerance() {
        let primary = Dimensions::new(1600, 1000);
        assert!(!primary.ratio_differs(&Dimensions::new(800, 500), 0.01));
        assert!(!primary.ratio_differs(&Dimensions::new(800, 501), 0.01));
        assert!(primary.ratio_differs(&Dimensions::new(800, 600), 0.01));
    }
}
