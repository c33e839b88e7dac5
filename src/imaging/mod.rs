//! Image probing: intrinsic dimensions only, pure Rust.
//!
//! - **Backend**: [`ImageProbe`] trait, [`Dimensions`], [`ProbeError`]
//! - **RustProbe**: `image` crate headers + `avif-parse` for AVIF

pub mod backend;
pub mod rust_backend;

pub use backend::{Dimensions, ImageProbe, ProbeError};
pub use rust_backend::{PROBE_EXTENSIONS, RustProbe};
