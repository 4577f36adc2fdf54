//! rawslice - slices and grayscale windows from raw, headerless volume files
//!
//! A raw volume has no header: width, height, element type and byte order
//! are declared by the caller every time the bytes are read, and the same
//! file may be reinterpreted freely.
//!
//! # Features
//!
//! - Eight element types (`uint8` .. `float64`) in either byte order
//! - Axial and coronal slice extraction from a single in-memory buffer
//! - Single-pass global extrema for default display windows
//! - Window/level mapping to 8-bit grayscale
//! - An explicit file cache with a size ceiling and memoised extrema
//! - Optional rayon-parallel extremum scans (`parallel` feature)
//!
//! # Example
//!
//! ```rust
//! use rawslice::{extract_slice, map_samples_to_grayscale, ByteOrder, ElementType};
//! use rawslice::{VolumeGeometry, ViewingPlane, Window};
//!
//! # fn main() -> rawslice::Result<()> {
//! // Two 4x2 uint8 slices
//! let volume: Vec<u8> = (0..16).collect();
//! let geometry = VolumeGeometry::new(4, 2, ElementType::Uint8)?;
//!
//! let slice = extract_slice(&volume, &geometry, 1, ViewingPlane::Axial)?;
//! let pixels = map_samples_to_grayscale(
//!     &slice.data,
//!     ElementType::Uint8,
//!     ByteOrder::Little,
//!     Window::new(8.0, 15.0),
//! );
//! assert_eq!(pixels.len(), 8);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod cache;
pub mod config;
pub mod decode;
pub mod error;
pub mod io;
pub mod protocol;
pub mod slice;
pub mod stats;
pub mod types;
pub mod window;

// Re-exports
pub use access::RawVolumeAccess;
pub use cache::FileCache;
pub use config::{ViewerConfig, DEFAULT_MAX_FILE_SIZE};
pub use decode::{decode, decode_all, encode, Samples};
pub use error::{RawSliceError, Result};
pub use io::{FileAccess, FileSystemAccess};
pub use protocol::{Request, Response};
pub use slice::{extract_slice, max_slice_count, Slice, VolumeGeometry};
pub use stats::{compute_extrema, find_min_max};
pub use types::{ByteOrder, ElementType, Extrema, ViewingPlane, Window};
pub use window::{map_samples_to_grayscale, map_to_grayscale};

/// Version of the rawslice crate
pub const RAWSLICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!RAWSLICE_VERSION.is_empty());
    }
}
