//! Voxelstore - flat-file storage engine for 5-D pixel volumes
//!
//! A blocking, memory-mapped storage engine for large, regularly-shaped
//! multi-dimensional numeric arrays addressed by (X, Y, Z, C, T). Each
//! volume is one headerless binary file of exactly
//! `size_x * size_y * size_z * size_c * size_t * byte_width` bytes; all
//! shape and sample-width information is supplied externally per access.
//!
//! # Features
//!
//! - Exact stride/offset arithmetic for the 5-D layout, eager and 64-bit
//! - Region, row, plane, stack, and timepoint reads as zero-copy mappings
//! - Durable region writes (flushed and synced before returning)
//! - Null-plane sentinel convention for "not yet written" planes
//! - Whole-volume SHA-1 digesting, with a pluggable-algorithm seam
//! - Base-1000 sharded directory layout bounding per-directory fan-out
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use voxelstore::{VolumeDescriptor, VolumeStore};
//!
//! fn main() -> voxelstore::Result<()> {
//!     let store = VolumeStore::new("/data/repository", "Pixels/")?;
//!
//!     // 512 x 512, 16 z-sections, 3 channels, 10 timepoints, 16-bit samples
//!     let descriptor = Arc::new(VolumeDescriptor::new(42, 512, 512, 16, 3, 10, 16)?);
//!     let buffer = store.create(Arc::clone(&descriptor))?;
//!
//!     let plane = vec![0u8; buffer.layout().plane_size() as usize];
//!     buffer.set_plane(0, 0, 0, &plane)?;
//!
//!     let digest = buffer.calculate_digest()?;
//!     println!("volume digest: {:02x?}", digest);
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod error;
pub mod layout;
pub mod path;
pub mod store;
pub mod types;
pub mod utils;

// Re-exports
pub use access::{MappedRegion, VolumeBuffer, VolumeStats, NULL_PLANE, NULL_PLANE_SIZE};
pub use error::{Result, VolumeError};
pub use layout::VolumeLayout;
pub use path::{sharded_path, PathResolver};
pub use store::VolumeStore;
pub use types::{Axis, VolumeDescriptor};

/// Version of the voxelstore implementation
pub const VOXELSTORE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VOXELSTORE_VERSION.is_empty());
    }
}
