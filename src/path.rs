//! Sharded filesystem path derivation for volume identifiers
//!
//! Identifiers are mapped to nested `Dir-DDD` directories by their high-order
//! base-1000 digits, bounding every directory level to at most 1000 entries.
//! The final path component is always the original, undivided id.

use std::path::{Path, PathBuf};

/// Maximum number of entries per shard directory level.
const FAN_OUT: u64 = 1000;

/// Derive the sharded relative path for an identifier.
///
/// `prefix` is the category namespace (for example one prefix for pixel
/// volumes and another for opaque blob files sharing the scheme) and should
/// end with a separator.
///
/// ```
/// use voxelstore::path::sharded_path;
///
/// assert_eq!(sharded_path("vol/", 42), "vol/42");
/// assert_eq!(sharded_path("vol/", 1500), "vol/Dir-001/1500");
/// assert_eq!(sharded_path("vol/", 1_500_000), "vol/Dir-001/Dir-500/1500000");
/// ```
pub fn sharded_path(prefix: &str, id: u64) -> String {
    let mut remaining = id;
    let mut suffix = String::new();

    while remaining > FAN_OUT - 1 {
        remaining /= FAN_OUT;
        if remaining > 0 {
            suffix.insert_str(0, &format!("Dir-{:03}/", remaining % FAN_OUT));
        }
    }

    format!("{}{}{}", prefix, suffix, id)
}

/// Maps (category prefix, numeric id) pairs to absolute paths under a root.
///
/// Explicitly constructed and passed to consumers; there is no process-wide
/// singleton resolver.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The backing root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for an identifier within a category.
    pub fn resolve(&self, prefix: &str, id: u64) -> PathBuf {
        self.root.join(sharded_path(prefix, id))
    }
}
