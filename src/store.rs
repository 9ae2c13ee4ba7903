//! Volume store - factory that allocates and opens backing files

use crate::access::VolumeBuffer;
use crate::error::{Result, VolumeError};
use crate::layout::VolumeLayout;
use crate::path::PathResolver;
use crate::types::VolumeDescriptor;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Factory for [`VolumeBuffer`] instances under one backing root.
///
/// A store owns a root directory and a category prefix (for example one
/// namespace for pixel volumes and another for opaque blob files sharing the
/// same sharding scheme). The root is validated eagerly at construction;
/// volume-level operations never discover a misconfigured root late.
///
/// Explicitly constructed and injected into consumers; there is no
/// process-wide singleton store.
#[derive(Debug)]
pub struct VolumeStore {
    resolver: PathResolver,
    prefix: String,
}

impl VolumeStore {
    /// Create a store over `root` with a category `prefix` such as
    /// `"Pixels/"`.
    ///
    /// Fails with [`VolumeError::Configuration`] if the root is missing, is
    /// not a directory, or is not writable.
    pub fn new(root: impl AsRef<Path>, prefix: impl Into<String>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        let metadata = fs::metadata(&root).map_err(|e| {
            VolumeError::Configuration(format!("backing root {}: {}", root.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(VolumeError::Configuration(format!(
                "backing root {} is not a directory",
                root.display()
            )));
        }
        if metadata.permissions().readonly() {
            return Err(VolumeError::Configuration(format!(
                "backing root {} is not writable",
                root.display()
            )));
        }

        Ok(Self {
            resolver: PathResolver::new(root),
            prefix: prefix.into(),
        })
    }

    /// The backing root directory
    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// Sharded path of the backing file for `id`.
    pub fn volume_path(&self, id: u64) -> PathBuf {
        self.resolver.resolve(&self.prefix, id)
    }

    /// Allocate a new backing file for `descriptor` and return a read/write
    /// buffer over it.
    ///
    /// The file is pre-sized to exactly `total_size` bytes by seeking to the
    /// last byte and writing it, which stays sparse on file systems that
    /// support sparse files. Fails with [`VolumeError::AlreadyExists`] if a
    /// backing file for this id is already present.
    pub fn create(&self, descriptor: Arc<VolumeDescriptor>) -> Result<VolumeBuffer> {
        let layout = VolumeLayout::new(&descriptor);
        let path = self.volume_path(descriptor.id());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    VolumeError::AlreadyExists(path.display().to_string())
                }
                _ => VolumeError::Io(e),
            })?;

        // total_size >= 1 because every extent is >= 1.
        file.seek(SeekFrom::Start(layout.total_size() - 1))?;
        file.write_all(&[0])?;
        file.sync_all()?;

        debug!(
            id = descriptor.id(),
            path = %path.display(),
            size = layout.total_size(),
            "created volume file"
        );

        Ok(VolumeBuffer::new(descriptor, file, path))
    }

    /// Open the existing backing file for `descriptor`.
    ///
    /// The file length is verified against the descriptor-derived
    /// `total_size`; a mismatch fails with [`VolumeError::FileLength`]
    /// rather than handing out a buffer whose offsets silently disagree
    /// with the file.
    pub fn open(&self, descriptor: Arc<VolumeDescriptor>) -> Result<VolumeBuffer> {
        let layout = VolumeLayout::new(&descriptor);
        let path = self.volume_path(descriptor.id());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => VolumeError::NotFound(path.display().to_string()),
                _ => VolumeError::Io(e),
            })?;

        let actual = file.metadata()?.len();
        if actual != layout.total_size() {
            return Err(VolumeError::FileLength {
                expected: layout.total_size(),
                actual,
            });
        }

        debug!(
            id = descriptor.id(),
            path = %path.display(),
            size = actual,
            "opened volume file"
        );

        Ok(VolumeBuffer::new(descriptor, file, path))
    }
}
