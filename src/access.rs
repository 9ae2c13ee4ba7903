//! Volume buffer - coordinate-addressed, memory-mapped access to one backing file

use crate::error::{Result, VolumeError};
use crate::layout::VolumeLayout;
use crate::types::VolumeDescriptor;
use crate::utils::format_bytes;
use digest::{Digest, Output};
use memmap2::{Mmap, MmapMut, MmapOptions};
use parking_lot::RwLock;
use sha1::Sha1;
use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// Number of leading plane bytes compared against [`NULL_PLANE`].
pub const NULL_PLANE_SIZE: usize = 64;

/// Sentinel pattern marking a plane as not yet written.
///
/// Only the first [`NULL_PLANE_SIZE`] bytes of a plane are compared, so the
/// check is a content-sniffing heuristic: legitimate data that happens to
/// begin with this pattern reads as absent, and a plane is considered
/// written the moment its prefix differs, whatever the rest contains.
pub const NULL_PLANE: [u8; NULL_PLANE_SIZE] = null_plane_pattern();

const fn null_plane_pattern() -> [u8; NULL_PLANE_SIZE] {
    let mut pattern = [0u8; NULL_PLANE_SIZE];
    let mut i = 0;
    while i < NULL_PLANE_SIZE {
        pattern[i] = if i % 2 == 0 { 0x80 } else { 0x7F };
        i += 1;
    }
    pattern
}

/// True when the leading bytes of `plane` match the sentinel prefix.
fn is_null_plane(plane: &[u8]) -> bool {
    let n = NULL_PLANE_SIZE.min(plane.len());
    plane[..n] == NULL_PLANE[..n]
}

/// Read-only view of one mapped byte range of a volume.
///
/// The caller reads directly from the mapping; no copy is made. The view
/// stays valid for as long as it is held, independent of the buffer that
/// produced it.
#[derive(Debug)]
pub struct MappedRegion {
    map: Mmap,
}

impl MappedRegion {
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.map
    }
}

impl Deref for MappedRegion {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.map
    }
}

impl AsRef<[u8]> for MappedRegion {
    fn as_ref(&self) -> &[u8] {
        &self.map
    }
}

/// Coordinate-addressed access to one pixel volume.
///
/// A buffer exclusively owns one file handle, opened eagerly at construction
/// by [`VolumeStore`](crate::store::VolumeStore) and closed on drop. Mapping
/// and write-back operations are guarded by a shared-read/exclusive-write
/// lock; a [`MappedRegion`] handed out earlier still observes later writes,
/// since mappings are live views of the file. Multiple buffers may wrap the
/// same underlying file; coordination across buffers or processes is the
/// caller's concern.
///
/// Every accessor may block on file-system I/O. There is no timeout or
/// cancellation below this layer.
pub struct VolumeBuffer {
    descriptor: Arc<VolumeDescriptor>,
    layout: VolumeLayout,
    file: File,
    path: PathBuf,
    lock: RwLock<()>,
}

impl VolumeBuffer {
    pub(crate) fn new(descriptor: Arc<VolumeDescriptor>, file: File, path: PathBuf) -> Self {
        let layout = VolumeLayout::new(&descriptor);
        Self {
            descriptor,
            layout,
            file,
            path,
            lock: RwLock::new(()),
        }
    }

    /// The descriptor this buffer was opened with
    pub fn descriptor(&self) -> &VolumeDescriptor {
        &self.descriptor
    }

    /// The derived layout
    pub fn layout(&self) -> &VolumeLayout {
        &self.layout
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_region(&self, size: u64, offset: u64) -> Result<()> {
        let total = self.layout.total_size();
        let end = offset
            .checked_add(size)
            .ok_or(VolumeError::RegionBounds {
                offset,
                size,
                total,
            })?;
        if end > total {
            return Err(VolumeError::RegionBounds {
                offset,
                size,
                total,
            });
        }
        Ok(())
    }

    // Maps without taking the region lock; callers hold it already.
    fn map_shared(&self, size: u64, offset: u64) -> Result<MappedRegion> {
        // Safety: the buffer keeps the file handle open for the lifetime of
        // the mapping; writes race only through this buffer's own lock.
        let map = unsafe {
            MmapOptions::new()
                .offset(offset)
                .len(size as usize)
                .map(&self.file)?
        };
        Ok(MappedRegion { map })
    }

    /// Map `size` bytes at `offset` read-only.
    pub fn region(&self, size: u64, offset: u64) -> Result<MappedRegion> {
        self.check_region(size, offset)?;
        let _guard = self.lock.read();
        self.map_shared(size, offset)
    }

    /// Write `data` over the `size` bytes at `offset` and force it to
    /// stable storage.
    ///
    /// Durability contract: a successful return means the bytes are
    /// persisted, not merely buffered. A failure part-way through leaves the
    /// range in an undefined state; there is no rollback.
    pub fn set_region(&self, size: u64, offset: u64, data: &[u8]) -> Result<()> {
        if data.len() as u64 != size {
            return Err(VolumeError::RegionSize {
                expected: size,
                actual: data.len() as u64,
            });
        }
        self.check_region(size, offset)?;

        let _guard = self.lock.write();
        // Safety: as in map_shared; the exclusive lock keeps this buffer's
        // readers out while the range is mutated.
        let mut map: MmapMut = unsafe {
            MmapOptions::new()
                .offset(offset)
                .len(size as usize)
                .map_mut(&self.file)?
        };
        map.copy_from_slice(data);
        map.flush()?;
        self.file.sync_all()?;
        trace!(offset, size, "region persisted");
        Ok(())
    }

    /// Map the row at (y, z, c, t).
    pub fn row(&self, y: u32, z: u32, c: u32, t: u32) -> Result<MappedRegion> {
        self.layout
            .check_bounds(Some(y), Some(z), Some(c), Some(t))?;
        self.region(self.layout.row_size(), self.layout.row_offset(y, z, c, t))
    }

    /// Map the plane at (z, c, t), or `None` if it reads as unwritten.
    ///
    /// A plane whose first [`NULL_PLANE_SIZE`] bytes equal [`NULL_PLANE`]
    /// reports absent regardless of its remaining bytes; see the sentinel
    /// caveats on [`NULL_PLANE`].
    pub fn plane(&self, z: u32, c: u32, t: u32) -> Result<Option<MappedRegion>> {
        self.layout.check_bounds(None, Some(z), Some(c), Some(t))?;
        let region = self.region(self.layout.plane_size(), self.layout.plane_offset(z, c, t))?;
        if is_null_plane(&region) {
            Ok(None)
        } else {
            Ok(Some(region))
        }
    }

    /// Map the stack at (c, t).
    pub fn stack(&self, c: u32, t: u32) -> Result<MappedRegion> {
        self.layout.check_bounds(None, None, Some(c), Some(t))?;
        self.region(self.layout.stack_size(), self.layout.stack_offset(c, t))
    }

    /// Map the timepoint at t.
    pub fn timepoint(&self, t: u32) -> Result<MappedRegion> {
        self.layout.check_bounds(None, None, None, Some(t))?;
        self.region(self.layout.timepoint_size(), self.layout.timepoint_offset(t))
    }

    /// Write one row.
    pub fn set_row(&self, y: u32, z: u32, c: u32, t: u32, data: &[u8]) -> Result<()> {
        self.layout
            .check_bounds(Some(y), Some(z), Some(c), Some(t))?;
        self.set_region(
            self.layout.row_size(),
            self.layout.row_offset(y, z, c, t),
            data,
        )
    }

    /// Write one plane.
    pub fn set_plane(&self, z: u32, c: u32, t: u32, data: &[u8]) -> Result<()> {
        self.layout.check_bounds(None, Some(z), Some(c), Some(t))?;
        self.set_region(
            self.layout.plane_size(),
            self.layout.plane_offset(z, c, t),
            data,
        )
    }

    /// Write one stack.
    pub fn set_stack(&self, c: u32, t: u32, data: &[u8]) -> Result<()> {
        self.layout.check_bounds(None, None, Some(c), Some(t))?;
        self.set_region(
            self.layout.stack_size(),
            self.layout.stack_offset(c, t),
            data,
        )
    }

    /// Write one timepoint.
    pub fn set_timepoint(&self, t: u32, data: &[u8]) -> Result<()> {
        self.layout.check_bounds(None, None, None, Some(t))?;
        self.set_region(
            self.layout.timepoint_size(),
            self.layout.timepoint_offset(t),
            data,
        )
    }

    /// Mark the plane at (z, c, t) as unwritten.
    ///
    /// Writes the sentinel prefix followed by zeros over the whole plane, so
    /// a subsequent [`plane`](Self::plane) call returns `None`.
    pub fn clear_plane(&self, z: u32, c: u32, t: u32) -> Result<()> {
        self.layout.check_bounds(None, Some(z), Some(c), Some(t))?;
        let plane_size = self.layout.plane_size() as usize;
        let mut data = vec![0u8; plane_size];
        let n = NULL_PLANE_SIZE.min(plane_size);
        data[..n].copy_from_slice(&NULL_PLANE[..n]);
        self.set_region(
            self.layout.plane_size(),
            self.layout.plane_offset(z, c, t),
            &data,
        )
    }

    /// SHA-1 digest of the whole volume, for integrity verification against
    /// the value held by the external metadata catalog.
    pub fn calculate_digest(&self) -> Result<[u8; 20]> {
        Ok(self.digest_with::<Sha1>()?.into())
    }

    /// Digest the whole volume under a caller-chosen algorithm.
    ///
    /// Timepoints are contiguous and fed in increasing t order, so the
    /// result is identical to hashing bytes `[0, total_size)` sequentially;
    /// the per-timepoint chunking only bounds the mapped span.
    pub fn digest_with<D: Digest>(&self) -> Result<Output<D>> {
        let _guard = self.lock.read();
        let mut hasher = D::new();
        for t in 0..self.layout.size_t() {
            let region =
                self.map_shared(self.layout.timepoint_size(), self.layout.timepoint_offset(t))?;
            hasher.update(region.as_bytes());
        }
        Ok(hasher.finalize())
    }

    /// Dimension and size summary for this volume.
    pub fn stats(&self) -> VolumeStats {
        let layout = &self.layout;
        VolumeStats {
            id: self.descriptor.id(),
            size_x: layout.size_x(),
            size_y: layout.size_y(),
            size_z: layout.size_z(),
            size_c: layout.size_c(),
            size_t: layout.size_t(),
            byte_width: layout.byte_width(),
            plane_count: u64::from(layout.size_z())
                * u64::from(layout.size_c())
                * u64::from(layout.size_t()),
            total_size: layout.total_size(),
        }
    }
}

/// Volume statistics
#[derive(Debug, Clone)]
pub struct VolumeStats {
    pub id: u64,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    pub size_c: u32,
    pub size_t: u32,
    pub byte_width: u64,
    pub plane_count: u64,
    pub total_size: u64,
}

impl VolumeStats {
    pub fn summary(&self) -> String {
        format!(
            "volume {}: {} x {} x {}z x {}c x {}t @ {} B/sample, {} planes, {}",
            self.id,
            self.size_x,
            self.size_y,
            self.size_z,
            self.size_c,
            self.size_t,
            self.byte_width,
            self.plane_count,
            format_bytes(self.total_size),
        )
    }
}
