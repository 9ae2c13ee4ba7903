//! Stride and offset arithmetic for the flat 5-D volume layout
//!
//! A volume is one contiguous file of `total_size` bytes with no header. The
//! byte position of sample (x, y, z, c, t) is
//! `t * timepoint_size + c * stack_size + z * plane_size + y * row_size + x * byte_width`,
//! so offsets increase monotonically in t, then c, then z, then y. That
//! ordering is the on-disk contract, not an implementation detail.

use crate::error::{Result, VolumeError};
use crate::types::{Axis, VolumeDescriptor};
use serde::{Deserialize, Serialize};

/// Derived byte sizes and coordinate-to-offset mappings for one volume.
///
/// Every size is computed eagerly at construction and never mutated. All
/// arithmetic is `u64`: the individual extents fit `u32`, but their products
/// routinely do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeLayout {
    size_x: u32,
    size_y: u32,
    size_z: u32,
    size_c: u32,
    size_t: u32,
    byte_width: u64,
    row_size: u64,
    plane_size: u64,
    stack_size: u64,
    timepoint_size: u64,
    total_size: u64,
}

impl VolumeLayout {
    /// Derive the layout from a validated descriptor.
    pub fn new(descriptor: &VolumeDescriptor) -> Self {
        let byte_width = descriptor.byte_width();
        let row_size = u64::from(descriptor.size_x()) * byte_width;
        let plane_size = row_size * u64::from(descriptor.size_y());
        let stack_size = plane_size * u64::from(descriptor.size_z());
        let timepoint_size = stack_size * u64::from(descriptor.size_c());
        let total_size = timepoint_size * u64::from(descriptor.size_t());

        Self {
            size_x: descriptor.size_x(),
            size_y: descriptor.size_y(),
            size_z: descriptor.size_z(),
            size_c: descriptor.size_c(),
            size_t: descriptor.size_t(),
            byte_width,
            row_size,
            plane_size,
            stack_size,
            timepoint_size,
            total_size,
        }
    }

    pub fn size_x(&self) -> u32 {
        self.size_x
    }

    pub fn size_y(&self) -> u32 {
        self.size_y
    }

    pub fn size_z(&self) -> u32 {
        self.size_z
    }

    pub fn size_c(&self) -> u32 {
        self.size_c
    }

    pub fn size_t(&self) -> u32 {
        self.size_t
    }

    /// Bytes per sample
    pub fn byte_width(&self) -> u64 {
        self.byte_width
    }

    /// Bytes in one row: `size_x * byte_width`
    pub fn row_size(&self) -> u64 {
        self.row_size
    }

    /// Bytes in one plane: `row_size * size_y`
    pub fn plane_size(&self) -> u64 {
        self.plane_size
    }

    /// Bytes in one stack: `plane_size * size_z`
    pub fn stack_size(&self) -> u64 {
        self.stack_size
    }

    /// Bytes in one timepoint: `stack_size * size_c`
    pub fn timepoint_size(&self) -> u64 {
        self.timepoint_size
    }

    /// Bytes in the whole volume: `timepoint_size * size_t`
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Byte offset of the row at (y, z, c, t). Coordinates are not checked.
    pub fn row_offset(&self, y: u32, z: u32, c: u32, t: u32) -> u64 {
        self.row_size * u64::from(y)
            + self.timepoint_size * u64::from(t)
            + self.stack_size * u64::from(c)
            + self.plane_size * u64::from(z)
    }

    /// Byte offset of the plane at (z, c, t). Coordinates are not checked.
    pub fn plane_offset(&self, z: u32, c: u32, t: u32) -> u64 {
        self.timepoint_size * u64::from(t)
            + self.stack_size * u64::from(c)
            + self.plane_size * u64::from(z)
    }

    /// Byte offset of the stack at (c, t). Coordinates are not checked.
    pub fn stack_offset(&self, c: u32, t: u32) -> u64 {
        self.timepoint_size * u64::from(t) + self.stack_size * u64::from(c)
    }

    /// Byte offset of the timepoint at t. The coordinate is not checked.
    pub fn timepoint_offset(&self, t: u32) -> u64 {
        self.timepoint_size * u64::from(t)
    }

    /// Check every supplied coordinate against its declared extent.
    ///
    /// Omitted coordinates are not checked; plane-level accessors, for
    /// example, pass `None` for y. Coordinates are unsigned, so negative
    /// values are unrepresentable rather than rejected at runtime.
    pub fn check_bounds(
        &self,
        y: Option<u32>,
        z: Option<u32>,
        c: Option<u32>,
        t: Option<u32>,
    ) -> Result<()> {
        if let Some(y) = y {
            check_axis(Axis::Y, y, self.size_y)?;
        }
        if let Some(z) = z {
            check_axis(Axis::Z, z, self.size_z)?;
        }
        if let Some(c) = c {
            check_axis(Axis::C, c, self.size_c)?;
        }
        if let Some(t) = t {
            check_axis(Axis::T, t, self.size_t)?;
        }
        Ok(())
    }
}

fn check_axis(axis: Axis, value: u32, extent: u32) -> Result<()> {
    if value >= extent {
        return Err(VolumeError::OutOfBounds {
            axis,
            value,
            extent,
        });
    }
    Ok(())
}
