//! Core descriptor types for pixel volumes

use crate::error::{Result, VolumeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five addressable dimensions of a pixel volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Spatial column
    X,
    /// Spatial row
    Y,
    /// Depth plane
    Z,
    /// Channel
    C,
    /// Time point
    T,
}

impl Axis {
    /// Short name of the axis, as used in bounds errors
    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::C => "C",
            Axis::T => "T",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Externally supplied description of one pixel volume.
///
/// The metadata catalog owns identifier lifecycle and descriptor persistence;
/// this crate only consumes the fields. All extents are at least 1 and the
/// bit depth is a positive multiple of 8, enforced at construction, so a
/// descriptor in hand always yields a well-formed layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDescriptor {
    id: u64,
    size_x: u32,
    size_y: u32,
    size_z: u32,
    size_c: u32,
    size_t: u32,
    bit_depth: u32,
}

impl VolumeDescriptor {
    /// Create a new descriptor, validating every field.
    pub fn new(
        id: u64,
        size_x: u32,
        size_y: u32,
        size_z: u32,
        size_c: u32,
        size_t: u32,
        bit_depth: u32,
    ) -> Result<Self> {
        for (name, extent) in [
            ("size_x", size_x),
            ("size_y", size_y),
            ("size_z", size_z),
            ("size_c", size_c),
            ("size_t", size_t),
        ] {
            if extent == 0 {
                return Err(VolumeError::InvalidDescriptor(format!(
                    "{} must be at least 1",
                    name
                )));
            }
        }

        if bit_depth == 0 || bit_depth % 8 != 0 {
            return Err(VolumeError::InvalidDescriptor(format!(
                "bit depth must be a positive multiple of 8, got {}",
                bit_depth
            )));
        }

        let descriptor = Self {
            id,
            size_x,
            size_y,
            size_z,
            size_c,
            size_t,
            bit_depth,
        };

        if descriptor.checked_total_size().is_none() {
            return Err(VolumeError::InvalidDescriptor(
                "total volume size overflows u64".to_string(),
            ));
        }

        Ok(descriptor)
    }

    /// Externally generated numeric identifier
    pub fn id(&self) -> u64 {
        self.id
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

    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Bytes per sample
    pub fn byte_width(&self) -> u64 {
        u64::from(self.bit_depth / 8)
    }

    /// Declared extent of one axis
    pub fn extent(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.size_x,
            Axis::Y => self.size_y,
            Axis::Z => self.size_z,
            Axis::C => self.size_c,
            Axis::T => self.size_t,
        }
    }

    fn checked_total_size(&self) -> Option<u64> {
        u64::from(self.size_x)
            .checked_mul(u64::from(self.size_y))?
            .checked_mul(u64::from(self.size_z))?
            .checked_mul(u64::from(self.size_c))?
            .checked_mul(u64::from(self.size_t))?
            .checked_mul(self.byte_width())
    }
}
