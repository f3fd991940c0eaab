// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Alignment arithmetic and the memory an image is bound to.

use crate::{DeviceAddress, DeviceSize, NonZeroDeviceSize};
use std::{
    cmp::Ordering,
    error::Error,
    fmt::{Debug, Display, Error as FmtError, Formatter},
};

/// Power of two alignment of a resource in device memory.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct DeviceAlignment(NonZeroDeviceSize);

impl DeviceAlignment {
    /// The smallest possible alignment, 1.
    pub const MIN: Self = Self(NonZeroDeviceSize::MIN);

    /// Tries to create a `DeviceAlignment` from a [`DeviceSize`], returning [`None`] if it's not a
    /// power of two.
    #[inline]
    pub const fn new(alignment: DeviceSize) -> Option<Self> {
        if alignment.is_power_of_two() {
            match NonZeroDeviceSize::new(alignment) {
                Some(alignment) => Some(Self(alignment)),
                None => None,
            }
        } else {
            None
        }
    }

    /// Returns the alignment as a [`DeviceSize`].
    #[inline]
    pub const fn as_devicesize(self) -> DeviceSize {
        self.0.get()
    }

    /// Returns the alignment as a [`NonZeroDeviceSize`].
    #[inline]
    pub const fn as_nonzero(self) -> NonZeroDeviceSize {
        self.0
    }

    /// Returns the base-2 logarithm of the alignment.
    #[inline]
    pub const fn log2(self) -> u32 {
        self.0.trailing_zeros()
    }

    /// Returns whether `offset` is a multiple of `self`.
    #[inline]
    pub const fn is_aligned(self, offset: DeviceSize) -> bool {
        offset & (self.as_devicesize() - 1) == 0
    }
}

impl Debug for DeviceAlignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{:?} (1 << {:?})", self.as_nonzero(), self.log2())
    }
}

impl Default for DeviceAlignment {
    #[inline]
    fn default() -> Self {
        DeviceAlignment::MIN
    }
}

impl PartialOrd for DeviceAlignment {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeviceAlignment {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_nonzero().cmp(&other.as_nonzero())
    }
}

impl TryFrom<DeviceSize> for DeviceAlignment {
    type Error = ();

    #[inline]
    fn try_from(alignment: DeviceSize) -> Result<Self, Self::Error> {
        DeviceAlignment::new(alignment).ok_or(())
    }
}

impl From<DeviceAlignment> for DeviceSize {
    #[inline]
    fn from(alignment: DeviceAlignment) -> Self {
        alignment.as_devicesize()
    }
}

/// Rounds `val` up to the next multiple of `alignment`.
#[inline]
pub const fn align_up(val: DeviceSize, alignment: DeviceAlignment) -> DeviceSize {
    align_down(val + alignment.as_devicesize() - 1, alignment)
}

/// Rounds `val` down to the previous multiple of `alignment`.
#[inline]
pub const fn align_down(val: DeviceSize, alignment: DeviceAlignment) -> DeviceSize {
    val & !(alignment.as_devicesize() - 1)
}

/// Memory requirements of an image: the byte size of its allocation and the alignment that the
/// start of the allocation must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRequirements {
    /// Number of bytes the image occupies, including every auxiliary surface and the fast-clear
    /// value block.
    pub size: DeviceSize,

    /// Alignment of the start of the image, the maximum over all of its surfaces.
    pub alignment: DeviceAlignment,
}

/// A block of device memory that images can be bound to.
///
/// Allocating this memory is the responsibility of the caller; only its GPU address and size are
/// needed here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceMemory {
    /// GPU virtual address of the first byte of the allocation.
    pub device_address: DeviceAddress,

    /// Size of the allocation in bytes.
    pub size: DeviceSize,
}

/// Where an image lives after [`bind_memory`](crate::image::sys::RawImage::bind_memory).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageMemory {
    /// The memory the image is bound to.
    pub memory: DeviceMemory,

    /// Offset of the image within `memory`.
    pub offset: DeviceSize,
}

impl ImageMemory {
    /// Returns the GPU address of the first byte of the image.
    #[inline]
    pub fn device_address(&self) -> DeviceAddress {
        self.memory.device_address + self.offset
    }
}

/// Error that can happen when binding memory to an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindMemoryError {
    /// The offset is not a multiple of the image's required alignment.
    UnalignedOffset {
        offset: DeviceSize,
        required_alignment: DeviceAlignment,
    },

    /// The memory after the offset is too small to hold the image.
    MemoryTooSmall {
        available: DeviceSize,
        required_size: DeviceSize,
    },
}

impl Error for BindMemoryError {}

impl Display for BindMemoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::UnalignedOffset {
                offset,
                required_alignment,
            } => write!(
                f,
                "the offset {} is not a multiple of the required alignment {}",
                offset,
                required_alignment.as_devicesize(),
            ),
            Self::MemoryTooSmall {
                available,
                required_size,
            } => write!(
                f,
                "the memory has {} bytes available after the offset, but the image needs {}",
                available, required_size,
            ),
        }
    }
}
