// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Image memory layout and auxiliary compression management for a GPU driver.
//!
//! The crate takes a logical image description and turns it into a memory map: one primary
//! surface per aspect, an optional shadow copy, an optional auxiliary compression surface and the
//! fast-clear value block that goes with it. Once an image is created, the same memory map is
//! queried for every access to decide which auxiliary usage is legal for the declared layout, and
//! image views project a subresource range of it into hardware surface states.
//!
//! # Starting off
//!
//! Everything hangs off a [`Device`](device::Device), which describes the hardware generation,
//! the surface layout calculator, the surface state encoder and the pool that hands out surface
//! state slots:
//!
//! ```
//! use image_layout::device::{Device, DeviceCreateInfo};
//!
//! let device = Device::new(DeviceCreateInfo {
//!     generation: 9,
//!     ..Default::default()
//! });
//! assert_eq!(device.capabilities().generation, 9);
//! ```
//!
//! Images are created unbound as a [`RawImage`](image::sys::RawImage), whose
//! [`memory_requirements`](image::sys::RawImage::memory_requirements) give the size and alignment
//! of the allocation. Binding memory turns it into an [`Image`](image::Image), from which
//! [`ImageView`](image::view::ImageView)s can be created.
//!
//! # Error handling
//!
//! Contract violations, such as out of range subresources, multi-bit aspect masks where a single
//! aspect is needed, or image layouts outside of the supported set, panic. The documentation of
//! every function lists the conditions under `# Panics`.
//!
//! Unsupported combinations never fail. They silently degrade to [`AuxUsage::None`] (with a
//! performance warning logged under the `image_layout::perf` target where the hardware could have
//! done better).
//!
//! Running out of memory, either for the image itself or for a surface state slot, is returned as
//! an [`OomError`].
//!
//! [`AuxUsage::None`]: image::aux::AuxUsage::None

use std::{
    error::Error,
    fmt::{Display, Error as FmtError, Formatter},
    sync::Arc,
};

pub mod device;
pub mod format;
pub mod image;
mod macros;
pub mod memory;
pub mod surface_layout;
pub mod surface_state;
mod tests;

/// Represents memory size and offset values on a Vulkan device.
/// Analogous to the Rust `usize` type on the host.
pub type DeviceSize = u64;

/// A [`DeviceSize`] that is known not to equal zero.
pub type NonZeroDeviceSize = std::num::NonZero<DeviceSize>;

/// Represents a GPU virtual address.
pub type DeviceAddress = u64;

/// Log target used for performance warnings, emitted whenever a faster path was skipped.
pub const PERF_LOG_TARGET: &str = "image_layout::perf";

/// Gives access to the internal [`Device`](device::Device) object that an object was created
/// from.
pub trait DeviceOwned {
    /// Returns the device that owns `self`.
    fn device(&self) -> &Arc<device::Device>;
}

impl<T> DeviceOwned for T
where
    T: std::ops::Deref,
    T::Target: DeviceOwned,
{
    fn device(&self) -> &Arc<device::Device> {
        (**self).device()
    }
}

/// Error type returned by functions that can only fail by running out of memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OomError {
    /// There is no memory available on the device (ie. video memory), or no surface state slot
    /// left in the pool.
    OutOfDeviceMemory,
}

impl Error for OomError {}

impl Display for OomError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "{}",
            match self {
                OomError::OutOfDeviceMemory => "no memory available on the graphical device",
            }
        )
    }
}

/// Used in create-info structures to make them non-exhaustive, so that new fields can be added
/// without breaking compatibility. Use `..Default::default()` to fill in the remaining fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NonExhaustive(pub(crate) ());
