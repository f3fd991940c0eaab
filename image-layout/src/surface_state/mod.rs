// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Hardware surface states.
//!
//! A surface state is the fixed-size descriptor that the hardware reads to access a surface. Its
//! bit layout belongs to the [`SurfaceStateEncoder`]; this crate only decides which values go
//! into it. Each surface state lives in a slot handed out by the device's
//! [`SurfaceStatePool`](pool::SurfaceStatePool).

use self::pool::SurfaceStateSlot;
use crate::{
    format::{Format, Swizzle},
    image::aux::AuxUsage,
    surface_layout::{SurfaceLayout, SurfaceUsage},
    DeviceAddress, DeviceSize,
};
use std::fmt::Debug;

pub mod packed;
pub mod pool;

/// Size in bytes of one surface state.
pub const SURFACE_STATE_SIZE: usize = 64;

/// Alignment in bytes of surface state slots.
pub const SURFACE_STATE_ALIGNMENT: usize = 64;

/// Writes hardware surface states.
pub trait SurfaceStateEncoder: Debug + Send + Sync {
    /// Encodes a surface state that reads or writes an image surface.
    fn encode_image(&self, data: &mut SurfaceStateData, info: &ImageSurfaceStateInfo<'_>);

    /// Encodes a surface state that reads or writes memory as a buffer.
    fn encode_buffer(&self, data: &mut SurfaceStateData, info: &BufferSurfaceStateInfo);
}

/// The bytes of one surface state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct SurfaceStateData(pub [u8; SURFACE_STATE_SIZE]);

impl SurfaceStateData {
    /// Returns surface state bytes that are all zero.
    #[inline]
    pub const fn zeroed() -> Self {
        SurfaceStateData([0; SURFACE_STATE_SIZE])
    }
}

impl Default for SurfaceStateData {
    #[inline]
    fn default() -> Self {
        Self::zeroed()
    }
}

/// A clear color as stored in a surface state, four raw dwords.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClearColor(pub [u32; 4]);

impl ClearColor {
    /// All channels zero.
    pub const ZERO: ClearColor = ClearColor([0; 4]);

    /// Returns a clear color for a floating point or normalized format.
    #[inline]
    pub fn from_f32(values: [f32; 4]) -> Self {
        ClearColor(values.map(f32::to_bits))
    }

    /// Returns the channels interpreted as floats.
    #[inline]
    pub fn as_f32(self) -> [f32; 4] {
        self.0.map(f32::from_bits)
    }
}

/// The part of an image that a surface state covers, and how it is accessed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceView {
    /// The format the surface is accessed with.
    pub format: Format,
    pub base_level: u32,
    pub levels: u32,

    /// The first array layer, or depth slice for 3D surfaces.
    pub base_layer: u32,

    /// The number of array layers, or depth slices for 3D surfaces.
    pub layers: u32,
    pub swizzle: Swizzle,
    pub usage: SurfaceUsage,
}

/// Everything needed to encode an image surface state.
#[derive(Clone, Copy, Debug)]
pub struct ImageSurfaceStateInfo<'a> {
    pub surface: &'a SurfaceLayout,
    pub view: &'a SurfaceView,

    /// Address of the first byte of `surface`.
    pub address: DeviceAddress,

    pub aux_surface: Option<&'a SurfaceLayout>,
    pub aux_usage: AuxUsage,

    /// Address of the auxiliary surface, or `0` when `aux_usage` is `AuxUsage::None`.
    pub aux_address: DeviceAddress,
    pub clear_color: ClearColor,

    /// Position in texel blocks of the first texel within the tile at `address`.
    pub x_offset: u32,
    pub y_offset: u32,
}

/// Everything needed to encode a buffer surface state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferSurfaceStateInfo {
    pub address: DeviceAddress,
    pub size: DeviceSize,

    /// The format of the elements, or `None` for untyped raw access.
    pub format: Option<Format>,

    /// Bytes between consecutive elements.
    pub stride: u32,
}

/// A surface state that has been filled in, along with the slot it lives in.
#[derive(Debug)]
pub struct SurfaceState {
    slot: SurfaceStateSlot,
    data: SurfaceStateData,
    address: DeviceAddress,
    aux_address: DeviceAddress,
    aux_usage: AuxUsage,
    clear_color: ClearColor,
}

impl SurfaceState {
    pub(crate) fn new(slot: SurfaceStateSlot) -> Self {
        SurfaceState {
            slot,
            data: SurfaceStateData::zeroed(),
            address: 0,
            aux_address: 0,
            aux_usage: AuxUsage::None,
            clear_color: ClearColor::ZERO,
        }
    }

    pub(crate) fn set(
        &mut self,
        data: SurfaceStateData,
        address: DeviceAddress,
        aux_address: DeviceAddress,
        aux_usage: AuxUsage,
        clear_color: ClearColor,
    ) {
        self.data = data;
        self.address = address;
        self.aux_address = aux_address;
        self.aux_usage = aux_usage;
        self.clear_color = clear_color;
    }

    /// Returns the slot the surface state lives in.
    #[inline]
    pub fn slot(&self) -> &SurfaceStateSlot {
        &self.slot
    }

    /// Returns the encoded bytes.
    #[inline]
    pub fn data(&self) -> &SurfaceStateData {
        &self.data
    }

    /// Returns the address of the surface that the state points to.
    #[inline]
    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    /// Returns the address of the auxiliary surface, or `0` if the state does not use one.
    #[inline]
    pub fn aux_address(&self) -> DeviceAddress {
        self.aux_address
    }

    /// Returns the auxiliary usage the state was encoded with.
    #[inline]
    pub fn aux_usage(&self) -> AuxUsage {
        self.aux_usage
    }

    /// Returns the clear color the state was encoded with.
    #[inline]
    pub fn clear_color(&self) -> ClearColor {
        self.clear_color
    }
}
