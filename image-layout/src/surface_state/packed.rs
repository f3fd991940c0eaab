// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! A surface state encoder with a flat, documented layout.
//!
//! The fields are stored as plain little-endian integers instead of hardware bit fields, which
//! makes states easy to inspect in tests and tools.

use super::{
    BufferSurfaceStateInfo, ImageSurfaceStateInfo, SurfaceStateData, SurfaceStateEncoder,
    SURFACE_STATE_SIZE,
};
use crate::{
    format::ChannelSelect,
    image::aux::AuxUsage,
    surface_layout::{SurfaceDim, SurfaceUsage, Tiling},
};
use bytemuck::{Pod, Zeroable};

/// Encodes [`PackedSurfaceState`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct PackedSurfaceStateEncoder;

impl SurfaceStateEncoder for PackedSurfaceStateEncoder {
    fn encode_image(&self, data: &mut SurfaceStateData, info: &ImageSurfaceStateInfo<'_>) {
        let &ImageSurfaceStateInfo {
            surface,
            view,
            address,
            aux_surface,
            aux_usage,
            aux_address,
            clear_color,
            x_offset,
            y_offset,
        } = info;

        debug_assert!(aux_usage == AuxUsage::None || aux_surface.is_some());

        let surface_type = if view.usage.intersects(SurfaceUsage::CUBE) {
            SURFACE_TYPE_CUBE
        } else {
            match surface.dim {
                SurfaceDim::Dim1d => SURFACE_TYPE_1D,
                SurfaceDim::Dim2d => SURFACE_TYPE_2D,
                SurfaceDim::Dim3d => SURFACE_TYPE_3D,
            }
        };
        let depth = match surface.dim {
            SurfaceDim::Dim3d => surface.extent[2],
            _ => view.layers,
        };

        let state = PackedSurfaceState {
            address,
            aux_address,
            clear_color: clear_color.0,
            format: ash::vk::Format::from(view.format).as_raw() as u32,
            row_pitch: surface.row_pitch,
            width: surface.extent[0],
            height: surface.extent[1],
            depth: depth as u16,
            base_layer: view.base_layer as u16,
            base_level: view.base_level as u8,
            levels: view.levels as u8,
            x_offset: x_offset as u8,
            y_offset: y_offset as u8,
            swizzle: view.swizzle.to_array().map(|c| c as u8),
            surface_type,
            tiling: tiling_code(surface.tiling),
            aux_usage: aux_usage_code(aux_usage),
            samples: (surface.samples as u32).trailing_zeros() as u8,
        };

        data.0.copy_from_slice(bytemuck::bytes_of(&state));
    }

    fn encode_buffer(&self, data: &mut SurfaceStateData, info: &BufferSurfaceStateInfo) {
        let &BufferSurfaceStateInfo {
            address,
            size,
            format,
            stride,
        } = info;

        debug_assert!(stride != 0);
        let elements = size / stride as u64;

        let state = PackedSurfaceState {
            address,
            format: format.map_or(FORMAT_RAW, |format| {
                ash::vk::Format::from(format).as_raw() as u32
            }),
            row_pitch: stride,
            width: u32::try_from(elements).unwrap_or(u32::MAX),
            height: 1,
            depth: 1,
            levels: 1,
            swizzle: [
                ChannelSelect::Red as u8,
                ChannelSelect::Green as u8,
                ChannelSelect::Blue as u8,
                ChannelSelect::Alpha as u8,
            ],
            surface_type: SURFACE_TYPE_BUFFER,
            ..PackedSurfaceState::zeroed()
        };

        data.0.copy_from_slice(bytemuck::bytes_of(&state));
    }
}

/// Value of [`PackedSurfaceState::format`] for untyped raw buffer access.
pub const FORMAT_RAW: u32 = u32::MAX;

pub const SURFACE_TYPE_1D: u8 = 0;
pub const SURFACE_TYPE_2D: u8 = 1;
pub const SURFACE_TYPE_3D: u8 = 2;
pub const SURFACE_TYPE_CUBE: u8 = 3;
pub const SURFACE_TYPE_BUFFER: u8 = 4;

/// The layout of the surface states written by [`PackedSurfaceStateEncoder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Zeroable, Pod)]
#[repr(C)]
pub struct PackedSurfaceState {
    pub address: u64,
    pub aux_address: u64,
    pub clear_color: [u32; 4],

    /// The raw Vulkan format, or [`FORMAT_RAW`].
    pub format: u32,
    pub row_pitch: u32,
    pub width: u32,
    pub height: u32,

    /// Number of array layers, or the depth of a 3D surface.
    pub depth: u16,
    pub base_layer: u16,
    pub base_level: u8,
    pub levels: u8,
    pub x_offset: u8,
    pub y_offset: u8,
    pub swizzle: [u8; 4],
    pub surface_type: u8,
    pub tiling: u8,
    pub aux_usage: u8,

    /// Log2 of the sample count.
    pub samples: u8,
}

const _: () = assert!(size_of::<PackedSurfaceState>() == SURFACE_STATE_SIZE);

impl PackedSurfaceState {
    /// Reads back a state written by [`PackedSurfaceStateEncoder`].
    #[inline]
    pub fn read(data: &SurfaceStateData) -> Self {
        bytemuck::pod_read_unaligned(&data.0)
    }
}

fn tiling_code(tiling: Tiling) -> u8 {
    match tiling {
        Tiling::Linear => 0,
        Tiling::X => 1,
        Tiling::Y => 2,
        Tiling::W => 3,
        Tiling::Hiz => 4,
        Tiling::Ccs => 5,
    }
}

fn aux_usage_code(aux_usage: AuxUsage) -> u8 {
    match aux_usage {
        AuxUsage::None => 0,
        AuxUsage::Hiz => 1,
        AuxUsage::CcsE => 2,
        AuxUsage::Mcs => 3,
    }
}
