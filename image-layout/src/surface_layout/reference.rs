// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! A surface layout calculator with simple, predictable rules.
//!
//! Mip levels are stacked vertically inside each array layer, each level padded to a multiple of
//! four rows. Array layers (and samples, for multisampled surfaces) follow each other. The whole
//! surface is padded to a whole number of tiles, so tiled surfaces are always a multiple of
//! 4096 bytes.

use super::{
    Subimage, SurfaceDim, SurfaceInitInfo, SurfaceLayout, SurfaceLayoutCalculator, SurfaceUsage,
    Tiling,
};
use crate::{
    format::Format,
    image::{max_mip_levels, mip_level_extent, ImageAspects, SampleCount},
    memory::DeviceAlignment,
    DeviceSize,
};

const TILED_ALIGNMENT: DeviceAlignment = match DeviceAlignment::new(4096) {
    Some(alignment) => alignment,
    None => panic!(),
};

const LINEAR_ALIGNMENT: DeviceAlignment = match DeviceAlignment::new(64) {
    Some(alignment) => alignment,
    None => panic!(),
};

/// Each mip level starts on a multiple of this many rows.
const LEVEL_ROW_ALIGNMENT: u64 = 4;

/// The [`SurfaceLayoutCalculator`] that devices use unless told otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferenceLayoutCalculator {
    generation: u32,
}

/// The unit that a surface is made of: a block of `width` by `height` texels stored in `bytes`
/// bytes.
#[derive(Clone, Copy, Debug)]
struct Element {
    width: u32,
    height: u32,
    bytes: u32,
}

impl Element {
    fn of_format(format: Format) -> Element {
        let [width, height, _] = format.block_extent();

        Element {
            width,
            height,
            bytes: format.block_size() as u32,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Shape {
    row_pitch: u32,
    array_pitch: DeviceSize,
    size: DeviceSize,
}

impl ReferenceLayoutCalculator {
    /// Returns a calculator for the given hardware generation.
    #[inline]
    pub const fn new(generation: u32) -> Self {
        ReferenceLayoutCalculator { generation }
    }

    fn choose_tiling(info: &SurfaceInitInfo) -> Option<Tiling> {
        let flags = info.tiling_flags;

        // Stencil buffers can only be W-tiled, and depth buffers only Y-tiled.
        if info.usage.intersects(SurfaceUsage::STENCIL) {
            return flags.allows(Tiling::W).then_some(Tiling::W);
        }

        if info.usage.intersects(SurfaceUsage::DEPTH) || info.samples != SampleCount::Sample1 {
            return flags.allows(Tiling::Y).then_some(Tiling::Y);
        }

        [Tiling::Y, Tiling::X, Tiling::Linear]
            .into_iter()
            .find(|&tiling| flags.allows(tiling))
    }

    fn alignment(tiling: Tiling) -> DeviceAlignment {
        if tiling.is_tiled() {
            TILED_ALIGNMENT
        } else {
            LINEAR_ALIGNMENT
        }
    }

    /// Number of rows of elements that `level` takes up in one layer, or in one depth slice.
    fn level_rows(extent: [u32; 3], level: u32, element: Element) -> Option<u64> {
        let level_extent = mip_level_extent(extent, level)?;
        let rows = level_extent[1].div_ceil(element.height) as u64;

        Some(rows.next_multiple_of(LEVEL_ROW_ALIGNMENT))
    }

    /// Number of depth slices of `level`, which is 1 for anything but 3D surfaces.
    fn level_slices(dim: SurfaceDim, extent: [u32; 3], level: u32) -> Option<u64> {
        match dim {
            SurfaceDim::Dim3d => Some(mip_level_extent(extent, level)?[2] as u64),
            _ => Some(1),
        }
    }

    fn shape(
        dim: SurfaceDim,
        extent: [u32; 3],
        levels: u32,
        physical_layers: u32,
        element: Element,
        tiling: Tiling,
        row_pitch_hint: u32,
    ) -> Option<Shape> {
        let [tile_width, tile_height] = tiling.tile_extent();

        let min_row_pitch = extent[0].div_ceil(element.width) as u64 * element.bytes as u64;
        let row_pitch = if row_pitch_hint == 0 {
            min_row_pitch.next_multiple_of(tile_width as u64)
        } else {
            if (row_pitch_hint as u64) < min_row_pitch || row_pitch_hint % tile_width != 0 {
                return None;
            }

            row_pitch_hint as u64
        };

        let mut layer_rows = 0;

        for level in 0..levels {
            layer_rows += Self::level_rows(extent, level, element)?
                * Self::level_slices(dim, extent, level)?;
        }

        let total_rows = layer_rows
            .checked_mul(physical_layers as u64)?
            .next_multiple_of(tile_height as u64);

        let array_pitch_rows = match dim {
            SurfaceDim::Dim3d => Self::level_rows(extent, 0, element)?,
            _ => layer_rows,
        };

        Some(Shape {
            row_pitch: u32::try_from(row_pitch).ok()?,
            array_pitch: array_pitch_rows.checked_mul(row_pitch)?,
            size: total_rows.checked_mul(row_pitch)?,
        })
    }

    fn derive_aux(
        surface: &SurfaceLayout,
        element: Element,
        physical_layers: u32,
        tiling: Tiling,
    ) -> Option<SurfaceLayout> {
        let shape = Self::shape(
            surface.dim,
            surface.extent,
            surface.levels,
            physical_layers,
            element,
            tiling,
            0,
        )?;

        Some(SurfaceLayout {
            tiling,
            row_pitch: shape.row_pitch,
            array_pitch: shape.array_pitch,
            size: shape.size,
            alignment: TILED_ALIGNMENT,
            ..*surface
        })
    }
}

impl SurfaceLayoutCalculator for ReferenceLayoutCalculator {
    fn init_surface(&self, info: &SurfaceInitInfo) -> Option<SurfaceLayout> {
        let &SurfaceInitInfo {
            dim,
            format,
            extent,
            levels,
            layers,
            samples,
            tiling_flags: _,
            usage,
            row_pitch,
        } = info;

        if extent.contains(&0) || levels == 0 || layers == 0 {
            return None;
        }

        if levels > max_mip_levels(extent) {
            return None;
        }

        let dim_ok = match dim {
            SurfaceDim::Dim1d => extent[1] == 1 && extent[2] == 1,
            SurfaceDim::Dim2d => extent[2] == 1,
            SurfaceDim::Dim3d => layers == 1,
        };

        if !dim_ok {
            return None;
        }

        if samples != SampleCount::Sample1
            && (dim != SurfaceDim::Dim2d || levels != 1 || format.is_compressed())
        {
            return None;
        }

        if usage.intersects(SurfaceUsage::DEPTH) && format.aspects() != ImageAspects::DEPTH {
            return None;
        }

        if usage.intersects(SurfaceUsage::STENCIL) && format.aspects() != ImageAspects::STENCIL {
            return None;
        }

        let tiling = Self::choose_tiling(info)?;
        let physical_layers = layers.checked_mul(samples as u32)?;
        let shape = Self::shape(
            dim,
            extent,
            levels,
            physical_layers,
            Element::of_format(format),
            tiling,
            row_pitch,
        )?;

        Some(SurfaceLayout {
            dim,
            format,
            extent,
            levels,
            layers,
            samples,
            tiling,
            usage,
            row_pitch: shape.row_pitch,
            array_pitch: shape.array_pitch,
            size: shape.size,
            alignment: Self::alignment(tiling),
        })
    }

    fn hiz_surface(&self, surface: &SurfaceLayout) -> Option<SurfaceLayout> {
        if !surface.usage.intersects(SurfaceUsage::DEPTH)
            || surface.tiling != Tiling::Y
            || surface.dim != SurfaceDim::Dim2d
        {
            return None;
        }

        // One 16-byte HiZ element covers 8x4 samples.
        let element = Element {
            width: 8,
            height: 4,
            bytes: 16,
        };
        let physical_layers = surface.layers.checked_mul(surface.samples as u32)?;

        Self::derive_aux(surface, element, physical_layers, Tiling::Hiz)
    }

    fn ccs_surface(&self, surface: &SurfaceLayout) -> Option<SurfaceLayout> {
        if surface.samples != SampleCount::Sample1
            || !matches!(surface.tiling, Tiling::X | Tiling::Y)
            || surface.dim == SurfaceDim::Dim1d
            || surface.format.is_compressed()
            || surface.format.aspects() != ImageAspects::COLOR
        {
            return None;
        }

        // Older hardware can only compress single-level, single-layer surfaces.
        if self.generation < 9
            && (surface.levels != 1 || surface.layers != 1 || surface.dim != SurfaceDim::Dim2d)
        {
            return None;
        }

        // One byte of CCS covers 256 bytes of the main surface.
        let element = match surface.format.block_size() {
            4 => Element {
                width: 16,
                height: 4,
                bytes: 1,
            },
            8 => Element {
                width: 8,
                height: 4,
                bytes: 1,
            },
            16 => Element {
                width: 4,
                height: 4,
                bytes: 1,
            },
            _ => return None,
        };

        Self::derive_aux(surface, element, surface.layers, Tiling::Ccs)
    }

    fn mcs_surface(&self, surface: &SurfaceLayout) -> Option<SurfaceLayout> {
        if !surface.tiling.is_tiled()
            || surface.format.is_compressed()
            || surface.format.aspects() != ImageAspects::COLOR
        {
            return None;
        }

        let bytes = match surface.samples {
            SampleCount::Sample2 | SampleCount::Sample4 => 1,
            SampleCount::Sample8 => 4,
            SampleCount::Sample16 => 8,
            _ => return None,
        };
        let element = Element {
            width: 1,
            height: 1,
            bytes,
        };

        Self::derive_aux(surface, element, surface.layers, Tiling::Y)
    }

    fn subimage_surface(
        &self,
        surface: &SurfaceLayout,
        level: u32,
        layer: u32,
    ) -> Option<Subimage> {
        if matches!(surface.tiling, Tiling::Hiz | Tiling::Ccs)
            || surface.samples != SampleCount::Sample1
            || level >= surface.levels
        {
            return None;
        }

        let element = Element::of_format(surface.format);
        let level_extent = mip_level_extent(surface.extent, level)?;

        let mut y = 0;

        if surface.dim == SurfaceDim::Dim3d {
            if layer >= level_extent[2] {
                return None;
            }

            for l in 0..level {
                y += Self::level_rows(surface.extent, l, element)?
                    * Self::level_slices(surface.dim, surface.extent, l)?;
            }

            y += layer as u64 * Self::level_rows(surface.extent, level, element)?;
        } else {
            if layer >= surface.layers {
                return None;
            }

            let mut layer_rows = 0;

            for l in 0..surface.levels {
                let rows = Self::level_rows(surface.extent, l, element)?;

                if l < level {
                    y += rows;
                }

                layer_rows += rows;
            }

            y += layer as u64 * layer_rows;
        }

        let row_pitch = surface.row_pitch as DeviceSize;
        let (offset, tile_y) = if surface.tiling.is_tiled() {
            let tile_height = surface.tiling.tile_extent()[1] as u64;
            ((y / tile_height) * tile_height * row_pitch, (y % tile_height) as u32)
        } else {
            (y * row_pitch, 0)
        };
        let rows = Self::level_rows(surface.extent, level, element)?;

        Some(Subimage {
            surface: SurfaceLayout {
                extent: [level_extent[0], level_extent[1], 1],
                levels: 1,
                layers: 1,
                array_pitch: rows * row_pitch,
                size: rows * row_pitch,
                alignment: Self::alignment(surface.tiling),
                ..*surface
            },
            offset,
            tile_x: 0,
            tile_y,
        })
    }
}
