// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Filling surface states for views of an image.

use super::{aux::AuxUsage, Image, ImageAspects, SampleCount};
use crate::{
    format::{ChannelSelect, Swizzle},
    macros::driver_bitflags,
    surface_layout::{SurfaceUsage, Tiling},
    surface_state::{
        BufferSurfaceStateInfo, ClearColor, ImageSurfaceStateInfo, SurfaceState, SurfaceStateData,
        SurfaceView,
    },
    DeviceOwned,
};

/// Fast-clear depth value of HiZ surfaces, which newer hardware lets the sampler read as the
/// clear color.
const HIZ_FAST_CLEAR_DEPTH: f32 = 1.0;

driver_bitflags! {
    /// Variants of a surface state for the same view and usage.
    SurfaceStateFlags = u8;

    /// The state is used for sampling in the shader-read-only layout, and may read the shadow
    /// surface instead of the primary one.
    TEXTURE_OPTIMAL = 1 << 0,

    /// The state is only used for storage writes, which support every format.
    STORAGE_WRITE_ONLY = 1 << 1,
}

/// Returns `swizzle` adjusted for rendering, where the alpha channel must map to itself.
///
/// # Panics
///
/// - Panics if the alpha channel of `swizzle` is neither `One` nor `Alpha`.
#[inline]
pub fn swizzle_for_render(swizzle: Swizzle) -> Swizzle {
    // Formats without alpha are sampled with alpha forced to one. What gets written to that
    // channel does not matter.
    assert!(
        matches!(swizzle.a, ChannelSelect::One | ChannelSelect::Alpha),
        "cannot render with {:?} in the alpha channel",
        swizzle.a,
    );

    Swizzle {
        a: ChannelSelect::Alpha,
        ..swizzle
    }
}

/// Fills `state` with a surface state that accesses `aspects` of `image` through `view`.
///
/// `view_usage` is the single way the hardware is going to access the surface, and is added to
/// `view.usage`. If `clear_color` is `None`, a default one is used: zero, except for HiZ on
/// generation 9 and later, where the red channel holds the fast-clear depth.
///
/// # Panics
///
/// - Panics if `aspects` does not select a surface of `image`.
/// - Panics if `aux_usage` is not `AuxUsage::None` and `image` has no auxiliary surface.
/// - Panics if `view_usage` is `SurfaceUsage::RENDER_TARGET` and the alpha channel of
///   `view.swizzle` is neither `One` nor `Alpha`.
/// - Panics if `view_usage` is `SurfaceUsage::STORAGE`, `flags` does not contain
///   `STORAGE_WRITE_ONLY` and `aux_usage` is not `AuxUsage::None`.
/// - Panics if `view` is an uncompressed view of a block-compressed surface, and it covers more
///   than one mip level or array layer.
pub fn fill_surface_state(
    image: &Image,
    aspects: ImageAspects,
    view: &SurfaceView,
    view_usage: SurfaceUsage,
    aux_usage: AuxUsage,
    clear_color: Option<ClearColor>,
    flags: SurfaceStateFlags,
    state: &mut SurfaceState,
) {
    let device = image.device();
    let generation = device.capabilities().generation;

    let mut surface = image.surface_for_aspects(aspects);
    let mut view = *view;
    view.usage |= view_usage;

    // Sampling from the tiled shadow is faster than from the linear primary surface.
    if let Some(shadow) = image.inner().surfaces().shadow() {
        if view.format.is_compressed() && flags.intersects(SurfaceStateFlags::TEXTURE_OPTIMAL) {
            assert!(surface.layout.format.is_compressed());
            assert_eq!(surface.layout.tiling, Tiling::Linear);
            assert!(shadow.layout.tiling.is_tiled());
            surface = shadow;
        }
    }

    if view_usage == SurfaceUsage::RENDER_TARGET {
        view.swizzle = swizzle_for_render(view.swizzle);
    }

    let clear_color = clear_color.unwrap_or_else(|| {
        if generation >= 9 && aux_usage == AuxUsage::Hiz {
            ClearColor::from_f32([HIZ_FAST_CLEAR_DEPTH, 0.0, 0.0, 0.0])
        } else {
            ClearColor::ZERO
        }
    });

    let base_address = image.device_address();
    let address = base_address + surface.offset;
    let aux = image.inner().aux();
    let aux_address = match (aux_usage, aux) {
        (AuxUsage::None, _) => 0,
        (_, Some(aux)) => base_address + aux.surface.offset,
        (_, None) => panic!(
            "{:?} was requested for an image without an auxiliary surface",
            aux_usage,
        ),
    };

    let encoder = device.state_encoder();
    let mut data = SurfaceStateData::zeroed();
    let reads_storage = view_usage == SurfaceUsage::STORAGE
        && !flags.intersects(SurfaceStateFlags::STORAGE_WRITE_ONLY);

    if reads_storage && !view.format.has_matching_typed_storage_format(generation) {
        // The shader does all the tiling and format math itself, on top of raw memory.
        assert_eq!(aux_usage, AuxUsage::None);

        encoder.encode_buffer(
            &mut data,
            &BufferSurfaceStateInfo {
                address,
                size: surface.size(),
                format: None,
                stride: 1,
            },
        );
        state.set(data, address, 0, AuxUsage::None, clear_color);

        return;
    }

    if reads_storage {
        // Typed reads only support a few formats; the shader converts from the lowered one.
        assert_eq!(aux_usage, AuxUsage::None);
        view.format = view.format.lower_storage_format(generation);
    }

    let mut layout = surface.layout;
    let mut offset = 0;
    let mut tile_offsets = [0, 0];

    if surface.layout.format.is_compressed() && !view.format.is_compressed() {
        // Each texel of the view is one block of the surface. This only works for a single
        // subimage at a time.
        assert_eq!(surface.layout.samples, SampleCount::Sample1);
        assert_eq!(
            view.levels, 1,
            "an uncompressed view of a compressed image must have a single level",
        );
        assert_eq!(
            view.layers, 1,
            "an uncompressed view of a compressed image must have a single layer",
        );

        let subimage = device
            .layout_calculator()
            .subimage_surface(&surface.layout, view.base_level, view.base_layer)
            .unwrap_or_else(|| {
                panic!(
                    "level {} layer {} is not a subimage of the surface",
                    view.base_level, view.base_layer,
                )
            });

        view.base_level = 0;
        view.base_layer = 0;

        // Tile offsets are already in blocks, which are texels of the view.
        let [block_width, block_height, _] = surface.layout.format.block_extent();
        layout = subimage.surface;
        layout.format = view.format;
        layout.extent = [
            layout.extent[0].div_ceil(block_width),
            layout.extent[1].div_ceil(block_height),
            1,
        ];
        offset = subimage.offset;
        tile_offsets = [subimage.tile_x, subimage.tile_y];

        if generation <= 8 {
            assert_eq!(surface.layout.tiling, Tiling::Linear);
            assert_eq!(tile_offsets, [0, 0]);
        }
    }

    encoder.encode_image(
        &mut data,
        &ImageSurfaceStateInfo {
            surface: &layout,
            view: &view,
            address: address + offset,
            aux_surface: aux.map(|aux| &aux.surface.layout),
            aux_usage,
            aux_address,
            clear_color,
            x_offset: tile_offsets[0],
            y_offset: tile_offsets[1],
        },
    );
    state.set(data, address + offset, aux_address, aux_usage, clear_color);
}
