// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Hardware surface shapes.
//!
//! A surface is one physically contiguous piece of an image: the texels of one aspect, a shadow
//! copy of them, or an auxiliary compression surface. How the texels are arranged inside a
//! surface is up to the hardware, and is computed by a [`SurfaceLayoutCalculator`]. The rest of
//! the crate only looks at the size, alignment and pitches that it returns.

use crate::{
    format::Format,
    image::{ImageType, SampleCount},
    macros::driver_bitflags,
    memory::DeviceAlignment,
    DeviceSize,
};
use std::fmt::Debug;

pub mod reference;

/// Computes the shape of surfaces.
///
/// Every method returns `None` when the input is a combination that the hardware does not
/// support. For [`init_surface`](Self::init_surface) that is a bug in the caller, for the
/// auxiliary surfaces it just means the image goes without one.
pub trait SurfaceLayoutCalculator: Debug + Send + Sync {
    /// Lays out a primary surface.
    fn init_surface(&self, info: &SurfaceInitInfo) -> Option<SurfaceLayout>;

    /// Derives the HiZ surface of a depth surface.
    fn hiz_surface(&self, surface: &SurfaceLayout) -> Option<SurfaceLayout>;

    /// Derives the single-sample color compression surface of a color surface.
    fn ccs_surface(&self, surface: &SurfaceLayout) -> Option<SurfaceLayout>;

    /// Derives the multisample compression surface of a multisampled color surface.
    fn mcs_surface(&self, surface: &SurfaceLayout) -> Option<SurfaceLayout>;

    /// Extracts a single mip level and array layer of `surface` as a surface of its own.
    fn subimage_surface(
        &self,
        surface: &SurfaceLayout,
        level: u32,
        layer: u32,
    ) -> Option<Subimage>;
}

/// The dimensionality of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceDim {
    Dim1d,
    Dim2d,
    Dim3d,
}

impl From<ImageType> for SurfaceDim {
    #[inline]
    fn from(val: ImageType) -> Self {
        match val {
            ImageType::Dim1d => SurfaceDim::Dim1d,
            ImageType::Dim2d => SurfaceDim::Dim2d,
            ImageType::Dim3d => SurfaceDim::Dim3d,
        }
    }
}

/// The arrangement of the bytes of a surface in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tiling {
    /// Row-major.
    Linear,
    /// 512-byte by 8-row tiles.
    X,
    /// 128-byte by 32-row tiles.
    Y,
    /// 64-byte by 64-row tiles, used for stencil.
    W,
    /// The tiling of HiZ surfaces.
    Hiz,
    /// The tiling of color compression surfaces.
    Ccs,
}

impl Tiling {
    /// Returns whether the tiling is anything other than linear.
    #[inline]
    pub const fn is_tiled(self) -> bool {
        !matches!(self, Tiling::Linear)
    }

    /// Returns the width in bytes and the height in rows of one tile. Linear surfaces have
    /// one-row tiles as wide as their row alignment.
    #[inline]
    pub const fn tile_extent(self) -> [u32; 2] {
        match self {
            Tiling::Linear => [64, 1],
            Tiling::X => [512, 8],
            Tiling::Y | Tiling::Hiz | Tiling::Ccs => [128, 32],
            Tiling::W => [64, 64],
        }
    }
}

driver_bitflags! {
    /// A set of tilings that a surface may be laid out with.
    TilingFlags = u8;

    LINEAR = 1 << 0,
    X = 1 << 1,
    Y = 1 << 2,
    W = 1 << 3,
}

impl TilingFlags {
    /// Any tiling the calculator sees fit.
    pub const ANY: TilingFlags = TilingFlags::all();

    /// Returns whether `tiling` is in `self`.
    #[inline]
    pub const fn allows(self, tiling: Tiling) -> bool {
        match tiling {
            Tiling::Linear => self.intersects(TilingFlags::LINEAR),
            Tiling::X => self.intersects(TilingFlags::X),
            Tiling::Y | Tiling::Hiz | Tiling::Ccs => self.intersects(TilingFlags::Y),
            Tiling::W => self.intersects(TilingFlags::W),
        }
    }
}

driver_bitflags! {
    /// How a surface is going to be accessed by the hardware.
    SurfaceUsage = u16;

    /// Read by the sampler.
    TEXTURE = 1 << 0,

    /// Written as a color render target.
    RENDER_TARGET = 1 << 1,

    /// Used as a depth buffer.
    DEPTH = 1 << 2,

    /// Used as a stencil buffer.
    STENCIL = 1 << 3,

    /// Viewed as a cube map.
    CUBE = 1 << 4,

    /// Read and written as a storage image.
    STORAGE = 1 << 5,
}

/// Parameters to lay out a primary surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceInitInfo {
    pub dim: SurfaceDim,
    pub format: Format,
    pub extent: [u32; 3],
    pub levels: u32,
    pub layers: u32,
    pub samples: SampleCount,
    pub tiling_flags: TilingFlags,
    pub usage: SurfaceUsage,

    /// The row pitch the caller wants, or `0` to let the calculator pick the minimum.
    pub row_pitch: u32,
}

/// The shape of a laid out surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceLayout {
    pub dim: SurfaceDim,
    pub format: Format,

    /// The extent of the first level, in texels.
    pub extent: [u32; 3],
    pub levels: u32,
    pub layers: u32,
    pub samples: SampleCount,
    pub tiling: Tiling,
    pub usage: SurfaceUsage,

    /// Bytes between the starts of two consecutive rows of texel blocks.
    pub row_pitch: u32,

    /// Bytes between the starts of two consecutive array layers, or depth slices of the first
    /// level for 3D surfaces.
    pub array_pitch: DeviceSize,

    /// Total size of the surface in bytes.
    pub size: DeviceSize,

    /// Required alignment of the start of the surface.
    pub alignment: DeviceAlignment,
}

impl SurfaceLayout {
    /// Returns the extent of the first level, in units of texel blocks of the surface's format.
    #[inline]
    pub fn extent_in_blocks(&self) -> [u32; 3] {
        let block = self.format.block_extent();

        [
            self.extent[0].div_ceil(block[0]),
            self.extent[1].div_ceil(block[1]),
            self.extent[2].div_ceil(block[2]),
        ]
    }
}

/// A single level and layer of a surface, as returned by
/// [`SurfaceLayoutCalculator::subimage_surface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subimage {
    /// The subimage as a single-level, single-layer surface.
    pub surface: SurfaceLayout,

    /// Offset in bytes of the tile that holds the first texel block of the subimage, from the
    /// start of the original surface.
    pub offset: DeviceSize,

    /// Position in texel blocks of the subimage within that tile.
    pub tile_x: u32,
    pub tile_y: u32,
}
