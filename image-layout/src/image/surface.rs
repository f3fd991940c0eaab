// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Placement of surfaces within the memory of an image.

use super::{aux::AuxiliaryRecord, ImageAspect, ImageCreateFlags, ImageUsage};
use crate::{
    memory::{align_up, DeviceAlignment, MemoryRequirements},
    surface_layout::{SurfaceLayout, SurfaceUsage},
    DeviceSize,
};

/// A surface that has been placed in the memory of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Surface {
    /// Offset of the surface from the start of the image.
    pub offset: DeviceSize,
    pub layout: SurfaceLayout,
}

impl Surface {
    /// Returns the size of the surface in bytes.
    #[inline]
    pub fn size(&self) -> DeviceSize {
        self.layout.size
    }

    /// Returns the alignment that the surface requires.
    #[inline]
    pub fn alignment(&self) -> DeviceAlignment {
        self.layout.alignment
    }

    /// Returns the offset of the first byte after the surface.
    #[inline]
    pub fn end(&self) -> DeviceSize {
        self.offset + self.layout.size
    }
}

/// Appends surfaces to the memory of an image.
///
/// Every surface goes at the current end of the image, rounded up to the surface's alignment.
/// The alignment of the image is the largest alignment of anything placed in it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfacePlacer {
    size: DeviceSize,
    alignment: DeviceAlignment,
}

impl SurfacePlacer {
    /// Returns a placer for an image that is empty so far.
    #[inline]
    pub const fn new() -> Self {
        SurfacePlacer {
            size: 0,
            alignment: DeviceAlignment::MIN,
        }
    }

    /// Places `layout` after everything placed so far.
    ///
    /// # Panics
    ///
    /// - Panics if `layout.size` is 0.
    pub fn place(&mut self, layout: SurfaceLayout) -> Surface {
        assert!(layout.size > 0, "cannot place a surface that was never laid out");

        let offset = align_up(self.size, layout.alignment);
        self.size = offset + layout.size;
        self.alignment = self.alignment.max(layout.alignment);

        Surface { offset, layout }
    }

    /// Appends `size` bytes right after everything placed so far, without any padding, and
    /// returns their offset.
    pub fn append_bytes(&mut self, size: DeviceSize) -> DeviceSize {
        let offset = self.size;
        self.size += size;

        offset
    }

    /// Returns the size of everything placed so far.
    #[inline]
    pub fn size(&self) -> DeviceSize {
        self.size
    }

    /// Returns the largest alignment of everything placed so far.
    #[inline]
    pub fn alignment(&self) -> DeviceAlignment {
        self.alignment
    }

    /// Returns the memory requirements of an image holding everything placed so far.
    #[inline]
    pub fn memory_requirements(&self) -> MemoryRequirements {
        MemoryRequirements {
            size: self.size,
            alignment: self.alignment,
        }
    }
}

/// Every surface of an image, as placed in its memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageSurfaces {
    pub(crate) primary: [Option<Surface>; 3],
    pub(crate) shadow: Option<Surface>,
    pub(crate) aux: Option<AuxiliaryRecord>,
}

impl ImageSurfaces {
    /// Returns the primary surface of `aspect`, if the image has that aspect.
    #[inline]
    pub fn primary(&self, aspect: ImageAspect) -> Option<&Surface> {
        self.primary[aspect.index()].as_ref()
    }

    /// Returns the shadow surface, if the image has one.
    ///
    /// A shadow surface is a tiled copy of a compressed, linear primary surface, which the
    /// sampler reads instead of the primary surface when it can.
    #[inline]
    pub fn shadow(&self) -> Option<&Surface> {
        self.shadow.as_ref()
    }

    /// Returns the auxiliary surface and its fast-clear block, if the image has them.
    #[inline]
    pub fn aux(&self) -> Option<&AuxiliaryRecord> {
        self.aux.as_ref()
    }

    /// Returns every placed surface, in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.primary
            .iter()
            .flatten()
            .chain(&self.shadow)
            .chain(self.aux.as_ref().map(|aux| &aux.surface))
    }
}

/// Returns how the hardware accesses the surface of `aspect`, for an image with the given flags
/// and usage.
pub(crate) fn choose_surface_usage(
    flags: ImageCreateFlags,
    usage: ImageUsage,
    aspect: ImageAspect,
) -> SurfaceUsage {
    let mut surface_usage = SurfaceUsage::empty();

    if usage.intersects(ImageUsage::SAMPLED | ImageUsage::INPUT_ATTACHMENT) {
        surface_usage |= SurfaceUsage::TEXTURE;
    }

    if usage.intersects(ImageUsage::COLOR_ATTACHMENT) {
        surface_usage |= SurfaceUsage::RENDER_TARGET;
    }

    if flags.intersects(ImageCreateFlags::CUBE_COMPATIBLE) {
        surface_usage |= SurfaceUsage::CUBE;
    }

    // Clears of depth and stencil images go through the depth and stencil hardware, even when
    // the image is only used for transfers.
    match aspect {
        ImageAspect::Depth => surface_usage |= SurfaceUsage::DEPTH,
        ImageAspect::Stencil => surface_usage |= SurfaceUsage::STENCIL,
        ImageAspect::Color => (),
    }

    // Transfers read by sampling from the source.
    if usage.intersects(ImageUsage::TRANSFER_SRC) {
        surface_usage |= SurfaceUsage::TEXTURE;
    }

    // Transfers write color by rendering into the destination.
    if usage.intersects(ImageUsage::TRANSFER_DST) && aspect == ImageAspect::Color {
        surface_usage |= SurfaceUsage::RENDER_TARGET;
    }

    surface_usage
}
