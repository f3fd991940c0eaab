// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Image storage (1D, 2D, 3D, arrays, etc.) and image views.
//!
//! An image is made of one primary surface per aspect, optionally a shadow copy of the primary
//! surface, and optionally one auxiliary surface followed by a block of fast-clear values. All of
//! them live in a single range of memory. The order in which they are placed is fixed:
//!
//! 1. the primary surfaces, in aspect order (color, depth, stencil),
//! 2. the shadow surface,
//! 3. the auxiliary surface,
//! 4. the fast-clear value block, always last.
//!
//! Creating an image happens in two steps, the same way as in Vulkan:
//!
//! - A [`RawImage`] is created from an [`ImageCreateInfo`]. This decides the placement of every
//!   surface and the auxiliary compression policy, and reports the
//!   [memory requirements](RawImage::memory_requirements).
//! - The raw image is [bound](RawImage::bind_memory) to memory, producing an [`Image`]. Only bound
//!   images can have [views](view::ImageView) created for them.
//!
//! # Auxiliary usage
//!
//! Depending on the layout an image is accessed in, its auxiliary surface may or may not be used.
//! [`Image::aux_usage_for_layout`] returns which [`AuxUsage`](aux::AuxUsage) is legal for an
//! access.

pub use self::{
    aspect::{ImageAspect, ImageAspects},
    layout::ImageLayout,
    sys::{ImageCreateInfo, RawImage},
    usage::ImageUsage,
};
use self::{aux::AuxUsage, surface::Surface};
use crate::{
    device::Device,
    format::Format,
    macros::{vulkan_bitflags, vulkan_bitflags_enum, vulkan_enum},
    memory::{ImageMemory, MemoryRequirements},
    DeviceAddress, DeviceOwned, DeviceSize,
};
use std::{
    cmp::max,
    hash::{Hash, Hasher},
    num::NonZero,
    ops::Range,
    sync::Arc,
};

mod aspect;
pub mod aux;
mod layout;
pub mod state;
pub mod surface;
pub mod sys;
mod usage;
pub mod view;

/// An image that is bound to memory.
#[derive(Debug)]
pub struct Image {
    inner: RawImage,
    memory: ImageMemory,
}

impl Image {
    pub(crate) fn from_raw(inner: RawImage, memory: ImageMemory) -> Self {
        Image { inner, memory }
    }

    /// Returns the unique identifier of the image.
    #[inline]
    pub fn id(&self) -> NonZero<u64> {
        self.inner.id()
    }

    /// Returns the raw image that this image was created from.
    #[inline]
    pub fn inner(&self) -> &RawImage {
        &self.inner
    }

    /// Returns the memory the image is bound to.
    #[inline]
    pub fn memory(&self) -> &ImageMemory {
        &self.memory
    }

    /// Returns the GPU address of the first byte of the image.
    #[inline]
    pub fn device_address(&self) -> DeviceAddress {
        self.memory.device_address()
    }

    /// Returns the memory requirements the image was bound with.
    #[inline]
    pub fn memory_requirements(&self) -> MemoryRequirements {
        self.inner.memory_requirements()
    }

    /// Returns the flags the image was created with.
    #[inline]
    pub fn flags(&self) -> ImageCreateFlags {
        self.inner.flags()
    }

    /// Returns the image type of the image.
    #[inline]
    pub fn image_type(&self) -> ImageType {
        self.inner.image_type()
    }

    /// Returns the image's format.
    #[inline]
    pub fn format(&self) -> Format {
        self.inner.format()
    }

    /// Returns the formats that views of the image may have.
    #[inline]
    pub fn view_formats(&self) -> &[Format] {
        self.inner.view_formats()
    }

    /// Returns the extent of the image.
    #[inline]
    pub fn extent(&self) -> [u32; 3] {
        self.inner.extent()
    }

    /// Returns the number of array layers in the image.
    #[inline]
    pub fn array_layers(&self) -> u32 {
        self.inner.array_layers()
    }

    /// Returns the number of mip levels in the image.
    #[inline]
    pub fn mip_levels(&self) -> u32 {
        self.inner.mip_levels()
    }

    /// Returns the number of samples for the image.
    #[inline]
    pub fn samples(&self) -> SampleCount {
        self.inner.samples()
    }

    /// Returns the tiling of the image.
    #[inline]
    pub fn tiling(&self) -> ImageTiling {
        self.inner.tiling()
    }

    /// Returns the usage the image was created with.
    #[inline]
    pub fn usage(&self) -> ImageUsage {
        self.inner.usage()
    }

    /// Returns the aspects of the image's format.
    #[inline]
    pub fn aspects(&self) -> ImageAspects {
        self.inner.aspects()
    }

    /// Returns the auxiliary usage that the image uses whenever its layout allows it.
    #[inline]
    pub fn aux_usage(&self) -> AuxUsage {
        self.inner.aux_usage()
    }

    /// Returns the auxiliary usage that is legal for accessing `aspects` of the image in
    /// `layout`. See [`RawImage::aux_usage_for_layout`].
    #[inline]
    pub fn aux_usage_for_layout(&self, aspects: ImageAspects, layout: ImageLayout) -> AuxUsage {
        self.inner.aux_usage_for_layout(aspects, layout)
    }

    /// Returns the surface that holds `aspects`. See [`RawImage::surface_for_aspects`].
    #[inline]
    pub fn surface_for_aspects(&self, aspects: ImageAspects) -> &Surface {
        self.inner.surface_for_aspects(aspects)
    }

    /// Returns the memory layout of the first level and layer of `aspect`. See
    /// [`RawImage::subresource_layout`].
    #[inline]
    pub fn subresource_layout(
        &self,
        aspect: ImageAspect,
        mip_level: u32,
        array_layer: u32,
    ) -> SubresourceLayout {
        self.inner.subresource_layout(aspect, mip_level, array_layer)
    }
}

impl DeviceOwned for Image {
    #[inline]
    fn device(&self) -> &Arc<Device> {
        self.inner.device()
    }
}

impl PartialEq for Image {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Image {}

impl Hash for Image {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

vulkan_bitflags! {
    /// Flags specifying additional properties of an image.
    ImageCreateFlags = ImageCreateFlags(u32);

    /// The image can be used to create an image view with a different format than the image.
    ///
    /// Color compression stays enabled only if every format in
    /// [`ImageCreateInfo::view_formats`] is compatible with it.
    MUTABLE_FORMAT = MUTABLE_FORMAT,

    /// The image can be used to create a cube image view.
    CUBE_COMPATIBLE = CUBE_COMPATIBLE,

    /// For images with a compressed format, allows creating an image view with an uncompressed
    /// format, where each texel in the view corresponds to a compressed texel block in the image.
    ///
    /// Requires `MUTABLE_FORMAT`.
    BLOCK_TEXEL_VIEW_COMPATIBLE = BLOCK_TEXEL_VIEW_COMPATIBLE,
}

vulkan_bitflags_enum! {
    /// A set of [`SampleCount`] values.
    SampleCounts,

    /// The number of samples per texel of an image.
    SampleCount,

    = SampleCountFlags(u32);

    /// 1 sample per texel.
    SAMPLE_1, Sample1 = TYPE_1,

    /// 2 samples per texel.
    SAMPLE_2, Sample2 = TYPE_2,

    /// 4 samples per texel.
    SAMPLE_4, Sample4 = TYPE_4,

    /// 8 samples per texel.
    SAMPLE_8, Sample8 = TYPE_8,

    /// 16 samples per texel.
    SAMPLE_16, Sample16 = TYPE_16,

    /// 32 samples per texel.
    SAMPLE_32, Sample32 = TYPE_32,

    /// 64 samples per texel.
    SAMPLE_64, Sample64 = TYPE_64,
}

impl From<SampleCount> for u32 {
    #[inline]
    fn from(value: SampleCount) -> Self {
        value as u32
    }
}

impl TryFrom<u32> for SampleCount {
    type Error = ();

    #[inline]
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Sample1),
            2 => Ok(Self::Sample2),
            4 => Ok(Self::Sample4),
            8 => Ok(Self::Sample8),
            16 => Ok(Self::Sample16),
            32 => Ok(Self::Sample32),
            64 => Ok(Self::Sample64),
            _ => Err(()),
        }
    }
}

vulkan_enum! {
    /// The basic dimensionality of an image.
    ImageType = ImageType(i32);

    Dim1d = TYPE_1D,
    Dim2d = TYPE_2D,
    Dim3d = TYPE_3D,
}

vulkan_enum! {
    /// The arrangement of texels or texel blocks in an image.
    ImageTiling = ImageTiling(i32);

    /// The arrangement is chosen by the driver, and may include auxiliary surfaces.
    Optimal = OPTIMAL,

    /// The texels are laid out in row-major order, and can be accessed from the host.
    Linear = LINEAR,
}

/// Returns the maximum number of mipmap levels for the given image extent.
///
/// The returned value is always at least 1.
///
/// # Examples
///
/// ```
/// use image_layout::image::max_mip_levels;
///
/// assert_eq!(max_mip_levels([1, 1, 1]), 1);
/// assert_eq!(max_mip_levels([2, 3, 1]), 2);
/// assert_eq!(max_mip_levels([512, 512, 1]), 10);
/// ```
#[inline]
pub fn max_mip_levels(extent: [u32; 3]) -> u32 {
    // This calculates `floor(log2(max(width, height, depth))) + 1` using fast integer operations.
    32 - (extent[0] | extent[1] | extent[2]).leading_zeros()
}

/// Returns the extent of the `level`th mipmap level.
/// If `level` is 0, then it returns `extent` back unchanged.
///
/// Returns `None` if `level` is not less than `max_mip_levels(extent)`.
///
/// # Examples
///
/// ```
/// use image_layout::image::mip_level_extent;
///
/// let extent = [963, 256, 1];
///
/// assert_eq!(mip_level_extent(extent, 0), Some(extent));
/// assert_eq!(mip_level_extent(extent, 1), Some([481, 128, 1]));
/// assert_eq!(mip_level_extent(extent, 6), Some([15, 4, 1]));
/// assert_eq!(mip_level_extent(extent, 9), Some([1, 1, 1]));
/// assert_eq!(mip_level_extent(extent, 11), None);
/// ```
pub fn mip_level_extent(extent: [u32; 3], level: u32) -> Option<[u32; 3]> {
    if level == 0 {
        return Some(extent);
    }

    if level >= max_mip_levels(extent) {
        return None;
    }

    Some(extent.map(|x| {
        debug_assert!(x != 0);
        max(1, x >> level)
    }))
}

/// One or more subresources of an image that should be accessed by a view.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageSubresourceRange {
    /// Selects the aspects that will be included.
    ///
    /// The value must not be empty.
    pub aspects: ImageAspects,

    /// Selects the range of the mip levels that will be included.
    ///
    /// The range must not be empty.
    pub mip_levels: Range<u32>,

    /// Selects the range of array layers that will be included.
    ///
    /// The range must not be empty.
    pub array_layers: Range<u32>,
}

impl ImageSubresourceRange {
    /// Returns an `ImageSubresourceRange` from the given image parameters, covering the whole
    /// image.
    #[inline]
    pub fn from_parameters(format: Format, mip_levels: u32, array_layers: u32) -> Self {
        Self {
            aspects: format.aspects(),
            mip_levels: 0..mip_levels,
            array_layers: 0..array_layers,
        }
    }
}

/// Describes the memory layout of a single subresource of an image.
///
/// The address of a texel at `(x, y, z, layer)` is `layer * array_pitch + z * depth_pitch +
/// y * row_pitch + x * size_of_each_texel + offset`. `size_of_each_texel` must be determined
/// depending on the format. The same formula applies for compressed formats, except that the
/// coordinates must be in number of blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubresourceLayout {
    /// The number of bytes from the start of the image to the start of the queried subresource.
    pub offset: DeviceSize,

    /// The total number of bytes for the queried subresource.
    pub size: DeviceSize,

    /// The number of bytes between two texels or two blocks in adjacent rows.
    pub row_pitch: DeviceSize,

    /// The number of bytes between two texels or two blocks in adjacent array layers.
    pub array_pitch: DeviceSize,

    /// The number of bytes between two texels or two blocks in adjacent depth slices.
    pub depth_pitch: DeviceSize,
}
