// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! All the formats that images can be created with, and what the hardware can do with them.
//!
//! Each format has a fixed set of properties: which aspects it has, the size and extent of one
//! texel block, the number of bits in each color channel, and the channel order that the hardware
//! reads it in. On top of these, a few capability queries decide what the layout code is allowed
//! to do with a format on a given hardware generation:
//!
//! - [`Format::supports_ccs_e`] and [`Format::ccs_e_compatible_with`] gate lossless color
//!   compression.
//! - [`Format::supports_rendering`] says whether the format can be written through a render
//!   target, and therefore through the compressed path.
//! - [`Format::has_matching_typed_storage_format`] and [`Format::lower_storage_format`] decide how
//!   a storage image is read by shaders.

use crate::{
    image::{ImageAspect, ImageAspects},
    macros::vulkan_enum,
    DeviceSize,
};

vulkan_enum! {
    /// An enumeration of the image formats known to the driver.
    #[allow(non_camel_case_types)]
    Format = Format(i32);

    R8_UNORM = R8_UNORM,
    R8_UINT = R8_UINT,
    R16_UINT = R16_UINT,
    R32_UINT = R32_UINT,
    R32_SFLOAT = R32_SFLOAT,
    R16G16_SFLOAT = R16G16_SFLOAT,
    R8G8B8_UNORM = R8G8B8_UNORM,
    R8G8B8A8_UNORM = R8G8B8A8_UNORM,
    R8G8B8A8_SRGB = R8G8B8A8_SRGB,
    R8G8B8A8_UINT = R8G8B8A8_UINT,
    B8G8R8A8_UNORM = B8G8R8A8_UNORM,
    B8G8R8A8_SRGB = B8G8R8A8_SRGB,
    R5G6B5_UNORM_PACK16 = R5G6B5_UNORM_PACK16,
    A2B10G10R10_UNORM_PACK32 = A2B10G10R10_UNORM_PACK32,
    E5B9G9R9_UFLOAT_PACK32 = E5B9G9R9_UFLOAT_PACK32,
    R16G16B16A16_SFLOAT = R16G16B16A16_SFLOAT,
    R16G16B16A16_UINT = R16G16B16A16_UINT,
    R32G32_UINT = R32G32_UINT,
    R32G32B32A32_SFLOAT = R32G32B32A32_SFLOAT,
    R32G32B32A32_UINT = R32G32B32A32_UINT,
    BC1_RGBA_UNORM_BLOCK = BC1_RGBA_UNORM_BLOCK,
    BC3_UNORM_BLOCK = BC3_UNORM_BLOCK,
    BC7_UNORM_BLOCK = BC7_UNORM_BLOCK,
    D16_UNORM = D16_UNORM,
    X8_D24_UNORM_PACK32 = X8_D24_UNORM_PACK32,
    D32_SFLOAT = D32_SFLOAT,
    S8_UINT = S8_UINT,
    D24_UNORM_S8_UINT = D24_UNORM_S8_UINT,
    D32_SFLOAT_S8_UINT = D32_SFLOAT_S8_UINT,
}

/// The block compression scheme of a format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CompressionType {
    /// S3TC / BCn block compression.
    BC,
}

/// Selects which channel of the source data ends up in a channel of a surface state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelSelect {
    Zero = 0,
    One = 1,
    Red = 4,
    Green = 5,
    Blue = 6,
    Alpha = 7,
}

/// A hardware channel swizzle, one [`ChannelSelect`] per output channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Swizzle {
    pub r: ChannelSelect,
    pub g: ChannelSelect,
    pub b: ChannelSelect,
    pub a: ChannelSelect,
}

impl Swizzle {
    /// Every channel reads itself.
    pub const IDENTITY: Swizzle = Swizzle {
        r: ChannelSelect::Red,
        g: ChannelSelect::Green,
        b: ChannelSelect::Blue,
        a: ChannelSelect::Alpha,
    };

    /// Color channels read themselves and alpha reads as one.
    pub const RGB1: Swizzle = Swizzle {
        a: ChannelSelect::One,
        ..Swizzle::IDENTITY
    };

    /// Returns the channel selects in `r, g, b, a` order.
    #[inline]
    pub const fn to_array(self) -> [ChannelSelect; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Swizzle {
    #[inline]
    fn default() -> Self {
        Swizzle::IDENTITY
    }
}

struct FormatInfo {
    aspects: ImageAspects,
    block_extent: [u32; 3],
    block_size: DeviceSize,
    components: [u8; 4],
    compression: Option<CompressionType>,
    renderable: bool,
    ccs_e: bool,
    typed_storage: bool,
    swizzle: Swizzle,
}

impl FormatInfo {
    const fn color(block_size: DeviceSize, components: [u8; 4]) -> Self {
        FormatInfo {
            aspects: ImageAspects::COLOR,
            block_extent: [1, 1, 1],
            block_size,
            components,
            compression: None,
            renderable: true,
            ccs_e: false,
            typed_storage: false,
            swizzle: Swizzle::IDENTITY,
        }
    }

    const fn bc(block_size: DeviceSize) -> Self {
        FormatInfo {
            block_extent: [4, 4, 1],
            compression: Some(CompressionType::BC),
            renderable: false,
            ..FormatInfo::color(block_size, [0; 4])
        }
    }

    const fn depth_stencil(aspects: ImageAspects, block_size: DeviceSize, bits: u8) -> Self {
        FormatInfo {
            aspects,
            renderable: false,
            ..FormatInfo::color(block_size, [bits, 0, 0, 0])
        }
    }

    const fn ccs_e(self) -> Self {
        FormatInfo {
            ccs_e: true,
            ..self
        }
    }

    const fn storage(self) -> Self {
        FormatInfo {
            typed_storage: true,
            ..self
        }
    }

    const fn not_renderable(self) -> Self {
        FormatInfo {
            renderable: false,
            ..self
        }
    }

    const fn swizzle(self, swizzle: Swizzle) -> Self {
        FormatInfo { swizzle, ..self }
    }
}

impl Format {
    const fn info(self) -> FormatInfo {
        match self {
            Format::R8_UNORM => FormatInfo::color(1, [8, 0, 0, 0]).storage(),
            Format::R8_UINT => FormatInfo::color(1, [8, 0, 0, 0]).storage(),
            Format::R16_UINT => FormatInfo::color(2, [16, 0, 0, 0]).storage(),
            Format::R32_UINT => FormatInfo::color(4, [32, 0, 0, 0]).ccs_e().storage(),
            Format::R32_SFLOAT => FormatInfo::color(4, [32, 0, 0, 0]).ccs_e().storage(),
            Format::R16G16_SFLOAT => FormatInfo::color(4, [16, 16, 0, 0]).ccs_e().storage(),
            Format::R8G8B8_UNORM => FormatInfo::color(3, [8, 8, 8, 0])
                .not_renderable()
                .swizzle(Swizzle::RGB1),
            Format::R8G8B8A8_UNORM => FormatInfo::color(4, [8, 8, 8, 8]).ccs_e().storage(),
            Format::R8G8B8A8_SRGB => FormatInfo::color(4, [8, 8, 8, 8]).ccs_e(),
            Format::R8G8B8A8_UINT => FormatInfo::color(4, [8, 8, 8, 8]).ccs_e().storage(),
            Format::B8G8R8A8_UNORM => FormatInfo::color(4, [8, 8, 8, 8]).ccs_e(),
            Format::B8G8R8A8_SRGB => FormatInfo::color(4, [8, 8, 8, 8]).ccs_e(),
            Format::R5G6B5_UNORM_PACK16 => FormatInfo::color(2, [5, 6, 5, 0]),
            Format::A2B10G10R10_UNORM_PACK32 => {
                FormatInfo::color(4, [10, 10, 10, 2]).ccs_e().storage()
            }
            Format::E5B9G9R9_UFLOAT_PACK32 => FormatInfo::color(4, [9, 9, 9, 0])
                .not_renderable()
                .swizzle(Swizzle::RGB1),
            Format::R16G16B16A16_SFLOAT => {
                FormatInfo::color(8, [16, 16, 16, 16]).ccs_e().storage()
            }
            Format::R16G16B16A16_UINT => FormatInfo::color(8, [16, 16, 16, 16]).ccs_e().storage(),
            Format::R32G32_UINT => FormatInfo::color(8, [32, 32, 0, 0]).ccs_e().storage(),
            Format::R32G32B32A32_SFLOAT => {
                FormatInfo::color(16, [32, 32, 32, 32]).ccs_e().storage()
            }
            Format::R32G32B32A32_UINT => {
                FormatInfo::color(16, [32, 32, 32, 32]).ccs_e().storage()
            }
            Format::BC1_RGBA_UNORM_BLOCK => FormatInfo::bc(8),
            Format::BC3_UNORM_BLOCK => FormatInfo::bc(16),
            Format::BC7_UNORM_BLOCK => FormatInfo::bc(16),
            Format::D16_UNORM => FormatInfo::depth_stencil(ImageAspects::DEPTH, 2, 16),
            Format::X8_D24_UNORM_PACK32 => FormatInfo::depth_stencil(ImageAspects::DEPTH, 4, 24),
            Format::D32_SFLOAT => FormatInfo::depth_stencil(ImageAspects::DEPTH, 4, 32),
            Format::S8_UINT => FormatInfo::depth_stencil(ImageAspects::STENCIL, 1, 8),
            Format::D24_UNORM_S8_UINT => FormatInfo::depth_stencil(
                ImageAspects::DEPTH.union(ImageAspects::STENCIL),
                4,
                24,
            ),
            Format::D32_SFLOAT_S8_UINT => FormatInfo::depth_stencil(
                ImageAspects::DEPTH.union(ImageAspects::STENCIL),
                4,
                32,
            ),
        }
    }

    /// Returns the aspects that images of this format have.
    #[inline]
    pub const fn aspects(self) -> ImageAspects {
        self.info().aspects
    }

    /// Returns the extent in texels of one texel block. This is `[1, 1, 1]` for all uncompressed
    /// formats.
    #[inline]
    pub const fn block_extent(self) -> [u32; 3] {
        self.info().block_extent
    }

    /// Returns the size in bytes of one texel block.
    ///
    /// For combined depth/stencil formats this is the size of the depth plane, which is the plane
    /// that is laid out first.
    #[inline]
    pub const fn block_size(self) -> DeviceSize {
        self.info().block_size
    }

    /// Returns the number of bits in the red, green, blue and alpha channels, or in the depth or
    /// stencil value for depth/stencil formats. Block compressed formats report zero bits.
    #[inline]
    pub const fn components(self) -> [u8; 4] {
        self.info().components
    }

    /// Returns the block compression scheme of the format, if any.
    #[inline]
    pub const fn compression(self) -> Option<CompressionType> {
        self.info().compression
    }

    /// Returns whether the format is block compressed.
    #[inline]
    pub const fn is_compressed(self) -> bool {
        self.info().compression.is_some()
    }

    /// Returns the channel order in which the hardware reads the format.
    #[inline]
    pub const fn hardware_swizzle(self) -> Swizzle {
        self.info().swizzle
    }

    /// Returns whether a color render target of this format can be written by the hardware.
    #[inline]
    pub const fn supports_rendering(self) -> bool {
        self.info().renderable
    }

    /// Returns whether the format supports lossless color compression on the given hardware
    /// generation.
    #[inline]
    pub const fn supports_ccs_e(self, generation: u32) -> bool {
        generation >= 9 && self.info().ccs_e
    }

    /// Returns whether an image created with format `self` can be accessed with format `other`
    /// while lossless color compression stays enabled.
    ///
    /// Compression only depends on the bit layout of the channels, not on how the data in them is
    /// encoded, so both formats must support compression and have the same number of bits in
    /// each channel.
    pub fn ccs_e_compatible_with(self, other: Format, generation: u32) -> bool {
        self.supports_ccs_e(generation)
            && other.supports_ccs_e(generation)
            && self.components() == other.components()
    }

    /// Returns whether storage images of this format can be read through a typed surface on the
    /// given hardware generation, possibly with a lowered format.
    ///
    /// If not, reads must go through an untyped raw buffer surface.
    pub fn has_matching_typed_storage_format(self, generation: u32) -> bool {
        let info = self.info();

        if info.compression.is_some()
            || info.aspects != ImageAspects::COLOR
            || !info.block_size.is_power_of_two()
        {
            return false;
        }

        match generation {
            9.. => true,
            8 => info.block_size <= 8,
            _ => info.block_size <= 4,
        }
    }

    /// Returns the format that shaders use to read a storage image of this format on the given
    /// hardware generation.
    ///
    /// Formats that the hardware cannot read natively are lowered to an unsigned integer format
    /// of the same size, which the shader then unpacks itself.
    ///
    /// # Panics
    ///
    /// - Panics if [`has_matching_typed_storage_format`] returns `false`.
    ///
    /// [`has_matching_typed_storage_format`]: Format::has_matching_typed_storage_format
    pub fn lower_storage_format(self, generation: u32) -> Format {
        assert!(
            self.has_matching_typed_storage_format(generation),
            "{:?} has no typed storage format on generation {}",
            self,
            generation,
        );

        let info = self.info();

        if info.components[0] == 32 || (generation >= 9 && info.typed_storage) {
            return self;
        }

        match info.block_size {
            1 => Format::R8_UINT,
            2 => Format::R16_UINT,
            4 => Format::R32_UINT,
            8 => Format::R32G32_UINT,
            _ => Format::R32G32B32A32_UINT,
        }
    }

    /// Returns the format of the plane that holds the data of `aspect`.
    ///
    /// For single-aspect formats this is `self`. Combined depth/stencil formats are stored as a
    /// separate depth plane and an `S8_UINT` stencil plane.
    ///
    /// # Panics
    ///
    /// - Panics if `self` does not have `aspect`.
    pub fn aspect_format(self, aspect: ImageAspect) -> Format {
        assert!(
            self.aspects().contains_enum(aspect),
            "{:?} does not have the {:?} aspect",
            self,
            aspect,
        );

        match (self, aspect) {
            (Format::D24_UNORM_S8_UINT, ImageAspect::Depth) => {
                Format::X8_D24_UNORM_PACK32
            }
            (Format::D32_SFLOAT_S8_UINT, ImageAspect::Depth) => Format::D32_SFLOAT,
            (
                Format::D24_UNORM_S8_UINT | Format::D32_SFLOAT_S8_UINT,
                ImageAspect::Stencil,
            ) => Format::S8_UINT,
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccs_e_compatibility_follows_channel_bits() {
        assert!(Format::R8G8B8A8_UNORM.ccs_e_compatible_with(Format::R8G8B8A8_SRGB, 9));
        assert!(Format::R8G8B8A8_UNORM.ccs_e_compatible_with(Format::B8G8R8A8_UNORM, 9));
        assert!(!Format::R8G8B8A8_UNORM.ccs_e_compatible_with(Format::R32_UINT, 9));
        assert!(!Format::R8G8B8A8_UNORM.ccs_e_compatible_with(Format::R8G8B8A8_SRGB, 8));
        assert!(!Format::R8G8B8A8_UNORM.ccs_e_compatible_with(Format::R8G8B8_UNORM, 9));
    }

    #[test]
    fn combined_depth_stencil_planes() {
        assert_eq!(
            Format::D24_UNORM_S8_UINT.aspect_format(ImageAspect::Depth),
            Format::X8_D24_UNORM_PACK32,
        );
        assert_eq!(
            Format::D32_SFLOAT_S8_UINT.aspect_format(ImageAspect::Stencil),
            Format::S8_UINT,
        );
        assert_eq!(
            Format::D16_UNORM.aspect_format(ImageAspect::Depth),
            Format::D16_UNORM,
        );
    }

    #[test]
    fn aspect_format_wrong_aspect() {
        crate::tests::assert_should_panic!("does not have the", {
            Format::R8G8B8A8_UNORM.aspect_format(ImageAspect::Depth);
        });
    }

    #[test]
    fn typed_storage_per_generation() {
        assert!(Format::R32G32B32A32_UINT.has_matching_typed_storage_format(9));
        assert!(!Format::R32G32B32A32_UINT.has_matching_typed_storage_format(8));
        assert!(Format::R16G16B16A16_SFLOAT.has_matching_typed_storage_format(8));
        assert!(!Format::R16G16B16A16_SFLOAT.has_matching_typed_storage_format(7));
        assert!(!Format::R8G8B8_UNORM.has_matching_typed_storage_format(9));
        assert!(!Format::BC1_RGBA_UNORM_BLOCK.has_matching_typed_storage_format(9));
    }

    #[test]
    fn storage_lowering() {
        assert_eq!(
            Format::R8G8B8A8_UNORM.lower_storage_format(9),
            Format::R8G8B8A8_UNORM,
        );
        assert_eq!(
            Format::R8G8B8A8_UNORM.lower_storage_format(8),
            Format::R32_UINT,
        );
        assert_eq!(
            Format::B8G8R8A8_UNORM.lower_storage_format(9),
            Format::R32_UINT,
        );
        assert_eq!(
            Format::R16G16B16A16_SFLOAT.lower_storage_format(8),
            Format::R32G32_UINT,
        );
        assert_eq!(Format::R32_SFLOAT.lower_storage_format(7), Format::R32_SFLOAT);
    }

    #[test]
    fn vulkan_round_trip() {
        let raw = ash::vk::Format::from(Format::BC7_UNORM_BLOCK);
        assert_eq!(raw, ash::vk::Format::BC7_UNORM_BLOCK);
        assert_eq!(Format::try_from(raw), Ok(Format::BC7_UNORM_BLOCK));
        assert!(Format::try_from(ash::vk::Format::ASTC_4X4_UNORM_BLOCK).is_err());
    }
}
