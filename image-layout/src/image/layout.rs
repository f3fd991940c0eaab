// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::{aux::AuxUsage, sys::RawImage, ImageAspects, ImageTiling};
use crate::{device::DeviceCapabilities, macros::vulkan_enum};

vulkan_enum! {
    /// In-memory layout of the pixel data of an image.
    ///
    /// The layout is declared by the user for every access, and tells the driver what the image
    /// is about to be used for. It decides which auxiliary compression mode may be used for the
    /// access; see [`RawImage::aux_usage_for_layout`].
    ImageLayout = ImageLayout(i32);

    /// The layout of the data is unknown, and the image is treated as containing no valid data.
    Undefined = UNDEFINED,

    /// A general-purpose layout that can be used for any operation.
    General = GENERAL,

    /// For a color image used as a color or resolve attachment in a framebuffer.
    ColorAttachmentOptimal = COLOR_ATTACHMENT_OPTIMAL,

    /// For a depth/stencil image used as a depth/stencil attachment in a framebuffer.
    DepthStencilAttachmentOptimal = DEPTH_STENCIL_ATTACHMENT_OPTIMAL,

    /// For a depth/stencil image used as a read-only depth/stencil attachment in a framebuffer, or
    /// as a (combined) sampled image or input attachment in a shader.
    DepthStencilReadOnlyOptimal = DEPTH_STENCIL_READ_ONLY_OPTIMAL,

    /// For an image used as a (combined) sampled image or input attachment in a shader.
    ShaderReadOnlyOptimal = SHADER_READ_ONLY_OPTIMAL,

    /// For operations that transfer data from an image (copy, blit).
    TransferSrcOptimal = TRANSFER_SRC_OPTIMAL,

    /// For operations that transfer data to an image (copy, blit, clear).
    TransferDstOptimal = TRANSFER_DST_OPTIMAL,

    /// The initial data is going to be directly written to from the CPU.
    Preinitialized = PREINITIALIZED,

    /// A combination of `DepthStencilReadOnlyOptimal` for the depth aspect of the image,
    /// and `DepthStencilAttachmentOptimal` for the stencil aspect of the image.
    DepthReadOnlyStencilAttachmentOptimal = DEPTH_READ_ONLY_STENCIL_ATTACHMENT_OPTIMAL,

    /// A combination of `DepthStencilAttachmentOptimal` for the depth aspect of the image,
    /// and `DepthStencilReadOnlyOptimal` for the stencil aspect of the image.
    DepthAttachmentStencilReadOnlyOptimal = DEPTH_ATTACHMENT_STENCIL_READ_ONLY_OPTIMAL,

    /// The layout of images that are held in a swapchain, while they are being presented.
    PresentSrc = PRESENT_SRC_KHR,
}

impl ImageLayout {
    /// Every layout an image can be accessed in.
    pub const ALL: [ImageLayout; ImageLayout::COUNT] = [
        ImageLayout::Undefined,
        ImageLayout::General,
        ImageLayout::ColorAttachmentOptimal,
        ImageLayout::DepthStencilAttachmentOptimal,
        ImageLayout::DepthStencilReadOnlyOptimal,
        ImageLayout::ShaderReadOnlyOptimal,
        ImageLayout::TransferSrcOptimal,
        ImageLayout::TransferDstOptimal,
        ImageLayout::Preinitialized,
        ImageLayout::DepthReadOnlyStencilAttachmentOptimal,
        ImageLayout::DepthAttachmentStencilReadOnlyOptimal,
        ImageLayout::PresentSrc,
    ];

    /// Converts a raw Vulkan layout received from the API.
    ///
    /// # Panics
    ///
    /// - Panics if `layout` is not one of the layouts in [`ImageLayout::ALL`], such as the
    ///   shared present layout.
    #[inline]
    pub fn from_raw(layout: ash::vk::ImageLayout) -> ImageLayout {
        ImageLayout::try_from(layout)
            .unwrap_or_else(|()| panic!("unsupported image layout {:?}", layout))
    }
}

/// Returns the auxiliary usage that is legal for accessing `aspects` of `image` in `layout`.
///
/// Every `AuxUsage::None` returned for an image that has an auxiliary surface marks a place where
/// the surrounding code must resolve the auxiliary surface into the primary one before (or after)
/// the access.
///
/// # Panics
///
/// - Panics if `aspects` is empty or contains aspects that `image` does not have.
/// - Panics if a depth or stencil aspect is accessed in `ImageLayout::ColorAttachmentOptimal`.
pub(crate) fn layout_to_aux_usage(
    capabilities: &DeviceCapabilities,
    image: &RawImage,
    aspects: ImageAspects,
    layout: ImageLayout,
) -> AuxUsage {
    assert!(!aspects.is_empty(), "the accessed aspects must not be empty");
    assert!(
        image.aspects().contains(aspects),
        "the accessed aspects {:?} are not a subset of the image's aspects {:?}",
        aspects,
        image.aspects(),
    );

    // No auxiliary surface, nothing to use.
    let Some(aux) = image.aux() else {
        return AuxUsage::None;
    };

    assert_eq!(
        image.tiling(),
        ImageTiling::Optimal,
        "images with an auxiliary surface must be optimally tiled",
    );
    debug_assert!(aux.surface.size() > 0);

    // Stencil HiZ did not exist before generation 8.
    if capabilities.generation < 8 && aspects == ImageAspects::STENCIL {
        return AuxUsage::None;
    }

    // Color compression does not depend on the layout yet.
    // TODO: choose color aux usage per layout once resolves are tracked per subresource.
    if aspects == ImageAspects::COLOR {
        return image.aux_usage();
    }

    match layout {
        // No data, or data from the CPU that never went through the auxiliary surface.
        ImageLayout::Undefined | ImageLayout::Preinitialized => AuxUsage::None,

        // The transfer path does not read or write HiZ.
        ImageLayout::General | ImageLayout::TransferSrcOptimal | ImageLayout::TransferDstOptimal => {
            AuxUsage::None
        }

        ImageLayout::DepthStencilReadOnlyOptimal
        | ImageLayout::ShaderReadOnlyOptimal
        | ImageLayout::DepthReadOnlyStencilAttachmentOptimal => {
            if capabilities.can_sample_with_hiz(aspects, image.samples()) {
                AuxUsage::Hiz
            } else {
                AuxUsage::None
            }
        }

        // The presentation engine cannot decompress.
        ImageLayout::PresentSrc => AuxUsage::None,

        ImageLayout::ColorAttachmentOptimal => {
            panic!(
                "the {:?} aspects cannot be accessed in the color attachment layout",
                aspects,
            )
        }

        ImageLayout::DepthStencilAttachmentOptimal
        | ImageLayout::DepthAttachmentStencilReadOnlyOptimal => AuxUsage::Hiz,
    }
}
