// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Low-level implementation of images.
//!
//! This module contains the [`RawImage`] type, which decides where every surface of an image
//! goes before any memory is bound to it.

use super::{
    aux::{AuxDecision, AuxPolicy, AuxUsage, AuxiliaryRecord},
    layout::layout_to_aux_usage,
    max_mip_levels,
    surface::{choose_surface_usage, ImageSurfaces, Surface, SurfacePlacer},
    Image, ImageAspect, ImageAspects, ImageCreateFlags, ImageLayout, ImageTiling, ImageType,
    ImageUsage, SampleCount, SubresourceLayout,
};
use crate::{
    device::Device,
    format::Format,
    macros::impl_id_counter,
    memory::{BindMemoryError, DeviceMemory, ImageMemory, MemoryRequirements},
    surface_layout::{SurfaceInitInfo, TilingFlags},
    DeviceOwned, DeviceSize, NonExhaustive, OomError,
};
use std::{num::NonZero, sync::Arc};

/// The largest width of 1D images, and width and height of 2D images.
pub const MAX_IMAGE_DIMENSION_2D: u32 = 16384;

/// The largest width, height and depth of 3D images.
pub const MAX_IMAGE_DIMENSION_3D: u32 = 2048;

/// The largest number of array layers of an image.
pub const MAX_IMAGE_ARRAY_LAYERS: u32 = 2048;

/// An image whose surfaces have been placed, but that is not bound to memory yet.
#[derive(Debug)]
pub struct RawImage {
    device: Arc<Device>,
    id: NonZero<u64>,

    flags: ImageCreateFlags,
    image_type: ImageType,
    format: Format,
    view_formats: Vec<Format>,
    extent: [u32; 3],
    array_layers: u32,
    mip_levels: u32,
    samples: SampleCount,
    tiling: ImageTiling,
    usage: ImageUsage,
    aspects: ImageAspects,

    surfaces: ImageSurfaces,
    aux_usage: AuxUsage,
    compression_always_on: bool,
    memory_requirements: MemoryRequirements,
}

impl RawImage {
    /// Creates a new `RawImage`, placing all of its surfaces.
    ///
    /// Returns [`OomError::OutOfDeviceMemory`] if the image ends up larger than the device's
    /// [`max_resource_size`](crate::device::DeviceCapabilities::max_resource_size).
    ///
    /// # Panics
    ///
    /// - Panics if `create_info` is not valid; see [`ImageCreateInfo`].
    /// - Panics if the device's surface layout calculator cannot lay out a primary surface.
    pub fn new(device: Arc<Device>, create_info: ImageCreateInfo) -> Result<RawImage, OomError> {
        create_info.validate();

        let capabilities = *device.capabilities();
        let calculator = device.layout_calculator();
        let aspects = create_info.format.aspects();

        // Older hardware cannot sample from a linear block-compressed surface that is also
        // viewed uncompressed, so such images keep a tiled copy for sampling.
        let needs_shadow = capabilities.generation <= 8
            && create_info
                .flags
                .intersects(ImageCreateFlags::BLOCK_TEXEL_VIEW_COMPATIBLE)
            && create_info.tiling == ImageTiling::Optimal;

        let tiling_flags = if needs_shadow || create_info.tiling == ImageTiling::Linear {
            TilingFlags::LINEAR
        } else {
            TilingFlags::ANY
        };

        let mut placer = SurfacePlacer::new();
        let mut surfaces = ImageSurfaces::default();

        for aspect in aspects {
            let init_info = SurfaceInitInfo {
                tiling_flags,
                row_pitch: create_info.row_pitch,
                ..create_info.surface_init_info(aspect)
            };
            let layout = calculator.init_surface(&init_info).unwrap_or_else(|| {
                panic!("the surface layout calculator rejected {:?}", init_info)
            });
            let surface = placer.place(layout);

            log::debug!(
                "Placed {:?} surface: offset {}, size {}, {:?} tiling",
                aspect,
                surface.offset,
                surface.size(),
                surface.layout.tiling,
            );
            surfaces.primary[aspect.index()] = Some(surface);
        }

        if needs_shadow {
            let init_info = SurfaceInitInfo {
                tiling_flags: TilingFlags::ANY,
                ..create_info.surface_init_info(ImageAspect::Color)
            };
            let layout = calculator.init_surface(&init_info).unwrap_or_else(|| {
                panic!("the surface layout calculator rejected {:?}", init_info)
            });
            let surface = placer.place(layout);

            log::debug!(
                "Placed shadow surface: offset {}, size {}",
                surface.offset,
                surface.size(),
            );
            surfaces.shadow = Some(surface);
        }

        let policy = AuxPolicy {
            capabilities: &capabilities,
            calculator,
            create_info: &create_info,
        };

        let AuxDecision {
            aux_usage,
            compression_always_on,
        } = if let Some(color) = surfaces.primary[ImageAspect::Color.index()] {
            if create_info.samples == SampleCount::Sample1 {
                policy.add_color_aux(&color, &mut placer, &mut surfaces)
            } else {
                policy.add_multisample_aux(&color, &mut placer, &mut surfaces)
            }
        } else if let Some(depth) = surfaces.primary[ImageAspect::Depth.index()] {
            policy.add_depth_aux(&depth, &mut placer, &mut surfaces)
        } else {
            AuxDecision::default()
        };

        if let Some(aux) = &surfaces.aux {
            log::debug!(
                "Placed {:?} surface: offset {}, size {}, fast-clear block {:?}",
                aux.kind,
                aux.surface.offset,
                aux.surface.size(),
                aux.fast_clear,
            );
        }

        let memory_requirements = placer.memory_requirements();

        if memory_requirements.size > capabilities.max_resource_size {
            log::debug!(
                "Image of {} bytes exceeds the maximum resource size of {} bytes",
                memory_requirements.size,
                capabilities.max_resource_size,
            );
            return Err(OomError::OutOfDeviceMemory);
        }

        let ImageCreateInfo {
            flags,
            image_type,
            format,
            view_formats,
            extent,
            array_layers,
            mip_levels,
            samples,
            tiling,
            usage,
            row_pitch: _,
            _ne: _,
        } = create_info;

        Ok(RawImage {
            device,
            id: Self::next_id(),
            flags,
            image_type,
            format,
            view_formats,
            extent,
            array_layers,
            mip_levels,
            samples,
            tiling,
            usage,
            aspects,
            surfaces,
            aux_usage,
            compression_always_on,
            memory_requirements,
        })
    }

    /// Returns the size and alignment of the memory the image needs.
    #[inline]
    pub fn memory_requirements(&self) -> MemoryRequirements {
        self.memory_requirements
    }

    /// Binds `memory` to the image, starting at `offset`.
    ///
    /// On failure the image is returned along with the error, so that it can be bound to
    /// different memory.
    pub fn bind_memory(
        self,
        memory: DeviceMemory,
        offset: DeviceSize,
    ) -> Result<Image, (BindMemoryError, RawImage)> {
        let MemoryRequirements { size, alignment } = self.memory_requirements;

        if !alignment.is_aligned(offset) {
            return Err((
                BindMemoryError::UnalignedOffset {
                    offset,
                    required_alignment: alignment,
                },
                self,
            ));
        }

        let available = memory.size.saturating_sub(offset);

        if available < size {
            return Err((
                BindMemoryError::MemoryTooSmall {
                    available,
                    required_size: size,
                },
                self,
            ));
        }

        Ok(Image::from_raw(self, ImageMemory { memory, offset }))
    }

    /// Returns the flags the image was created with.
    #[inline]
    pub fn flags(&self) -> ImageCreateFlags {
        self.flags
    }

    /// Returns the image type of the image.
    #[inline]
    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    /// Returns the image's format.
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the formats that views of the image may have.
    #[inline]
    pub fn view_formats(&self) -> &[Format] {
        &self.view_formats
    }

    /// Returns the extent of the image.
    #[inline]
    pub fn extent(&self) -> [u32; 3] {
        self.extent
    }

    /// Returns the number of array layers in the image.
    #[inline]
    pub fn array_layers(&self) -> u32 {
        self.array_layers
    }

    /// Returns the number of mip levels in the image.
    #[inline]
    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    /// Returns the number of samples for the image.
    #[inline]
    pub fn samples(&self) -> SampleCount {
        self.samples
    }

    /// Returns the tiling of the image.
    #[inline]
    pub fn tiling(&self) -> ImageTiling {
        self.tiling
    }

    /// Returns the usage the image was created with.
    #[inline]
    pub fn usage(&self) -> ImageUsage {
        self.usage
    }

    /// Returns the aspects of the image's format.
    #[inline]
    pub fn aspects(&self) -> ImageAspects {
        self.aspects
    }

    /// Returns every surface of the image.
    #[inline]
    pub fn surfaces(&self) -> &ImageSurfaces {
        &self.surfaces
    }

    /// Returns the auxiliary surface of the image, if it has one.
    #[inline]
    pub fn aux(&self) -> Option<&AuxiliaryRecord> {
        self.surfaces.aux()
    }

    /// Returns the auxiliary usage that the image uses whenever its layout allows it.
    ///
    /// This can be `AuxUsage::None` even if the image has an auxiliary surface, in which case the
    /// auxiliary surface is only used for fast clears.
    #[inline]
    pub fn aux_usage(&self) -> AuxUsage {
        self.aux_usage
    }

    /// Returns whether color compression is enabled for the whole lifetime of the image.
    #[inline]
    pub fn compression_always_on(&self) -> bool {
        self.compression_always_on
    }

    /// Returns the auxiliary usage that is legal for accessing `aspects` of the image in
    /// `layout`.
    ///
    /// For depth and stencil, this depends on the layout. For color, it is the image's fixed
    /// [`aux_usage`](Self::aux_usage) whatever the layout.
    ///
    /// # Panics
    ///
    /// - Panics if `aspects` is empty or contains aspects that the image does not have.
    /// - Panics if a depth or stencil aspect is accessed in `ImageLayout::ColorAttachmentOptimal`.
    #[inline]
    pub fn aux_usage_for_layout(&self, aspects: ImageAspects, layout: ImageLayout) -> AuxUsage {
        layout_to_aux_usage(self.device.capabilities(), self, aspects, layout)
    }

    /// Returns the surface that holds `aspects`.
    ///
    /// `aspects` must be a single aspect, or depth and stencil together, in which case the depth
    /// surface is returned if the image has one and the stencil surface otherwise.
    ///
    /// # Panics
    ///
    /// - Panics if `aspects` is not one of the combinations above.
    /// - Panics if the image does not have the selected aspect.
    pub fn surface_for_aspects(&self, aspects: ImageAspects) -> &Surface {
        let aspect = if aspects == ImageAspects::DEPTH | ImageAspects::STENCIL {
            if self.aspects.intersects(ImageAspects::DEPTH) {
                ImageAspect::Depth
            } else {
                ImageAspect::Stencil
            }
        } else {
            aspects
                .single()
                .unwrap_or_else(|| panic!("{:?} does not select a single surface", aspects))
        };

        self.surfaces
            .primary(aspect)
            .unwrap_or_else(|| panic!("the image does not have the {:?} aspect", aspect))
    }

    /// Returns the memory layout of a subresource of the image, relative to the start of the
    /// image.
    ///
    /// # Panics
    ///
    /// - Panics if the image does not have `aspect`.
    /// - Panics if `mip_level` or `array_layer` is not 0. Only the first subresource of each
    ///   aspect can be queried.
    pub fn subresource_layout(
        &self,
        aspect: ImageAspect,
        mip_level: u32,
        array_layer: u32,
    ) -> SubresourceLayout {
        assert_eq!(mip_level, 0, "only the first mip level can be queried");
        assert_eq!(array_layer, 0, "only the first array layer can be queried");

        let surface = self.surface_for_aspects(aspect.into());

        SubresourceLayout {
            offset: surface.offset,
            size: surface.size(),
            row_pitch: surface.layout.row_pitch as DeviceSize,
            array_pitch: surface.layout.array_pitch,
            depth_pitch: surface.layout.array_pitch,
        }
    }
}

impl DeviceOwned for RawImage {
    #[inline]
    fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

impl_id_counter!(RawImage);

/// Parameters to create a new `RawImage`.
#[derive(Clone, Debug)]
pub struct ImageCreateInfo {
    /// Additional properties of the image.
    ///
    /// The default value is empty.
    pub flags: ImageCreateFlags,

    /// The basic image dimensionality to create the image with.
    ///
    /// The default value is `ImageType::Dim2d`.
    pub image_type: ImageType,

    /// The format used to store the image data.
    ///
    /// The default value is `Format::R8G8B8A8_UNORM`.
    pub format: Format,

    /// The formats that views of the image may have, if `flags` contains
    /// [`ImageCreateFlags::MUTABLE_FORMAT`].
    ///
    /// An empty list means any compatible format. Color compression stays on for mutable-format
    /// images only if the list is not empty and every format in it is compatible with `format`.
    ///
    /// The default value is empty.
    pub view_formats: Vec<Format>,

    /// The width, height and depth of the image.
    ///
    /// If `image_type` is `ImageType::Dim2d`, then the depth must be 1.
    /// If `image_type` is `ImageType::Dim1d`, then the height and depth must be 1.
    /// No dimension may exceed [`MAX_IMAGE_DIMENSION_2D`], or [`MAX_IMAGE_DIMENSION_3D`] for 3D
    /// images.
    ///
    /// The default value is `[0, 0, 1]`, which must be overridden.
    pub extent: [u32; 3],

    /// The number of array layers to create the image with.
    ///
    /// On 3D images, this must be 1. It must not exceed [`MAX_IMAGE_ARRAY_LAYERS`].
    ///
    /// The default value is `1`.
    pub array_layers: u32,

    /// The number of mip levels to create the image with.
    ///
    /// The default value is `1`.
    pub mip_levels: u32,

    /// The number of samples per texel that the image should use.
    ///
    /// The default value is [`SampleCount::Sample1`].
    pub samples: SampleCount,

    /// The memory arrangement of the texel blocks.
    ///
    /// The default value is [`ImageTiling::Optimal`].
    pub tiling: ImageTiling,

    /// How the image is going to be used.
    ///
    /// The default value is empty, which must be overridden.
    pub usage: ImageUsage,

    /// The row pitch in bytes that the primary surfaces must have, for images that are shared
    /// with another API.
    ///
    /// The default value is `0`, which lets the layout calculator pick.
    pub row_pitch: u32,

    pub _ne: NonExhaustive,
}

impl Default for ImageCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            flags: ImageCreateFlags::empty(),
            image_type: ImageType::Dim2d,
            format: Format::R8G8B8A8_UNORM,
            view_formats: Vec::new(),
            extent: [0, 0, 1],
            array_layers: 1,
            mip_levels: 1,
            samples: SampleCount::Sample1,
            tiling: ImageTiling::Optimal,
            usage: ImageUsage::empty(),
            row_pitch: 0,
            _ne: NonExhaustive(()),
        }
    }
}

impl ImageCreateInfo {
    pub(crate) fn validate(&self) {
        let &Self {
            flags,
            image_type,
            format,
            view_formats: _,
            extent,
            array_layers,
            mip_levels,
            samples,
            tiling,
            usage,
            row_pitch: _,
            _ne: _,
        } = self;

        assert!(!extent.contains(&0), "the extent must not be zero");
        assert!(array_layers != 0, "the number of array layers must not be zero");
        assert!(
            array_layers <= MAX_IMAGE_ARRAY_LAYERS,
            "the number of array layers exceeds the maximum of {}",
            MAX_IMAGE_ARRAY_LAYERS,
        );
        assert!(!usage.is_empty(), "the usage must not be empty");

        match image_type {
            ImageType::Dim1d => assert!(
                extent[1] == 1 && extent[2] == 1,
                "1D images must have a height and depth of 1",
            ),
            ImageType::Dim2d => assert!(extent[2] == 1, "2D images must have a depth of 1"),
            ImageType::Dim3d => assert!(array_layers == 1, "3D images must have 1 array layer"),
        }

        let max_dimension = match image_type {
            ImageType::Dim1d | ImageType::Dim2d => MAX_IMAGE_DIMENSION_2D,
            ImageType::Dim3d => MAX_IMAGE_DIMENSION_3D,
        };
        assert!(
            extent.iter().all(|&dimension| dimension <= max_dimension),
            "the extent {:?} exceeds the maximum dimension of {} for {:?} images",
            extent,
            max_dimension,
            image_type,
        );

        assert!(
            (1..=max_mip_levels(extent)).contains(&mip_levels),
            "the number of mip levels must be between 1 and {}",
            max_mip_levels(extent),
        );

        if samples != SampleCount::Sample1 {
            assert!(
                image_type == ImageType::Dim2d
                    && mip_levels == 1
                    && tiling == ImageTiling::Optimal
                    && !format.is_compressed(),
                "multisampled images must be optimally tiled, uncompressed 2D images with 1 mip \
                level",
            );
        }

        if tiling == ImageTiling::Linear {
            assert!(
                format.aspects() == ImageAspects::COLOR,
                "linearly tiled images must have a color format",
            );
        }

        if flags.intersects(ImageCreateFlags::CUBE_COMPATIBLE) {
            assert!(
                image_type == ImageType::Dim2d && extent[0] == extent[1] && array_layers >= 6,
                "cube-compatible images must be square 2D images with at least 6 array layers",
            );
        }

        if flags.intersects(ImageCreateFlags::BLOCK_TEXEL_VIEW_COMPATIBLE) {
            assert!(
                flags.intersects(ImageCreateFlags::MUTABLE_FORMAT) && format.is_compressed(),
                "block-texel-view-compatible images must have a mutable, block-compressed format",
            );
        }
    }

    /// Returns the parameters to lay out the primary surface of `aspect`.
    fn surface_init_info(&self, aspect: ImageAspect) -> SurfaceInitInfo {
        SurfaceInitInfo {
            dim: self.image_type.into(),
            format: self.format.aspect_format(aspect),
            extent: self.extent,
            levels: self.mip_levels,
            layers: self.array_layers,
            samples: self.samples,
            tiling_flags: TilingFlags::ANY,
            usage: choose_surface_usage(self.flags, self.usage, aspect),
            row_pitch: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device::{DebugOverrides, DeviceCreateInfo},
        image::{aux::AuxSurfaceKind, view::ImageView},
        surface_layout::Tiling,
        tests::{assert_should_panic, bound_image, device, device_with_overrides},
    };

    fn color_attachment(extent: [u32; 2]) -> ImageCreateInfo {
        ImageCreateInfo {
            format: Format::R8G8B8A8_UNORM,
            extent: [extent[0], extent[1], 1],
            usage: ImageUsage::COLOR_ATTACHMENT | ImageUsage::SAMPLED,
            ..Default::default()
        }
    }

    fn depth_attachment(format: Format) -> ImageCreateInfo {
        ImageCreateInfo {
            format,
            extent: [64, 64, 1],
            usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT | ImageUsage::SAMPLED,
            ..Default::default()
        }
    }

    /// Checks the ordering and alignment rules that every image must follow.
    fn assert_well_placed(image: &RawImage) {
        let requirements = image.memory_requirements();
        let mut end = 0;

        for surface in image.surfaces().iter() {
            assert!(surface.alignment().is_aligned(surface.offset));
            assert!(surface.alignment() <= requirements.alignment);
            assert!(surface.offset >= end);
            end = surface.end();
        }

        match image.aux().and_then(|aux| aux.fast_clear) {
            Some(fast_clear) => {
                let aux = image.aux().unwrap();
                assert_eq!(fast_clear.offset, aux.surface.end());
                assert_eq!(requirements.size, fast_clear.offset + fast_clear.size());
                assert_eq!(fast_clear.offset % 4, 0);
            }
            None => assert_eq!(requirements.size, end),
        }
    }

    #[test]
    fn ccs_e_color_image() {
        let device = device(9);
        let image = RawImage::new(device, color_attachment([256, 256])).unwrap();
        assert_well_placed(&image);

        let color = image.surfaces().primary(ImageAspect::Color).unwrap();
        assert_eq!(color.offset, 0);
        assert_eq!(color.size(), 262144);
        assert_eq!(color.layout.tiling, Tiling::Y);

        let aux = image.aux().unwrap();
        assert_eq!(aux.kind, AuxSurfaceKind::Ccs);
        assert_eq!(aux.surface.offset, 262144);
        assert_eq!(aux.surface.size(), 8192);

        let fast_clear = aux.fast_clear.unwrap();
        assert_eq!(fast_clear.offset, 270336);
        assert_eq!(fast_clear.entry_size, 20);
        assert_eq!(fast_clear.levels, 1);

        assert_eq!(image.memory_requirements().size, 270356);
        assert_eq!(image.memory_requirements().alignment.as_devicesize(), 4096);
        assert_eq!(image.aux_usage(), AuxUsage::CcsE);
        assert!(image.compression_always_on());
    }

    #[test]
    fn color_layout_independence() {
        let image = RawImage::new(device(9), color_attachment([256, 256])).unwrap();

        // Color aux usage does not follow the layout yet; every layout, even those that go
        // through the transfer or presentation paths, reports the image's fixed aux usage.
        for layout in ImageLayout::ALL {
            assert_eq!(
                image.aux_usage_for_layout(ImageAspects::COLOR, layout),
                AuxUsage::CcsE,
            );
        }
    }

    #[test]
    fn storage_color_image_keeps_ccs_for_fast_clears() {
        let image = RawImage::new(
            device(9),
            ImageCreateInfo {
                usage: ImageUsage::COLOR_ATTACHMENT | ImageUsage::STORAGE,
                ..color_attachment([256, 256])
            },
        )
        .unwrap();
        assert_well_placed(&image);

        assert_eq!(image.aux().unwrap().kind, AuxSurfaceKind::Ccs);
        assert_eq!(image.aux_usage(), AuxUsage::None);
        assert!(!image.compression_always_on());
        assert_eq!(
            image.aux_usage_for_layout(ImageAspects::COLOR, ImageLayout::ColorAttachmentOptimal),
            AuxUsage::None,
        );
    }

    #[test]
    fn mutable_format_without_view_formats() {
        let image = RawImage::new(
            device(9),
            ImageCreateInfo {
                flags: ImageCreateFlags::MUTABLE_FORMAT,
                ..color_attachment([256, 256])
            },
        )
        .unwrap();

        assert!(image.aux().is_some());
        assert_eq!(image.aux_usage(), AuxUsage::None);
    }

    #[test]
    fn non_renderable_format_has_no_aux() {
        let image = RawImage::new(
            device(9),
            ImageCreateInfo {
                format: Format::E5B9G9R9_UFLOAT_PACK32,
                extent: [64, 64, 1],
                usage: ImageUsage::SAMPLED,
                ..Default::default()
            },
        )
        .unwrap();
        assert_well_placed(&image);

        assert!(image.aux().is_none());
        assert_eq!(image.aux_usage(), AuxUsage::None);
        assert_eq!(image.memory_requirements().size, 16384);
    }

    #[test]
    fn ccs_debug_override() {
        let device = device_with_overrides(
            9,
            DebugOverrides {
                no_ccs: true,
                ..Default::default()
            },
        );
        let image = RawImage::new(device, color_attachment([256, 256])).unwrap();

        assert!(image.aux().is_none());
        assert_eq!(image.memory_requirements().size, 262144);
    }

    #[test]
    fn multisampled_color_image() {
        let image = RawImage::new(
            device(9),
            ImageCreateInfo {
                samples: SampleCount::Sample4,
                usage: ImageUsage::COLOR_ATTACHMENT,
                ..color_attachment([64, 64])
            },
        )
        .unwrap();
        assert_well_placed(&image);

        let aux = image.aux().unwrap();
        assert_eq!(aux.kind, AuxSurfaceKind::Mcs);
        assert_eq!(aux.surface.offset, 65536);
        assert_eq!(aux.fast_clear.unwrap().offset, 73728);
        assert_eq!(image.memory_requirements().size, 73748);
        assert_eq!(image.aux_usage(), AuxUsage::Mcs);
        assert!(!image.compression_always_on());
    }

    #[test]
    fn multisampled_storage() {
        assert_should_panic!("storage usage", {
            RawImage::new(
                device(9),
                ImageCreateInfo {
                    samples: SampleCount::Sample4,
                    usage: ImageUsage::COLOR_ATTACHMENT | ImageUsage::STORAGE,
                    ..color_attachment([64, 64])
                },
            )
            .unwrap();
        });
    }

    #[test]
    fn depth_hiz() {
        let image = RawImage::new(device(9), depth_attachment(Format::D32_SFLOAT)).unwrap();
        assert_well_placed(&image);

        let aux = image.aux().unwrap();
        assert_eq!(aux.kind, AuxSurfaceKind::Hiz);
        assert_eq!(aux.surface.offset, 16384);
        assert_eq!(aux.surface.size(), 4096);
        assert!(aux.fast_clear.is_none());
        assert_eq!(image.memory_requirements().size, 20480);
        assert_eq!(image.aux_usage(), AuxUsage::Hiz);

        let depth = ImageAspects::DEPTH;
        assert_eq!(
            image.aux_usage_for_layout(depth, ImageLayout::DepthStencilAttachmentOptimal),
            AuxUsage::Hiz,
        );
        assert_eq!(
            image.aux_usage_for_layout(depth, ImageLayout::TransferSrcOptimal),
            AuxUsage::None,
        );
        assert_eq!(
            image.aux_usage_for_layout(depth, ImageLayout::ShaderReadOnlyOptimal),
            AuxUsage::Hiz,
        );
        assert_eq!(
            image.aux_usage_for_layout(depth, ImageLayout::General),
            AuxUsage::None,
        );
        assert_eq!(
            image.aux_usage_for_layout(depth, ImageLayout::PresentSrc),
            AuxUsage::None,
        );
    }

    #[test]
    fn multisampled_depth_hiz_is_not_sampled() {
        let create_info = ImageCreateInfo {
            samples: SampleCount::Sample4,
            ..depth_attachment(Format::D32_SFLOAT)
        };
        let image = RawImage::new(device(9), create_info.clone()).unwrap();
        assert_well_placed(&image);

        assert_eq!(image.aux().unwrap().kind, AuxSurfaceKind::Hiz);
        assert_eq!(image.aux_usage(), AuxUsage::Hiz);

        let depth = ImageAspects::DEPTH;
        assert_eq!(
            image.aux_usage_for_layout(depth, ImageLayout::DepthStencilAttachmentOptimal),
            AuxUsage::Hiz,
        );

        // The sampler cannot read HiZ of multisampled surfaces.
        for layout in [
            ImageLayout::ShaderReadOnlyOptimal,
            ImageLayout::DepthStencilReadOnlyOptimal,
            ImageLayout::DepthReadOnlyStencilAttachmentOptimal,
        ] {
            assert_eq!(image.aux_usage_for_layout(depth, layout), AuxUsage::None);
        }

        let image = bound_image(&device(9), create_info);
        let view = ImageView::new_default(image).unwrap();
        let optimal = view.optimal_sampler_state().unwrap();
        assert_eq!(optimal.aux_usage(), AuxUsage::None);
        assert_eq!(optimal.aux_address(), 0);
    }

    #[test]
    fn depth_color_attachment_layout() {
        let image = RawImage::new(device(9), depth_attachment(Format::D32_SFLOAT)).unwrap();

        assert_should_panic!("color attachment layout", {
            image.aux_usage_for_layout(ImageAspects::DEPTH, ImageLayout::ColorAttachmentOptimal);
        });
    }

    #[test]
    fn multi_level_depth_has_no_hiz() {
        let image = RawImage::new(
            device(9),
            ImageCreateInfo {
                mip_levels: 3,
                ..depth_attachment(Format::D32_SFLOAT)
            },
        )
        .unwrap();
        assert_well_placed(&image);

        assert!(image.aux().is_none());
        assert_eq!(image.aux_usage(), AuxUsage::None);

        for layout in ImageLayout::ALL {
            if layout == ImageLayout::ColorAttachmentOptimal {
                continue;
            }

            assert_eq!(
                image.aux_usage_for_layout(ImageAspects::DEPTH, layout),
                AuxUsage::None,
            );
        }
    }

    #[test]
    fn hiz_skip_rules() {
        // Generation 7 never gets HiZ.
        let image = RawImage::new(device(7), depth_attachment(Format::D32_SFLOAT)).unwrap();
        assert!(image.aux().is_none());

        // Neither do depth images that are never rendered to.
        let image = RawImage::new(
            device(9),
            ImageCreateInfo {
                usage: ImageUsage::SAMPLED,
                ..depth_attachment(Format::D32_SFLOAT)
            },
        )
        .unwrap();
        assert!(image.aux().is_none());

        // Or arrays.
        let image = RawImage::new(
            device(9),
            ImageCreateInfo {
                array_layers: 2,
                ..depth_attachment(Format::D32_SFLOAT)
            },
        )
        .unwrap();
        assert!(image.aux().is_none());

        // Or multisampled images on generation 8.
        let image = RawImage::new(
            device(8),
            ImageCreateInfo {
                samples: SampleCount::Sample4,
                ..depth_attachment(Format::D32_SFLOAT)
            },
        )
        .unwrap();
        assert!(image.aux().is_none());

        let device = device_with_overrides(
            9,
            DebugOverrides {
                no_hiz: true,
                ..Default::default()
            },
        );
        let image = RawImage::new(device, depth_attachment(Format::D32_SFLOAT)).unwrap();
        assert!(image.aux().is_none());
    }

    #[test]
    fn depth_storage() {
        assert_should_panic!("storage usage", {
            RawImage::new(
                device(9),
                ImageCreateInfo {
                    usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT | ImageUsage::STORAGE,
                    ..depth_attachment(Format::D32_SFLOAT)
                },
            )
            .unwrap();
        });
    }

    #[test]
    fn combined_depth_stencil() {
        let image = RawImage::new(device(9), depth_attachment(Format::D24_UNORM_S8_UINT)).unwrap();
        assert_well_placed(&image);

        let surfaces = image.surfaces();
        let depth = surfaces.primary(ImageAspect::Depth).unwrap();
        let stencil = surfaces.primary(ImageAspect::Stencil).unwrap();
        assert_eq!(depth.layout.format, Format::X8_D24_UNORM_PACK32);
        assert_eq!((depth.offset, depth.size()), (0, 16384));
        assert_eq!(stencil.layout.format, Format::S8_UINT);
        assert_eq!(stencil.layout.tiling, Tiling::W);
        assert_eq!((stencil.offset, stencil.size()), (16384, 4096));
        assert_eq!(image.aux().unwrap().surface.offset, 20480);
        assert_eq!(image.memory_requirements().size, 24576);

        assert_eq!(
            image.aux_usage_for_layout(
                ImageAspects::STENCIL,
                ImageLayout::DepthStencilAttachmentOptimal,
            ),
            AuxUsage::Hiz,
        );
        // Stencil alone can never be sampled through HiZ.
        assert_eq!(
            image.aux_usage_for_layout(ImageAspects::STENCIL, ImageLayout::ShaderReadOnlyOptimal),
            AuxUsage::None,
        );
        assert_eq!(
            image.aux_usage_for_layout(
                ImageAspects::DEPTH | ImageAspects::STENCIL,
                ImageLayout::DepthStencilReadOnlyOptimal,
            ),
            AuxUsage::Hiz,
        );

        assert_eq!(
            image.surface_for_aspects(ImageAspects::DEPTH | ImageAspects::STENCIL),
            depth,
        );
        assert_eq!(image.surface_for_aspects(ImageAspects::STENCIL), stencil);
    }

    #[test]
    fn stencil_before_generation_8() {
        for generation in [7, 8, 9] {
            let image = RawImage::new(device(generation), depth_attachment(Format::S8_UINT)).unwrap();

            for layout in ImageLayout::ALL {
                if layout == ImageLayout::ColorAttachmentOptimal {
                    continue;
                }

                assert_eq!(
                    image.aux_usage_for_layout(ImageAspects::STENCIL, layout),
                    AuxUsage::None,
                );
            }
        }

        let image =
            RawImage::new(device(7), depth_attachment(Format::D24_UNORM_S8_UINT)).unwrap();

        for layout in ImageLayout::ALL {
            if layout == ImageLayout::ColorAttachmentOptimal {
                continue;
            }

            assert_eq!(
                image.aux_usage_for_layout(ImageAspects::STENCIL, layout),
                AuxUsage::None,
            );
        }
    }

    #[test]
    fn resolver_is_total() {
        let images = [
            RawImage::new(device(9), color_attachment([256, 256])).unwrap(),
            RawImage::new(device(8), color_attachment([256, 256])).unwrap(),
            RawImage::new(device(9), depth_attachment(Format::D24_UNORM_S8_UINT)).unwrap(),
            RawImage::new(device(8), depth_attachment(Format::D32_SFLOAT)).unwrap(),
            RawImage::new(
                device(9),
                ImageCreateInfo {
                    tiling: ImageTiling::Linear,
                    ..color_attachment([64, 64])
                },
            )
            .unwrap(),
        ];

        for image in &images {
            for aspect in image.aspects() {
                for layout in ImageLayout::ALL {
                    if aspect != ImageAspect::Color
                        && layout == ImageLayout::ColorAttachmentOptimal
                    {
                        continue;
                    }

                    let aux_usage = image.aux_usage_for_layout(aspect.into(), layout);

                    if image.aux().is_none() {
                        assert_eq!(aux_usage, AuxUsage::None);
                    }

                    if aspect == ImageAspect::Color {
                        assert_eq!(aux_usage, image.aux_usage());
                    } else {
                        assert!(matches!(aux_usage, AuxUsage::None | AuxUsage::Hiz));
                    }
                }
            }
        }
    }

    #[test]
    fn resolver_rejects_foreign_aspects() {
        let image = RawImage::new(device(9), color_attachment([64, 64])).unwrap();

        assert_should_panic!("not a subset", {
            image.aux_usage_for_layout(ImageAspects::DEPTH, ImageLayout::General);
        });
        assert_should_panic!("must not be empty", {
            image.aux_usage_for_layout(ImageAspects::empty(), ImageLayout::General);
        });
    }

    #[test]
    fn shadow_surface() {
        let create_info = ImageCreateInfo {
            flags: ImageCreateFlags::MUTABLE_FORMAT | ImageCreateFlags::BLOCK_TEXEL_VIEW_COMPATIBLE,
            format: Format::BC7_UNORM_BLOCK,
            view_formats: vec![Format::BC7_UNORM_BLOCK, Format::R32G32B32A32_UINT],
            extent: [64, 64, 1],
            usage: ImageUsage::SAMPLED | ImageUsage::TRANSFER_DST,
            ..Default::default()
        };

        let image = RawImage::new(device(8), create_info.clone()).unwrap();
        assert_well_placed(&image);

        let color = image.surfaces().primary(ImageAspect::Color).unwrap();
        let shadow = image.surfaces().shadow().unwrap();
        assert_eq!(color.layout.tiling, Tiling::Linear);
        assert_eq!((color.offset, color.size()), (0, 4096));
        assert_eq!(shadow.layout.tiling, Tiling::Y);
        assert_eq!((shadow.offset, shadow.size()), (4096, 8192));
        assert!(image.aux().is_none());
        assert_eq!(image.memory_requirements().size, 12288);

        // Newer hardware samples from the tiled primary surface directly.
        let image = RawImage::new(device(9), create_info).unwrap();
        assert!(image.surfaces().shadow().is_none());
        assert_eq!(
            image.surfaces().primary(ImageAspect::Color).unwrap().layout.tiling,
            Tiling::Y,
        );
        assert_eq!(image.memory_requirements().size, 8192);
    }

    #[test]
    fn too_large_for_device() {
        let device = Device::new(DeviceCreateInfo {
            max_resource_size: Some(4096),
            ..Default::default()
        });

        assert_eq!(
            RawImage::new(device, color_attachment([256, 256])).unwrap_err(),
            OomError::OutOfDeviceMemory,
        );
    }

    #[test]
    fn invalid_create_info() {
        assert_should_panic!("extent must not be zero", {
            RawImage::new(device(9), ImageCreateInfo::default()).unwrap();
        });
        assert_should_panic!("block-compressed", {
            RawImage::new(
                device(9),
                ImageCreateInfo {
                    flags: ImageCreateFlags::MUTABLE_FORMAT
                        | ImageCreateFlags::BLOCK_TEXEL_VIEW_COMPATIBLE,
                    ..color_attachment([64, 64])
                },
            )
            .unwrap();
        });
        assert_should_panic!("mip levels", {
            RawImage::new(
                device(9),
                ImageCreateInfo {
                    mip_levels: 8,
                    ..color_attachment([64, 64])
                },
            )
            .unwrap();
        });
    }

    #[test]
    fn extent_limits() {
        // The row pitch of this would not fit in 32 bits.
        assert_should_panic!("exceeds the maximum dimension", {
            RawImage::new(
                device(9),
                ImageCreateInfo {
                    image_type: ImageType::Dim1d,
                    format: Format::R32G32B32A32_SFLOAT,
                    extent: [1 << 28, 1, 1],
                    usage: ImageUsage::SAMPLED,
                    ..Default::default()
                },
            )
            .unwrap();
        });
        assert_should_panic!("exceeds the maximum dimension", {
            RawImage::new(
                device(9),
                ImageCreateInfo {
                    image_type: ImageType::Dim3d,
                    extent: [64, 64, MAX_IMAGE_DIMENSION_3D + 1],
                    usage: ImageUsage::SAMPLED,
                    ..Default::default()
                },
            )
            .unwrap();
        });
        assert_should_panic!("array layers exceeds the maximum", {
            RawImage::new(
                device(9),
                ImageCreateInfo {
                    array_layers: MAX_IMAGE_ARRAY_LAYERS + 1,
                    ..color_attachment([64, 64])
                },
            )
            .unwrap();
        });

        let image = RawImage::new(
            device(9),
            ImageCreateInfo {
                image_type: ImageType::Dim1d,
                format: Format::R32G32B32A32_SFLOAT,
                extent: [MAX_IMAGE_DIMENSION_2D, 1, 1],
                usage: ImageUsage::SAMPLED,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(image.extent(), [MAX_IMAGE_DIMENSION_2D, 1, 1]);
    }

    #[test]
    fn bind_memory() {
        let raw_image = RawImage::new(device(9), color_attachment([256, 256])).unwrap();
        let memory = DeviceMemory {
            device_address: 0x10_0000,
            size: 1 << 20,
        };

        let (err, raw_image) = raw_image.bind_memory(memory, 64).unwrap_err();
        assert!(matches!(err, BindMemoryError::UnalignedOffset { offset: 64, .. }));

        let small = DeviceMemory {
            device_address: 0x10_0000,
            size: 8192,
        };
        let (err, raw_image) = raw_image.bind_memory(small, 4096).unwrap_err();
        assert_eq!(
            err,
            BindMemoryError::MemoryTooSmall {
                available: 4096,
                required_size: 270356,
            },
        );

        let image = raw_image.bind_memory(memory, 4096).unwrap();
        assert_eq!(image.device_address(), 0x10_1000);
        assert_eq!(image.aux_usage(), AuxUsage::CcsE);
    }

    #[test]
    fn subresource_layout() {
        let image = RawImage::new(device(9), depth_attachment(Format::D24_UNORM_S8_UINT)).unwrap();

        let layout = image.subresource_layout(ImageAspect::Stencil, 0, 0);
        assert_eq!(layout.offset, 16384);
        assert_eq!(layout.size, 4096);
        assert_eq!(layout.row_pitch, 64);
        assert_eq!(layout.array_pitch, 4096);

        assert_should_panic!("first mip level", {
            image.subresource_layout(ImageAspect::Depth, 1, 0);
        });
        assert_should_panic!("does not have the Color aspect", {
            image.subresource_layout(ImageAspect::Color, 0, 0);
        });
    }

    #[test]
    fn ids_are_unique() {
        let a = RawImage::new(device(9), color_attachment([64, 64])).unwrap();
        let b = RawImage::new(device(9), color_attachment([64, 64])).unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }
}
