// Copyright (c) 2021 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Image views.
//!
//! This module contains types related to image views. An image view wraps around an image and
//! describes how the GPU should interpret the data. Creating one fills in every surface state
//! that the view can be accessed through, according to its usage.

use super::{
    aux::AuxUsage,
    mip_level_extent,
    state::{fill_surface_state, SurfaceStateFlags},
    Image, ImageAspect, ImageAspects, ImageCreateFlags, ImageLayout, ImageSubresourceRange,
    ImageType, ImageUsage,
};
use crate::{
    device::Device,
    format::{ChannelSelect, Format, Swizzle},
    macros::{impl_id_counter, vulkan_enum},
    surface_layout::SurfaceUsage,
    surface_state::{SurfaceState, SurfaceView},
    DeviceOwned, NonExhaustive, OomError,
};
use std::{num::NonZero, sync::Arc};

/// A wrapper around an image that makes it available to shaders or framebuffers.
#[derive(Debug)]
pub struct ImageView {
    id: NonZero<u64>,
    image: Arc<Image>,

    view_type: ImageViewType,
    format: Format,
    component_mapping: ComponentMapping,
    subresource_range: ImageSubresourceRange,
    usage: ImageUsage,
    extent: [u32; 3],
    surface_view: SurfaceView,

    optimal_sampler_state: Option<SurfaceState>,
    general_sampler_state: Option<SurfaceState>,
    storage_state: Option<SurfaceState>,
    writeonly_storage_state: Option<SurfaceState>,
    color_attachment_state: Option<SurfaceState>,
}

impl ImageView {
    /// Creates a new `ImageView`.
    ///
    /// The surface states of the view are allocated from the device's surface state pool. If the
    /// pool runs out, [`OomError::OutOfDeviceMemory`] is returned and every state allocated so
    /// far goes back to the pool.
    ///
    /// # Panics
    ///
    /// - Panics if `create_info` is not valid for `image`; see [`ImageViewCreateInfo`].
    pub fn new(
        image: Arc<Image>,
        create_info: ImageViewCreateInfo,
    ) -> Result<Arc<ImageView>, OomError> {
        create_info.validate(&image);

        let ImageViewCreateInfo {
            view_type,
            format,
            component_mapping,
            subresource_range,
            usage,
            _ne: _,
        } = create_info;

        let usage = if usage.is_empty() {
            image.usage()
        } else {
            usage
        };
        let aspects = subresource_range.aspects;
        let base_level = subresource_range.mip_levels.start;

        let extent = mip_level_extent(image.extent(), base_level).unwrap();

        // Views of combined depth/stencil formats read one plane at a time.
        let surface_format = if format.aspects().count() > 1 {
            if aspects.intersects(ImageAspects::DEPTH) {
                format.aspect_format(ImageAspect::Depth)
            } else {
                format.aspect_format(ImageAspect::Stencil)
            }
        } else {
            format
        };

        let format_swizzle = surface_format.hardware_swizzle();
        let swizzle = Swizzle {
            r: remap_swizzle(component_mapping.r, ComponentSwizzle::Red, format_swizzle),
            g: remap_swizzle(component_mapping.g, ComponentSwizzle::Green, format_swizzle),
            b: remap_swizzle(component_mapping.b, ComponentSwizzle::Blue, format_swizzle),
            a: remap_swizzle(component_mapping.a, ComponentSwizzle::Alpha, format_swizzle),
        };

        // A 3D view covers every depth slice of its base level.
        let (base_layer, layers) = if view_type == ImageViewType::Dim3d {
            (0, extent[2])
        } else {
            (
                subresource_range.array_layers.start,
                subresource_range.array_layers.len() as u32,
            )
        };

        let surface_view = SurfaceView {
            format: surface_format,
            base_level,
            levels: subresource_range.mip_levels.len() as u32,
            base_layer,
            layers,
            swizzle,
            usage: if view_type.is_cube() {
                SurfaceUsage::CUBE
            } else {
                SurfaceUsage::empty()
            },
        };

        let pool = image.device().surface_state_pool();
        let allocate_state = || pool.allocate().map(SurfaceState::new);

        let mut optimal_sampler_state = None;
        let mut general_sampler_state = None;
        let mut storage_state = None;
        let mut writeonly_storage_state = None;
        let mut color_attachment_state = None;

        // Color input attachments need compression information that only exists once a render
        // pass begins, so they get their states there.
        if usage.intersects(ImageUsage::SAMPLED)
            || (usage.intersects(ImageUsage::INPUT_ATTACHMENT)
                && !aspects.intersects(ImageAspects::COLOR))
        {
            let mut optimal = allocate_state()?;
            let mut general = allocate_state()?;

            fill_surface_state(
                &image,
                aspects,
                &surface_view,
                SurfaceUsage::TEXTURE,
                image.aux_usage_for_layout(aspects, ImageLayout::ShaderReadOnlyOptimal),
                None,
                SurfaceStateFlags::TEXTURE_OPTIMAL,
                &mut optimal,
            );
            fill_surface_state(
                &image,
                aspects,
                &surface_view,
                SurfaceUsage::TEXTURE,
                image.aux_usage_for_layout(aspects, ImageLayout::General),
                None,
                SurfaceStateFlags::empty(),
                &mut general,
            );

            optimal_sampler_state = Some(optimal);
            general_sampler_state = Some(general);
        }

        if usage.intersects(ImageUsage::COLOR_ATTACHMENT) && aspects == ImageAspects::COLOR {
            let mut state = allocate_state()?;

            // Attachments are always accessed with an identity mapping.
            let render_view = SurfaceView {
                swizzle: format_swizzle,
                ..surface_view
            };
            fill_surface_state(
                &image,
                aspects,
                &render_view,
                SurfaceUsage::RENDER_TARGET,
                image.aux_usage_for_layout(aspects, ImageLayout::ColorAttachmentOptimal),
                None,
                SurfaceStateFlags::empty(),
                &mut state,
            );

            color_attachment_state = Some(state);
        }

        if usage.intersects(ImageUsage::STORAGE) {
            let mut read_write = allocate_state()?;
            let mut write_only = allocate_state()?;

            fill_surface_state(
                &image,
                aspects,
                &surface_view,
                SurfaceUsage::STORAGE,
                AuxUsage::None,
                None,
                SurfaceStateFlags::empty(),
                &mut read_write,
            );
            fill_surface_state(
                &image,
                aspects,
                &surface_view,
                SurfaceUsage::STORAGE,
                AuxUsage::None,
                None,
                SurfaceStateFlags::STORAGE_WRITE_ONLY,
                &mut write_only,
            );

            storage_state = Some(read_write);
            writeonly_storage_state = Some(write_only);
        }

        log::debug!(
            "Created {:?} view of {:?} for {:?}: levels {:?}, layers {}..{}",
            view_type,
            surface_format,
            usage,
            subresource_range.mip_levels,
            base_layer,
            base_layer + layers,
        );

        Ok(Arc::new(ImageView {
            id: Self::next_id(),
            image,
            view_type,
            format,
            component_mapping,
            subresource_range,
            usage,
            extent,
            surface_view,
            optimal_sampler_state,
            general_sampler_state,
            storage_state,
            writeonly_storage_state,
            color_attachment_state,
        }))
    }

    /// Creates a default `ImageView`. Equivalent to
    /// `ImageView::new(image, ImageViewCreateInfo::from_image(image))`.
    #[inline]
    pub fn new_default(image: Arc<Image>) -> Result<Arc<ImageView>, OomError> {
        let create_info = ImageViewCreateInfo::from_image(&image);

        Self::new(image, create_info)
    }

    /// Returns the wrapped image that this image view was created from.
    #[inline]
    pub fn image(&self) -> &Arc<Image> {
        &self.image
    }

    /// Returns the component mapping of this view.
    #[inline]
    pub fn component_mapping(&self) -> ComponentMapping {
        self.component_mapping
    }

    /// Returns the format of this view.
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the subresource range of the wrapped image that this view exposes.
    #[inline]
    pub fn subresource_range(&self) -> &ImageSubresourceRange {
        &self.subresource_range
    }

    /// Returns the usage of the image view.
    #[inline]
    pub fn usage(&self) -> ImageUsage {
        self.usage
    }

    /// Returns the [`ImageViewType`] of this image view.
    #[inline]
    pub fn view_type(&self) -> ImageViewType {
        self.view_type
    }

    /// Returns the extent of the base mip level of the view.
    #[inline]
    pub fn extent(&self) -> [u32; 3] {
        self.extent
    }

    /// Returns the part of the image that the surface states of the view cover.
    #[inline]
    pub fn surface_view(&self) -> &SurfaceView {
        &self.surface_view
    }

    /// Returns the state for sampling in `ImageLayout::ShaderReadOnlyOptimal`.
    #[inline]
    pub fn optimal_sampler_state(&self) -> Option<&SurfaceState> {
        self.optimal_sampler_state.as_ref()
    }

    /// Returns the state for sampling in `ImageLayout::General`.
    #[inline]
    pub fn general_sampler_state(&self) -> Option<&SurfaceState> {
        self.general_sampler_state.as_ref()
    }

    /// Returns the state for storage reads and writes.
    #[inline]
    pub fn storage_state(&self) -> Option<&SurfaceState> {
        self.storage_state.as_ref()
    }

    /// Returns the state for storage accesses that only write.
    #[inline]
    pub fn writeonly_storage_state(&self) -> Option<&SurfaceState> {
        self.writeonly_storage_state.as_ref()
    }

    /// Returns the state for rendering to the view as a color attachment.
    #[inline]
    pub fn color_attachment_state(&self) -> Option<&SurfaceState> {
        self.color_attachment_state.as_ref()
    }
}

impl DeviceOwned for ImageView {
    #[inline]
    fn device(&self) -> &Arc<Device> {
        self.image.device()
    }
}

impl_id_counter!(ImageView);

/// Parameters to create a new `ImageView`.
#[derive(Clone, Debug)]
pub struct ImageViewCreateInfo {
    /// The image view type.
    ///
    /// The view type must be compatible with the dimensions of the image and the selected array
    /// layers.
    pub view_type: ImageViewType,

    /// The format of the image view.
    ///
    /// Unless the image was created with [`ImageCreateFlags::MUTABLE_FORMAT`], this must be the
    /// format of the image.
    pub format: Format,

    /// How to map components of each pixel.
    ///
    /// The default value is [`ComponentMapping::identity()`].
    pub component_mapping: ComponentMapping,

    /// The subresource range of the image that the view should cover.
    pub subresource_range: ImageSubresourceRange,

    /// How the image view is going to be used.
    ///
    /// If `usage` is empty, then the usage of the image is used.
    ///
    /// The default value is empty.
    pub usage: ImageUsage,

    pub _ne: NonExhaustive,
}

impl ImageViewCreateInfo {
    /// Returns an `ImageViewCreateInfo` with the `view_type` determined from the image type and
    /// array layers, and `subresource_range` determined from the image format and covering the
    /// whole image.
    pub fn from_image(image: &Image) -> Self {
        Self {
            view_type: match image.image_type() {
                ImageType::Dim1d => {
                    if image.array_layers() == 1 {
                        ImageViewType::Dim1d
                    } else {
                        ImageViewType::Dim1dArray
                    }
                }
                ImageType::Dim2d => {
                    if image.array_layers() == 1 {
                        ImageViewType::Dim2d
                    } else {
                        ImageViewType::Dim2dArray
                    }
                }
                ImageType::Dim3d => ImageViewType::Dim3d,
            },
            format: image.format(),
            component_mapping: ComponentMapping::identity(),
            subresource_range: ImageSubresourceRange::from_parameters(
                image.format(),
                image.mip_levels(),
                image.array_layers(),
            ),
            usage: ImageUsage::empty(),
            _ne: NonExhaustive(()),
        }
    }

    pub(crate) fn validate(&self, image: &Image) {
        let &Self {
            view_type,
            format,
            component_mapping: _,
            ref subresource_range,
            usage,
            _ne: _,
        } = self;

        assert!(
            !subresource_range.aspects.is_empty(),
            "the aspects of the subresource range must not be empty",
        );
        assert!(
            image.aspects().contains(subresource_range.aspects),
            "the aspects of the subresource range are not a subset of the image's aspects",
        );
        assert!(
            !subresource_range.mip_levels.is_empty()
                && subresource_range.mip_levels.end <= image.mip_levels(),
            "the mip levels {:?} are out of range for an image with {} mip levels",
            subresource_range.mip_levels,
            image.mip_levels(),
        );
        assert!(
            !subresource_range.array_layers.is_empty(),
            "the subresource range must have at least one array layer",
        );

        match image.image_type() {
            ImageType::Dim1d | ImageType::Dim2d => assert!(
                subresource_range.array_layers.end <= image.array_layers(),
                "the array layers {:?} are out of range for an image with {} array layers",
                subresource_range.array_layers,
                image.array_layers(),
            ),
            ImageType::Dim3d => {
                let depth = mip_level_extent(image.extent(), subresource_range.mip_levels.start)
                    .map_or(0, |extent| extent[2]);

                assert!(
                    subresource_range.array_layers.end <= depth,
                    "the depth slices {:?} are out of range for a mip level with depth {}",
                    subresource_range.array_layers,
                    depth,
                );
            }
        }

        let view_usage = if usage.is_empty() {
            image.usage()
        } else {
            usage
        };

        assert!(
            image.usage().contains(view_usage),
            "the usage of the view is not a subset of the usage of the image",
        );
        assert!(
            view_usage.intersects(
                ImageUsage::SAMPLED
                    | ImageUsage::STORAGE
                    | ImageUsage::COLOR_ATTACHMENT
                    | ImageUsage::INPUT_ATTACHMENT
                    | ImageUsage::DEPTH_STENCIL_ATTACHMENT
            ),
            "the usage of the view does not allow it to be used for anything",
        );

        let layer_count = subresource_range.array_layers.len();

        match (view_type, image.image_type()) {
            (ImageViewType::Dim1d, ImageType::Dim1d)
            | (ImageViewType::Dim2d, ImageType::Dim2d) => {
                assert_eq!(layer_count, 1, "non-array views must have a single layer");
            }
            (ImageViewType::Dim1dArray, ImageType::Dim1d)
            | (ImageViewType::Dim2dArray, ImageType::Dim2d)
            | (ImageViewType::Dim3d, ImageType::Dim3d) => (),
            (ImageViewType::Cube | ImageViewType::CubeArray, ImageType::Dim2d) => {
                assert!(
                    image.flags().intersects(ImageCreateFlags::CUBE_COMPATIBLE),
                    "cube views require a cube-compatible image",
                );
                assert!(
                    layer_count % 6 == 0
                        && (view_type == ImageViewType::CubeArray || layer_count == 6),
                    "cube views must cover 6 array layers, or a multiple of 6 for cube arrays",
                );
            }
            _ => panic!(
                "a {:?} view cannot be created for a {:?} image",
                view_type,
                image.image_type(),
            ),
        }

        if format != image.format() {
            assert!(
                image.flags().intersects(ImageCreateFlags::MUTABLE_FORMAT),
                "the format of the view differs from the format of the image, but the image does \
                not have a mutable format",
            );
            assert!(
                image.view_formats().is_empty() || image.view_formats().contains(&format),
                "{:?} is not one of the view formats of the image",
                format,
            );
        }
    }
}

vulkan_enum! {
    /// The geometry type of an image view.
    ImageViewType = ImageViewType(i32);

    Dim1d = TYPE_1D,
    Dim2d = TYPE_2D,
    Dim3d = TYPE_3D,
    Cube = CUBE,
    Dim1dArray = TYPE_1D_ARRAY,
    Dim2dArray = TYPE_2D_ARRAY,
    CubeArray = CUBE_ARRAY,
}

impl ImageViewType {
    /// Returns whether the type is `Cube` or `CubeArray`.
    #[inline]
    pub fn is_cube(self) -> bool {
        matches!(self, Self::Cube | Self::CubeArray)
    }
}

/// A mapping between components of a source format and components read by a shader.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentMapping {
    /// First component.
    pub r: ComponentSwizzle,
    /// Second component.
    pub g: ComponentSwizzle,
    /// Third component.
    pub b: ComponentSwizzle,
    /// Fourth component.
    pub a: ComponentSwizzle,
}

impl ComponentMapping {
    /// Creates a `ComponentMapping` with all components identity swizzled.
    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }
}

impl From<ComponentMapping> for ash::vk::ComponentMapping {
    #[inline]
    fn from(value: ComponentMapping) -> Self {
        Self {
            r: value.r.into(),
            g: value.g.into(),
            b: value.b.into(),
            a: value.a.into(),
        }
    }
}

vulkan_enum! {
    /// Describes the value that an individual component must return when being accessed.
    ComponentSwizzle = ComponentSwizzle(i32);

    /// Returns the value that this component should normally have.
    ///
    /// This is the `Default` value.
    Identity = IDENTITY,

    /// Always return zero.
    Zero = ZERO,

    /// Always return one.
    One = ONE,

    /// Returns the value of the first component.
    Red = R,

    /// Returns the value of the second component.
    Green = G,

    /// Returns the value of the third component.
    Blue = B,

    /// Returns the value of the fourth component.
    Alpha = A,
}

impl Default for ComponentSwizzle {
    #[inline]
    fn default() -> ComponentSwizzle {
        ComponentSwizzle::Identity
    }
}

/// Returns the hardware channel that `component` of a view reads, given the view's `swizzle` for
/// that component and the order in which the hardware stores the channels of the format.
///
/// # Panics
///
/// - Panics if both `swizzle` and `component` are `ComponentSwizzle::Identity`.
pub fn remap_swizzle(
    swizzle: ComponentSwizzle,
    component: ComponentSwizzle,
    format_swizzle: Swizzle,
) -> ChannelSelect {
    let swizzle = match swizzle {
        ComponentSwizzle::Identity => component,
        swizzle => swizzle,
    };

    match swizzle {
        ComponentSwizzle::Zero => ChannelSelect::Zero,
        ComponentSwizzle::One => ChannelSelect::One,
        ComponentSwizzle::Red => format_swizzle.r,
        ComponentSwizzle::Green => format_swizzle.g,
        ComponentSwizzle::Blue => format_swizzle.b,
        ComponentSwizzle::Alpha => format_swizzle.a,
        ComponentSwizzle::Identity => panic!("the component to remap must not be `Identity`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device::DeviceCreateInfo,
        image::ImageCreateInfo,
        surface_state::packed::{PackedSurfaceState, SURFACE_TYPE_3D, SURFACE_TYPE_CUBE},
        tests::{assert_should_panic, bound_image, device, TEST_MEMORY_ADDRESS},
    };

    fn color_image(device: &Arc<Device>, usage: ImageUsage) -> Arc<Image> {
        bound_image(
            device,
            ImageCreateInfo {
                format: Format::R8G8B8A8_UNORM,
                extent: [256, 256, 1],
                usage,
                ..Default::default()
            },
        )
    }

    #[test]
    fn remap() {
        let rgb1 = Swizzle::RGB1;

        assert_eq!(
            remap_swizzle(ComponentSwizzle::Identity, ComponentSwizzle::Red, rgb1),
            ChannelSelect::Red,
        );
        assert_eq!(
            remap_swizzle(ComponentSwizzle::Identity, ComponentSwizzle::Alpha, rgb1),
            ChannelSelect::One,
        );
        assert_eq!(
            remap_swizzle(ComponentSwizzle::Zero, ComponentSwizzle::Green, rgb1),
            ChannelSelect::Zero,
        );
        assert_eq!(
            remap_swizzle(ComponentSwizzle::Blue, ComponentSwizzle::Red, Swizzle::IDENTITY),
            ChannelSelect::Blue,
        );

        assert_should_panic!("Identity", {
            remap_swizzle(
                ComponentSwizzle::Identity,
                ComponentSwizzle::Identity,
                Swizzle::IDENTITY,
            );
        });
    }

    #[test]
    fn sampled_and_rendered_color_view() {
        let device = device(9);
        let image = color_image(&device, ImageUsage::SAMPLED | ImageUsage::COLOR_ATTACHMENT);
        let view = ImageView::new_default(image).unwrap();

        let optimal = view.optimal_sampler_state().unwrap();
        let general = view.general_sampler_state().unwrap();
        let attachment = view.color_attachment_state().unwrap();
        assert!(view.storage_state().is_none());
        assert!(view.writeonly_storage_state().is_none());

        for state in [optimal, general, attachment] {
            assert_eq!(state.aux_usage(), AuxUsage::CcsE);
            assert_eq!(state.address(), TEST_MEMORY_ADDRESS);
            assert_eq!(state.aux_address(), TEST_MEMORY_ADDRESS + 262144);
        }

        assert_eq!(device.surface_state_pool().allocated_count(), 3);
        drop(view);
        assert_eq!(device.surface_state_pool().allocated_count(), 0);
    }

    #[test]
    fn depth_view() {
        let device = device(9);
        let image = bound_image(
            &device,
            ImageCreateInfo {
                format: Format::D32_SFLOAT,
                extent: [64, 64, 1],
                usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT | ImageUsage::SAMPLED,
                ..Default::default()
            },
        );
        let view = ImageView::new_default(image).unwrap();

        let optimal = view.optimal_sampler_state().unwrap();
        assert_eq!(optimal.aux_usage(), AuxUsage::Hiz);
        assert_eq!(optimal.clear_color().as_f32(), [1.0, 0.0, 0.0, 0.0]);

        let general = view.general_sampler_state().unwrap();
        assert_eq!(general.aux_usage(), AuxUsage::None);
        assert_eq!(general.aux_address(), 0);

        assert!(view.color_attachment_state().is_none());
    }

    #[test]
    fn stencil_view_of_combined_image() {
        let image = bound_image(
            &device(9),
            ImageCreateInfo {
                format: Format::D24_UNORM_S8_UINT,
                extent: [64, 64, 1],
                usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT | ImageUsage::INPUT_ATTACHMENT,
                ..Default::default()
            },
        );
        let mut create_info = ImageViewCreateInfo::from_image(&image);
        create_info.subresource_range.aspects = ImageAspects::STENCIL;

        let view = ImageView::new(image, create_info).unwrap();
        assert_eq!(view.surface_view().format, Format::S8_UINT);

        // Input attachments of depth/stencil images are sampled like textures.
        let optimal = view.optimal_sampler_state().unwrap();
        assert_eq!(optimal.address(), TEST_MEMORY_ADDRESS + 16384);
        assert_eq!(optimal.aux_usage(), AuxUsage::None);
    }

    #[test]
    fn color_input_attachment_has_no_sampler_states() {
        let image = color_image(
            &device(9),
            ImageUsage::COLOR_ATTACHMENT | ImageUsage::INPUT_ATTACHMENT,
        );
        let view = ImageView::new_default(image).unwrap();

        assert!(view.optimal_sampler_state().is_none());
        assert!(view.color_attachment_state().is_some());
    }

    #[test]
    fn storage_view() {
        let image = color_image(&device(9), ImageUsage::STORAGE | ImageUsage::SAMPLED);
        let view = ImageView::new_default(image).unwrap();

        for state in [
            view.storage_state().unwrap(),
            view.writeonly_storage_state().unwrap(),
            view.optimal_sampler_state().unwrap(),
        ] {
            assert_eq!(state.aux_usage(), AuxUsage::None);
            assert_eq!(state.aux_address(), 0);
        }
    }

    #[test]
    fn state_slots_run_out() {
        let device = Device::new(DeviceCreateInfo {
            surface_state_count: 2,
            ..Default::default()
        });
        let image = color_image(&device, ImageUsage::SAMPLED | ImageUsage::COLOR_ATTACHMENT);

        assert_eq!(
            ImageView::new_default(image).unwrap_err(),
            OomError::OutOfDeviceMemory,
        );
        assert_eq!(device.surface_state_pool().allocated_count(), 0);
    }

    #[test]
    fn volume_view_covers_every_slice() {
        let image = bound_image(
            &device(9),
            ImageCreateInfo {
                image_type: ImageType::Dim3d,
                extent: [16, 16, 8],
                mip_levels: 2,
                usage: ImageUsage::SAMPLED,
                ..Default::default()
            },
        );
        let mut create_info = ImageViewCreateInfo::from_image(&image);
        create_info.subresource_range.mip_levels = 1..2;

        let view = ImageView::new(image, create_info).unwrap();
        assert_eq!(view.extent(), [8, 8, 4]);
        assert_eq!(view.surface_view().base_layer, 0);
        assert_eq!(view.surface_view().layers, 4);

        let packed = PackedSurfaceState::read(view.general_sampler_state().unwrap().data());
        assert_eq!(packed.surface_type, SURFACE_TYPE_3D);
    }

    #[test]
    fn cube_view() {
        let image = bound_image(
            &device(9),
            ImageCreateInfo {
                flags: ImageCreateFlags::CUBE_COMPATIBLE,
                extent: [64, 64, 1],
                array_layers: 6,
                usage: ImageUsage::SAMPLED,
                ..Default::default()
            },
        );
        let create_info = ImageViewCreateInfo {
            view_type: ImageViewType::Cube,
            ..ImageViewCreateInfo::from_image(&image)
        };

        let view = ImageView::new(image, create_info).unwrap();
        assert!(view.surface_view().usage.intersects(SurfaceUsage::CUBE));

        let packed = PackedSurfaceState::read(view.optimal_sampler_state().unwrap().data());
        assert_eq!(packed.surface_type, SURFACE_TYPE_CUBE);
        assert_eq!(packed.depth, 6);
    }

    #[test]
    fn hardware_swizzle_of_rgb_format() {
        let image = bound_image(
            &device(9),
            ImageCreateInfo {
                format: Format::R8G8B8_UNORM,
                extent: [64, 64, 1],
                usage: ImageUsage::SAMPLED,
                ..Default::default()
            },
        );
        let view = ImageView::new_default(image).unwrap();

        assert_eq!(view.surface_view().swizzle, Swizzle::RGB1);
    }

    #[test]
    fn invalid_create_info() {
        let image = color_image(&device(9), ImageUsage::SAMPLED);

        assert_should_panic!("not a subset of the usage", {
            let create_info = ImageViewCreateInfo {
                usage: ImageUsage::STORAGE,
                ..ImageViewCreateInfo::from_image(&image)
            };
            ImageView::new(image.clone(), create_info).unwrap();
        });
        assert_should_panic!("out of range", {
            let mut create_info = ImageViewCreateInfo::from_image(&image);
            create_info.subresource_range.mip_levels = 1..2;
            ImageView::new(image.clone(), create_info).unwrap();
        });
        assert_should_panic!("mutable format", {
            let create_info = ImageViewCreateInfo {
                format: Format::R8G8B8A8_SRGB,
                ..ImageViewCreateInfo::from_image(&image)
            };
            ImageView::new(image.clone(), create_info).unwrap();
        });
        assert_should_panic!("cube-compatible", {
            let create_info = ImageViewCreateInfo {
                view_type: ImageViewType::Cube,
                ..ImageViewCreateInfo::from_image(&image)
            };
            ImageView::new(image.clone(), create_info).unwrap();
        });
    }
}
