// Copyright (c) 2020 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use crate::macros::vulkan_bitflags_enum;

vulkan_bitflags_enum! {
    /// A set of [`ImageAspect`] values.
    ImageAspects
    impl {
        /// Returns the single aspect in `self`, or `None` if `self` is empty or has more than
        /// one aspect.
        #[inline]
        pub fn single(self) -> Option<ImageAspect> {
            if self.count() == 1 {
                self.into_iter().next()
            } else {
                None
            }
        }
    },

    /// An individual data type within an image.
    ///
    /// Most images have only the `Color` aspect, but depth/stencil images may have both a `Depth`
    /// and a `Stencil` aspect, which are laid out as separate surfaces.
    ImageAspect
    impl {
        /// Returns a dense index for the aspect, usable to index per-aspect storage.
        #[inline]
        pub(crate) const fn index(self) -> usize {
            match self {
                ImageAspect::Color => 0,
                ImageAspect::Depth => 1,
                ImageAspect::Stencil => 2,
            }
        }
    },

    = ImageAspectFlags(u32);

    /// The single component of a color image.
    COLOR, Color = COLOR,

    /// The depth component.
    DEPTH, Depth = DEPTH,

    /// The stencil component.
    STENCIL, Stencil = STENCIL,
}
