// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Auxiliary compression surfaces.
//!
//! An image can have at most one auxiliary surface, which holds compression metadata for one of
//! its primary surfaces:
//!
//! - HiZ for the depth surface of a depth/stencil image.
//! - CCS (single-sample color compression) for a single-sampled color surface.
//! - MCS (multisample color compression) for a multisampled color surface.
//!
//! Color auxiliary surfaces are followed by a block of fast-clear values, one entry per mip level.
//! Whenever the hardware cannot use an auxiliary surface, the image simply goes without one.

use super::{
    surface::{ImageSurfaces, Surface, SurfacePlacer},
    sys::ImageCreateInfo,
    ImageCreateFlags, ImageUsage,
};
use crate::{
    device::DeviceCapabilities, surface_layout::SurfaceLayoutCalculator, DeviceSize,
    PERF_LOG_TARGET,
};

/// How the auxiliary surface of an image is used for an access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AuxUsage {
    /// The auxiliary surface is not used, and the primary surface must hold the real data.
    #[default]
    None,

    /// Hierarchical depth.
    Hiz,

    /// Lossless single-sample color compression.
    CcsE,

    /// Multisample color compression.
    Mcs,
}

/// What an auxiliary surface holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuxSurfaceKind {
    Hiz,
    Ccs,
    Mcs,
}

/// The fast-clear value block that follows a color auxiliary surface.
///
/// Each mip level has one entry: the clear value, followed by a dword that says whether the level
/// needs a resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FastClearBlock {
    /// Offset of the block from the start of the image.
    pub offset: DeviceSize,

    /// Size of one entry in bytes.
    pub entry_size: DeviceSize,

    /// Number of entries.
    pub levels: u32,
}

impl FastClearBlock {
    /// Returns the size of the block in bytes.
    #[inline]
    pub fn size(&self) -> DeviceSize {
        self.entry_size * self.levels as DeviceSize
    }
}

/// The auxiliary surface of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuxiliaryRecord {
    pub kind: AuxSurfaceKind,
    pub surface: Surface,

    /// Only present for color auxiliary surfaces.
    pub fast_clear: Option<FastClearBlock>,
}

/// The auxiliary usage an image ends up with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct AuxDecision {
    pub(crate) aux_usage: AuxUsage,
    pub(crate) compression_always_on: bool,
}

/// What the auxiliary policy looks at.
pub(crate) struct AuxPolicy<'a> {
    pub(crate) capabilities: &'a DeviceCapabilities,
    pub(crate) calculator: &'a dyn SurfaceLayoutCalculator,
    pub(crate) create_info: &'a ImageCreateInfo,
}

impl AuxPolicy<'_> {
    /// Gives the depth surface a HiZ surface, if it is worth it and the hardware can do it.
    pub(crate) fn add_depth_aux(
        &self,
        depth: &Surface,
        placer: &mut SurfacePlacer,
        surfaces: &mut ImageSurfaces,
    ) -> AuxDecision {
        let create_info = self.create_info;
        debug_assert!(surfaces.aux.is_none());
        assert!(
            !create_info.usage.intersects(ImageUsage::STORAGE),
            "depth images cannot have storage usage",
        );

        if !create_info
            .usage
            .intersects(ImageUsage::DEPTH_STENCIL_ATTACHMENT)
        {
            // Never rendered to, so HiZ would never be filled.
            return AuxDecision::default();
        }

        let skip_reason = if self.capabilities.generation == 7 {
            Some("HiZ is not implemented on generation 7")
        } else if create_info.mip_levels > 1 {
            Some("HiZ is not enabled for images with more than one mip level")
        } else if create_info.array_layers > 1 {
            Some("HiZ clears and resolves are not implemented for multiple array layers")
        } else if self.capabilities.generation == 8 && u32::from(create_info.samples) > 1 {
            Some("HiZ is not enabled for multisampled images on generation 8")
        } else {
            None
        };

        if let Some(reason) = skip_reason {
            log::warn!(target: PERF_LOG_TARGET, "{}", reason);
            return AuxDecision::default();
        }

        if self.capabilities.debug_overrides.no_hiz {
            log::debug!("HiZ disabled by debug override");
            return AuxDecision::default();
        }

        let Some(layout) = self.calculator.hiz_surface(&depth.layout) else {
            log::warn!(
                target: PERF_LOG_TARGET,
                "The depth surface cannot have a HiZ surface",
            );
            return AuxDecision::default();
        };

        surfaces.aux = Some(AuxiliaryRecord {
            kind: AuxSurfaceKind::Hiz,
            surface: placer.place(layout),
            fast_clear: None,
        });

        AuxDecision {
            aux_usage: AuxUsage::Hiz,
            compression_always_on: false,
        }
    }

    /// Gives a single-sampled color surface a CCS surface and fast-clear block, if the hardware
    /// can do it.
    pub(crate) fn add_color_aux(
        &self,
        color: &Surface,
        placer: &mut SurfacePlacer,
        surfaces: &mut ImageSurfaces,
    ) -> AuxDecision {
        let create_info = self.create_info;
        debug_assert!(surfaces.aux.is_none());

        if self.capabilities.debug_overrides.no_ccs {
            log::debug!("Color compression disabled by debug override");
            return AuxDecision::default();
        }

        let Some(layout) = self.calculator.ccs_surface(&color.layout) else {
            return AuxDecision::default();
        };

        if !color.layout.format.supports_rendering() {
            log::warn!(
                target: PERF_LOG_TARGET,
                "{:?} does not support rendering, not allocating a CCS surface",
                color.layout.format,
            );
            return AuxDecision::default();
        }

        let surface = placer.place(layout);
        let fast_clear = self.add_fast_clear_block(&surface, placer);

        surfaces.aux = Some(AuxiliaryRecord {
            kind: AuxSurfaceKind::Ccs,
            surface,
            fast_clear: Some(fast_clear),
        });

        // Without storage access and with every possible view format compatible, the image is
        // only ever accessed through paths that understand compression.
        if !create_info.usage.intersects(ImageUsage::STORAGE)
            && all_formats_ccs_e_compatible(self.capabilities.generation, create_info)
        {
            AuxDecision {
                aux_usage: AuxUsage::CcsE,
                compression_always_on: true,
            }
        } else {
            AuxDecision::default()
        }
    }

    /// Gives a multisampled color surface an MCS surface and fast-clear block, if the hardware
    /// can do it.
    pub(crate) fn add_multisample_aux(
        &self,
        color: &Surface,
        placer: &mut SurfacePlacer,
        surfaces: &mut ImageSurfaces,
    ) -> AuxDecision {
        debug_assert!(surfaces.aux.is_none());

        assert!(
            !self.create_info.usage.intersects(ImageUsage::STORAGE),
            "multisampled images cannot have storage usage",
        );

        let Some(layout) = self.calculator.mcs_surface(&color.layout) else {
            return AuxDecision::default();
        };

        let surface = placer.place(layout);
        let fast_clear = self.add_fast_clear_block(&surface, placer);

        surfaces.aux = Some(AuxiliaryRecord {
            kind: AuxSurfaceKind::Mcs,
            surface,
            fast_clear: Some(fast_clear),
        });

        AuxDecision {
            aux_usage: AuxUsage::Mcs,
            compression_always_on: false,
        }
    }

    /// Appends the fast-clear block right after `aux`, which must be the last thing placed.
    fn add_fast_clear_block(&self, aux: &Surface, placer: &mut SurfacePlacer) -> FastClearBlock {
        // The block is copied with dword-sized GPU writes.
        assert!(placer.alignment().as_devicesize() % 4 == 0);
        assert!(aux.size() % 4 == 0);
        assert_eq!(
            placer.size(),
            aux.end(),
            "the fast-clear block must directly follow the auxiliary surface",
        );

        let entry_size = self.capabilities.fast_clear_state_entry_size();
        assert!(entry_size % 4 == 0);

        let levels = self.create_info.mip_levels;
        let offset = placer.append_bytes(entry_size * levels as DeviceSize);

        FastClearBlock {
            offset,
            entry_size,
            levels,
        }
    }
}

/// Returns whether lossless color compression can stay enabled for every format that views of
/// the image may have.
pub(crate) fn all_formats_ccs_e_compatible(generation: u32, create_info: &ImageCreateInfo) -> bool {
    let format = create_info.format;

    if !format.supports_ccs_e(generation) {
        return false;
    }

    if !create_info.flags.intersects(ImageCreateFlags::MUTABLE_FORMAT) {
        return true;
    }

    // A mutable format without a list of view formats can be viewed with anything.
    !create_info.view_formats.is_empty()
        && create_info
            .view_formats
            .iter()
            .all(|&view_format| format.ccs_e_compatible_with(view_format, generation))
}
