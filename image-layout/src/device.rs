// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The device that images are created for.
//!
//! A [`Device`] bundles what the layout code needs to know about the hardware: its
//! [capabilities](DeviceCapabilities), the [surface layout calculator] that decides the shape of
//! each surface, the [surface state encoder] that writes hardware descriptors, and the
//! [pool](SurfaceStatePool) that surface state slots are allocated from.
//!
//! [surface layout calculator]: SurfaceLayoutCalculator
//! [surface state encoder]: SurfaceStateEncoder

use crate::{
    image::{ImageAspects, SampleCount},
    surface_layout::{reference::ReferenceLayoutCalculator, SurfaceLayoutCalculator},
    surface_state::{packed::PackedSurfaceStateEncoder, pool::SurfaceStatePool, SurfaceStateEncoder},
    DeviceSize, NonExhaustive,
};
use std::sync::Arc;

/// Environment variable that disables HiZ for depth images when set to a truthy value.
pub const DISABLE_HIZ_ENV: &str = "IMAGE_LAYOUT_DISABLE_HIZ";

/// Environment variable that disables color compression when set to a truthy value.
pub const DISABLE_CCS_ENV: &str = "IMAGE_LAYOUT_DISABLE_CCS";

/// Represents a GPU device that images can be laid out for.
#[derive(Debug)]
pub struct Device {
    capabilities: DeviceCapabilities,
    layout_calculator: Box<dyn SurfaceLayoutCalculator>,
    state_encoder: Box<dyn SurfaceStateEncoder>,
    surface_state_pool: Arc<SurfaceStatePool>,
}

impl Device {
    /// Creates a new `Device`.
    ///
    /// # Panics
    ///
    /// - Panics if `create_info.generation` is less than 7.
    /// - Panics if `create_info.surface_state_count` is 0.
    pub fn new(create_info: DeviceCreateInfo) -> Arc<Device> {
        let DeviceCreateInfo {
            generation,
            debug_overrides,
            max_resource_size,
            surface_state_count,
            layout_calculator,
            state_encoder,
            _ne: _,
        } = create_info;

        assert!(
            generation >= 7,
            "hardware generation {} is older than the oldest supported generation 7",
            generation,
        );
        assert!(surface_state_count != 0);

        let capabilities = DeviceCapabilities {
            generation,
            debug_overrides,
            max_resource_size: max_resource_size
                .unwrap_or_else(|| DeviceCapabilities::default_max_resource_size(generation)),
        };

        log::debug!(
            "Creating device: generation {}, {} surface state slots, {:?}",
            generation,
            surface_state_count,
            debug_overrides,
        );

        Arc::new(Device {
            capabilities,
            layout_calculator: layout_calculator
                .unwrap_or_else(|| Box::new(ReferenceLayoutCalculator::new(generation))),
            state_encoder: state_encoder.unwrap_or_else(|| Box::new(PackedSurfaceStateEncoder)),
            surface_state_pool: SurfaceStatePool::new(surface_state_count),
        })
    }

    /// Returns the capabilities of the device.
    #[inline]
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// Returns the calculator that lays out surfaces for this device.
    #[inline]
    pub fn layout_calculator(&self) -> &dyn SurfaceLayoutCalculator {
        &*self.layout_calculator
    }

    /// Returns the encoder that writes surface states for this device.
    #[inline]
    pub fn state_encoder(&self) -> &dyn SurfaceStateEncoder {
        &*self.state_encoder
    }

    /// Returns the pool that surface state slots are allocated from.
    #[inline]
    pub fn surface_state_pool(&self) -> &Arc<SurfaceStatePool> {
        &self.surface_state_pool
    }
}

/// Parameters to create a new `Device`.
#[derive(Debug)]
pub struct DeviceCreateInfo {
    /// The hardware generation of the device.
    ///
    /// The default value is `9`.
    pub generation: u32,

    /// Features to force off, for debugging.
    ///
    /// The default value is no overrides. Use [`DebugOverrides::from_env`] to take them from the
    /// environment.
    pub debug_overrides: DebugOverrides,

    /// The largest image, in bytes, that can be created. Larger images fail with
    /// [`OomError::OutOfDeviceMemory`](crate::OomError::OutOfDeviceMemory).
    ///
    /// The default value is `None`, which picks the hardware limit for `generation`.
    pub max_resource_size: Option<DeviceSize>,

    /// Number of surface state slots in the device's pool.
    ///
    /// The default value is `4096`.
    pub surface_state_count: u32,

    /// The calculator that lays out surfaces.
    ///
    /// The default value is `None`, which uses a [`ReferenceLayoutCalculator`].
    pub layout_calculator: Option<Box<dyn SurfaceLayoutCalculator>>,

    /// The encoder that writes surface states.
    ///
    /// The default value is `None`, which uses a [`PackedSurfaceStateEncoder`].
    pub state_encoder: Option<Box<dyn SurfaceStateEncoder>>,

    pub _ne: NonExhaustive,
}

impl Default for DeviceCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            generation: 9,
            debug_overrides: DebugOverrides::default(),
            max_resource_size: None,
            surface_state_count: 4096,
            layout_calculator: None,
            state_encoder: None,
            _ne: NonExhaustive(()),
        }
    }
}

/// What the layout code needs to know about the hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// The hardware generation.
    pub generation: u32,

    /// Features forced off for debugging.
    pub debug_overrides: DebugOverrides,

    /// The largest image that can be created, in bytes.
    pub max_resource_size: DeviceSize,
}

impl DeviceCapabilities {
    const fn default_max_resource_size(generation: u32) -> DeviceSize {
        if generation >= 8 {
            1 << 38
        } else {
            1 << 31
        }
    }

    /// Returns the size in bytes of a clear value stored in a surface state.
    #[inline]
    pub const fn clear_value_size(&self) -> DeviceSize {
        if self.generation >= 9 {
            4 * 4
        } else {
            4
        }
    }

    /// Returns the size in bytes of one entry of a fast-clear value block.
    ///
    /// An entry is the clear value followed by one dword that says whether the level needs to be
    /// resolved.
    #[inline]
    pub const fn fast_clear_state_entry_size(&self) -> DeviceSize {
        let clear_value_size = self.clear_value_size();
        debug_assert!(clear_value_size % 4 == 0);

        clear_value_size + 4
    }

    /// Returns whether the sampler can read depth through HiZ, for images with `samples` samples.
    #[inline]
    pub fn can_sample_with_hiz(&self, aspects: ImageAspects, samples: SampleCount) -> bool {
        assert!(!aspects.is_empty());

        self.generation >= 8
            && aspects.intersects(ImageAspects::DEPTH)
            && samples == SampleCount::Sample1
    }
}

/// Features that can be forced off for debugging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugOverrides {
    /// Never create HiZ surfaces for depth images.
    pub no_hiz: bool,

    /// Never create color compression surfaces.
    pub no_ccs: bool,
}

impl DebugOverrides {
    /// Reads the overrides from the [`DISABLE_HIZ_ENV`] and [`DISABLE_CCS_ENV`] environment
    /// variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let truthy = |name: &str| {
            lookup(name).is_some_and(|raw| {
                let v = raw.trim();
                v == "1"
                    || v.eq_ignore_ascii_case("true")
                    || v.eq_ignore_ascii_case("yes")
                    || v.eq_ignore_ascii_case("on")
            })
        };

        DebugOverrides {
            no_hiz: truthy(DISABLE_HIZ_ENV),
            no_ccs: truthy(DISABLE_CCS_ENV),
        }
    }
}
