// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

#![cfg(test)]

use crate::{
    device::{DebugOverrides, Device, DeviceCreateInfo},
    image::{sys::RawImage, Image, ImageCreateInfo},
    memory::DeviceMemory,
    DeviceAddress,
};
use std::sync::Arc;

/// Address that test memory is placed at. Page aligned, and far from zero so that a missing base
/// address shows up in the tests.
pub(crate) const TEST_MEMORY_ADDRESS: DeviceAddress = 0x1_0000_0000;

/// Creates a device of the given hardware generation with default settings.
pub(crate) fn device(generation: u32) -> Arc<Device> {
    Device::new(DeviceCreateInfo {
        generation,
        ..Default::default()
    })
}

/// Creates a device of the given hardware generation with some features forced off.
pub(crate) fn device_with_overrides(
    generation: u32,
    debug_overrides: DebugOverrides,
) -> Arc<Device> {
    Device::new(DeviceCreateInfo {
        generation,
        debug_overrides,
        ..Default::default()
    })
}

/// Creates an image and binds it at the start of memory that is exactly as big as it needs.
pub(crate) fn bound_image(device: &Arc<Device>, create_info: ImageCreateInfo) -> Arc<Image> {
    let raw_image = RawImage::new(device.clone(), create_info).unwrap();
    let requirements = raw_image.memory_requirements();
    let memory = DeviceMemory {
        device_address: TEST_MEMORY_ADDRESS,
        size: requirements.size,
    };

    Arc::new(raw_image.bind_memory(memory, 0).map_err(|(err, _)| err).unwrap())
}

macro_rules! assert_should_panic {
    ($msg:expr, $code:block) => {{
        let res = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $code));

        match res {
            Ok(_) => panic!("Test expected to panic but didn't"),
            Err(err) => {
                if let Some(msg) = err.downcast_ref::<String>() {
                    assert!(msg.contains($msg), "unexpected panic message: {}", msg);
                } else if let Some(&msg) = err.downcast_ref::<&str>() {
                    assert!(msg.contains($msg), "unexpected panic message: {}", msg);
                } else {
                    panic!("Couldn't decipher the panic message of the test")
                }
            }
        }
    }};

    ($code:block) => {{
        let res = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $code));

        match res {
            Ok(_) => panic!("Test expected to panic but didn't"),
            Err(_) => {}
        }
    }};
}

pub(crate) use assert_should_panic;
