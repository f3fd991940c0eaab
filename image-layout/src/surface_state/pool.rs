// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::SURFACE_STATE_SIZE;
use crate::OomError;
use crossbeam_queue::SegQueue;
use parking_lot::Mutex;
use std::{fmt, sync::Arc};

/// Hands out fixed-size, fixed-alignment surface state slots.
///
/// Slots that are returned go to a free list and are handed out again before any new slot is
/// taken from the end of the pool. The pool is shared by all image views of a device and can be
/// used from any thread.
#[derive(Debug)]
pub struct SurfaceStatePool {
    capacity: u32,
    next_slot: Mutex<u32>,
    free_list: SegQueue<u32>,
}

impl SurfaceStatePool {
    /// Creates a pool of `capacity` slots.
    pub fn new(capacity: u32) -> Arc<Self> {
        Arc::new(SurfaceStatePool {
            capacity,
            next_slot: Mutex::new(0),
            free_list: SegQueue::new(),
        })
    }

    /// Allocates a slot.
    ///
    /// Returns [`OomError::OutOfDeviceMemory`] if every slot is in use.
    pub fn allocate(self: &Arc<Self>) -> Result<SurfaceStateSlot, OomError> {
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                let mut next_slot = self.next_slot.lock();

                if *next_slot >= self.capacity {
                    return Err(OomError::OutOfDeviceMemory);
                }

                let index = *next_slot;
                *next_slot += 1;

                index
            }
        };

        Ok(SurfaceStateSlot {
            pool: self.clone(),
            index,
        })
    }

    /// Returns the total number of slots in the pool.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the number of slots that are currently allocated.
    pub fn allocated_count(&self) -> u32 {
        let next_slot = self.next_slot.lock();

        *next_slot - self.free_list.len() as u32
    }
}

/// A surface state slot. The slot goes back to its pool when this is dropped.
pub struct SurfaceStateSlot {
    pool: Arc<SurfaceStatePool>,
    index: u32,
}

impl SurfaceStateSlot {
    /// Returns the offset in bytes of the slot from the start of the pool.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.index * SURFACE_STATE_SIZE as u32
    }
}

impl Drop for SurfaceStateSlot {
    #[inline]
    fn drop(&mut self) {
        self.pool.free_list.push(self.index);
    }
}

impl fmt::Debug for SurfaceStateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceStateSlot")
            .field("offset", &self.offset())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface_state::SURFACE_STATE_ALIGNMENT;
    use std::thread;

    #[test]
    fn offsets_are_aligned() {
        let pool = SurfaceStatePool::new(4);
        let a = pool.allocate().unwrap();
        let b = pool.allocate().unwrap();

        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset() as usize, SURFACE_STATE_SIZE);
        assert_eq!(b.offset() as usize % SURFACE_STATE_ALIGNMENT, 0);
    }

    #[test]
    fn exhaustion_and_reuse() {
        let pool = SurfaceStatePool::new(2);
        let a = pool.allocate().unwrap();
        let _b = pool.allocate().unwrap();

        assert_eq!(pool.allocate().unwrap_err(), OomError::OutOfDeviceMemory);
        assert_eq!(pool.allocated_count(), 2);

        let offset = a.offset();
        drop(a);
        assert_eq!(pool.allocated_count(), 1);
        assert_eq!(pool.allocate().unwrap().offset(), offset);
    }

    #[test]
    fn concurrent_allocation() {
        let pool = SurfaceStatePool::new(64);

        let slots: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let pool = &pool;
                    scope.spawn(move || {
                        (0..16)
                            .map(|_| pool.allocate().unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let mut offsets: Vec<_> = slots.iter().map(|s| s.offset()).collect();
        offsets.sort_unstable();
        offsets.dedup();
        assert_eq!(offsets.len(), 64);
        assert!(pool.allocate().is_err());

        drop(slots);
        assert_eq!(pool.allocated_count(), 0);
    }
}
