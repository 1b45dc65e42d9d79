// Frames in flight
//
// Each slot bundles everything one in-flight frame touches. Slots are used
// round-robin; a slot is only reused after its fence has been waited on.

use ash::vk;

use crate::backend::{FrameSync, GpuBuffer};

pub struct FrameSlot {
    pub command_buffer: vk::CommandBuffer,
    pub sync: FrameSync,
    /// Host-visible, persistently mapped
    pub uniform: GpuBuffer,
    pub descriptor_set: vk::DescriptorSet,
}

/// Fixed-size ring with a cursor that wraps with `(current + 1) % len`
#[derive(Debug)]
pub struct FrameRing<T> {
    slots: Vec<T>,
    current: usize,
}

impl<T> FrameRing<T> {
    /// `None` for an empty slot list
    pub fn new(slots: Vec<T>) -> Option<Self> {
        if slots.is_empty() {
            None
        } else {
            Some(Self { slots, current: 0 })
        }
    }

    /// `count` copies of `value`; at least one slot
    pub fn filled(value: T, count: usize) -> Self
    where
        T: Clone,
    {
        Self {
            slots: vec![value; count.max(1)],
            current: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &T {
        &self.slots[self.current]
    }

    pub fn current_mut(&mut self) -> &mut T {
        &mut self.slots[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.slots.len();
    }
}
