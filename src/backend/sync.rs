// Synchronization primitives
//
// Fences, semaphores for GPU-CPU and GPU-GPU sync
// One set per frame in flight

use std::sync::Arc;

use ash::vk;

use super::VulkanDevice;
use crate::error::RenderResult;

/// Frame synchronization - one per frame in flight
pub struct FrameSync {
    pub image_available: vk::Semaphore,
    pub render_finished: vk::Semaphore,
    pub in_flight_fence: vk::Fence,
    device: Arc<VulkanDevice>,
}

impl FrameSync {
    pub fn new(device: Arc<VulkanDevice>) -> RenderResult<Self> {
        let semaphore_info = vk::SemaphoreCreateInfo::default();
        // Start signaled so the first wait on each slot returns immediately
        let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

        let mut sync = Self {
            image_available: vk::Semaphore::null(),
            render_finished: vk::Semaphore::null(),
            in_flight_fence: vk::Fence::null(),
            device,
        };

        unsafe {
            sync.image_available = sync.device.device.create_semaphore(&semaphore_info, None)?;
            sync.render_finished = sync.device.device.create_semaphore(&semaphore_info, None)?;
            sync.in_flight_fence = sync.device.device.create_fence(&fence_info, None)?;
        }

        Ok(sync)
    }

    /// Block until the GPU finished the last submission using this set
    pub fn wait(&self) -> RenderResult<()> {
        unsafe {
            self.device
                .device
                .wait_for_fences(&[self.in_flight_fence], true, u64::MAX)
        }?;
        Ok(())
    }

    pub fn reset(&self) -> RenderResult<()> {
        unsafe { self.device.device.reset_fences(&[self.in_flight_fence]) }?;
        Ok(())
    }
}

impl Drop for FrameSync {
    fn drop(&mut self) {
        // Null handles are ignored by the destroy calls
        unsafe {
            self.device.device.destroy_semaphore(self.image_available, None);
            self.device.device.destroy_semaphore(self.render_finished, None);
            self.device.device.destroy_fence(self.in_flight_fence, None);
        }
    }
}
