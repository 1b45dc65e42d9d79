// Command pools and one-shot submissions
//
// The per-frame command buffers come from a RESET_COMMAND_BUFFER pool.
// Setup-time transfers (mesh/texture uploads, layout transitions) go through
// `one_shot`, which blocks until the graphics queue is idle.

use std::sync::Arc;

use ash::vk;

use super::VulkanDevice;
use crate::error::RenderResult;

pub struct CommandPool {
    pub pool: vk::CommandPool,
    device: Arc<VulkanDevice>,
}

impl CommandPool {
    /// Pool on the graphics family whose buffers can be reset individually
    pub fn new(device: Arc<VulkanDevice>) -> RenderResult<Self> {
        let create_info = vk::CommandPoolCreateInfo::default()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(device.queue_families.graphics);

        let pool = unsafe { device.device.create_command_pool(&create_info, None) }?;

        Ok(Self { pool, device })
    }

    pub fn allocate(&self, count: u32) -> RenderResult<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        Ok(unsafe { self.device.device.allocate_command_buffers(&alloc_info) }?)
    }

    /// Record with `record`, submit to the graphics queue and wait for it.
    ///
    /// Blocking; only meant for setup, never inside the frame loop.
    pub fn one_shot<F>(&self, record: F) -> RenderResult<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer) -> RenderResult<()>,
    {
        let buffers = self.allocate(1)?;
        let result = self.submit_and_wait(&buffers, record);

        unsafe { self.device.device.free_command_buffers(self.pool, &buffers) };

        result
    }

    fn submit_and_wait<F>(&self, buffers: &[vk::CommandBuffer], record: F) -> RenderResult<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer) -> RenderResult<()>,
    {
        let device = &self.device.device;
        let Some(&cmd) = buffers.first() else {
            return Ok(());
        };

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        unsafe { device.begin_command_buffer(cmd, &begin_info) }?;
        record(device, cmd)?;
        unsafe { device.end_command_buffer(cmd) }?;

        let submit_info = vk::SubmitInfo::default().command_buffers(buffers);

        unsafe {
            device.queue_submit(self.device.graphics_queue, &[submit_info], vk::Fence::null())?;
            device.queue_wait_idle(self.device.graphics_queue)?;
        }

        Ok(())
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_command_pool(self.pool, None);
        }
    }
}
