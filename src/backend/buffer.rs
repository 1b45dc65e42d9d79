// Buffer utilities for vertex, index, and uniform buffers
//
// Memory comes from gpu-allocator. Host-visible buffers (staging, uniforms)
// stay persistently mapped for their whole lifetime; device-local buffers
// are filled once through a staging copy.

use std::sync::Arc;

use ash::vk;
use bytemuck::Pod;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;

use super::commands::CommandPool;
use super::VulkanDevice;
use crate::error::{RenderError, RenderResult};

/// Buffer + allocation, freed on drop
pub struct GpuBuffer {
    pub buffer: vk::Buffer,
    pub size: vk::DeviceSize,
    allocation: Option<Allocation>,
    device: Arc<VulkanDevice>,
}

impl GpuBuffer {
    pub fn new(
        device: Arc<VulkanDevice>,
        name: &str,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        location: MemoryLocation,
    ) -> RenderResult<Self> {
        // Zero-sized buffers are invalid in Vulkan
        let size = size.max(1);

        let buffer_info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.device.create_buffer(&buffer_info, None) }?;
        let requirements = unsafe { device.device.get_buffer_memory_requirements(buffer) };

        let allocation = match device.allocate(&AllocationCreateDesc {
            name,
            requirements,
            location,
            linear: true,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        }) {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe { device.device.destroy_buffer(buffer, None) };
                return Err(e);
            }
        };

        let result = Self {
            buffer,
            size,
            allocation: Some(allocation),
            device,
        };

        if let Some(allocation) = &result.allocation {
            unsafe {
                result.device.device.bind_buffer_memory(
                    buffer,
                    allocation.memory(),
                    allocation.offset(),
                )
            }?;
        }

        Ok(result)
    }

    /// Copy `data` to the start of a host-visible buffer
    pub fn write<T: Pod>(&mut self, data: &[T]) -> RenderResult<()> {
        let mapped = self
            .allocation
            .as_mut()
            .and_then(|allocation| allocation.mapped_slice_mut());

        copy_to_mapped(mapped, bytemuck::cast_slice(data))
    }

    /// Device-local buffer filled from `data` via a staging copy.
    ///
    /// Blocks until the copy finished; the staging buffer is gone on return.
    pub fn device_local_with_data<T: Pod>(
        device: Arc<VulkanDevice>,
        uploader: &CommandPool,
        name: &str,
        usage: vk::BufferUsageFlags,
        data: &[T],
    ) -> RenderResult<Self> {
        let size = std::mem::size_of_val(data) as vk::DeviceSize;

        let mut staging = Self::new(
            device.clone(),
            "staging",
            size,
            vk::BufferUsageFlags::TRANSFER_SRC,
            MemoryLocation::CpuToGpu,
        )?;
        staging.write(data)?;

        let target = Self::new(
            device,
            name,
            size,
            usage | vk::BufferUsageFlags::TRANSFER_DST,
            MemoryLocation::GpuOnly,
        )?;

        let region = vk::BufferCopy::default().size(staging.size.min(target.size));
        uploader.one_shot(|device, cmd| {
            unsafe { device.cmd_copy_buffer(cmd, staging.buffer, target.buffer, &[region]) };
            Ok(())
        })?;

        log::debug!("Uploaded {} bytes to '{}'", size, name);

        Ok(target)
    }
}

/// Copy `bytes` to the start of a mapped range
fn copy_to_mapped(mapped: Option<&mut [u8]>, bytes: &[u8]) -> RenderResult<()> {
    let mapped = mapped.ok_or(RenderError::BufferNotMapped)?;

    if bytes.len() > mapped.len() {
        return Err(RenderError::BufferOverflow {
            len: bytes.len(),
            capacity: mapped.len(),
        });
    }

    mapped[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

impl Drop for GpuBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_buffer(self.buffer, None);
        }
        if let Some(allocation) = self.allocation.take() {
            self.device.free(allocation);
        }
    }
}
