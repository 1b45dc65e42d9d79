// Descriptor set layout, pool and per-frame sets
//
// Binding 0: uniform buffer (vertex stage)
// Binding 1: combined image sampler (fragment stage)

use std::sync::Arc;

use ash::vk;

use super::VulkanDevice;
use crate::error::RenderResult;

pub const UNIFORM_BINDING: u32 = 0;
pub const SAMPLER_BINDING: u32 = 1;

/// Layout bindings shared by every pipeline
pub fn layout_bindings() -> [vk::DescriptorSetLayoutBinding<'static>; 2] {
    [
        vk::DescriptorSetLayoutBinding::default()
            .binding(UNIFORM_BINDING)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::VERTEX),
        vk::DescriptorSetLayoutBinding::default()
            .binding(SAMPLER_BINDING)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::FRAGMENT),
    ]
}

/// Pool sizes for `sets` descriptor sets using [`layout_bindings`]
pub fn pool_sizes(sets: u32) -> [vk::DescriptorPoolSize; 2] {
    [
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::UNIFORM_BUFFER,
            descriptor_count: sets,
        },
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            descriptor_count: sets,
        },
    ]
}

pub struct DescriptorSetLayout {
    pub layout: vk::DescriptorSetLayout,
    device: Arc<VulkanDevice>,
}

impl DescriptorSetLayout {
    pub fn new(device: Arc<VulkanDevice>) -> RenderResult<Self> {
        let bindings = layout_bindings();
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

        let layout = unsafe { device.device.create_descriptor_set_layout(&create_info, None) }?;

        Ok(Self { layout, device })
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.device
                .device
                .destroy_descriptor_set_layout(self.layout, None);
        }
    }
}

/// Pool owning the per-frame sets; sets are freed with the pool
pub struct DescriptorPool {
    pub pool: vk::DescriptorPool,
    device: Arc<VulkanDevice>,
}

impl DescriptorPool {
    pub fn new(device: Arc<VulkanDevice>, max_sets: u32) -> RenderResult<Self> {
        let sizes = pool_sizes(max_sets);
        let create_info = vk::DescriptorPoolCreateInfo::default()
            .pool_sizes(&sizes)
            .max_sets(max_sets);

        let pool = unsafe { device.device.create_descriptor_pool(&create_info, None) }?;

        Ok(Self { pool, device })
    }

    /// One set per entry of `count`, all with the same layout
    pub fn allocate(
        &self,
        layout: &DescriptorSetLayout,
        count: usize,
    ) -> RenderResult<Vec<vk::DescriptorSet>> {
        let layouts = vec![layout.layout; count];
        let alloc_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts);

        Ok(unsafe { self.device.device.allocate_descriptor_sets(&alloc_info) }?)
    }

    /// Point `set` at a uniform buffer and a sampled texture
    pub fn write_set(
        &self,
        set: vk::DescriptorSet,
        uniform: vk::Buffer,
        uniform_range: vk::DeviceSize,
        view: vk::ImageView,
        sampler: vk::Sampler,
    ) {
        let buffer_info = [vk::DescriptorBufferInfo {
            buffer: uniform,
            offset: 0,
            range: uniform_range,
        }];
        let image_info = [vk::DescriptorImageInfo {
            sampler,
            image_view: view,
            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        }];

        let writes = [
            vk::WriteDescriptorSet::default()
                .dst_set(set)
                .dst_binding(UNIFORM_BINDING)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .buffer_info(&buffer_info),
            vk::WriteDescriptorSet::default()
                .dst_set(set)
                .dst_binding(SAMPLER_BINDING)
                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .image_info(&image_info),
        ];

        unsafe { self.device.device.update_descriptor_sets(&writes, &[]) };
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_bindings() {
        let bindings = layout_bindings();
        assert_eq!(bindings[0].binding, 0);
        assert_eq!(bindings[0].descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(bindings[0].stage_flags, vk::ShaderStageFlags::VERTEX);
        assert_eq!(bindings[1].binding, 1);
        assert_eq!(
            bindings[1].descriptor_type,
            vk::DescriptorType::COMBINED_IMAGE_SAMPLER
        );
        assert_eq!(bindings[1].stage_flags, vk::ShaderStageFlags::FRAGMENT);
    }

    #[test]
    fn test_pool_sizes_cover_every_set() {
        for size in pool_sizes(3) {
            assert_eq!(size.descriptor_count, 3);
        }
    }
}
