// GPU images - depth/color attachments and sampled textures
//
// Image + view + allocation bundled into one RAII wrapper, plus the
// command-recording helpers used during setup (layout transitions,
// buffer-to-image copies, mipmap blits).

use std::sync::Arc;

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;

use super::VulkanDevice;
use crate::error::{RenderError, RenderResult};

/// Depth formats probed in order of preference
pub const DEPTH_FORMAT_CANDIDATES: [vk::Format; 3] = [
    vk::Format::D32_SFLOAT,
    vk::Format::D32_SFLOAT_S8_UINT,
    vk::Format::D24_UNORM_S8_UINT,
];

/// Creation parameters for [`GpuImage`]
#[derive(Debug, Clone, Copy)]
pub struct ImageDesc<'a> {
    pub name: &'a str,
    pub extent: vk::Extent2D,
    pub mip_levels: u32,
    pub samples: vk::SampleCountFlags,
    pub format: vk::Format,
    pub usage: vk::ImageUsageFlags,
    pub aspect: vk::ImageAspectFlags,
}

/// Device-local 2D image with its view
pub struct GpuImage {
    pub image: vk::Image,
    pub view: vk::ImageView,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
    pub mip_levels: u32,
    allocation: Option<Allocation>,
    device: Arc<VulkanDevice>,
}

impl GpuImage {
    pub fn new(device: Arc<VulkanDevice>, desc: &ImageDesc) -> RenderResult<Self> {
        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width: desc.extent.width,
                height: desc.extent.height,
                depth: 1,
            })
            .mip_levels(desc.mip_levels)
            .array_layers(1)
            .format(desc.format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(desc.usage)
            .samples(desc.samples)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let image = unsafe { device.device.create_image(&image_info, None) }?;
        let requirements = unsafe { device.device.get_image_memory_requirements(image) };

        let allocation = match device.allocate(&AllocationCreateDesc {
            name: desc.name,
            requirements,
            location: MemoryLocation::GpuOnly,
            linear: false,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        }) {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe { device.device.destroy_image(image, None) };
                return Err(e);
            }
        };

        // Wrap before binding so every later failure cleans up through Drop
        let mut gpu_image = Self {
            image,
            view: vk::ImageView::null(),
            format: desc.format,
            extent: desc.extent,
            mip_levels: desc.mip_levels,
            allocation: Some(allocation),
            device,
        };

        if let Some(allocation) = &gpu_image.allocation {
            unsafe {
                gpu_image.device.device.bind_image_memory(
                    image,
                    allocation.memory(),
                    allocation.offset(),
                )
            }?;
        }

        gpu_image.view = create_image_view(
            &gpu_image.device.device,
            image,
            desc.format,
            desc.aspect,
            desc.mip_levels,
        )?;

        log::debug!(
            "Created image '{}' {}x{} {:?} ({} mips, {:?})",
            desc.name,
            desc.extent.width,
            desc.extent.height,
            desc.format,
            desc.mip_levels,
            desc.samples
        );

        Ok(gpu_image)
    }
}

impl Drop for GpuImage {
    fn drop(&mut self) {
        unsafe {
            if self.view != vk::ImageView::null() {
                self.device.device.destroy_image_view(self.view, None);
            }
            self.device.device.destroy_image(self.image, None);
        }
        if let Some(allocation) = self.allocation.take() {
            self.device.free(allocation);
        }
    }
}

/// 2D view covering `mip_levels` levels of a single-layer image
pub fn create_image_view(
    device: &ash::Device,
    image: vk::Image,
    format: vk::Format,
    aspect: vk::ImageAspectFlags,
    mip_levels: u32,
) -> RenderResult<vk::ImageView> {
    let create_info = vk::ImageViewCreateInfo::default()
        .image(image)
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(format)
        .components(vk::ComponentMapping::default())
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: aspect,
            base_mip_level: 0,
            level_count: mip_levels,
            base_array_layer: 0,
            layer_count: 1,
        });

    Ok(unsafe { device.create_image_view(&create_info, None) }?)
}

/// First candidate whose tiling features include `features`.
pub fn find_supported_format(
    candidates: &[vk::Format],
    tiling: vk::ImageTiling,
    features: vk::FormatFeatureFlags,
    mut properties: impl FnMut(vk::Format) -> vk::FormatProperties,
) -> RenderResult<vk::Format> {
    candidates
        .iter()
        .copied()
        .find(|&format| {
            let props = properties(format);
            match tiling {
                vk::ImageTiling::LINEAR => props.linear_tiling_features.contains(features),
                vk::ImageTiling::OPTIMAL => props.optimal_tiling_features.contains(features),
                _ => false,
            }
        })
        .ok_or_else(|| RenderError::NoSupportedFormat(format!("{:?}", candidates)))
}

pub fn find_depth_format(device: &VulkanDevice) -> RenderResult<vk::Format> {
    find_supported_format(
        &DEPTH_FORMAT_CANDIDATES,
        vk::ImageTiling::OPTIMAL,
        vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
        |format| device.format_properties(format),
    )
}

pub fn has_stencil_component(format: vk::Format) -> bool {
    matches!(
        format,
        vk::Format::D32_SFLOAT_S8_UINT | vk::Format::D24_UNORM_S8_UINT
    )
}

/// Full mip chain length: floor(log2(max(w, h))) + 1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Access masks and pipeline stages for a layout transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionMasks {
    pub src_access: vk::AccessFlags,
    pub dst_access: vk::AccessFlags,
    pub src_stage: vk::PipelineStageFlags,
    pub dst_stage: vk::PipelineStageFlags,
}

pub fn transition_masks(
    old: vk::ImageLayout,
    new: vk::ImageLayout,
) -> RenderResult<TransitionMasks> {
    use vk::ImageLayout as L;

    let masks = match (old, new) {
        (L::UNDEFINED, L::TRANSFER_DST_OPTIMAL) => TransitionMasks {
            src_access: vk::AccessFlags::empty(),
            dst_access: vk::AccessFlags::TRANSFER_WRITE,
            src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
            dst_stage: vk::PipelineStageFlags::TRANSFER,
        },
        (L::TRANSFER_DST_OPTIMAL, L::SHADER_READ_ONLY_OPTIMAL) => TransitionMasks {
            src_access: vk::AccessFlags::TRANSFER_WRITE,
            dst_access: vk::AccessFlags::SHADER_READ,
            src_stage: vk::PipelineStageFlags::TRANSFER,
            dst_stage: vk::PipelineStageFlags::FRAGMENT_SHADER,
        },
        (L::UNDEFINED, L::DEPTH_STENCIL_ATTACHMENT_OPTIMAL) => TransitionMasks {
            src_access: vk::AccessFlags::empty(),
            dst_access: vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
            dst_stage: vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
        },
        (from, to) => return Err(RenderError::UnsupportedTransition { from, to }),
    };

    Ok(masks)
}

fn aspect_for_layout(new: vk::ImageLayout, format: vk::Format) -> vk::ImageAspectFlags {
    if new == vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL {
        if has_stencil_component(format) {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        } else {
            vk::ImageAspectFlags::DEPTH
        }
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

/// Record a pipeline barrier moving every mip level of `image` from `old` to `new`.
pub fn transition_image_layout(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    image: vk::Image,
    format: vk::Format,
    old: vk::ImageLayout,
    new: vk::ImageLayout,
    mip_levels: u32,
) -> RenderResult<()> {
    let masks = transition_masks(old, new)?;

    let barrier = vk::ImageMemoryBarrier::default()
        .old_layout(old)
        .new_layout(new)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: aspect_for_layout(new, format),
            base_mip_level: 0,
            level_count: mip_levels,
            base_array_layer: 0,
            layer_count: 1,
        })
        .src_access_mask(masks.src_access)
        .dst_access_mask(masks.dst_access);

    unsafe {
        device.cmd_pipeline_barrier(
            cmd,
            masks.src_stage,
            masks.dst_stage,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[barrier],
        );
    }

    Ok(())
}

/// Record a copy of tightly packed pixels from `buffer` into mip 0 of `image`.
/// The image must be in TRANSFER_DST_OPTIMAL.
pub fn copy_buffer_to_image(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    buffer: vk::Buffer,
    image: vk::Image,
    extent: vk::Extent2D,
) {
    let region = vk::BufferImageCopy::default()
        .buffer_offset(0)
        .buffer_row_length(0)
        .buffer_image_height(0)
        .image_subresource(vk::ImageSubresourceLayers {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            mip_level: 0,
            base_array_layer: 0,
            layer_count: 1,
        })
        .image_offset(vk::Offset3D::default())
        .image_extent(vk::Extent3D {
            width: extent.width,
            height: extent.height,
            depth: 1,
        });

    unsafe {
        device.cmd_copy_buffer_to_image(
            cmd,
            buffer,
            image,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            &[region],
        );
    }
}

/// Size of the next mip level down
pub fn next_mip_extent(extent: vk::Extent2D) -> vk::Extent2D {
    vk::Extent2D {
        width: (extent.width / 2).max(1),
        height: (extent.height / 2).max(1),
    }
}

/// Fails with [`RenderError::LinearBlitUnsupported`] when `format` cannot be
/// the source of a linearly filtered blit.
pub fn ensure_linear_blit(device: &VulkanDevice, format: vk::Format) -> RenderResult<()> {
    let props = device.format_properties(format);
    if props
        .optimal_tiling_features
        .contains(vk::FormatFeatureFlags::SAMPLED_IMAGE_FILTER_LINEAR)
    {
        Ok(())
    } else {
        Err(RenderError::LinearBlitUnsupported(format))
    }
}

/// Record the blit chain that fills mips 1.. from mip 0.
///
/// Expects every level in TRANSFER_DST_OPTIMAL and leaves every level in
/// SHADER_READ_ONLY_OPTIMAL.
pub fn generate_mipmaps(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    image: vk::Image,
    extent: vk::Extent2D,
    mip_levels: u32,
) {
    let mut barrier = vk::ImageMemoryBarrier::default()
        .image(image)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        });

    let mut src_extent = extent;

    for level in 1..mip_levels {
        let dst_extent = next_mip_extent(src_extent);

        // Previous level: TRANSFER_DST -> TRANSFER_SRC
        barrier.subresource_range.base_mip_level = level - 1;
        barrier.old_layout = vk::ImageLayout::TRANSFER_DST_OPTIMAL;
        barrier.new_layout = vk::ImageLayout::TRANSFER_SRC_OPTIMAL;
        barrier.src_access_mask = vk::AccessFlags::TRANSFER_WRITE;
        barrier.dst_access_mask = vk::AccessFlags::TRANSFER_READ;

        unsafe {
            device.cmd_pipeline_barrier(
                cmd,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::TRANSFER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }

        let blit = vk::ImageBlit::default()
            .src_offsets([
                vk::Offset3D::default(),
                vk::Offset3D {
                    x: src_extent.width as i32,
                    y: src_extent.height as i32,
                    z: 1,
                },
            ])
            .src_subresource(vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: level - 1,
                base_array_layer: 0,
                layer_count: 1,
            })
            .dst_offsets([
                vk::Offset3D::default(),
                vk::Offset3D {
                    x: dst_extent.width as i32,
                    y: dst_extent.height as i32,
                    z: 1,
                },
            ])
            .dst_subresource(vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: level,
                base_array_layer: 0,
                layer_count: 1,
            });

        unsafe {
            device.cmd_blit_image(
                cmd,
                image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[blit],
                vk::Filter::LINEAR,
            );
        }

        // Previous level is final: TRANSFER_SRC -> SHADER_READ_ONLY
        barrier.old_layout = vk::ImageLayout::TRANSFER_SRC_OPTIMAL;
        barrier.new_layout = vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL;
        barrier.src_access_mask = vk::AccessFlags::TRANSFER_READ;
        barrier.dst_access_mask = vk::AccessFlags::SHADER_READ;

        unsafe {
            device.cmd_pipeline_barrier(
                cmd,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }

        src_extent = dst_extent;
    }

    // Last level was only ever written to
    barrier.subresource_range.base_mip_level = mip_levels.saturating_sub(1);
    barrier.old_layout = vk::ImageLayout::TRANSFER_DST_OPTIMAL;
    barrier.new_layout = vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL;
    barrier.src_access_mask = vk::AccessFlags::TRANSFER_WRITE;
    barrier.dst_access_mask = vk::AccessFlags::SHADER_READ;

    unsafe {
        device.cmd_pipeline_barrier(
            cmd,
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::FRAGMENT_SHADER,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[barrier],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(optimal: vk::FormatFeatureFlags) -> vk::FormatProperties {
        vk::FormatProperties {
            optimal_tiling_features: optimal,
            ..Default::default()
        }
    }

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 1), 2);
        assert_eq!(mip_level_count(1024, 1024), 11);
        assert_eq!(mip_level_count(1024, 768), 11);
        assert_eq!(mip_level_count(1023, 7), 10);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn test_next_mip_extent_never_zero() {
        let extent = next_mip_extent(vk::Extent2D { width: 5, height: 1 });
        assert_eq!(extent, vk::Extent2D { width: 2, height: 1 });
    }

    #[test]
    fn test_depth_format_first_supported() {
        let format = find_supported_format(
            &DEPTH_FORMAT_CANDIDATES,
            vk::ImageTiling::OPTIMAL,
            vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
            |format| match format {
                vk::Format::D32_SFLOAT => props(vk::FormatFeatureFlags::empty()),
                _ => props(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT),
            },
        )
        .unwrap();
        assert_eq!(format, vk::Format::D32_SFLOAT_S8_UINT);
    }

    #[test]
    fn test_depth_format_none_supported() {
        let result = find_supported_format(
            &DEPTH_FORMAT_CANDIDATES,
            vk::ImageTiling::OPTIMAL,
            vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
            |_| props(vk::FormatFeatureFlags::SAMPLED_IMAGE),
        );
        assert!(matches!(result, Err(RenderError::NoSupportedFormat(_))));
    }

    #[test]
    fn test_linear_tiling_checks_linear_features() {
        let result = find_supported_format(
            &[vk::Format::D32_SFLOAT],
            vk::ImageTiling::LINEAR,
            vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
            |_| props(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_has_stencil_component() {
        assert!(!has_stencil_component(vk::Format::D32_SFLOAT));
        assert!(has_stencil_component(vk::Format::D32_SFLOAT_S8_UINT));
        assert!(has_stencil_component(vk::Format::D24_UNORM_S8_UINT));
    }

    #[test]
    fn test_transition_masks() {
        let masks = transition_masks(
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        )
        .unwrap();
        assert_eq!(masks.src_stage, vk::PipelineStageFlags::TOP_OF_PIPE);
        assert_eq!(masks.dst_access, vk::AccessFlags::TRANSFER_WRITE);

        let masks = transition_masks(
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        )
        .unwrap();
        assert_eq!(masks.dst_stage, vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS);
    }

    #[test]
    fn test_transition_unsupported() {
        let result = transition_masks(
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        );
        assert!(matches!(result, Err(RenderError::UnsupportedTransition { .. })));
    }

    #[test]
    fn test_depth_aspect_includes_stencil() {
        let layout = vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL;
        assert_eq!(
            aspect_for_layout(layout, vk::Format::D32_SFLOAT),
            vk::ImageAspectFlags::DEPTH
        );
        assert_eq!(
            aspect_for_layout(layout, vk::Format::D24_UNORM_S8_UINT),
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        );
    }
}
