// Render pass - one subpass drawing color + depth
//
// With multisampling the color attachment is a transient MSAA image that is
// resolved into the swapchain image at the end of the subpass. Attachment
// order: [color, depth] or [msaa color, depth, resolve].

use std::sync::Arc;

use ash::vk;

use super::VulkanDevice;
use crate::error::RenderResult;

pub const COLOR_ATTACHMENT: u32 = 0;
pub const DEPTH_ATTACHMENT: u32 = 1;
pub const RESOLVE_ATTACHMENT: u32 = 2;

pub fn attachment_descriptions(
    color_format: vk::Format,
    depth_format: vk::Format,
    samples: vk::SampleCountFlags,
) -> Vec<vk::AttachmentDescription> {
    let multisampled = samples != vk::SampleCountFlags::TYPE_1;

    let color = vk::AttachmentDescription::default()
        .format(color_format)
        .samples(samples)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(if multisampled {
            vk::AttachmentStoreOp::DONT_CARE
        } else {
            vk::AttachmentStoreOp::STORE
        })
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(if multisampled {
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
        } else {
            vk::ImageLayout::PRESENT_SRC_KHR
        });

    // Depth is not needed after the pass
    let depth = vk::AttachmentDescription::default()
        .format(depth_format)
        .samples(samples)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::DONT_CARE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

    let mut attachments = vec![color, depth];

    if multisampled {
        attachments.push(
            vk::AttachmentDescription::default()
                .format(color_format)
                .samples(vk::SampleCountFlags::TYPE_1)
                .load_op(vk::AttachmentLoadOp::DONT_CARE)
                .store_op(vk::AttachmentStoreOp::STORE)
                .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(vk::ImageLayout::PRESENT_SRC_KHR),
        );
    }

    attachments
}

pub struct RenderPass {
    pub render_pass: vk::RenderPass,
    pub color_format: vk::Format,
    pub depth_format: vk::Format,
    pub samples: vk::SampleCountFlags,
    device: Arc<VulkanDevice>,
}

impl RenderPass {
    pub fn new(
        device: Arc<VulkanDevice>,
        color_format: vk::Format,
        depth_format: vk::Format,
        samples: vk::SampleCountFlags,
    ) -> RenderResult<Self> {
        let attachments = attachment_descriptions(color_format, depth_format, samples);

        let color_refs = [vk::AttachmentReference {
            attachment: COLOR_ATTACHMENT,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }];
        let depth_ref = vk::AttachmentReference {
            attachment: DEPTH_ATTACHMENT,
            layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        };
        let resolve_refs = [vk::AttachmentReference {
            attachment: RESOLVE_ATTACHMENT,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }];

        let mut subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .depth_stencil_attachment(&depth_ref);
        if attachments.len() > RESOLVE_ATTACHMENT as usize {
            subpass = subpass.resolve_attachments(&resolve_refs);
        }

        let dependency = vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                    | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            )
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                    | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            )
            .dst_access_mask(
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                    | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            );

        let subpasses = [subpass];
        let dependencies = [dependency];
        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        let render_pass = unsafe { device.device.create_render_pass(&create_info, None) }?;

        log::debug!(
            "Created render pass: color {:?}, depth {:?}, samples {:?}",
            color_format,
            depth_format,
            samples
        );

        Ok(Self {
            render_pass,
            color_format,
            depth_format,
            samples,
            device,
        })
    }

    pub fn is_multisampled(&self) -> bool {
        self.samples != vk::SampleCountFlags::TYPE_1
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_render_pass(self.render_pass, None);
        }
    }
}
