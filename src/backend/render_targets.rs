// Render targets - everything sized to the swapchain
//
// Depth buffer, optional MSAA color buffer and one framebuffer per swapchain
// image. Rebuilt from scratch whenever the swapchain is.

use std::sync::Arc;

use ash::vk;

use super::commands::CommandPool;
use super::image::{transition_image_layout, GpuImage, ImageDesc};
use super::render_pass::RenderPass;
use super::swapchain::Swapchain;
use super::VulkanDevice;
use crate::error::RenderResult;

/// Framebuffer attachment list matching the render pass attachment order
pub fn framebuffer_attachments(
    msaa_color: Option<vk::ImageView>,
    depth: vk::ImageView,
    swapchain_view: vk::ImageView,
) -> Vec<vk::ImageView> {
    match msaa_color {
        Some(color) => vec![color, depth, swapchain_view],
        None => vec![swapchain_view, depth],
    }
}

pub struct RenderTargets {
    pub framebuffers: Vec<vk::Framebuffer>,
    pub extent: vk::Extent2D,
    // Held for the framebuffers; dropped after them (see Drop)
    depth: GpuImage,
    color: Option<GpuImage>,
    device: Arc<VulkanDevice>,
}

impl RenderTargets {
    pub fn new(
        device: Arc<VulkanDevice>,
        uploader: &CommandPool,
        render_pass: &RenderPass,
        swapchain: &Swapchain,
    ) -> RenderResult<Self> {
        let extent = swapchain.extent;

        let depth = GpuImage::new(
            device.clone(),
            &ImageDesc {
                name: "depth",
                extent,
                mip_levels: 1,
                samples: render_pass.samples,
                format: render_pass.depth_format,
                usage: vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
                aspect: vk::ImageAspectFlags::DEPTH,
            },
        )?;

        uploader.one_shot(|device, cmd| {
            transition_image_layout(
                device,
                cmd,
                depth.image,
                depth.format,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                1,
            )
        })?;

        let color = if render_pass.is_multisampled() {
            Some(GpuImage::new(
                device.clone(),
                &ImageDesc {
                    name: "msaa color",
                    extent,
                    mip_levels: 1,
                    samples: render_pass.samples,
                    format: render_pass.color_format,
                    usage: vk::ImageUsageFlags::TRANSIENT_ATTACHMENT
                        | vk::ImageUsageFlags::COLOR_ATTACHMENT,
                    aspect: vk::ImageAspectFlags::COLOR,
                },
            )?)
        } else {
            None
        };

        let mut targets = Self {
            framebuffers: Vec::with_capacity(swapchain.image_views.len()),
            extent,
            depth,
            color,
            device,
        };

        for &view in &swapchain.image_views {
            let attachments = framebuffer_attachments(
                targets.color.as_ref().map(|c| c.view),
                targets.depth.view,
                view,
            );
            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(render_pass.render_pass)
                .attachments(&attachments)
                .width(extent.width)
                .height(extent.height)
                .layers(1);

            let framebuffer =
                unsafe { targets.device.device.create_framebuffer(&create_info, None) }?;
            targets.framebuffers.push(framebuffer);
        }

        log::debug!(
            "Created {} framebuffers ({}x{})",
            targets.framebuffers.len(),
            extent.width,
            extent.height
        );

        Ok(targets)
    }
}

impl Drop for RenderTargets {
    fn drop(&mut self) {
        unsafe {
            for &framebuffer in &self.framebuffers {
                self.device.device.destroy_framebuffer(framebuffer, None);
            }
        }
        // Images are dropped after this, as fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn test_framebuffer_attachment_order() {
        let color = vk::ImageView::from_raw(1);
        let depth = vk::ImageView::from_raw(2);
        let swap = vk::ImageView::from_raw(3);

        assert_eq!(framebuffer_attachments(None, depth, swap), vec![swap, depth]);
        assert_eq!(
            framebuffer_attachments(Some(color), depth, swap),
            vec![color, depth, swap]
        );
    }
}
