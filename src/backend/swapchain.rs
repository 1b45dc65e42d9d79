// Swapchain - Window presentation
//
// Manages the chain of images we render to and present to the screen.
// Out-of-date / suboptimal results are reported as outcomes, not errors,
// so the frame loop can rebuild instead of bailing.

use std::sync::Arc;

use ash::{khr, vk};

use super::image::create_image_view;
use super::VulkanDevice;
use crate::error::{RenderError, RenderResult};

/// Result of acquiring the next swapchain image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    Ready { index: u32, suboptimal: bool },
    OutOfDate,
}

/// Result of presenting an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    /// Suboptimal or out of date: the swapchain must be rebuilt
    Stale,
}

/// Prefer 8-bit BGRA sRGB, else whatever the surface lists first.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first())
        .copied()
}

/// Use `preferred` when the surface offers it, else FIFO.
pub fn choose_present_mode(
    available: &[vk::PresentModeKHR],
    preferred: vk::PresentModeKHR,
) -> vk::PresentModeKHR {
    // MAILBOX: No vsync, no tearing, triple buffered
    // FIFO: Vsync enabled, guaranteed available
    if available.contains(&preferred) {
        preferred
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Surface extent, or the framebuffer size clamped to the surface limits when
/// the surface leaves it up to us (`u32::MAX` width).
pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    framebuffer_size: (u32, u32),
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    let (width, height) = framebuffer_size;
    vk::Extent2D {
        width: width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// One more than the minimum; `max_image_count == 0` means unbounded.
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

pub struct Swapchain {
    pub swapchain: vk::SwapchainKHR,
    pub swapchain_loader: khr::swapchain::Device,
    pub images: Vec<vk::Image>,
    pub image_views: Vec<vk::ImageView>,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
    pub present_mode: vk::PresentModeKHR,
    preferred_present_mode: vk::PresentModeKHR,
    device: Arc<VulkanDevice>,
}

impl Swapchain {
    pub fn new(
        device: Arc<VulkanDevice>,
        framebuffer_size: (u32, u32),
        preferred_present_mode: vk::PresentModeKHR,
    ) -> RenderResult<Self> {
        let loader = khr::swapchain::Device::new(&device.instance, &device.device);
        Self::create(
            device,
            loader,
            framebuffer_size,
            preferred_present_mode,
            vk::SwapchainKHR::null(),
        )
    }

    fn create(
        device: Arc<VulkanDevice>,
        swapchain_loader: khr::swapchain::Device,
        framebuffer_size: (u32, u32),
        preferred_present_mode: vk::PresentModeKHR,
        old_swapchain: vk::SwapchainKHR,
    ) -> RenderResult<Self> {
        log::info!(
            "Creating swapchain: {}x{}",
            framebuffer_size.0,
            framebuffer_size.1
        );

        let support = device.surface_support()?;

        let surface_format = choose_surface_format(&support.formats).ok_or_else(|| {
            RenderError::NoSupportedFormat("surface reports no formats".into())
        })?;
        let present_mode = choose_present_mode(&support.present_modes, preferred_present_mode);
        let extent = choose_extent(&support.capabilities, framebuffer_size);
        let image_count = choose_image_count(&support.capabilities);

        log::info!(
            "Surface format: {:?}/{:?}, present mode: {:?}",
            surface_format.format,
            surface_format.color_space,
            present_mode
        );

        let families = device.queue_families;
        let family_indices = families.unique();

        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(device.surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        create_info = if families.is_shared() {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        } else {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&family_indices)
        };

        let swapchain = unsafe { swapchain_loader.create_swapchain(&create_info, None) }?;

        let images = match unsafe { swapchain_loader.get_swapchain_images(swapchain) } {
            Ok(images) => images,
            Err(e) => {
                unsafe { swapchain_loader.destroy_swapchain(swapchain, None) };
                return Err(e.into());
            }
        };

        log::info!("Created swapchain with {} images", images.len());

        let mut result = Self {
            swapchain,
            swapchain_loader,
            images,
            image_views: Vec::new(),
            format: surface_format.format,
            extent,
            present_mode,
            preferred_present_mode,
            device,
        };

        for &image in &result.images {
            let view = create_image_view(
                &result.device.device,
                image,
                surface_format.format,
                vk::ImageAspectFlags::COLOR,
                1,
            )?;
            result.image_views.push(view);
        }

        Ok(result)
    }

    /// Replace this swapchain with a new one sized to `framebuffer_size`.
    ///
    /// The caller must have waited for the device to go idle and dropped
    /// every framebuffer referencing the old image views.
    pub fn recreate(&mut self, framebuffer_size: (u32, u32)) -> RenderResult<()> {
        let new = Self::create(
            self.device.clone(),
            self.swapchain_loader.clone(),
            framebuffer_size,
            self.preferred_present_mode,
            self.swapchain,
        )?;

        // Old swapchain and its views are destroyed here
        *self = new;
        Ok(())
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Acquire next image for rendering, waiting without timeout
    pub fn acquire_next_image(&self, semaphore: vk::Semaphore) -> RenderResult<AcquireOutcome> {
        let result = unsafe {
            self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                semaphore,
                vk::Fence::null(),
            )
        };

        match result {
            Ok((index, suboptimal)) => Ok(AcquireOutcome::Ready { index, suboptimal }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(e.into()),
        }
    }

    /// Present rendered image to screen
    pub fn present(
        &self,
        queue: vk::Queue,
        image_index: u32,
        wait_semaphores: &[vk::Semaphore],
    ) -> RenderResult<PresentOutcome> {
        let swapchains = [self.swapchain];
        let image_indices = [image_index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe { self.swapchain_loader.queue_present(queue, &present_info) };

        match result {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::Stale),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            for &view in &self.image_views {
                self.device.device.destroy_image_view(view, None);
            }
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    fn capabilities(current: (u32, u32), min: (u32, u32), max: (u32, u32)) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D { width: current.0, height: current.1 },
            min_image_extent: vk::Extent2D { width: min.0, height: min.1 },
            max_image_extent: vk::Extent2D { width: max.0, height: max.1 },
            ..Default::default()
        }
    }

    #[test]
    fn test_choose_surface_format_prefers_srgb() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let chosen = choose_surface_format(&formats).unwrap();
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
    }

    #[test]
    fn test_choose_surface_format_fallback_first() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT),
        ];
        let chosen = choose_surface_format(&formats).unwrap();
        assert_eq!(chosen.format, vk::Format::R8G8B8A8_UNORM);
        assert!(choose_surface_format(&[]).is_none());
    }

    #[test]
    fn test_choose_present_mode() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(
            choose_present_mode(&modes, vk::PresentModeKHR::MAILBOX),
            vk::PresentModeKHR::MAILBOX
        );

        let modes = [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO];
        assert_eq!(
            choose_present_mode(&modes, vk::PresentModeKHR::MAILBOX),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn test_choose_extent_uses_current() {
        let caps = capabilities((800, 600), (1, 1), (4096, 4096));
        assert_eq!(
            choose_extent(&caps, (1920, 1080)),
            vk::Extent2D { width: 800, height: 600 }
        );
    }

    #[test]
    fn test_choose_extent_clamps_framebuffer() {
        let caps = capabilities((u32::MAX, u32::MAX), (100, 100), (1024, 768));
        assert_eq!(
            choose_extent(&caps, (1920, 50)),
            vk::Extent2D { width: 1024, height: 100 }
        );
        assert_eq!(
            choose_extent(&caps, (640, 480)),
            vk::Extent2D { width: 640, height: 480 }
        );
    }

    #[test]
    fn test_choose_image_count() {
        let mut caps = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(choose_image_count(&caps), 3);

        caps.max_image_count = 2;
        assert_eq!(choose_image_count(&caps), 2);

        caps.max_image_count = 8;
        assert_eq!(choose_image_count(&caps), 3);
    }
}
