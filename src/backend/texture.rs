// Sampled texture: RGBA8 sRGB image with a full mip chain + sampler

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use gpu_allocator::MemoryLocation;

use super::buffer::GpuBuffer;
use super::commands::CommandPool;
use super::image::{
    copy_buffer_to_image, ensure_linear_blit, generate_mipmaps, mip_level_count,
    transition_image_layout, GpuImage, ImageDesc,
};
use super::VulkanDevice;
use crate::error::{LoadError, RenderResult};

pub const TEXTURE_FORMAT: vk::Format = vk::Format::R8G8B8A8_SRGB;

/// Decoded RGBA8 pixels
#[derive(Debug, Clone)]
pub struct TextureData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let image = image::open(path).map_err(|source| LoadError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        log::info!("Loaded texture {:?} ({}x{})", path, width, height);

        Ok(Self {
            pixels: rgba.into_raw(),
            width,
            height,
        })
    }

    /// 1x1 opaque white, used when no texture is configured
    pub fn white() -> Self {
        Self {
            pixels: vec![255; 4],
            width: 1,
            height: 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SamplerSettings {
    pub anisotropy: bool,
    /// Minimum LOD as a fraction of the mip count
    pub min_lod_fraction: f32,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            anisotropy: true,
            min_lod_fraction: 0.25,
        }
    }
}

/// (min_lod, max_lod) for a chain of `mip_levels` levels
pub fn lod_range(mip_levels: u32, min_lod_fraction: f32) -> (f32, f32) {
    let max_lod = mip_levels as f32;
    let min_lod = (max_lod * min_lod_fraction.clamp(0.0, 1.0)).min(max_lod);
    (min_lod, max_lod)
}

pub struct Texture {
    pub image: GpuImage,
    pub sampler: vk::Sampler,
    device: Arc<VulkanDevice>,
}

impl Texture {
    pub fn new(
        device: Arc<VulkanDevice>,
        uploader: &CommandPool,
        data: &TextureData,
        settings: &SamplerSettings,
    ) -> RenderResult<Self> {
        // Check before any GPU work so an unsupported format fails cleanly
        ensure_linear_blit(&device, TEXTURE_FORMAT)?;

        let extent = vk::Extent2D {
            width: data.width,
            height: data.height,
        };
        let mip_levels = mip_level_count(data.width, data.height);

        let mut staging = GpuBuffer::new(
            device.clone(),
            "texture staging",
            data.pixels.len() as vk::DeviceSize,
            vk::BufferUsageFlags::TRANSFER_SRC,
            MemoryLocation::CpuToGpu,
        )?;
        staging.write(&data.pixels)?;

        let image = GpuImage::new(
            device.clone(),
            &ImageDesc {
                name: "texture",
                extent,
                mip_levels,
                samples: vk::SampleCountFlags::TYPE_1,
                format: TEXTURE_FORMAT,
                usage: vk::ImageUsageFlags::TRANSFER_SRC
                    | vk::ImageUsageFlags::TRANSFER_DST
                    | vk::ImageUsageFlags::SAMPLED,
                aspect: vk::ImageAspectFlags::COLOR,
            },
        )?;

        uploader.one_shot(|device, cmd| {
            transition_image_layout(
                device,
                cmd,
                image.image,
                TEXTURE_FORMAT,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                mip_levels,
            )?;
            copy_buffer_to_image(device, cmd, staging.buffer, image.image, extent);
            // Leaves every level in SHADER_READ_ONLY_OPTIMAL
            generate_mipmaps(device, cmd, image.image, extent, mip_levels);
            Ok(())
        })?;

        let sampler = create_sampler(&device, mip_levels, settings)?;

        log::debug!("Texture ready: {} mip levels", mip_levels);

        Ok(Self {
            image,
            sampler,
            device,
        })
    }

    pub fn view(&self) -> vk::ImageView {
        self.image.view
    }
}

fn create_sampler(
    device: &VulkanDevice,
    mip_levels: u32,
    settings: &SamplerSettings,
) -> RenderResult<vk::Sampler> {
    let (min_lod, max_lod) = lod_range(mip_levels, settings.min_lod_fraction);

    let create_info = vk::SamplerCreateInfo::default()
        .mag_filter(vk::Filter::LINEAR)
        .min_filter(vk::Filter::LINEAR)
        .address_mode_u(vk::SamplerAddressMode::REPEAT)
        .address_mode_v(vk::SamplerAddressMode::REPEAT)
        .address_mode_w(vk::SamplerAddressMode::REPEAT)
        .anisotropy_enable(settings.anisotropy)
        .max_anisotropy(if settings.anisotropy {
            device.max_sampler_anisotropy()
        } else {
            1.0
        })
        .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
        .unnormalized_coordinates(false)
        .compare_enable(false)
        .compare_op(vk::CompareOp::ALWAYS)
        .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
        .mip_lod_bias(0.0)
        .min_lod(min_lod)
        .max_lod(max_lod);

    Ok(unsafe { device.device.create_sampler(&create_info, None) }?)
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_sampler(self.sampler, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lod_range() {
        let (min, max) = lod_range(11, 0.25);
        assert_relative_eq!(min, 2.75);
        assert_relative_eq!(max, 11.0);

        let (min, max) = lod_range(1, 0.0);
        assert_relative_eq!(min, 0.0);
        assert_relative_eq!(max, 1.0);
    }

    #[test]
    fn test_lod_fraction_clamped() {
        let (min, max) = lod_range(4, 3.0);
        assert_relative_eq!(min, max);
    }

    #[test]
    fn test_load_missing_image() {
        let result = TextureData::load(Path::new("no/such/texture.png"));
        assert!(matches!(result, Err(LoadError::Image { .. })));
    }

    #[test]
    fn test_load_png_as_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tex.png");
        image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let data = TextureData::load(&path).unwrap();
        assert_eq!((data.width, data.height), (4, 2));
        assert_eq!(data.pixels.len(), 4 * 2 * 4);
        assert_eq!(&data.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_white_fallback() {
        let data = TextureData::white();
        assert_eq!(data.pixels, vec![255, 255, 255, 255]);
    }
}
