// Render context - the Vulkan side of the frame loop
//
// Owns every GPU resource the renderer uses and implements `FrameBackend`
// on top of them. Setup order follows the dependency chain:
// swapchain -> render pass -> targets -> descriptors -> pipelines -> scene.

use std::sync::Arc;

use ash::vk;
use glam::Mat4;
use gpu_allocator::MemoryLocation;

use super::frame::FrameSlot;
use super::orchestrator::FrameBackend;
use super::uniform::UniformBufferObject;
use crate::backend::descriptor::{DescriptorPool, DescriptorSetLayout};
use crate::backend::image::find_depth_format;
use crate::backend::texture::{SamplerSettings, TextureData};
use crate::backend::{
    AcquireOutcome, CommandPool, FrameSync, GpuBuffer, Pipeline, PipelineDesc, PresentOutcome,
    RenderPass, RenderTargets, Swapchain, Texture, VulkanDevice,
};
use crate::config::Config;
use crate::error::{RenderError, RenderResult};
use crate::scene::{Camera, CommandRecorder, MeshData, MeshSource, SceneObject, VertexKind};

/// A mesh to load plus where to put it
#[derive(Debug, Clone)]
pub struct SceneEntry {
    pub source: MeshSource,
    pub transform: Mat4,
}

struct DrawItem {
    object: SceneObject,
    transform: Mat4,
}

pub struct RenderContext {
    // Fields drop top to bottom; the device goes last
    slots: Vec<FrameSlot>,
    items: Vec<DrawItem>,
    pipelines: Vec<Pipeline>,
    _texture: Texture,
    _descriptor_pool: DescriptorPool,
    _descriptor_layout: DescriptorSetLayout,
    targets: Option<RenderTargets>,
    render_pass: RenderPass,
    swapchain: Swapchain,
    command_pool: CommandPool,

    pub camera: Camera,
    clear_color: [f32; 4],
    framebuffer_size: (u32, u32),
    device: Arc<VulkanDevice>,
}

impl RenderContext {
    pub fn new(
        device: Arc<VulkanDevice>,
        config: &Config,
        scene: &[SceneEntry],
        framebuffer_size: (u32, u32),
    ) -> RenderResult<Self> {
        let frames_in_flight = config.frames_in_flight();

        let command_pool = CommandPool::new(device.clone())?;

        let swapchain = Swapchain::new(device.clone(), framebuffer_size, config.get_present_mode())?;

        let samples = device.sample_count(config.graphics.msaa, config.graphics.max_msaa_samples);
        let depth_format = find_depth_format(&device)?;
        log::info!("Depth format {:?}, MSAA samples {:?}", depth_format, samples);

        let render_pass = RenderPass::new(device.clone(), swapchain.format, depth_format, samples)?;
        let targets = RenderTargets::new(device.clone(), &command_pool, &render_pass, &swapchain)?;

        // Texture shared by every frame
        let texture_data = match &config.texture.path {
            Some(path) => TextureData::load(path)?,
            None => TextureData::white(),
        };
        let texture = Texture::new(
            device.clone(),
            &command_pool,
            &texture_data,
            &SamplerSettings {
                anisotropy: config.texture.anisotropy,
                min_lod_fraction: config.texture.min_lod_fraction,
            },
        )?;

        // Descriptors: one set per frame in flight
        let descriptor_layout = DescriptorSetLayout::new(device.clone())?;
        let descriptor_pool = DescriptorPool::new(device.clone(), frames_in_flight as u32)?;
        let descriptor_sets = descriptor_pool.allocate(&descriptor_layout, frames_in_flight)?;
        let command_buffers = command_pool.allocate(frames_in_flight as u32)?;

        let ubo_size = std::mem::size_of::<UniformBufferObject>() as vk::DeviceSize;
        let mut slots = Vec::with_capacity(frames_in_flight);
        for (&descriptor_set, &command_buffer) in descriptor_sets.iter().zip(&command_buffers) {
            let uniform = GpuBuffer::new(
                device.clone(),
                "uniform buffer",
                ubo_size,
                vk::BufferUsageFlags::UNIFORM_BUFFER,
                MemoryLocation::CpuToGpu,
            )?;
            descriptor_pool.write_set(
                descriptor_set,
                uniform.buffer,
                ubo_size,
                texture.view(),
                texture.sampler,
            );

            slots.push(FrameSlot {
                command_buffer,
                sync: FrameSync::new(device.clone())?,
                uniform,
                descriptor_set,
            });
        }

        // Pipelines, 3D first so flat shapes draw over the scene
        let pipeline_descs = [
            PipelineDesc {
                name: "textured 3d".to_string(),
                vertex_shader: config.shaders.vertex_3d.clone(),
                fragment_shader: config.shaders.fragment.clone(),
                vertex_kind: VertexKind::Textured3D,
            },
            PipelineDesc {
                name: "flat 2d".to_string(),
                vertex_shader: config.shaders.vertex_2d.clone(),
                fragment_shader: config.shaders.fragment.clone(),
                vertex_kind: VertexKind::Flat2D,
            },
        ];
        let pipelines = pipeline_descs
            .iter()
            .map(|desc| {
                Pipeline::build(device.clone(), desc, &descriptor_layout, &render_pass, samples)
            })
            .collect::<RenderResult<Vec<_>>>()?;

        // Scene
        let mut items = Vec::with_capacity(scene.len());
        for entry in scene {
            let mesh = MeshData::load(&entry.source)?;
            let object = SceneObject::upload(device.clone(), &command_pool, &mesh)?;
            items.push(DrawItem {
                object,
                transform: entry.transform,
            });
        }
        log::info!("Scene ready: {} objects", items.len());

        Ok(Self {
            slots,
            items,
            pipelines,
            _texture: texture,
            _descriptor_pool: descriptor_pool,
            _descriptor_layout: descriptor_layout,
            targets: Some(targets),
            render_pass,
            swapchain,
            command_pool,
            camera: Camera::new(&config.camera),
            clear_color: config.graphics.clear_color,
            framebuffer_size,
            device,
        })
    }

    pub fn set_framebuffer_size(&mut self, width: u32, height: u32) {
        self.framebuffer_size = (width, height);
    }

    pub fn swapchain_extent(&self) -> vk::Extent2D {
        self.swapchain.extent
    }

    pub fn wait_idle(&self) -> RenderResult<()> {
        self.device.wait_idle()
    }

    fn slot(&self, slot: usize) -> RenderResult<&FrameSlot> {
        // Slot indices come from the orchestrator's ring of the same length
        self.slots.get(slot).ok_or(RenderError::InvalidFrameSlot(slot))
    }

    fn draw_scene(&self, cmd: vk::CommandBuffer, descriptor_set: vk::DescriptorSet) {
        let mut recorder = CommandRecorder::new(&self.device.device, cmd);

        for pipeline in &self.pipelines {
            let mut items = self
                .items
                .iter()
                .filter(|item| item.object.kind == pipeline.vertex_kind)
                .peekable();
            if items.peek().is_none() {
                continue;
            }

            pipeline.bind(cmd, descriptor_set);
            for item in items {
                pipeline.push_transform(cmd, &item.transform);
                item.object.record(&mut recorder);
            }
        }
    }
}

impl FrameBackend for RenderContext {
    fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer_size
    }

    fn wait_for_slot(&mut self, slot: usize) -> RenderResult<()> {
        self.slot(slot)?.sync.wait()
    }

    fn acquire_image(&mut self, slot: usize) -> RenderResult<AcquireOutcome> {
        let semaphore = self.slot(slot)?.sync.image_available;
        self.swapchain.acquire_next_image(semaphore)
    }

    fn reset_slot_fence(&mut self, slot: usize) -> RenderResult<()> {
        self.slot(slot)?.sync.reset()
    }

    fn record_commands(&mut self, slot: usize, image: u32) -> RenderResult<()> {
        let frame = self.slot(slot)?;
        let cmd = frame.command_buffer;
        let device = &self.device.device;

        let framebuffer = self
            .targets
            .as_ref()
            .and_then(|targets| targets.framebuffers.get(image as usize).copied())
            .ok_or(RenderError::MissingFramebuffer(image))?;
        let extent = self.swapchain.extent;

        unsafe {
            device.reset_command_buffer(cmd, vk::CommandBufferResetFlags::empty())?;
            device.begin_command_buffer(cmd, &vk::CommandBufferBeginInfo::default())?;
        }

        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: self.clear_color,
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            },
        ];

        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };
        let render_pass_info = vk::RenderPassBeginInfo::default()
            .render_pass(self.render_pass.render_pass)
            .framebuffer(framebuffer)
            .render_area(render_area)
            .clear_values(&clear_values);

        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };

        unsafe {
            device.cmd_begin_render_pass(cmd, &render_pass_info, vk::SubpassContents::INLINE);
            device.cmd_set_viewport(cmd, 0, &[viewport]);
            device.cmd_set_scissor(cmd, 0, &[render_area]);
        }

        self.draw_scene(cmd, frame.descriptor_set);

        unsafe {
            device.cmd_end_render_pass(cmd);
            device.end_command_buffer(cmd)?;
        }

        Ok(())
    }

    fn write_uniforms(&mut self, slot: usize) -> RenderResult<()> {
        let ubo = UniformBufferObject::new(&self.camera, self.swapchain.extent);
        let frame = self
            .slots
            .get_mut(slot)
            .ok_or(RenderError::InvalidFrameSlot(slot))?;
        frame.uniform.write(&[ubo])
    }

    fn submit(&mut self, slot: usize) -> RenderResult<()> {
        let frame = self.slot(slot)?;

        let wait_semaphores = [frame.sync.image_available];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [frame.command_buffer];
        let signal_semaphores = [frame.sync.render_finished];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device.device.queue_submit(
                self.device.graphics_queue,
                &[submit_info],
                frame.sync.in_flight_fence,
            )
        }?;

        Ok(())
    }

    fn present(&mut self, slot: usize, image: u32) -> RenderResult<PresentOutcome> {
        let render_finished = self.slot(slot)?.sync.render_finished;
        self.swapchain
            .present(self.device.present_queue, image, &[render_finished])
    }

    fn rebuild_swapchain(&mut self) -> RenderResult<()> {
        self.device.wait_idle()?;

        // Framebuffers reference the old image views
        self.targets = None;
        self.swapchain.recreate(self.framebuffer_size)?;

        // The render pass and pipelines are kept, so the format must not move
        if self.swapchain.format != self.render_pass.color_format {
            return Err(RenderError::SwapchainFormatChanged {
                old: self.render_pass.color_format,
                new: self.swapchain.format,
            });
        }

        self.targets = Some(RenderTargets::new(
            self.device.clone(),
            &self.command_pool,
            &self.render_pass,
            &self.swapchain,
        )?);

        Ok(())
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        // Nothing may still be executing when the fields start dropping
        if let Err(e) = self.device.wait_idle() {
            log::error!("wait_idle failed during shutdown: {}", e);
        }
    }
}
