// Graphics pipeline creation and management
//
// The graphics pipeline defines how vertices are processed and rasterized.
// It includes: vertex input, shaders, rasterization, depth/stencil, blending.
// Viewport and scissor are dynamic so pipelines survive swapchain rebuilds.

use std::path::PathBuf;
use std::sync::Arc;

use ash::vk;
use glam::Mat4;

use super::descriptor::DescriptorSetLayout;
use super::render_pass::RenderPass;
use super::shader::ShaderModule;
use super::VulkanDevice;
use crate::error::{RenderError, RenderResult};
use crate::scene::vertex::VertexKind;

/// Minimum fraction of samples shaded individually when MSAA is on
pub const MIN_SAMPLE_SHADING: f32 = 0.2;

/// Push constant block: one model matrix for the vertex stage
pub const PUSH_CONSTANT_SIZE: u32 = std::mem::size_of::<Mat4>() as u32;

/// What to build: shader pair + vertex layout
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    pub name: String,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub vertex_kind: VertexKind,
}

/// Sample shading is only meaningful with more than one sample
pub fn multisample_state(samples: vk::SampleCountFlags) -> vk::PipelineMultisampleStateCreateInfo<'static> {
    let shading = samples != vk::SampleCountFlags::TYPE_1;
    vk::PipelineMultisampleStateCreateInfo::default()
        .rasterization_samples(samples)
        .sample_shading_enable(shading)
        .min_sample_shading(if shading { MIN_SAMPLE_SHADING } else { 0.0 })
}

pub fn push_constant_ranges() -> [vk::PushConstantRange; 1] {
    [vk::PushConstantRange {
        stage_flags: vk::ShaderStageFlags::VERTEX,
        offset: 0,
        size: PUSH_CONSTANT_SIZE,
    }]
}

pub struct Pipeline {
    pub pipeline: vk::Pipeline,
    pub layout: vk::PipelineLayout,
    pub vertex_kind: VertexKind,
    pub name: String,
    device: Arc<VulkanDevice>,
}

impl Pipeline {
    pub fn build(
        device: Arc<VulkanDevice>,
        desc: &PipelineDesc,
        descriptor_layout: &DescriptorSetLayout,
        render_pass: &RenderPass,
        samples: vk::SampleCountFlags,
    ) -> RenderResult<Self> {
        log::info!("Building pipeline '{}'", desc.name);

        // Modules only live for the duration of this call
        let vert = ShaderModule::from_file(device.clone(), &desc.vertex_shader)?;
        let frag = ShaderModule::from_file(device.clone(), &desc.fragment_shader)?;

        let entry_point = c"main";
        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vert.module)
                .name(entry_point),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(frag.module)
                .name(entry_point),
        ];

        // Vertex input
        let (bindings, attributes) = desc.vertex_kind.input_description();
        let vertex_input_info = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes);

        // Input assembly
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // Viewport and scissor are set at record time
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);
        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        // Rasterization
        let rasterizer = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::BACK)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .depth_bias_enable(false);

        let multisampling = multisample_state(samples);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(true)
            .depth_write_enable(true)
            .depth_compare_op(vk::CompareOp::LESS) // Closer objects win
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        // Color blending (no blending, opaque)
        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(false)];
        let color_blending = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        // Pipeline layout: the shared descriptor set + per-object transform
        let set_layouts = [descriptor_layout.layout];
        let push_constant_ranges = push_constant_ranges();
        let layout_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(&set_layouts)
            .push_constant_ranges(&push_constant_ranges);

        let layout = unsafe { device.device.create_pipeline_layout(&layout_info, None) }
            .map_err(RenderError::LayoutCreation)?;

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_info)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterizer)
            .multisample_state(&multisampling)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blending)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .render_pass(render_pass.render_pass)
            .subpass(0);

        let pipelines = unsafe {
            device
                .device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
        };

        let pipeline = match pipelines {
            Ok(pipelines) => pipelines.into_iter().next().unwrap_or_default(),
            Err((_, e)) => {
                unsafe { device.device.destroy_pipeline_layout(layout, None) };
                return Err(e.into());
            }
        };

        Ok(Self {
            pipeline,
            layout,
            vertex_kind: desc.vertex_kind,
            name: desc.name.clone(),
            device,
        })
    }

    /// Bind the pipeline and the frame's descriptor set
    pub fn bind(&self, cmd: vk::CommandBuffer, descriptor_set: vk::DescriptorSet) {
        unsafe {
            self.device.device.cmd_bind_pipeline(
                cmd,
                vk::PipelineBindPoint::GRAPHICS,
                self.pipeline,
            );
            self.device.device.cmd_bind_descriptor_sets(
                cmd,
                vk::PipelineBindPoint::GRAPHICS,
                self.layout,
                0,
                &[descriptor_set],
                &[],
            );
        }
    }

    /// Push the per-object model matrix
    pub fn push_transform(&self, cmd: vk::CommandBuffer, transform: &Mat4) {
        unsafe {
            self.device.device.cmd_push_constants(
                cmd,
                self.layout,
                vk::ShaderStageFlags::VERTEX,
                0,
                bytemuck::bytes_of(transform),
            );
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_pipeline(self.pipeline, None);
            self.device.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_constant_is_one_matrix() {
        let ranges = push_constant_ranges();
        assert_eq!(ranges[0].size, 64);
        assert_eq!(ranges[0].stage_flags, vk::ShaderStageFlags::VERTEX);
    }

    #[test]
    fn test_sample_shading_only_with_msaa() {
        let state = multisample_state(vk::SampleCountFlags::TYPE_1);
        assert_eq!(state.sample_shading_enable, vk::FALSE);

        let state = multisample_state(vk::SampleCountFlags::TYPE_8);
        assert_eq!(state.sample_shading_enable, vk::TRUE);
        assert_eq!(state.min_sample_shading, MIN_SAMPLE_SHADING);
        assert_eq!(state.rasterization_samples, vk::SampleCountFlags::TYPE_8);
    }
}
