// Scene objects - GPU-resident meshes

use std::sync::Arc;

use ash::vk;

use super::mesh::MeshData;
use super::vertex::VertexKind;
use crate::backend::{CommandPool, GpuBuffer, VulkanDevice};
use crate::error::RenderResult;

/// The subset of command recording a scene object needs
pub trait DrawRecorder {
    fn bind_vertex_buffer(&mut self, buffer: vk::Buffer);
    fn bind_index_buffer(&mut self, buffer: vk::Buffer);
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );
}

/// Records straight into a Vulkan command buffer
pub struct CommandRecorder<'a> {
    device: &'a ash::Device,
    cmd: vk::CommandBuffer,
}

impl<'a> CommandRecorder<'a> {
    pub fn new(device: &'a ash::Device, cmd: vk::CommandBuffer) -> Self {
        Self { device, cmd }
    }
}

impl DrawRecorder for CommandRecorder<'_> {
    fn bind_vertex_buffer(&mut self, buffer: vk::Buffer) {
        unsafe { self.device.cmd_bind_vertex_buffers(self.cmd, 0, &[buffer], &[0]) };
    }

    fn bind_index_buffer(&mut self, buffer: vk::Buffer) {
        unsafe {
            self.device
                .cmd_bind_index_buffer(self.cmd, buffer, 0, vk::IndexType::UINT32)
        };
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) {
        unsafe {
            self.device.cmd_draw_indexed(
                self.cmd,
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            )
        };
    }
}

/// Buffers and count for one indexed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub vertex_buffer: vk::Buffer,
    pub index_buffer: vk::Buffer,
    pub index_count: u32,
}

impl DrawCall {
    /// Draw for `mesh` once it lives in the given buffers
    pub fn from_mesh(vertex_buffer: vk::Buffer, index_buffer: vk::Buffer, mesh: &MeshData) -> Self {
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    /// Bind both buffers and issue one indexed draw. Pipeline and
    /// descriptor state are the caller's business.
    pub fn record(&self, recorder: &mut impl DrawRecorder) {
        recorder.bind_vertex_buffer(self.vertex_buffer);
        recorder.bind_index_buffer(self.index_buffer);
        recorder.draw_indexed(self.index_count, 1, 0, 0, 0);
    }
}

pub struct SceneObject {
    // Owned so the handles in `draw` stay valid
    _vertex_buffer: GpuBuffer,
    _index_buffer: GpuBuffer,
    draw: DrawCall,
    pub vertex_count: u32,
    pub index_count: u32,
    pub kind: VertexKind,
}

impl SceneObject {
    /// Copy the mesh into device-local vertex/index buffers. Blocking.
    pub fn upload(
        device: Arc<VulkanDevice>,
        uploader: &CommandPool,
        mesh: &MeshData,
    ) -> RenderResult<Self> {
        let vertex_buffer = GpuBuffer::device_local_with_data(
            device.clone(),
            uploader,
            "vertex buffer",
            vk::BufferUsageFlags::VERTEX_BUFFER,
            mesh.vertex_bytes(),
        )?;
        let index_buffer = GpuBuffer::device_local_with_data(
            device,
            uploader,
            "index buffer",
            vk::BufferUsageFlags::INDEX_BUFFER,
            &mesh.indices,
        )?;

        let draw = DrawCall::from_mesh(vertex_buffer.buffer, index_buffer.buffer, mesh);

        Ok(Self {
            _vertex_buffer: vertex_buffer,
            _index_buffer: index_buffer,
            draw,
            vertex_count: mesh.vertex_count() as u32,
            index_count: draw.index_count,
            kind: mesh.kind(),
        })
    }

    pub fn draw_call(&self) -> DrawCall {
        self.draw
    }

    pub fn record(&self, recorder: &mut impl DrawRecorder) {
        self.draw.record(recorder);
    }
}
