// Per-frame uniform payload

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::scene::Camera;

/// Matches the `UniformBufferObject` block at binding 0 of the vertex shaders
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UniformBufferObject {
    pub model: Mat4,
    pub view: Mat4,
    pub proj: Mat4,
}

impl UniformBufferObject {
    pub fn new(camera: &Camera, extent: vk::Extent2D) -> Self {
        Self {
            model: camera.model(),
            view: camera.view(),
            proj: camera.projection(aspect_ratio(extent)),
        }
    }
}

/// Width over height; 1.0 for a degenerate extent
pub fn aspect_ratio(extent: vk::Extent2D) -> f32 {
    if extent.height == 0 {
        1.0
    } else {
        extent.width as f32 / extent.height as f32
    }
}
