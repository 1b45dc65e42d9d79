// Vertex formats and their Vulkan input layouts

use std::hash::{Hash, Hasher};
use std::mem::{offset_of, size_of};

use ash::vk;
use bytemuck::{Pod, Zeroable};

/// Textured 3D vertex (OBJ meshes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex3D {
    fn key(&self) -> [u32; 8] {
        let [px, py, pz] = self.position.map(f32::to_bits);
        let [r, g, b] = self.color.map(f32::to_bits);
        let [u, v] = self.tex_coord.map(f32::to_bits);
        [px, py, pz, r, g, b, u, v]
    }
}

// Bit equality, so Eq and Hash agree even for NaN / -0.0
impl PartialEq for Vertex3D {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Vertex3D {}

impl Hash for Vertex3D {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Flat 2D vertex (procedural shapes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex2D {
    pub position: [f32; 2],
    pub color: [f32; 3],
    pub tex_coord: [f32; 2],
}

/// Which vertex struct a pipeline or buffer carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKind {
    Flat2D,
    Textured3D,
}

impl VertexKind {
    pub fn stride(self) -> u32 {
        match self {
            VertexKind::Flat2D => size_of::<Vertex2D>() as u32,
            VertexKind::Textured3D => size_of::<Vertex3D>() as u32,
        }
    }

    /// One interleaved binding at slot 0; locations 0..3 are position,
    /// color and texcoord.
    pub fn input_description(
        self,
    ) -> (
        Vec<vk::VertexInputBindingDescription>,
        Vec<vk::VertexInputAttributeDescription>,
    ) {
        let binding = vk::VertexInputBindingDescription {
            binding: 0,
            stride: self.stride(),
            input_rate: vk::VertexInputRate::VERTEX,
        };

        let attribute = |location, format, offset: usize| vk::VertexInputAttributeDescription {
            location,
            binding: 0,
            format,
            offset: offset as u32,
        };

        let attributes = match self {
            VertexKind::Flat2D => vec![
                attribute(0, vk::Format::R32G32_SFLOAT, offset_of!(Vertex2D, position)),
                attribute(1, vk::Format::R32G32B32_SFLOAT, offset_of!(Vertex2D, color)),
                attribute(2, vk::Format::R32G32_SFLOAT, offset_of!(Vertex2D, tex_coord)),
            ],
            VertexKind::Textured3D => vec![
                attribute(0, vk::Format::R32G32B32_SFLOAT, offset_of!(Vertex3D, position)),
                attribute(1, vk::Format::R32G32B32_SFLOAT, offset_of!(Vertex3D, color)),
                attribute(2, vk::Format::R32G32_SFLOAT, offset_of!(Vertex3D, tex_coord)),
            ],
        };

        (vec![binding], attributes)
    }
}
