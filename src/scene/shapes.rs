// Procedural 2D geometry

use std::f32::consts::TAU;

use glam::Vec2;

use super::mesh::{MeshData, Vertices};
use super::vertex::Vertex2D;

const CIRCLE_COLOR: [f32; 3] = [0.0, 0.0, 1.0];

/// Triangle fan approximating a disc.
///
/// Vertex 0 is the center, vertex 1 the rim point at angle 0, then one rim
/// point per segment (the last one closes the loop). Triangle `i` is
/// `(0, i + 1, i + 2)`. Fewer than 3 segments are bumped to 3.
pub fn filled_circle(center: Vec2, radius: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let step = TAU / segments as f32;

    let rim = |angle: f32| Vertex2D {
        position: (center + radius * Vec2::new(angle.cos(), angle.sin())).to_array(),
        color: CIRCLE_COLOR,
        tex_coord: [0.0, 0.0],
    };

    let mut vertices = Vec::with_capacity(segments as usize + 2);
    vertices.push(Vertex2D {
        position: center.to_array(),
        color: CIRCLE_COLOR,
        tex_coord: [0.0, 0.0],
    });
    vertices.push(rim(0.0));

    let mut indices = Vec::with_capacity(3 * segments as usize);
    for i in 0..segments {
        vertices.push(rim(step * (i + 1) as f32));
        indices.extend_from_slice(&[0, i + 1, i + 2]);
    }

    MeshData {
        vertices: Vertices::Flat2D(vertices),
        indices,
    }
}

/// Axis-aligned square of side `size` centred on the origin, one color per
/// corner (red, green, blue, white).
pub fn quad(size: f32) -> MeshData {
    let h = size / 2.0;
    let corner = |x: f32, y: f32, color: [f32; 3], uv: [f32; 2]| Vertex2D {
        position: [x, y],
        color,
        tex_coord: uv,
    };

    MeshData {
        vertices: Vertices::Flat2D(vec![
            corner(-h, -h, [1.0, 0.0, 0.0], [1.0, 0.0]),
            corner(h, -h, [0.0, 1.0, 0.0], [0.0, 0.0]),
            corner(h, h, [0.0, 0.0, 1.0], [0.0, 1.0]),
            corner(-h, h, [1.0, 1.0, 1.0], [1.0, 1.0]),
        ]),
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn flat(mesh: &MeshData) -> &[Vertex2D] {
        match &mesh.vertices {
            Vertices::Flat2D(v) => v,
            Vertices::Textured3D(_) => panic!("expected 2D vertices"),
        }
    }

    #[test]
    fn test_circle_counts() {
        let mesh = filled_circle(Vec2::ZERO, 0.25, 16);
        assert_eq!(mesh.vertex_count(), 18);
        assert_eq!(mesh.indices.len(), 48);
        for i in 0..16u32 {
            let tri = &mesh.indices[3 * i as usize..3 * i as usize + 3];
            assert_eq!(tri, &[0, i + 1, i + 2]);
        }
    }

    #[test]
    fn test_circle_clamps_segments() {
        let mesh = filled_circle(Vec2::ZERO, 1.0, 1);
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.indices.len(), 9);
    }

    #[test]
    fn test_circle_rim_on_radius() {
        let center = Vec2::new(0.5, -1.0);
        let mesh = filled_circle(center, 0.25, 8);
        let vertices = flat(&mesh);
        assert_eq!(vertices[0].position, [0.5, -1.0]);
        for v in &vertices[1..] {
            let d = Vec2::from(v.position).distance(center);
            assert_abs_diff_eq!(d, 0.25, epsilon = 1e-5);
        }
        // Closing vertex lands back on the start point
        let first = vertices[1].position;
        let last = vertices[vertices.len() - 1].position;
        assert_abs_diff_eq!(first[0], last[0], epsilon = 1e-5);
        assert_abs_diff_eq!(first[1], last[1], epsilon = 1e-5);
    }

    #[test]
    fn test_quad() {
        let mesh = quad(1.0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 3, 0]);
        assert_eq!(flat(&mesh)[2].position, [0.5, 0.5]);
    }
}
