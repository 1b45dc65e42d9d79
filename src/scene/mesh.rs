// Mesh sources: OBJ files or literal vertex/index arrays

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::vertex::{Vertex2D, Vertex3D, VertexKind};
use crate::error::LoadError;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Where a scene object's geometry comes from
#[derive(Debug, Clone)]
pub enum MeshSource {
    /// OBJ file; texcoords are only read when `textured` is set
    Obj { path: PathBuf, textured: bool },
    Literal3D {
        vertices: Vec<Vertex3D>,
        indices: Vec<u32>,
    },
    Literal2D {
        vertices: Vec<Vertex2D>,
        indices: Vec<u32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Vertices {
    Flat2D(Vec<Vertex2D>),
    Textured3D(Vec<Vertex3D>),
}

/// CPU-side geometry ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vertices,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn load(source: &MeshSource) -> Result<Self, LoadError> {
        match source {
            MeshSource::Obj { path, textured } => load_obj(path, *textured),
            MeshSource::Literal3D { vertices, indices } => Ok(Self {
                vertices: Vertices::Textured3D(vertices.clone()),
                indices: indices.clone(),
            }),
            MeshSource::Literal2D { vertices, indices } => Ok(Self {
                vertices: Vertices::Flat2D(vertices.clone()),
                indices: indices.clone(),
            }),
        }
    }

    pub fn kind(&self) -> VertexKind {
        match self.vertices {
            Vertices::Flat2D(_) => VertexKind::Flat2D,
            Vertices::Textured3D(_) => VertexKind::Textured3D,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match &self.vertices {
            Vertices::Flat2D(v) => v.len(),
            Vertices::Textured3D(v) => v.len(),
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        match &self.vertices {
            Vertices::Flat2D(v) => bytemuck::cast_slice(v),
            Vertices::Textured3D(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Collapse bit-identical vertices; returns the unique vertices and an index
/// per input vertex.
pub fn dedup_vertices(input: impl IntoIterator<Item = Vertex3D>) -> (Vec<Vertex3D>, Vec<u32>) {
    let mut unique: HashMap<Vertex3D, u32> = HashMap::new();
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for vertex in input {
        let index = *unique.entry(vertex).or_insert_with(|| {
            vertices.push(vertex);
            (vertices.len() - 1) as u32
        });
        indices.push(index);
    }

    (vertices, indices)
}

fn load_obj(path: &Path, textured: bool) -> Result<MeshData, LoadError> {
    let mesh_error = |source| LoadError::Mesh {
        path: path.to_path_buf(),
        source,
    };

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )
    .map_err(mesh_error)?;

    let mut corners = Vec::new();
    for model in &models {
        let mesh = &model.mesh;
        for &index in &mesh.indices {
            let i = index as usize;

            let position = mesh
                .positions
                .get(3 * i..3 * i + 3)
                .ok_or_else(|| mesh_error(tobj::LoadError::FaceVertexOutOfBounds))?;

            // Image rows run top to bottom, OBJ V runs bottom to top
            let tex_coord = if textured {
                mesh.texcoords
                    .get(2 * i..2 * i + 2)
                    .map(|uv| [uv[0], 1.0 - uv[1]])
                    .unwrap_or_default()
            } else {
                [0.0, 0.0]
            };

            corners.push(Vertex3D {
                position: [position[0], position[1], position[2]],
                color: WHITE,
                tex_coord,
            });
        }
    }

    let (vertices, indices) = dedup_vertices(corners);

    log::info!(
        "Loaded mesh {:?}: {} vertices, {} indices",
        path,
        vertices.len(),
        indices.len()
    );

    Ok(MeshData {
        vertices: Vertices::Textured3D(vertices),
        indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32) -> Vertex3D {
        Vertex3D {
            position: [x, 0.0, 0.0],
            color: WHITE,
            tex_coord: [0.0, 0.0],
        }
    }

    #[test]
    fn test_dedup_shares_identical_vertices() {
        let (vertices, indices) = dedup_vertices([v(0.0), v(1.0), v(0.0), v(2.0), v(1.0)]);
        assert_eq!(vertices, vec![v(0.0), v(1.0), v(2.0)]);
        assert_eq!(indices, vec![0, 1, 0, 2, 1]);
    }

    #[test]
    fn test_dedup_empty() {
        let (vertices, indices) = dedup_vertices(Vec::new());
        assert!(vertices.is_empty());
        assert!(indices.is_empty());
    }

    #[test]
    fn test_literal_2d_source() {
        let source = MeshSource::Literal2D {
            vertices: vec![Vertex2D::default(); 3],
            indices: vec![0, 1, 2],
        };
        let mesh = MeshData::load(&source).unwrap();
        assert_eq!(mesh.kind(), VertexKind::Flat2D);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertex_bytes().len(), 3 * 28);
    }

    #[test]
    fn test_missing_obj() {
        let source = MeshSource::Obj {
            path: "missing/model.obj".into(),
            textured: true,
        };
        assert!(matches!(
            MeshData::load(&source),
            Err(LoadError::Mesh { .. })
        ));
    }
}
