// Scene - what gets drawn
//
// Vertex formats, mesh loading, procedural shapes, GPU-resident objects
// and the camera driving the per-frame uniforms.

pub mod camera;
pub mod mesh;
pub mod object;
pub mod shapes;
pub mod vertex;

pub use camera::{Camera, CameraMove};
pub use mesh::{MeshData, MeshSource, Vertices};
pub use object::{CommandRecorder, DrawCall, DrawRecorder, SceneObject};
pub use vertex::{Vertex2D, Vertex3D, VertexKind};
