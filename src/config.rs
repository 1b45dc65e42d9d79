// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// Every section is optional; missing keys fall back to the defaults below,
// which reproduce the stock scene (room + vehicle + quad + circle).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ash::vk;
use glam::{Mat4, Vec2, Vec3};
use serde::Deserialize;

use crate::renderer::SceneEntry;
use crate::scene::{shapes, MeshData, MeshSource, Vertices};

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub texture: TextureConfig,
    pub shaders: ShaderConfig,
    pub camera: CameraConfig,
    pub debug: DebugConfig,
    pub scene: SceneConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan Tutorial Renderer".to_string(),
            width: 800,
            height: 600,
            fullscreen: false,
        }
    }
}

/// Graphics settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub present_mode: String,
    pub clear_color: [f32; 4],
    pub max_frames_in_flight: usize,
    pub msaa: bool,
    /// Upper bound on the sample count picked from device limits
    pub max_msaa_samples: u32,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            present_mode: "mailbox".to_string(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            max_frames_in_flight: 2,
            msaa: true,
            max_msaa_samples: 8,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// None: a 1x1 white texture is used
    pub path: Option<PathBuf>,
    pub min_lod_fraction: f32,
    pub anisotropy: bool,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("textures/viking_room.png")),
            min_lod_fraction: 0.25,
            anisotropy: true,
        }
    }
}

/// Compiled SPIR-V paths
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex_3d: PathBuf,
    pub vertex_2d: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex_3d: PathBuf::from("shaders/shader.vert.spv"),
            vertex_2d: PathBuf::from("shaders/shader2d.vert.spv"),
            fragment: PathBuf::from("shaders/shader.frag.spv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub move_step: f32,
    /// Radians per mouse motion event while right-dragging
    pub rotate_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [2.0, 2.0, 2.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 10.0,
            move_step: 0.2,
            rotate_step: 0.01,
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
    pub log_to_file: bool,
    pub log_file: String,
    pub log_level: String,
    pub show_fps: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: cfg!(debug_assertions),
            log_to_file: false,
            log_file: "vulkan_debug.log".to_string(),
            log_level: "info".to_string(),
            show_fps: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Obj,
    Quad,
    Circle,
}

/// One entry of `[[scene.objects]]`
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectConfig {
    pub kind: ObjectKind,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub textured: bool,
    #[serde(default = "default_quad_size")]
    pub size: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_segments")]
    pub segments: u32,
    #[serde(default)]
    pub translation: [f32; 3],
    /// Degrees about `rotation_axis`
    #[serde(default)]
    pub rotation_degrees: f32,
    #[serde(default = "default_axis")]
    pub rotation_axis: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_true() -> bool {
    true
}

fn default_quad_size() -> f32 {
    1.0
}

fn default_radius() -> f32 {
    0.25
}

fn default_segments() -> u32 {
    16
}

fn default_axis() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

fn default_scale() -> f32 {
    1.0
}

impl ObjectConfig {
    fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            path: None,
            textured: default_true(),
            size: default_quad_size(),
            radius: default_radius(),
            segments: default_segments(),
            translation: [0.0; 3],
            rotation_degrees: 0.0,
            rotation_axis: default_axis(),
            scale: default_scale(),
        }
    }

    /// translate * scale * rotate
    pub fn transform(&self) -> Mat4 {
        let axis = Vec3::from(self.rotation_axis).try_normalize().unwrap_or(Vec3::Z);
        Mat4::from_translation(Vec3::from(self.translation))
            * Mat4::from_scale(Vec3::splat(self.scale))
            * Mat4::from_axis_angle(axis, self.rotation_degrees.to_radians())
    }

    /// Resolve into loadable geometry. An `obj` entry without a path is a
    /// configuration error.
    pub fn mesh_source(&self) -> Result<MeshSource> {
        match self.kind {
            ObjectKind::Obj => {
                let path = self
                    .path
                    .clone()
                    .context("scene object of kind \"obj\" needs a path")?;
                Ok(MeshSource::Obj {
                    path,
                    textured: self.textured,
                })
            }
            ObjectKind::Quad => Ok(literal(shapes::quad(self.size))),
            ObjectKind::Circle => Ok(literal(shapes::filled_circle(
                Vec2::ZERO,
                self.radius,
                self.segments,
            ))),
        }
    }
}

fn literal(mesh: MeshData) -> MeshSource {
    match mesh.vertices {
        Vertices::Flat2D(vertices) => MeshSource::Literal2D {
            vertices,
            indices: mesh.indices,
        },
        Vertices::Textured3D(vertices) => MeshSource::Literal3D {
            vertices,
            indices: mesh.indices,
        },
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub objects: Vec<ObjectConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let room = ObjectConfig {
            path: Some(PathBuf::from("models/room.obj")),
            translation: [-1.0, 0.0, 0.0],
            ..ObjectConfig::new(ObjectKind::Obj)
        };
        let vehicle = ObjectConfig {
            path: Some(PathBuf::from("models/vehicle.obj")),
            translation: [0.0, -1.0, 0.0],
            scale: 0.025,
            rotation_degrees: 90.0,
            rotation_axis: [1.0, 0.0, 0.0],
            ..ObjectConfig::new(ObjectKind::Obj)
        };
        let quad = ObjectConfig {
            translation: [1.0, 0.0, 0.0],
            ..ObjectConfig::new(ObjectKind::Quad)
        };
        let circle = ObjectConfig {
            translation: [0.0, 1.0, 0.0],
            ..ObjectConfig::new(ObjectKind::Circle)
        };

        Self {
            objects: vec![room, vehicle, quad, circle],
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {:#}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get present mode as Vulkan enum
    pub fn get_present_mode(&self) -> vk::PresentModeKHR {
        match self.graphics.present_mode.to_lowercase().as_str() {
            "immediate" => vk::PresentModeKHR::IMMEDIATE,
            "mailbox" => vk::PresentModeKHR::MAILBOX,
            "fifo" => vk::PresentModeKHR::FIFO,
            "fifo_relaxed" => vk::PresentModeKHR::FIFO_RELAXED,
            _ => {
                log::warn!(
                    "Unknown present mode '{}', defaulting to MAILBOX",
                    self.graphics.present_mode
                );
                vk::PresentModeKHR::MAILBOX
            }
        }
    }

    /// Frames in flight, never below one
    pub fn frames_in_flight(&self) -> usize {
        self.graphics.max_frames_in_flight.max(1)
    }

    /// Scene objects in declaration order
    pub fn scene_entries(&self) -> Result<Vec<SceneEntry>> {
        self.scene
            .objects
            .iter()
            .enumerate()
            .map(|(i, object)| {
                let source = object
                    .mesh_source()
                    .with_context(|| format!("scene object #{}", i))?;
                Ok(SceneEntry {
                    source,
                    transform: object.transform(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.get_present_mode(), vk::PresentModeKHR::MAILBOX);
        assert_eq!(config.frames_in_flight(), 2);
        assert!(config.graphics.msaa);
        assert_eq!(config.scene.objects.len(), 4);
        assert_relative_eq!(config.texture.min_lod_fraction, 0.25);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [graphics]
            present_mode = "fifo"
            max_frames_in_flight = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.get_present_mode(), vk::PresentModeKHR::FIFO);
        assert_eq!(config.frames_in_flight(), 1);
        assert_eq!(config.window.width, 800);
        assert_eq!(config.shaders.fragment, PathBuf::from("shaders/shader.frag.spv"));
    }

    #[test]
    fn test_unknown_present_mode_falls_back() {
        let config = Config::from_toml("[graphics]\npresent_mode = \"warp\"").unwrap();
        assert_eq!(config.get_present_mode(), vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn test_scene_objects_parse() {
        let config = Config::from_toml(
            r#"
            [[scene.objects]]
            kind = "circle"
            segments = 8
            translation = [0.0, 1.0, 0.0]

            [[scene.objects]]
            kind = "obj"
            path = "models/room.obj"
            textured = false
            "#,
        )
        .unwrap();
        let objects = &config.scene.objects;
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].kind, ObjectKind::Circle);
        assert_eq!(objects[0].segments, 8);
        assert_relative_eq!(objects[0].radius, 0.25);
        assert!(!objects[1].textured);
    }

    #[test]
    fn test_obj_without_path_is_rejected() {
        let object = ObjectConfig::new(ObjectKind::Obj);
        assert!(object.mesh_source().is_err());
    }

    #[test]
    fn test_vehicle_transform() {
        let config = Config::default();
        let vehicle = &config.scene.objects[1];
        let m = vehicle.transform();
        // +Y in model space maps onto +Z after the 90 degree X rotation
        let p = m.transform_point3(Vec3::Y);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 0.025, epsilon = 1e-6);
    }

    #[test]
    fn test_default_scene_entries() {
        let entries = Config::default().scene_entries().unwrap();
        assert_eq!(entries.len(), 4);
        assert!(matches!(entries[0].source, MeshSource::Obj { textured: true, .. }));
        assert!(matches!(entries[2].source, MeshSource::Literal2D { .. }));
        let origin = entries[3].transform.transform_point3(Vec3::ZERO);
        assert_relative_eq!(origin.y, 1.0);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(Config::from_toml("[graphics\nmsaa = yes").is_err());
    }
}
