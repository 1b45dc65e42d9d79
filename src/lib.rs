//! Vulkan renderer: device and swapchain management, render targets,
//! pipelines, GPU-resident meshes and an N-frames-in-flight frame loop.
//!
//! The binary in `main.rs` wires this to a winit window.

pub mod backend;
pub mod config;
pub mod error;
pub mod renderer;
pub mod scene;

pub use error::{LoadError, RenderError, RenderResult};
