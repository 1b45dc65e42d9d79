//! Error types for the renderer.
//!
//! Setup failures are fatal and bubble up to `main`. Recoverable swapchain
//! signals (out-of-date, suboptimal) are not errors: they are returned as
//! [`crate::backend::swapchain::AcquireOutcome`] /
//! [`crate::backend::swapchain::PresentOutcome`] values and handled by the
//! frame orchestrator.

use std::path::PathBuf;

use ash::vk;
use thiserror::Error;

/// Renderer error type.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to load the Vulkan library
    #[error("Failed to load Vulkan: {0}")]
    Loading(#[from] ash::LoadingError),

    /// Unexpected Vulkan API result
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),

    /// GPU allocator error
    #[error("Allocator error: {0}")]
    Allocator(#[from] gpu_allocator::AllocationError),

    /// Window did not provide usable raw handles
    #[error("Window handle error: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),

    /// No physical device satisfies the renderer's requirements
    #[error("No suitable GPU found")]
    NoSuitableDevice,

    /// A required device extension is not supported
    #[error("Required device extension missing: {0}")]
    ExtensionMissing(String),

    /// Validation was requested but the layer is not installed
    #[error("Validation layer requested but not available: {0}")]
    ValidationLayerMissing(String),

    /// None of the candidate formats supports the requested features
    #[error("No supported format among candidates: {0}")]
    NoSupportedFormat(String),

    /// Shader binary could not be read or is not valid SPIR-V
    #[error("Failed to load shader {path:?}: {source}")]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pipeline layout creation failed
    #[error("Failed to create pipeline layout: {0}")]
    LayoutCreation(vk::Result),

    /// Unsupported image layout transition requested
    #[error("Unsupported layout transition {from:?} -> {to:?}")]
    UnsupportedTransition {
        from: vk::ImageLayout,
        to: vk::ImageLayout,
    },

    /// Texture format cannot be blitted with linear filtering
    #[error("Format {0:?} does not support linear blitting")]
    LinearBlitUnsupported(vk::Format),

    /// Recreated swapchain picked a format the render pass was not built for
    #[error("Swapchain format changed from {old:?} to {new:?}")]
    SwapchainFormatChanged { old: vk::Format, new: vk::Format },

    /// Frame slot index outside the frames-in-flight ring
    #[error("Frame slot {0} does not exist")]
    InvalidFrameSlot(usize),

    /// Acquired swapchain image has no framebuffer
    #[error("No framebuffer for swapchain image {0}")]
    MissingFramebuffer(u32),

    /// Host write into memory that is not mapped
    #[error("Buffer is not host-visible")]
    BufferNotMapped,

    /// Host write larger than the buffer
    #[error("Write of {len} bytes exceeds buffer size of {capacity} bytes")]
    BufferOverflow { len: usize, capacity: usize },

    /// Asset loading error
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Errors from the mesh and image loader collaborators.
#[derive(Error, Debug)]
pub enum LoadError {
    /// OBJ file missing or malformed
    #[error("Failed to load mesh {path:?}: {source}")]
    Mesh {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    /// Image file missing or undecodable
    #[error("Failed to load image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Result type alias for renderer operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
