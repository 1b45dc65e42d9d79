// Backend module - Vulkan abstraction layer
//
// Design: Thin RAII wrappers around ash, one per resource category.
// Every wrapper holds an Arc<VulkanDevice>, so the device outlives them all.

pub mod buffer;
pub mod commands;
pub mod descriptor;
pub mod device;
pub mod image;
pub mod pipeline;
pub mod render_pass;
pub mod render_targets;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod texture;

pub use buffer::GpuBuffer;
pub use commands::CommandPool;
pub use device::VulkanDevice;
pub use pipeline::{Pipeline, PipelineDesc};
pub use render_pass::RenderPass;
pub use render_targets::RenderTargets;
pub use swapchain::{AcquireOutcome, PresentOutcome, Swapchain};
pub use sync::FrameSync;
pub use texture::Texture;
