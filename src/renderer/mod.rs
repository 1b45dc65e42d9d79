// Renderer - frame loop on top of the backend
//
// `Renderer` pairs the Vulkan resources (`RenderContext`) with the frame
// state machine (`FrameOrchestrator`). The window layer only talks to this.

pub mod context;
pub mod frame;
pub mod orchestrator;
pub mod uniform;

use std::sync::Arc;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

pub use context::{RenderContext, SceneEntry};
pub use frame::{FrameRing, FrameSlot};
pub use orchestrator::{FrameBackend, FrameOrchestrator, FrameOutcome, RecreateOutcome, SlotState};
pub use uniform::UniformBufferObject;

use crate::backend::VulkanDevice;
use crate::config::Config;
use crate::error::RenderResult;
use crate::scene::Camera;

pub struct Renderer {
    context: RenderContext,
    orchestrator: FrameOrchestrator,
}

impl Renderer {
    pub fn new<W>(
        window: &W,
        framebuffer_size: (u32, u32),
        config: &Config,
        scene: &[SceneEntry],
    ) -> RenderResult<Self>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        let device: Arc<VulkanDevice> =
            VulkanDevice::new(window, &config.window.title, config.debug.validation_layers)?;

        let context = RenderContext::new(device, config, scene, framebuffer_size)?;
        let orchestrator = FrameOrchestrator::new(config.frames_in_flight());

        log::info!(
            "Renderer initialized with {} frames in flight",
            orchestrator.frames_in_flight()
        );

        Ok(Self {
            context,
            orchestrator,
        })
    }

    pub fn draw_frame(&mut self) -> RenderResult<FrameOutcome> {
        self.orchestrator.draw_frame(&mut self.context)
    }

    /// Window resized (possibly to zero while minimized)
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.set_framebuffer_size(width, height);
        self.orchestrator.notify_resized();
    }

    /// Waiting for a non-zero framebuffer before it can draw again
    pub fn is_suspended(&self) -> bool {
        self.orchestrator.is_suspended()
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.context.camera
    }

    pub fn wait_idle(&self) -> RenderResult<()> {
        self.context.wait_idle()
    }
}
