// Frame orchestration
//
// The per-frame state machine, independent of Vulkan: everything that
// touches the GPU sits behind `FrameBackend`. Swapchain invalidation
// (out-of-date, suboptimal, resize) is handled here and never surfaces as
// an error.

use crate::backend::{AcquireOutcome, PresentOutcome};
use crate::error::RenderResult;

use super::frame::FrameRing;

/// GPU side of a frame, one call per step
pub trait FrameBackend {
    /// Current window framebuffer size in pixels
    fn framebuffer_size(&self) -> (u32, u32);

    /// Block until the slot's previous submission finished
    fn wait_for_slot(&mut self, slot: usize) -> RenderResult<()>;
    fn acquire_image(&mut self, slot: usize) -> RenderResult<AcquireOutcome>;
    fn reset_slot_fence(&mut self, slot: usize) -> RenderResult<()>;
    fn record_commands(&mut self, slot: usize, image: u32) -> RenderResult<()>;
    fn write_uniforms(&mut self, slot: usize) -> RenderResult<()>;
    fn submit(&mut self, slot: usize) -> RenderResult<()>;
    fn present(&mut self, slot: usize, image: u32) -> RenderResult<PresentOutcome>;

    /// Rebuild swapchain and everything sized to it. Only called with a
    /// non-zero framebuffer.
    fn rebuild_swapchain(&mut self) -> RenderResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Fence waited on (or never submitted); free to record
    Idle,
    Acquiring,
    Recording,
    /// On the GPU until the next fence wait on this slot
    Submitted,
    Presenting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// Presented, then the swapchain was rebuilt (or the rebuild deferred)
    Recreated,
    /// Nothing submitted this call
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecreateOutcome {
    Rebuilt,
    /// Framebuffer is zero-area (minimized); retried on the next frame
    Deferred,
}

pub struct FrameOrchestrator {
    slots: FrameRing<SlotState>,
    framebuffer_resized: bool,
    recreate_pending: bool,
}

impl FrameOrchestrator {
    /// `frames_in_flight` is clamped to at least one
    pub fn new(frames_in_flight: usize) -> Self {
        Self {
            slots: FrameRing::filled(SlotState::Idle, frames_in_flight),
            framebuffer_resized: false,
            recreate_pending: false,
        }
    }

    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    pub fn current_slot(&self) -> usize {
        self.slots.current_index()
    }

    pub fn slot_state(&self, slot: usize) -> Option<SlotState> {
        self.slots.get(slot).copied()
    }

    /// Slots whose last submission has not been waited on yet
    pub fn slots_in_flight(&self) -> usize {
        self.slots
            .iter()
            .filter(|&&state| state == SlotState::Submitted)
            .count()
    }

    /// Window reported a new size; the swapchain is rebuilt after the next present
    pub fn notify_resized(&mut self) {
        self.framebuffer_resized = true;
    }

    /// A rebuild is waiting for a non-zero framebuffer
    pub fn is_suspended(&self) -> bool {
        self.recreate_pending
    }

    /// Rebuild unless the framebuffer is zero-area, in which case the rebuild
    /// is remembered and retried by the next `draw_frame`.
    pub fn recreate(&mut self, backend: &mut impl FrameBackend) -> RenderResult<RecreateOutcome> {
        let (width, height) = backend.framebuffer_size();
        if width == 0 || height == 0 {
            if !self.recreate_pending {
                log::debug!("Framebuffer is zero-sized, deferring swapchain rebuild");
            }
            self.recreate_pending = true;
            return Ok(RecreateOutcome::Deferred);
        }

        log::info!("Recreating swapchain at {}x{}", width, height);
        backend.rebuild_swapchain()?;
        self.recreate_pending = false;
        // The rebuild already used the latest size
        self.framebuffer_resized = false;
        Ok(RecreateOutcome::Rebuilt)
    }

    pub fn draw_frame(&mut self, backend: &mut impl FrameBackend) -> RenderResult<FrameOutcome> {
        if self.recreate_pending && self.recreate(backend)? == RecreateOutcome::Deferred {
            return Ok(FrameOutcome::Skipped);
        }

        let slot = self.slots.current_index();

        backend.wait_for_slot(slot)?;
        *self.slots.current_mut() = SlotState::Acquiring;
        let image = match backend.acquire_image(slot)? {
            AcquireOutcome::Ready { index, .. } => index,
            AcquireOutcome::OutOfDate => {
                // Fence stays signaled, so the next wait on this slot returns
                *self.slots.current_mut() = SlotState::Idle;
                self.recreate(backend)?;
                return Ok(FrameOutcome::Skipped);
            }
        };

        backend.reset_slot_fence(slot)?;

        *self.slots.current_mut() = SlotState::Recording;
        backend.record_commands(slot, image)?;
        backend.write_uniforms(slot)?;

        backend.submit(slot)?;
        *self.slots.current_mut() = SlotState::Presenting;
        let presented = backend.present(slot, image)?;
        // Stays in flight until the fence wait when the ring comes back around
        *self.slots.current_mut() = SlotState::Submitted;

        let outcome = if presented == PresentOutcome::Stale || self.framebuffer_resized {
            self.framebuffer_resized = false;
            self.recreate(backend)?;
            FrameOutcome::Recreated
        } else {
            FrameOutcome::Presented
        };

        self.slots.advance();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_in_flight_clamped() {
        assert_eq!(FrameOrchestrator::new(0).frames_in_flight(), 1);
        assert_eq!(FrameOrchestrator::new(3).frames_in_flight(), 3);
    }

    #[test]
    fn test_fresh_slots_idle() {
        let orchestrator = FrameOrchestrator::new(2);
        assert_eq!(orchestrator.current_slot(), 0);
        assert_eq!(orchestrator.slot_state(1), Some(SlotState::Idle));
        assert_eq!(orchestrator.slot_state(2), None);
        assert!(!orchestrator.is_suspended());
        assert_eq!(orchestrator.slots_in_flight(), 0);
    }
}
