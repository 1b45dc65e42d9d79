// Frame loop state machine driven against a scripted backend

use std::collections::VecDeque;

use tutorial_renderer::backend::{AcquireOutcome, PresentOutcome};
use tutorial_renderer::renderer::{
    FrameBackend, FrameOrchestrator, FrameOutcome, RecreateOutcome, SlotState,
};
use tutorial_renderer::RenderResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Wait(usize),
    Acquire(usize),
    ResetFence(usize),
    Record(usize, u32),
    Uniforms(usize),
    Submit(usize),
    Present(usize, u32),
    Rebuild,
}

/// Pretends to be the GPU. Submitted work only completes when the CPU waits
/// on its fence, so every frame stays in flight as long as it possibly can.
struct MockBackend {
    calls: Vec<Call>,
    size: (u32, u32),
    image_count: u32,
    next_image: u32,
    acquire_script: VecDeque<AcquireOutcome>,
    present_script: VecDeque<PresentOutcome>,
    fence_signaled: Vec<bool>,
    /// Slot has a submission the GPU has not finished
    pending: Vec<bool>,
    /// Submissions minus completions
    in_flight: usize,
    max_in_flight: usize,
}

impl MockBackend {
    fn new(slots: usize) -> Self {
        Self {
            calls: Vec::new(),
            size: (800, 600),
            image_count: 3,
            next_image: 0,
            acquire_script: VecDeque::new(),
            present_script: VecDeque::new(),
            fence_signaled: vec![true; slots],
            pending: vec![false; slots],
            in_flight: 0,
            max_in_flight: 0,
        }
    }

    fn count(&self, call: Call) -> usize {
        self.calls.iter().filter(|&&c| c == call).count()
    }

    fn rebuilds(&self) -> usize {
        self.count(Call::Rebuild)
    }

    fn submits(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Submit(_)))
            .count()
    }
}

impl FrameBackend for MockBackend {
    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn wait_for_slot(&mut self, slot: usize) -> RenderResult<()> {
        // Blocking here lets the GPU finish this slot's submission
        if self.pending[slot] {
            self.pending[slot] = false;
            self.fence_signaled[slot] = true;
            self.in_flight -= 1;
        }
        assert!(
            self.fence_signaled[slot],
            "slot {} fence was reset without a submission, the wait would never return",
            slot
        );
        self.calls.push(Call::Wait(slot));
        Ok(())
    }

    fn acquire_image(&mut self, slot: usize) -> RenderResult<AcquireOutcome> {
        self.calls.push(Call::Acquire(slot));
        if let Some(outcome) = self.acquire_script.pop_front() {
            return Ok(outcome);
        }
        let index = self.next_image;
        self.next_image = (self.next_image + 1) % self.image_count;
        Ok(AcquireOutcome::Ready {
            index,
            suboptimal: false,
        })
    }

    fn reset_slot_fence(&mut self, slot: usize) -> RenderResult<()> {
        self.fence_signaled[slot] = false;
        self.calls.push(Call::ResetFence(slot));
        Ok(())
    }

    fn record_commands(&mut self, slot: usize, image: u32) -> RenderResult<()> {
        assert!(
            !self.pending[slot],
            "slot {} recorded while the GPU still uses its command buffer",
            slot
        );
        self.calls.push(Call::Record(slot, image));
        Ok(())
    }

    fn write_uniforms(&mut self, slot: usize) -> RenderResult<()> {
        self.calls.push(Call::Uniforms(slot));
        Ok(())
    }

    fn submit(&mut self, slot: usize) -> RenderResult<()> {
        self.pending[slot] = true;
        self.in_flight += 1;
        self.max_in_flight = self.max_in_flight.max(self.in_flight);
        self.calls.push(Call::Submit(slot));
        Ok(())
    }

    fn present(&mut self, slot: usize, image: u32) -> RenderResult<PresentOutcome> {
        self.calls.push(Call::Present(slot, image));
        Ok(self
            .present_script
            .pop_front()
            .unwrap_or(PresentOutcome::Presented))
    }

    fn rebuild_swapchain(&mut self) -> RenderResult<()> {
        assert!(self.size.0 > 0 && self.size.1 > 0, "rebuild with a zero-area framebuffer");
        self.calls.push(Call::Rebuild);
        Ok(())
    }
}

#[test]
fn steady_state_frame_order() {
    let mut backend = MockBackend::new(2);
    let mut orchestrator = FrameOrchestrator::new(2);

    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Presented);

    assert_eq!(
        backend.calls,
        vec![
            Call::Wait(0),
            Call::Acquire(0),
            Call::ResetFence(0),
            Call::Record(0, 0),
            Call::Uniforms(0),
            Call::Submit(0),
            Call::Present(0, 0),
        ]
    );
    assert_eq!(orchestrator.current_slot(), 1);
}

#[test]
fn slots_rotate_round_robin() {
    for frames_in_flight in 1..=4 {
        let mut backend = MockBackend::new(frames_in_flight);
        let mut orchestrator = FrameOrchestrator::new(frames_in_flight);

        for frame in 0..10 {
            assert_eq!(orchestrator.current_slot(), frame % frames_in_flight);
            orchestrator.draw_frame(&mut backend).unwrap();
        }
    }
}

#[test]
fn in_flight_frames_bounded_by_slot_count() {
    for frames_in_flight in 1..=3 {
        let mut backend = MockBackend::new(frames_in_flight);
        let mut orchestrator = FrameOrchestrator::new(frames_in_flight);

        for _ in 0..10 {
            orchestrator.draw_frame(&mut backend).unwrap();
            assert!(backend.in_flight <= frames_in_flight);
            assert_eq!(orchestrator.slots_in_flight(), backend.in_flight);
        }

        assert_eq!(backend.submits(), 10);
        // The GPU never finishes early, so the bound is actually reached
        assert_eq!(backend.max_in_flight, frames_in_flight);
    }
}

#[test]
fn frame_after_full_ring_records_only_after_first_slot_wait() {
    for frames_in_flight in 1..=3 {
        let mut backend = MockBackend::new(frames_in_flight);
        let mut orchestrator = FrameOrchestrator::new(frames_in_flight);

        for _ in 0..=frames_in_flight {
            orchestrator.draw_frame(&mut backend).unwrap();
        }

        let first_submit = backend
            .calls
            .iter()
            .position(|&c| c == Call::Submit(0))
            .unwrap();
        let second_wait = first_submit
            + backend.calls[first_submit..]
                .iter()
                .position(|&c| c == Call::Wait(0))
                .unwrap();
        let second_record = backend
            .calls
            .iter()
            .rposition(|c| matches!(c, Call::Record(0, _)))
            .unwrap();

        assert!(first_submit < second_wait);
        assert!(second_wait < second_record);
        assert_eq!(backend.max_in_flight, frames_in_flight);
    }
}

#[test]
fn slot_reports_submitted_until_waited() {
    let mut backend = MockBackend::new(2);
    let mut orchestrator = FrameOrchestrator::new(2);

    orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(orchestrator.slot_state(0), Some(SlotState::Submitted));
    assert_eq!(orchestrator.slot_state(1), Some(SlotState::Idle));

    orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(orchestrator.slot_state(1), Some(SlotState::Submitted));
    assert_eq!(orchestrator.slots_in_flight(), 2);

    // An out-of-date acquire on slot 0 waits on its fence but submits nothing
    backend.acquire_script.push_back(AcquireOutcome::OutOfDate);
    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Skipped);
    assert_eq!(orchestrator.slot_state(0), Some(SlotState::Idle));
    assert_eq!(orchestrator.slots_in_flight(), 1);
}

#[test]
fn out_of_date_acquire_skips_without_resetting_fence() {
    let mut backend = MockBackend::new(2);
    backend.acquire_script.push_back(AcquireOutcome::OutOfDate);
    let mut orchestrator = FrameOrchestrator::new(2);

    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Skipped);
    assert_eq!(
        backend.calls,
        vec![Call::Wait(0), Call::Acquire(0), Call::Rebuild]
    );
    // Same slot is retried; its fence is still signaled so the wait returns
    assert_eq!(orchestrator.current_slot(), 0);

    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Presented);
    assert_eq!(backend.count(Call::ResetFence(0)), 1);
}

#[test]
fn suboptimal_acquire_still_draws() {
    let mut backend = MockBackend::new(2);
    backend.acquire_script.push_back(AcquireOutcome::Ready {
        index: 2,
        suboptimal: true,
    });
    let mut orchestrator = FrameOrchestrator::new(2);

    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Presented);
    assert_eq!(backend.count(Call::Record(0, 2)), 1);
    assert_eq!(backend.rebuilds(), 0);
}

#[test]
fn stale_present_rebuilds_once() {
    let mut backend = MockBackend::new(2);
    backend.present_script.push_back(PresentOutcome::Stale);
    let mut orchestrator = FrameOrchestrator::new(2);

    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Recreated);
    assert_eq!(backend.rebuilds(), 1);
    assert_eq!(orchestrator.current_slot(), 1);

    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Presented);
    assert_eq!(backend.rebuilds(), 1);
}

#[test]
fn resize_flag_rebuilds_after_present() {
    let mut backend = MockBackend::new(2);
    let mut orchestrator = FrameOrchestrator::new(2);

    orchestrator.notify_resized();
    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Recreated);

    let present = backend
        .calls
        .iter()
        .position(|c| matches!(c, Call::Present(..)))
        .unwrap();
    let rebuild = backend.calls.iter().position(|&c| c == Call::Rebuild).unwrap();
    assert!(present < rebuild);

    // Flag was consumed
    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Presented);
    assert_eq!(backend.rebuilds(), 1);
}

#[test]
fn zero_sized_framebuffer_defers_until_restored() {
    let mut backend = MockBackend::new(2);
    let mut orchestrator = FrameOrchestrator::new(2);

    // Minimized: the resize arrives with a zero-area framebuffer
    backend.size = (0, 0);
    orchestrator.notify_resized();
    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Recreated);
    assert!(orchestrator.is_suspended());
    assert_eq!(backend.rebuilds(), 0);

    let submits = backend.submits();
    for _ in 0..5 {
        assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Skipped);
    }
    assert_eq!(backend.submits(), submits);
    assert_eq!(backend.rebuilds(), 0);

    // Restored; the window reports the new size like any other resize
    backend.size = (1024, 768);
    orchestrator.notify_resized();
    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Presented);
    assert!(!orchestrator.is_suspended());
    assert_eq!(backend.rebuilds(), 1);

    orchestrator.draw_frame(&mut backend).unwrap();
    assert_eq!(backend.rebuilds(), 1);
}

#[test]
fn resize_during_out_of_date_rebuild_is_not_repeated() {
    let mut backend = MockBackend::new(2);
    let mut orchestrator = FrameOrchestrator::new(2);

    orchestrator.notify_resized();
    backend.acquire_script.push_back(AcquireOutcome::OutOfDate);
    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Skipped);
    assert_eq!(backend.rebuilds(), 1);

    assert_eq!(orchestrator.draw_frame(&mut backend).unwrap(), FrameOutcome::Presented);
    assert_eq!(backend.rebuilds(), 1);
}

#[test]
fn explicit_recreate_respects_zero_area() {
    let mut backend = MockBackend::new(1);
    let mut orchestrator = FrameOrchestrator::new(1);

    backend.size = (640, 0);
    assert_eq!(orchestrator.recreate(&mut backend).unwrap(), RecreateOutcome::Deferred);
    assert!(orchestrator.is_suspended());

    backend.size = (640, 480);
    assert_eq!(orchestrator.recreate(&mut backend).unwrap(), RecreateOutcome::Rebuilt);
    assert!(!orchestrator.is_suspended());
    assert_eq!(backend.rebuilds(), 1);
}
