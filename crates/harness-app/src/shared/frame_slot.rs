use crate::orchestrator::Phase;
use harness_core::prelude::*;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type FrameSlotHandle = Arc<FrameSlot>;

/// Hand-off point between the foreground loop and the display thread.
///
/// The foreground publishes, the display takes. Only the newest frame is kept:
/// a frame that is replaced before the display gets to it is simply dropped.
pub struct FrameSlot {
    latest: Mutex<Option<Frame>>,
    phase: Mutex<Phase>,
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // a panicked writer cannot leave a half-written frame behind, the swap is atomic
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FrameSlot {
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(None),
            phase: Mutex::new(Phase::Starting),
        }
    }

    pub fn handle() -> FrameSlotHandle {
        Arc::new(Self::new())
    }

    pub fn publish(&self, frame: Frame) {
        *lock(&self.latest) = Some(frame);
    }

    /// Newest unseen frame, if any
    pub fn take(&self) -> Option<Frame> {
        lock(&self.latest).take()
    }

    pub fn set_phase(&self, phase: &Phase) {
        *lock(&self.phase) = phase.clone();
    }

    pub fn phase(&self) -> Phase {
        lock(&self.phase).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{Failure, FailureKind};

    #[test]
    fn keeps_only_the_newest_frame() {
        let slot = FrameSlot::new();
        assert!(slot.take().is_none());

        slot.publish(Frame::blank(2, 2).unwrap());
        slot.publish(Frame::blank(4, 4).unwrap());
        assert_eq!(slot.take().map(|frame| frame.size()), Some([4, 4]));
        assert!(slot.take().is_none());
    }

    #[test]
    fn phase_is_shared_across_threads() {
        let slot = FrameSlot::handle();
        let writer = slot.clone();
        let failed = Phase::Failed(Failure::new(FailureKind::Machine, "boom"));
        let expected = failed.clone();
        std::thread::spawn(move || writer.set_phase(&failed))
            .join()
            .unwrap();
        assert_eq!(slot.phase(), expected);
    }
}
