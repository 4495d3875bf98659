use crate::orchestrator::{Phase, Surface};
use crate::shared::frame_slot::FrameSlotHandle;
use harness_core::prelude::*;

/// Surface backed by the egui window: frames go through the slot and the
/// display thread is woken to draw them.
pub struct SlotSurface {
    slot: FrameSlotHandle,
    egui_ctx: egui::Context,
}

impl SlotSurface {
    pub fn new(slot: FrameSlotHandle, egui_ctx: egui::Context) -> Self {
        Self { slot, egui_ctx }
    }
}

impl Surface for SlotSurface {
    fn paint(&mut self, frame: Frame) {
        self.slot.publish(frame);
        self.egui_ctx.request_repaint();
    }

    fn show_phase(&mut self, phase: &Phase) {
        self.slot.set_phase(phase);
        self.egui_ctx.request_repaint();
    }
}
