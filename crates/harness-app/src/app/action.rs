use crate::app::viewer::ViewerApp;
use crate::orchestrator::ForegroundEvent;
use harness_core::prelude::*;

/// Things the views ask the app to do once the frame has been laid out
pub enum Action {
    Input(RawInput),
    SetCyclesPerTick(String),
    Quit,
}

impl ViewerApp {
    pub(crate) fn apply_actions(&mut self, egui_ctx: &egui::Context, actions: Vec<Action>) {
        for action in actions {
            self.apply_action(egui_ctx, action);
        }
    }

    pub(crate) fn apply_action(&mut self, egui_ctx: &egui::Context, action: Action) {
        match action {
            Action::Input(raw) => self.send(ForegroundEvent::Input(raw)),
            Action::SetCyclesPerTick(text) => self.send(ForegroundEvent::SetCyclesPerTick(text)),
            Action::Quit => egui_ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }
}
