use crate::app::action::Action;
use crate::app::ui::error::ErrorInfo;
use crate::orchestrator::FailureKind;

/// Terminal screen once startup or the machine has failed
pub fn ui(egui_ctx: &egui::Context, info: &ErrorInfo, actions: &mut Vec<Action>) {
    egui::TopBottomPanel::bottom("error_actions").show(egui_ctx, |ui| {
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui.button("Copy report").clicked() {
                egui_ctx.copy_text(info.report());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Quit").clicked() {
                    actions.push(Action::Quit);
                }
            });
        });
        ui.add_space(6.0);
    });

    egui::CentralPanel::default().show(egui_ctx, |ui| {
        let accent = match info.kind {
            FailureKind::Resources => ui.visuals().warn_fg_color,
            FailureKind::Machine | FailureKind::Harness => ui.visuals().error_fg_color,
        };

        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.heading(egui::RichText::new(info.headline).color(accent));
            ui.add_space(6.0);
            ui.label(egui::RichText::new(info.hint).color(ui.visuals().weak_text_color()));
        });

        ui.add_space(16.0);
        egui::CollapsingHeader::new("Details")
            .default_open(info.kind != FailureKind::Harness)
            .show(ui, |ui| {
                egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    ui.label(egui::RichText::new(&info.details).monospace());
                });
            });
    });
}
