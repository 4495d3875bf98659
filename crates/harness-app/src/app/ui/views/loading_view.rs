use crate::orchestrator::Phase;
use egui::Ui;

pub fn ui(egui_ctx: &egui::Context, phase: &Phase) {
    let detail = match phase {
        Phase::Starting => "Waiting for the machine core",
        Phase::Loading => "Fetching bootloader and disk image",
        Phase::Initializing => "Booting",
        Phase::Running | Phase::Failed(_) => "",
    };

    egui::CentralPanel::default().show(egui_ctx, |_| {
        egui::Area::new("loading_panel".into())
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(egui_ctx, |ui: &mut Ui| {
                egui::Frame::group(ui.style())
                    .inner_margin(egui::Margin::symmetric(32, 32))
                    .corner_radius(egui::CornerRadius::same(12))
                    .show(ui, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.heading("Starting");
                            ui.add_space(12.0);
                            ui.spinner();
                            ui.add_space(12.0);
                            ui.label(
                                egui::RichText::new(detail)
                                    .color(ui.visuals().weak_text_color()),
                            );
                        });
                    });
            });
    });
}
