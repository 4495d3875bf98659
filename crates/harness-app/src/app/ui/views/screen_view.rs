use crate::app::action::Action;
use crate::app::ui::UiCtx;
use crate::app::ui::clickwheel::ClickWheel;
use eframe::epaint::ColorImage;
use eframe::epaint::textures::TextureOptions;
use harness_core::config::CycleQuantum;

pub struct ScreenView {
    wheel: ClickWheel,
    cycles_text: String,
    cycles_error: Option<String>,
}

impl ScreenView {
    pub fn new(cycles_per_tick: CycleQuantum) -> Self {
        ScreenView {
            wheel: ClickWheel::default(),
            cycles_text: cycles_per_tick.to_string(),
            cycles_error: None,
        }
    }

    pub fn ui(&mut self, egui_ctx: &egui::Context, ui_ctx: &mut UiCtx) {
        egui::TopBottomPanel::top("tuning_panel").show(egui_ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Cycles per tick");
                let field = ui.add(
                    egui::TextEdit::singleline(&mut self.cycles_text).desired_width(90.0),
                );
                let submitted =
                    field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if submitted || ui.button("Apply").clicked() {
                    match CycleQuantum::parse(&self.cycles_text) {
                        Ok(_) => {
                            self.cycles_error = None;
                            ui_ctx
                                .actions
                                .push(Action::SetCyclesPerTick(self.cycles_text.clone()));
                        }
                        Err(err) => self.cycles_error = Some(err.to_string()),
                    }
                }
                if let Some(err) = &self.cycles_error {
                    ui.colored_label(ui.visuals().error_fg_color, err);
                }
            });
        });

        egui::TopBottomPanel::bottom("wheel_panel")
            .resizable(false)
            .show(egui_ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    self.wheel.ui(ui, ui_ctx.actions);
                    ui.add_space(8.0);
                });
            });

        egui::CentralPanel::default().show(egui_ctx, |ui| {
            if let Some(frame) = ui_ctx.slot.take() {
                let color_image = ColorImage::from_rgba_unmultiplied(frame.size(), &frame.pixels);
                let tex = ui_ctx.texture.get_or_insert_with(|| {
                    ui.ctx().load_texture(
                        "machine_frame",
                        color_image.clone(),
                        TextureOptions::NEAREST,
                    )
                });
                tex.set(color_image, TextureOptions::NEAREST);
            }
            let Some(tex) = ui_ctx.texture.as_ref() else {
                ui.centered_and_justified(|ui| ui.spinner());
                return;
            };

            // Scale while maintaining aspect
            let avail = ui.available_size();
            let aspect = tex.aspect_ratio();
            let (w, h) = if avail.x / avail.y > aspect {
                (avail.y * aspect, avail.y)
            } else {
                (avail.x, avail.x / aspect)
            };

            ui.centered_and_justified(|ui| {
                ui.image((tex.id(), egui::vec2(w, h)));
            });
        });
    }
}
