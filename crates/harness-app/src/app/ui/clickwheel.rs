use crate::app::action::Action;
use harness_core::prelude::*;

pub const WHEEL_OUTER_RADIUS: f32 = 90.0;
pub const WHEEL_INNER_RADIUS: f32 = 32.0;

/// Rotary control matching the painted wheel, in the widget's local space
pub fn clickwheel_rotary() -> RotaryControl {
    RotaryControl::new(
        (WHEEL_OUTER_RADIUS, WHEEL_OUTER_RADIUS),
        WHEEL_INNER_RADIUS,
        WHEEL_OUTER_RADIUS,
    )
}

/// Whether a widget-local point lies on the ring between the two radii
pub fn on_ring(local: egui::Vec2) -> bool {
    let distance = (local - egui::vec2(WHEEL_OUTER_RADIUS, WHEEL_OUTER_RADIUS)).length();
    (WHEEL_INNER_RADIUS..=WHEEL_OUTER_RADIUS).contains(&distance)
}

/// On-screen click wheel with a centre button.
///
/// Only reports pointer activity; turning it into scrolls is the translator's job.
#[derive(Debug, Default)]
pub struct ClickWheel {
    /// Pointer went down on the widget and is still held
    held: bool,
    /// Held and still on the ring; a drag that strays off stays disarmed
    /// until the next press
    dragging: bool,
    button_down: bool,
}

impl ClickWheel {
    pub fn ui(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let side = 2.0 * WHEEL_OUTER_RADIUS;
        let (rect, wheel) = ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::drag());
        let button_rect = egui::Rect::from_center_size(
            rect.center(),
            egui::vec2(2.0 * WHEEL_INNER_RADIUS, 2.0 * WHEEL_INNER_RADIUS),
        );
        let button = ui.interact(button_rect, wheel.id.with("centre"), egui::Sense::click());

        let to_local = |pos: egui::Pos2| pos - rect.min;
        let down = wheel.is_pointer_button_down_on();
        let moving = ui.input(|i| i.pointer.is_moving());

        let pos = wheel.interact_pointer_pos().map(to_local);
        match (self.held, down, pos) {
            (false, true, Some(local)) => {
                actions.push(Action::Input(RawInput::PointerDown {
                    x: local.x,
                    y: local.y,
                }));
                self.held = true;
                self.dragging = on_ring(local);
            }
            (true, true, Some(local)) if self.dragging && moving => {
                if on_ring(local) {
                    actions.push(Action::Input(RawInput::PointerMove {
                        x: local.x,
                        y: local.y,
                    }));
                } else {
                    actions.push(Action::Input(RawInput::PointerLeave));
                    self.dragging = false;
                }
            }
            (true, false, _) => {
                if self.dragging {
                    actions.push(Action::Input(RawInput::PointerUp));
                }
                self.held = false;
                self.dragging = false;
            }
            _ => {}
        }
        if self.dragging && !wheel.contains_pointer() {
            actions.push(Action::Input(RawInput::PointerLeave));
            self.dragging = false;
        }

        let pressed = button.is_pointer_button_down_on();
        if pressed != self.button_down {
            self.button_down = pressed;
            actions.push(Action::Input(RawInput::SecondaryButton { pressed }));
        }

        self.paint(ui, rect);
    }

    fn paint(&self, ui: &egui::Ui, rect: egui::Rect) {
        let painter = ui.painter_at(rect);
        let visuals = ui.visuals();
        let center = rect.center();
        let ring = if self.dragging {
            visuals.widgets.active.bg_fill
        } else {
            visuals.widgets.inactive.bg_fill
        };
        let button = if self.button_down {
            visuals.widgets.active.weak_bg_fill
        } else {
            visuals.panel_fill
        };
        let text = visuals.text_color();

        painter.circle_filled(center, WHEEL_OUTER_RADIUS, ring);
        painter.circle_filled(center, WHEEL_INNER_RADIUS, button);

        let font = egui::FontId::proportional(12.0);
        let label_radius = (WHEEL_OUTER_RADIUS + WHEEL_INNER_RADIUS) / 2.0;
        for (offset, label) in [
            (egui::vec2(0.0, -label_radius), "MENU"),
            (egui::vec2(label_radius, 0.0), ">>"),
            (egui::vec2(-label_radius, 0.0), "<<"),
            (egui::vec2(0.0, label_radius), ">||"),
        ] {
            painter.text(
                center + offset,
                egui::Align2::CENTER_CENTER,
                label,
                font.clone(),
                text,
            );
        }
    }
}
