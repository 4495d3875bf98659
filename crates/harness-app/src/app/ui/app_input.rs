use harness_core::prelude::*;

/// DOM-style key name for the keys the machine cares about
pub fn key_name(key: egui::Key, shift: bool) -> Option<&'static str> {
    let name = match key {
        egui::Key::ArrowDown => "ArrowDown",
        egui::Key::ArrowUp => "ArrowUp",
        egui::Key::ArrowLeft => "ArrowLeft",
        egui::Key::ArrowRight => "ArrowRight",
        egui::Key::Enter => "Enter",
        egui::Key::H if shift => "H",
        egui::Key::H => "h",
        _ => return None,
    };
    Some(name)
}

/// Keyboard and wheel events of this frame, as raw input.
///
/// Key repeats are skipped: a held key is one press.
pub fn collect_input(ctx: &egui::Context) -> Vec<RawInput> {
    if ctx.wants_keyboard_input() {
        // a text field has focus, keys belong to it
        return ctx.input(|i| wheel_events(&i.events).collect());
    }

    ctx.input(|i| {
        let mut raw = Vec::new();
        for event in &i.events {
            if let egui::Event::Key {
                key,
                pressed,
                repeat: false,
                modifiers,
                ..
            } = event
                && let Some(name) = key_name(*key, modifiers.shift)
            {
                raw.push(if *pressed {
                    RawInput::KeyDown(name.to_string())
                } else {
                    RawInput::KeyUp(name.to_string())
                });
            }
        }
        raw.extend(wheel_events(&i.events));
        raw
    })
}

fn wheel_events(events: &[egui::Event]) -> impl Iterator<Item = RawInput> + '_ {
    events.iter().filter_map(|event| match event {
        egui::Event::MouseWheel { delta, .. } if delta.y != 0.0 => Some(wheel_input(delta.y)),
        _ => None,
    })
}

/// egui reports how the content should move, the opposite sign of a DOM deltaY
pub fn wheel_input(egui_delta_y: f32) -> RawInput {
    RawInput::Wheel {
        delta_y: -egui_delta_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mapped_key_reaches_a_control() {
        let keys = [
            (egui::Key::ArrowDown, false),
            (egui::Key::ArrowUp, false),
            (egui::Key::ArrowLeft, false),
            (egui::Key::ArrowRight, false),
            (egui::Key::Enter, false),
            (egui::Key::H, true),
        ];
        let mut controls: Vec<Control> = keys
            .iter()
            .filter_map(|&(key, shift)| key_name(key, shift))
            .filter_map(Control::from_key)
            .collect();
        controls.dedup();
        assert_eq!(controls.len(), Control::ALL.len());
    }

    #[test]
    fn lowercase_h_is_not_hold() {
        let name = key_name(egui::Key::H, false).unwrap();
        assert_eq!(Control::from_key(name), None);
        assert_eq!(key_name(egui::Key::Space, false), None);
    }

    #[test]
    fn wheel_down_is_a_positive_dom_delta() {
        assert_eq!(wheel_input(-1.0), RawInput::Wheel { delta_y: 1.0 });

        // and lands on the same scroll the browser wheel would produce
        let mut translator = InputTranslator::new();
        assert_eq!(
            translator.translate(&wheel_input(-1.0)),
            Some(Signal::Scroll { dx: 0.0, dy: -2.0 })
        );
    }
}
