//! Raw device events to logical controls.
//!
//! The worker never sees raw key names or pointer coordinates; everything
//! crossing the thread boundary is a [`Signal`] built here.

/// Fixed scroll magnitude sent for every wheel notch or rotary step
pub const SCROLL_STEP: f32 = 2.0;

/// Rotary quantization step (360° / 36)
pub const ROTARY_STEP_DEGREES: f32 = 360.0 / 36.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Control {
    Up,
    Down,
    Left,
    Right,
    Action,
    Hold,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::Up,
        Control::Down,
        Control::Left,
        Control::Right,
        Control::Action,
        Control::Hold,
    ];

    /// Maps a (case-sensitive) key name to its control
    pub fn from_key(key: &str) -> Option<Control> {
        match key {
            "ArrowUp" => Some(Control::Up),
            "ArrowDown" => Some(Control::Down),
            "ArrowLeft" => Some(Control::Left),
            "ArrowRight" => Some(Control::Right),
            "Enter" => Some(Control::Action),
            "H" => Some(Control::Hold),
            _ => None,
        }
    }

    /// Key name that produces this control
    pub fn key_name(self) -> &'static str {
        match self {
            Control::Up => "ArrowUp",
            Control::Down => "ArrowDown",
            Control::Left => "ArrowLeft",
            Control::Right => "ArrowRight",
            Control::Action => "Enter",
            Control::Hold => "H",
        }
    }
}

/// Translated input, ready to be wrapped in an envelope
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Signal {
    KeyDown(Control),
    KeyUp(Control),
    Scroll { dx: f32, dy: f32 },
}

/// Physical events as the display surface reports them
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    KeyDown(String),
    KeyUp(String),
    /// Vertical wheel/trackpad delta
    Wheel { delta_y: f32 },
    /// Pointer coordinates are in the rotary control's local space
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    PointerLeave,
    /// On-screen button standing in for `Enter`
    SecondaryButton { pressed: bool },
}

/// Scroll direction only depends on the sign; magnitude is fixed
pub fn wheel_scroll(delta_y: f32) -> Signal {
    if delta_y < 0.0 {
        Signal::Scroll {
            dx: 0.0,
            dy: SCROLL_STEP,
        }
    } else {
        Signal::Scroll {
            dx: 0.0,
            dy: -SCROLL_STEP,
        }
    }
}

/// Simulated click wheel driven by pointer drags.
///
/// Hit region is the annulus between `inner_radius` and `outer_radius` around
/// `center`. Screen y grows downwards, so increasing angles run clockwise.
#[derive(Debug, Clone)]
pub struct RotaryControl {
    center: (f32, f32),
    inner_radius: f32,
    outer_radius: f32,
    pressed: bool,
    last_angle: f32,
}

impl RotaryControl {
    pub fn new(center: (f32, f32), inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
            pressed: false,
            last_angle: 0.0,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let distance = (x - self.center.0).hypot(y - self.center.1);
        distance >= self.inner_radius && distance <= self.outer_radius
    }

    /// Angle of `(x, y)` around the center, in `[0, 360)`
    pub fn angle_at(&self, x: f32, y: f32) -> f32 {
        let angle = (y - self.center.1).atan2(x - self.center.0).to_degrees();
        angle.rem_euclid(360.0)
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    #[inline]
    pub fn last_angle(&self) -> f32 {
        self.last_angle
    }

    /// Returns whether the press landed on the control
    pub fn press(&mut self, x: f32, y: f32) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        self.pressed = true;
        self.last_angle = self.angle_at(x, y);
        true
    }

    pub fn release(&mut self) {
        self.pressed = false;
    }

    /// Leaving the hit region, the dead center included, disarms the control
    pub fn track(&mut self, x: f32, y: f32) -> Option<Signal> {
        if !self.contains(x, y) {
            self.release();
            return None;
        }
        let angle = self.angle_at(x, y);
        self.track_angle(angle)
    }

    /// Emits a scroll once the wheel has turned more than one step since the
    /// last emission. The reference angle only moves on emission.
    pub fn track_angle(&mut self, angle: f32) -> Option<Signal> {
        if !self.pressed {
            return None;
        }

        // shortest signed difference, so 355° -> 5° is +10° rather than -350°
        let delta = (angle - self.last_angle + 540.0).rem_euclid(360.0) - 180.0;
        if delta.abs() <= ROTARY_STEP_DEGREES {
            return None;
        }

        self.last_angle = angle.rem_euclid(360.0);
        let dy = if delta > 0.0 { -SCROLL_STEP } else { SCROLL_STEP };
        Some(Signal::Scroll { dx: 0.0, dy })
    }
}

#[derive(Debug, Default)]
pub struct InputTranslator {
    rotary: Option<RotaryControl>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rotary(mut self, rotary: RotaryControl) -> Self {
        self.rotary = Some(rotary);
        self
    }

    pub fn rotary(&self) -> Option<&RotaryControl> {
        self.rotary.as_ref()
    }

    pub fn translate(&mut self, raw: &RawInput) -> Option<Signal> {
        match raw {
            RawInput::KeyDown(key) => Control::from_key(key).map(Signal::KeyDown),
            RawInput::KeyUp(key) => Control::from_key(key).map(Signal::KeyUp),
            RawInput::Wheel { delta_y } => Some(wheel_scroll(*delta_y)),
            RawInput::PointerDown { x, y } => {
                if let Some(rotary) = self.rotary.as_mut() {
                    rotary.press(*x, *y);
                }
                None
            }
            RawInput::PointerMove { x, y } => self.rotary.as_mut()?.track(*x, *y),
            RawInput::PointerUp | RawInput::PointerLeave => {
                if let Some(rotary) = self.rotary.as_mut() {
                    rotary.release();
                }
                None
            }
            RawInput::SecondaryButton { pressed: true } => Some(Signal::KeyDown(Control::Action)),
            RawInput::SecondaryButton { pressed: false } => Some(Signal::KeyUp(Control::Action)),
        }
    }
}
