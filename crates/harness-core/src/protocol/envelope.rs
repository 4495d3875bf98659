use crate::frame::Frame;
use crate::input::Control;

/// The closed set of message kinds
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Ready,
    Init,
    Frame,
    KeyDown,
    KeyUp,
    Scroll,
    Drive,
    CyclesPerTick,
    Unknown,
    Error,
}

impl Kind {
    pub const ALL: [Kind; 10] = [
        Kind::Ready,
        Kind::Init,
        Kind::Frame,
        Kind::KeyDown,
        Kind::KeyUp,
        Kind::Scroll,
        Kind::Drive,
        Kind::CyclesPerTick,
        Kind::Unknown,
        Kind::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Ready => "ready",
            Kind::Init => "init",
            Kind::Frame => "frame",
            Kind::KeyDown => "keydown",
            Kind::KeyUp => "keyup",
            Kind::Scroll => "scroll",
            Kind::Drive => "drive",
            Kind::CyclesPerTick => "cycles_per_tick",
            Kind::Unknown => "unknown",
            Kind::Error => "error",
        }
    }

    pub fn parse(tag: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope contents. Buffers are moved, never shared.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `{}`
    Empty,
    Init { bootloader: Vec<u8>, disk: Vec<u8> },
    Control(Control),
    Scroll { delta_x: f32, delta_y: f32 },
    Integer(i64),
    Text(String),
    Frame(Frame),
    Message(String),
}

impl Payload {
    /// Variant name, for logs that must not dump buffers
    pub fn shape(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Init { .. } => "init",
            Payload::Control(_) => "control",
            Payload::Scroll { .. } => "scroll",
            Payload::Integer(_) => "integer",
            Payload::Text(_) => "text",
            Payload::Frame(_) => "frame",
            Payload::Message(_) => "message",
        }
    }
}

/// Wire unit exchanged across the thread boundary.
///
/// Both fields are optional on purpose: the receiving side treats the wire as
/// untrusted and decodes into [`Request`](super::Request) /
/// [`Reply`](super::Reply), rejecting envelopes that lack either part.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub kind: Option<String>,
    pub data: Option<Payload>,
}

impl Envelope {
    pub fn new(kind: Kind, data: Payload) -> Self {
        Self {
            kind: Some(kind.as_str().to_string()),
            data: Some(data),
        }
    }

    /// Envelope with a free-form tag, for anything outside the closed set
    pub fn raw(kind: Option<&str>, data: Option<Payload>) -> Self {
        Self {
            kind: kind.map(str::to_string),
            data,
        }
    }

    pub fn kind_str(&self) -> &str {
        self.kind.as_deref().unwrap_or("<none>")
    }
}
