use crate::config::{CycleQuantum, QuantumError};
use crate::input::{Control, Signal};
use crate::protocol::DecodeError;
use crate::protocol::envelope::{Envelope, Kind, Payload};

/// Tuning value as it arrived; validated by whoever applies it
#[derive(Debug, Clone, PartialEq)]
pub enum RawQuantum {
    Integer(i64),
    Text(String),
}

impl RawQuantum {
    pub fn validate(&self) -> Result<CycleQuantum, QuantumError> {
        match self {
            RawQuantum::Integer(value) => CycleQuantum::from_integer(*value),
            RawQuantum::Text(text) => CycleQuantum::parse(text),
        }
    }
}

/// Foreground -> worker
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Init { bootloader: Vec<u8>, disk: Vec<u8> },
    Frame,
    KeyDown(Control),
    KeyUp(Control),
    Scroll { dx: f32, dy: f32 },
    Drive,
    CyclesPerTick(RawQuantum),
}

impl Request {
    pub fn kind(&self) -> Kind {
        match self {
            Request::Init { .. } => Kind::Init,
            Request::Frame => Kind::Frame,
            Request::KeyDown(_) => Kind::KeyDown,
            Request::KeyUp(_) => Kind::KeyUp,
            Request::Scroll { .. } => Kind::Scroll,
            Request::Drive => Kind::Drive,
            Request::CyclesPerTick(_) => Kind::CyclesPerTick,
        }
    }

    pub fn decode(envelope: Envelope) -> Result<Request, DecodeError> {
        let (tag, data) = match envelope {
            Envelope {
                kind: Some(tag),
                data: Some(data),
            } => (tag, data),
            malformed => return Err(DecodeError::Malformed(malformed)),
        };

        let request = match (Kind::parse(&tag), data) {
            (Some(Kind::Init), Payload::Init { bootloader, disk }) => {
                Request::Init { bootloader, disk }
            }
            (Some(Kind::Frame), _) => Request::Frame,
            (Some(Kind::KeyDown), Payload::Control(control)) => Request::KeyDown(control),
            (Some(Kind::KeyUp), Payload::Control(control)) => Request::KeyUp(control),
            (Some(Kind::Scroll), Payload::Scroll { delta_x, delta_y }) => Request::Scroll {
                dx: delta_x,
                dy: delta_y,
            },
            (Some(Kind::Drive), _) => Request::Drive,
            (Some(Kind::CyclesPerTick), Payload::Integer(value)) => {
                Request::CyclesPerTick(RawQuantum::Integer(value))
            }
            (Some(Kind::CyclesPerTick), Payload::Text(text)) => {
                Request::CyclesPerTick(RawQuantum::Text(text))
            }
            (_, data) => {
                return Err(DecodeError::Unrecognized(Envelope {
                    kind: Some(tag),
                    data: Some(data),
                }));
            }
        };
        Ok(request)
    }

    pub fn into_envelope(self) -> Envelope {
        let kind = self.kind();
        let data = match self {
            Request::Init { bootloader, disk } => Payload::Init { bootloader, disk },
            Request::Frame | Request::Drive => Payload::Empty,
            Request::KeyDown(control) | Request::KeyUp(control) => Payload::Control(control),
            Request::Scroll { dx, dy } => Payload::Scroll {
                delta_x: dx,
                delta_y: dy,
            },
            Request::CyclesPerTick(RawQuantum::Integer(value)) => Payload::Integer(value),
            Request::CyclesPerTick(RawQuantum::Text(text)) => Payload::Text(text),
        };
        Envelope::new(kind, data)
    }
}

impl From<Signal> for Request {
    fn from(signal: Signal) -> Self {
        match signal {
            Signal::KeyDown(control) => Request::KeyDown(control),
            Signal::KeyUp(control) => Request::KeyUp(control),
            Signal::Scroll { dx, dy } => Request::Scroll { dx, dy },
        }
    }
}
