use crate::frame::Frame;
use crate::protocol::DecodeError;
use crate::protocol::envelope::{Envelope, Kind, Payload};

/// Worker -> foreground
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ready,
    Init,
    Frame(Frame),
    Drive,
    /// Echo of a payload the worker could not place
    Unknown(Payload),
    /// The machine failed; the worker stops serving after sending this
    Error(String),
}

impl Reply {
    pub fn kind(&self) -> Kind {
        match self {
            Reply::Ready => Kind::Ready,
            Reply::Init => Kind::Init,
            Reply::Frame(_) => Kind::Frame,
            Reply::Drive => Kind::Drive,
            Reply::Unknown(_) => Kind::Unknown,
            Reply::Error(_) => Kind::Error,
        }
    }

    /// Replies only need a kind; acknowledgements carry no data
    pub fn decode(envelope: Envelope) -> Result<Reply, DecodeError> {
        let (tag, data) = match envelope {
            Envelope {
                kind: Some(tag),
                data,
            } => (tag, data),
            malformed => return Err(DecodeError::Malformed(malformed)),
        };

        let reply = match (Kind::parse(&tag), data) {
            (Some(Kind::Ready), _) => Reply::Ready,
            (Some(Kind::Init), _) => Reply::Init,
            (Some(Kind::Drive), _) => Reply::Drive,
            (Some(Kind::Frame), Some(Payload::Frame(frame))) => Reply::Frame(frame),
            (Some(Kind::Unknown), data) => Reply::Unknown(data.unwrap_or(Payload::Empty)),
            (Some(Kind::Error), Some(Payload::Message(message))) => Reply::Error(message),
            (Some(Kind::Error), _) => Reply::Error("unspecified worker failure".into()),
            (_, data) => {
                return Err(DecodeError::Unrecognized(Envelope {
                    kind: Some(tag),
                    data,
                }));
            }
        };
        Ok(reply)
    }

    pub fn into_envelope(self) -> Envelope {
        let kind = self.kind();
        let data = match self {
            Reply::Ready | Reply::Init | Reply::Drive => Payload::Empty,
            Reply::Frame(frame) => Payload::Frame(frame),
            Reply::Unknown(echo) => echo,
            Reply::Error(message) => Payload::Message(message),
        };
        Envelope::new(kind, data)
    }
}
