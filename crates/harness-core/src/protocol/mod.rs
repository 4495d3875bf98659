//! Envelope protocol spoken across the worker boundary.
//!
//! The wire form ([`Envelope`]) is string-tagged and untrusted. Each side
//! decodes it into a closed enum: the worker into [`Request`], the foreground
//! into [`Reply`].

pub mod envelope;
pub mod reply;
pub mod request;

pub use envelope::{Envelope, Kind, Payload};
pub use reply::Reply;
pub use request::{RawQuantum, Request};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Missing `kind` (or, for requests, missing `data`)
    #[error("malformed envelope (kind: {})", .0.kind_str())]
    Malformed(Envelope),

    /// Well-formed, but not something this side understands
    #[error("unrecognized envelope kind {:?}", .0.kind_str())]
    Unrecognized(Envelope),
}
