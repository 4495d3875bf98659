//! Convenient imports for consumers of harness-core
//!
//! ```rust
//! use harness_core::prelude::*;
//! ```

// Machine contract
pub use crate::frame::{Frame, FrameError};
pub use crate::machine::{Controls, Machine, MachineError, MachineFactory};

// Protocol
pub use crate::protocol::{DecodeError, Envelope, Kind, Payload, RawQuantum, Reply, Request};

// Input
pub use crate::input::{Control, InputTranslator, RawInput, RotaryControl, Signal};

// Configuration
pub use crate::config::{CycleQuantum, HarnessConfig, QuantumError};

#[cfg(feature = "testing-utils")]
pub use crate::test_utils::*;
