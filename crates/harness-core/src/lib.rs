// Harness building blocks shared by the worker and the foreground
pub mod config;
pub mod frame;
pub mod input;
pub mod machine;
pub mod protocol;

#[cfg(any(test, feature = "testing-utils"))]
pub mod test_utils;

pub mod prelude;

// Re-exports
pub use config::{CycleQuantum, HarnessConfig};
pub use frame::Frame;
pub use input::{Control, InputTranslator, RawInput, Signal};
pub use machine::{Controls, Machine, MachineError, MachineFactory};
pub use protocol::{Envelope, Kind, Payload, Reply, Request};
