pub mod app;
pub mod harness;
pub mod loader;
pub mod orchestrator;
pub mod shared;
pub mod worker;

pub use harness::{Harness, Wiring};
pub use orchestrator::{Failure, FailureKind, ForegroundEvent, Orchestrator, Phase, Surface};
