//! Contract of the emulated machine the harness drives.
//!
//! The harness knows nothing about what is being emulated. A core plugs in by
//! implementing [`MachineFactory`]; the factory is moved onto the worker thread
//! and everything it builds stays there.

use crate::frame::{Frame, FrameError};
use crate::input::Control;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("failed to load machine core: {0}")]
    Load(String),

    #[error("failed to construct machine: {0}")]
    Construct(String),

    #[error("fatal error while running: {0}")]
    Run(String),

    #[error("machine produced a bad frame: {0}")]
    BadFrame(#[from] FrameError),
}

pub trait Machine {
    /// Current display contents
    fn get_frame(&mut self) -> Frame;

    /// Executes `cycles` instruction cycles
    fn run(&mut self, cycles: usize) -> Result<(), MachineError>;
}

/// Control handle taken from a machine when it is built
pub trait Controls {
    fn on_keydown(&mut self, control: Control);
    fn on_keyup(&mut self, control: Control);
    fn on_scroll(&mut self, dx: f32, dy: f32);
}

pub trait MachineFactory: Send + 'static {
    type Machine: Machine;
    type Controls: Controls;

    /// Runs once on the worker thread before it announces itself ready
    fn load(&mut self) -> Result<(), MachineError> {
        Ok(())
    }

    fn construct(
        &mut self,
        bootloader: Vec<u8>,
        disk: Vec<u8>,
    ) -> Result<(Self::Machine, Self::Controls), MachineError>;
}
