//! Scripted machine for exercising the harness without a real core.
//!
//! Every call the harness makes is appended to a shared [`CallLog`], which the
//! test keeps a clone of while the machine itself lives on the worker thread.

use crate::frame::Frame;
use crate::input::Control;
use crate::machine::{Controls, Machine, MachineError, MachineFactory};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum MachineCall {
    Load,
    Construct { bootloader: usize, disk: usize },
    GetFrame,
    Run(usize),
    KeyDown(Control),
    KeyUp(Control),
    Scroll(f32, f32),
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<MachineCall>>>);

impl CallLog {
    pub fn push(&self, call: MachineCall) {
        self.0.lock().unwrap().push(call);
    }

    pub fn snapshot(&self) -> Vec<MachineCall> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&MachineCall) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|call| pred(call)).count()
    }

    pub fn cycles_run(&self) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|call| match call {
                MachineCall::Run(cycles) => *cycles,
                _ => 0,
            })
            .sum()
    }
}

pub struct ScriptedFactory {
    width: usize,
    height: usize,
    log: CallLog,
    fail_load: Option<String>,
    fail_run_after: Option<usize>,
    truncate_frames: Option<usize>,
}

impl ScriptedFactory {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            log: CallLog::default(),
            fail_load: None,
            fail_run_after: None,
            truncate_frames: None,
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    pub fn failing_load(mut self, reason: &str) -> Self {
        self.fail_load = Some(reason.to_string());
        self
    }

    /// `run` fails once it has succeeded `runs` times
    pub fn failing_run_after(mut self, runs: usize) -> Self {
        self.fail_run_after = Some(runs);
        self
    }

    /// Frames keep their dimensions but only carry `bytes` of pixel data
    pub fn truncating_frames(mut self, bytes: usize) -> Self {
        self.truncate_frames = Some(bytes);
        self
    }
}

impl MachineFactory for ScriptedFactory {
    type Machine = ScriptedMachine;
    type Controls = ScriptedControls;

    fn load(&mut self) -> Result<(), MachineError> {
        self.log.push(MachineCall::Load);
        match &self.fail_load {
            Some(reason) => Err(MachineError::Load(reason.clone())),
            None => Ok(()),
        }
    }

    fn construct(
        &mut self,
        bootloader: Vec<u8>,
        disk: Vec<u8>,
    ) -> Result<(ScriptedMachine, ScriptedControls), MachineError> {
        self.log.push(MachineCall::Construct {
            bootloader: bootloader.len(),
            disk: disk.len(),
        });
        if bootloader.is_empty() || disk.is_empty() {
            return Err(MachineError::Construct("empty boot or disk image".into()));
        }

        let mut screen = Frame::blank(self.width, self.height)
            .map_err(|err| MachineError::Construct(err.to_string()))?;
        if let Some(bytes) = self.truncate_frames {
            screen.pixels.truncate(bytes);
        }

        let machine = ScriptedMachine {
            screen,
            log: self.log.clone(),
            runs: 0,
            fail_run_after: self.fail_run_after,
        };
        let controls = ScriptedControls {
            log: self.log.clone(),
        };
        Ok((machine, controls))
    }
}

pub struct ScriptedMachine {
    screen: Frame,
    log: CallLog,
    runs: usize,
    fail_run_after: Option<usize>,
}

impl Machine for ScriptedMachine {
    fn get_frame(&mut self) -> Frame {
        self.log.push(MachineCall::GetFrame);
        self.screen.clone()
    }

    fn run(&mut self, cycles: usize) -> Result<(), MachineError> {
        if self.fail_run_after.is_some_and(|limit| self.runs >= limit) {
            return Err(MachineError::Run("scripted fault".into()));
        }
        self.runs += 1;
        self.log.push(MachineCall::Run(cycles));
        Ok(())
    }
}

pub struct ScriptedControls {
    log: CallLog,
}

impl Controls for ScriptedControls {
    fn on_keydown(&mut self, control: Control) {
        self.log.push(MachineCall::KeyDown(control));
    }

    fn on_keyup(&mut self, control: Control) {
        self.log.push(MachineCall::KeyUp(control));
    }

    fn on_scroll(&mut self, dx: f32, dy: f32) {
        self.log.push(MachineCall::Scroll(dx, dy));
    }
}
