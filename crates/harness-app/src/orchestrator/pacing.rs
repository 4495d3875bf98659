use crate::worker::{LinkError, WorkerLink};
use harness_core::prelude::*;
use log::trace;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacingError {
    #[error("{0} loop already has a request in flight")]
    Outstanding(&'static str),

    #[error("{0} loop got an acknowledgement it never asked for")]
    Unsolicited(&'static str),

    #[error(transparent)]
    Link(#[from] LinkError),
}

/// A request/acknowledge loop with at most one request in flight.
///
/// `issue` refuses to send while a request is outstanding; the flag is only
/// cleared by `complete`, i.e. when the matching reply comes back.
#[derive(Debug)]
pub struct PacingLoop {
    name: &'static str,
    outstanding: bool,
    issued: u64,
    completed: u64,
}

impl PacingLoop {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            outstanding: false,
            issued: 0,
            completed: 0,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    pub fn issue(&mut self, link: &WorkerLink, request: Request) -> Result<(), PacingError> {
        if self.outstanding {
            return Err(PacingError::Outstanding(self.name));
        }
        link.post(request)?;
        self.outstanding = true;
        self.issued += 1;
        trace!("[{}] issued #{}", self.name, self.issued);
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), PacingError> {
        if !self.outstanding {
            return Err(PacingError::Unsolicited(self.name));
        }
        self.outstanding = false;
        self.completed += 1;
        Ok(())
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }
}
