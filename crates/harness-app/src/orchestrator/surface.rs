use harness_core::prelude::*;

/// Where the orchestrator is in the startup handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the worker to announce `ready`
    Starting,
    /// Fetching bootloader and disk
    Loading,
    /// `init` sent, waiting for the acknowledgement
    Initializing,
    Running,
    Failed(Failure),
}

/// Which side brought the harness down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Bootloader or disk image could not be fetched
    Resources,
    /// The machine reported an error or sent something unusable
    Machine,
    /// Threads or channels of the harness itself
    Harness,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Resources => "resource load failed",
            FailureKind::Machine => "machine failed",
            FailureKind::Harness => "harness failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub reason: String,
}

impl Failure {
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.reason)
    }
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Starting => "starting",
            Phase::Loading => "loading",
            Phase::Initializing => "initializing",
            Phase::Running => "running",
            Phase::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Failed(failure) => write!(f, "failed ({failure})"),
            phase => f.write_str(phase.label()),
        }
    }
}

/// The display the orchestrator paints onto
pub trait Surface {
    fn paint(&mut self, frame: Frame);

    fn show_phase(&mut self, phase: &Phase);
}
