//! Foreground side of the harness.
//!
//! The [`Orchestrator`] owns the worker link, the input translator and both
//! pacing loops. Its callbacks are driven one at a time by
//! [`event_loop::run`], so they never overlap.

pub mod event_loop;
pub mod pacing;
pub mod surface;

use crate::loader::{LoadError, ResourceLoader, Resources};
use crate::orchestrator::pacing::{PacingError, PacingLoop};
use crate::worker::{LinkError, WorkerLink};
use crossbeam_channel::{Receiver, Sender};
use harness_core::prelude::*;
use log::{debug, error, info, trace, warn};

pub use event_loop::ForegroundEvent;
pub use surface::{Failure, FailureKind, Phase, Surface};

type LoadResult = Result<Resources, LoadError>;

pub struct Orchestrator<S: Surface> {
    link: WorkerLink,
    surface: S,
    translator: InputTranslator,
    loader: ResourceLoader,
    loads: (Sender<LoadResult>, Receiver<LoadResult>),

    render: PacingLoop,
    drive: PacingLoop,
    phase: Phase,
    frames_painted: u64,
    inputs_dropped: u64,
}

impl<S: Surface> Orchestrator<S> {
    pub fn new(link: WorkerLink, surface: S, loader: ResourceLoader) -> Self {
        let mut orchestrator = Self {
            link,
            surface,
            translator: InputTranslator::new(),
            loader,
            loads: crossbeam_channel::unbounded(),
            render: PacingLoop::new("render"),
            drive: PacingLoop::new("drive"),
            phase: Phase::Starting,
            frames_painted: 0,
            inputs_dropped: 0,
        };
        orchestrator.surface.show_phase(&Phase::Starting);
        orchestrator
    }

    pub fn with_translator(mut self, translator: InputTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self.phase, Phase::Failed(_))
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn render_loop(&self) -> &PacingLoop {
        &self.render
    }

    pub fn drive_loop(&self) -> &PacingLoop {
        &self.drive
    }

    pub fn frames_painted(&self) -> u64 {
        self.frames_painted
    }

    pub(crate) fn replies(&self) -> &Receiver<Envelope> {
        self.link.replies()
    }

    pub(crate) fn loads(&self) -> &Receiver<LoadResult> {
        &self.loads.1
    }

    fn set_phase(&mut self, phase: Phase) {
        info!("[orchestrator] {} -> {}", self.phase.label(), phase);
        self.phase = phase;
        self.surface.show_phase(&self.phase);
    }

    fn fail(&mut self, kind: FailureKind, reason: impl Into<String>) {
        if self.is_failed() {
            return;
        }
        let failure = Failure::new(kind, reason);
        error!("[orchestrator] {failure}");
        self.set_phase(Phase::Failed(failure));
    }

    pub fn on_worker_message(&mut self, envelope: Envelope) {
        let reply = match Reply::decode(envelope) {
            Ok(reply) => reply,
            Err(err) => {
                error!("[orchestrator] dropping reply: {err}");
                return;
            }
        };
        trace!("[orchestrator] <- {}", reply.kind());

        match reply {
            Reply::Ready => self.on_ready(),
            Reply::Init => self.on_initialized(),
            Reply::Frame(frame) => self.on_frame(frame),
            Reply::Drive => self.on_drive(),
            Reply::Unknown(echo) => {
                warn!(
                    "[orchestrator] worker did not recognise a {} payload while {}",
                    echo.shape(),
                    self.phase.label()
                );
            }
            Reply::Error(reason) => self.fail(FailureKind::Machine, reason),
        }
    }

    fn on_ready(&mut self) {
        if self.link.is_ready() {
            warn!("[orchestrator] duplicate ready ignored");
            return;
        }
        self.link.mark_ready();
        self.set_phase(Phase::Loading);

        if let Err(err) = self.loader.spawn(self.loads.0.clone()) {
            self.fail(
                FailureKind::Harness,
                format!("could not start resource loader: {err}"),
            );
        }
    }

    pub fn on_resources(&mut self, result: Result<Resources, LoadError>) {
        if self.phase != Phase::Loading {
            warn!("[orchestrator] resources arrived while {}", self.phase.label());
            return;
        }

        let Resources { bootloader, disk } = match result {
            Ok(resources) => resources,
            Err(err) => return self.fail(FailureKind::Resources, err.to_string()),
        };
        info!(
            "[orchestrator] resources ready ({} + {} bytes), sending init",
            bootloader.len(),
            disk.len()
        );
        match self.link.post(Request::Init { bootloader, disk }) {
            Ok(()) => self.set_phase(Phase::Initializing),
            Err(err) => self.fail(FailureKind::Harness, format!("could not send init: {err}")),
        }
    }

    fn on_initialized(&mut self) {
        if self.phase != Phase::Initializing {
            warn!("[orchestrator] unexpected init ack while {}", self.phase.label());
            return;
        }
        self.set_phase(Phase::Running);
        self.request_frame();
        self.request_drive();
    }

    fn on_frame(&mut self, frame: Frame) {
        if let Err(err) = self.render.complete() {
            warn!("[orchestrator] {err}");
            return;
        }
        if let Err(err) = frame.validate() {
            return self.fail(FailureKind::Machine, format!("sent a bad frame: {err}"));
        }
        self.surface.paint(frame);
        self.frames_painted += 1;
        // next request waits for the next refresh
    }

    fn on_drive(&mut self) {
        if let Err(err) = self.drive.complete() {
            warn!("[orchestrator] {err}");
            return;
        }
        self.request_drive();
    }

    /// Display refresh opportunity
    pub fn on_refresh(&mut self) {
        if self.is_running() && !self.render.is_outstanding() {
            self.request_frame();
        }
    }

    fn request_frame(&mut self) {
        let result = self.render.issue(&self.link, Request::Frame);
        self.check_issue(result);
    }

    fn request_drive(&mut self) {
        if !self.is_running() {
            return;
        }
        let result = self.drive.issue(&self.link, Request::Drive);
        self.check_issue(result);
    }

    fn check_issue(&mut self, result: Result<(), PacingError>) {
        match result {
            Ok(()) => {}
            Err(PacingError::Link(LinkError::Disconnected)) => self.on_worker_lost(),
            Err(err) => warn!("[orchestrator] {err}"),
        }
    }

    pub fn on_input(&mut self, raw: &RawInput) {
        let Some(signal) = self.translator.translate(raw) else {
            return;
        };
        if !self.is_running() {
            self.inputs_dropped += 1;
            debug!("[orchestrator] dropping {signal:?} while {}", self.phase.label());
            return;
        }
        if let Err(err) = self.link.post(Request::from(signal)) {
            self.on_post_error(err);
        }
    }

    /// Validates locally, then forwards the new quantum to the worker
    pub fn set_cycles_per_tick(&mut self, text: &str) {
        let quantum = match CycleQuantum::parse(text) {
            Ok(quantum) => quantum,
            Err(err) => {
                warn!("[orchestrator] {err}");
                return;
            }
        };
        if !self.is_running() {
            warn!(
                "[orchestrator] cannot retune to {quantum} while {}",
                self.phase.label()
            );
            return;
        }
        let raw = RawQuantum::Integer(i64::from(quantum));
        if let Err(err) = self.link.post(Request::CyclesPerTick(raw)) {
            self.on_post_error(err);
        }
    }

    fn on_post_error(&mut self, err: LinkError) {
        match err {
            LinkError::Disconnected => self.on_worker_lost(),
            err => warn!("[orchestrator] {err}"),
        }
    }

    /// The worker's reply channel closed
    pub fn on_worker_lost(&mut self) {
        self.fail(FailureKind::Harness, "worker exited");
    }

    pub fn log_stats(&self) {
        info!(
            "[orchestrator] {} frames painted; {} inputs dropped before start",
            self.frames_painted, self.inputs_dropped
        );
        for pacing in [&self.render, &self.drive] {
            info!(
                "[orchestrator] {} loop: {} of {} requests completed",
                pacing.name(),
                pacing.completed(),
                pacing.issued()
            );
        }
    }
}
