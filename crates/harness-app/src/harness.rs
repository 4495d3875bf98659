use crate::loader::ResourceLoader;
use crate::orchestrator::{
    Failure, FailureKind, ForegroundEvent, Orchestrator, Phase, Surface, event_loop,
};
use crate::worker::WorkerHost;
use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use harness_core::prelude::*;
use log::{error, info};
use std::thread::JoinHandle;
use std::time::Instant;

/// Both halves of a running harness: the worker thread and the foreground loop
pub struct Harness {
    worker: WorkerHost,
    foreground: JoinHandle<Phase>,
    events: Sender<ForegroundEvent>,
}

/// Pieces the foreground loop is assembled from
pub struct Wiring<S> {
    pub surface: S,
    pub loader: ResourceLoader,
    pub translator: InputTranslator,
    /// Refresh source; `never()` when the display sends `Refresh` events itself
    pub ticks: Receiver<Instant>,
}

impl Harness {
    /// Spawns the worker with `factory` and the foreground loop around `wiring`.
    ///
    /// The handshake starts on its own: the worker announces `ready` as soon as
    /// its factory has loaded.
    pub fn launch<F, S>(factory: F, quantum: CycleQuantum, wiring: Wiring<S>) -> anyhow::Result<Self>
    where
        F: MachineFactory,
        S: Surface + Send + 'static,
    {
        let (worker, link) = WorkerHost::spawn(factory, quantum).context("spawning worker thread")?;
        let (events, events_rx) = crossbeam_channel::unbounded();

        let Wiring {
            surface,
            loader,
            translator,
            ticks,
        } = wiring;
        let foreground = std::thread::Builder::new()
            .name("harness-foreground".into())
            .spawn(move || {
                let orchestrator =
                    Orchestrator::new(link, surface, loader).with_translator(translator);
                let orchestrator = event_loop::run(orchestrator, &events_rx, ticks);
                orchestrator.phase().clone()
            })
            .context("spawning foreground thread")?;

        info!("[harness] started with {quantum} cycles per tick");
        Ok(Self {
            worker,
            foreground,
            events,
        })
    }

    pub fn send(&self, event: ForegroundEvent) {
        self.events.send(event).ok();
    }

    /// Stops the foreground loop and waits for both threads.
    ///
    /// The event sender is dropped as well, so the loop also stops if it
    /// missed the shutdown event.
    pub fn shutdown(self) -> Phase {
        self.send(ForegroundEvent::Shutdown);
        let Harness {
            worker,
            foreground,
            events,
        } = self;
        drop(events);
        let phase = foreground.join().unwrap_or_else(|_| {
            error!("[harness] foreground thread panicked");
            Phase::Failed(Failure::new(
                FailureKind::Harness,
                "foreground thread panicked",
            ))
        });
        // the orchestrator (and with it the request sender) is gone by now
        worker.join();
        phase
    }
}
