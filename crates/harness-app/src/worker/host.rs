use crate::worker::link::WorkerLink;
use crate::worker::session::Session;
use crossbeam_channel::{Receiver, Sender};
use harness_core::prelude::*;
use log::{debug, error, info, trace};
use std::thread::JoinHandle;

/// Owns the worker thread; links the foreground to the machine
pub struct WorkerHost {
    handle: JoinHandle<()>,
}

impl WorkerHost {
    /// Spawns the worker thread and moves `factory` onto it.
    ///
    /// Everything the factory builds stays on that thread; the only way in or
    /// out is the returned [`WorkerLink`].
    pub fn spawn<F: MachineFactory>(
        factory: F,
        quantum: CycleQuantum,
    ) -> std::io::Result<(Self, WorkerLink)> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded();

        let handle = std::thread::Builder::new()
            .name("harness-worker".into())
            .spawn(move || run_worker(factory, quantum, request_rx, reply_tx))?;

        Ok((Self { handle }, WorkerLink::new(request_tx, reply_rx)))
    }

    /// Waits for the worker to exit. Drop the link first or this blocks forever.
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!("[worker] thread panicked");
        }
    }
}

/// Worker thread body: load, announce, then serve envelopes one at a time
pub fn run_worker<F: MachineFactory>(
    factory: F,
    quantum: CycleQuantum,
    requests: Receiver<Envelope>,
    replies: Sender<Envelope>,
) {
    let mut session = Session::new(factory, quantum);

    if let Err(err) = session.load() {
        error!("[worker] {err}");
        replies.send(Reply::Error(err.to_string()).into_envelope()).ok();
        return;
    }
    info!("[worker] machine core loaded");
    if replies.send(Reply::Ready.into_envelope()).is_err() {
        return;
    }

    // Ends once every request sender is dropped
    for envelope in requests.iter() {
        if let Some(reply) = session.handle(envelope) {
            trace!("[worker] -> {}", reply.kind());
            if replies.send(reply.into_envelope()).is_err() {
                debug!("[worker] foreground hung up");
                break;
            }
        }
        if session.is_failed() {
            break;
        }
    }
    info!("[worker] exiting ({})", session.state_name());
}
