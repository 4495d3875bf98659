use crate::orchestrator::{Orchestrator, Surface};
use crossbeam_channel::{Receiver, select};
use harness_core::prelude::*;
use log::{debug, info};
use std::time::Instant;

/// Events the display surface feeds into the foreground loop
#[derive(Debug, Clone, PartialEq)]
pub enum ForegroundEvent {
    /// The display is about to draw; the render loop may request a frame
    Refresh,
    Input(RawInput),
    SetCyclesPerTick(String),
    Shutdown,
}

/// Runs the foreground loop until `Shutdown` or until every event sender is gone.
///
/// Refresh opportunities come either from `ticks` (headless) or from
/// `ForegroundEvent::Refresh` (windowed, pass `crossbeam_channel::never()`).
/// Returns the orchestrator so the caller can inspect its final state.
pub fn run<S: Surface>(
    mut orchestrator: Orchestrator<S>,
    events: &Receiver<ForegroundEvent>,
    ticks: Receiver<Instant>,
) -> Orchestrator<S> {
    let mut replies = orchestrator.replies().clone();
    let loads = orchestrator.loads().clone();
    info!("[orchestrator] foreground loop started");

    loop {
        let mut worker_gone = false;
        let mut stop = false;
        select! {
            recv(replies) -> msg => match msg {
                Ok(envelope) => orchestrator.on_worker_message(envelope),
                Err(_) => worker_gone = true,
            },
            recv(loads) -> msg => {
                if let Ok(result) = msg {
                    orchestrator.on_resources(result);
                }
            },
            recv(ticks) -> _ => orchestrator.on_refresh(),
            recv(events) -> msg => match msg {
                Ok(ForegroundEvent::Refresh) => orchestrator.on_refresh(),
                Ok(ForegroundEvent::Input(raw)) => orchestrator.on_input(&raw),
                Ok(ForegroundEvent::SetCyclesPerTick(text)) => {
                    orchestrator.set_cycles_per_tick(&text)
                }
                Ok(ForegroundEvent::Shutdown) | Err(_) => stop = true,
            },
        }

        if stop {
            break;
        }
        if worker_gone {
            debug!("[orchestrator] worker channel closed");
            orchestrator.on_worker_lost();
            replies = crossbeam_channel::never();
        }
    }

    info!("[orchestrator] foreground loop stopped ({})", orchestrator.phase());
    orchestrator.log_stats();
    orchestrator
}
