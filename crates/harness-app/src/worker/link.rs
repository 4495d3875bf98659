use crossbeam_channel::{Receiver, Sender};
use harness_core::prelude::*;
use log::trace;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("worker has not signalled ready, refusing to send {0}")]
    NotReady(Kind),

    #[error("worker is gone")]
    Disconnected,
}

/// Foreground end of the worker channels.
///
/// Sends are rejected until `ready` has been observed, so nothing can be
/// posted to a worker that is still loading its machine core.
pub struct WorkerLink {
    requests: Sender<Envelope>,
    replies: Receiver<Envelope>,
    ready: bool,
}

impl WorkerLink {
    pub fn new(requests: Sender<Envelope>, replies: Receiver<Envelope>) -> Self {
        Self {
            requests,
            replies,
            ready: false,
        }
    }

    pub fn replies(&self) -> &Receiver<Envelope> {
        &self.replies
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn post(&self, request: Request) -> Result<(), LinkError> {
        if !self.ready {
            return Err(LinkError::NotReady(request.kind()));
        }
        trace!("[link] -> {}", request.kind());
        self.requests
            .send(request.into_envelope())
            .map_err(|_| LinkError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sends_before_ready() {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (_reply_tx, reply_rx) = crossbeam_channel::unbounded();
        let mut link = WorkerLink::new(request_tx, reply_rx);

        assert_eq!(link.post(Request::Drive), Err(LinkError::NotReady(Kind::Drive)));
        assert!(request_rx.is_empty());

        link.mark_ready();
        assert_eq!(link.post(Request::Drive), Ok(()));
        assert_eq!(request_rx.len(), 1);
    }

    #[test]
    fn reports_disconnected_worker() {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (_reply_tx, reply_rx) = crossbeam_channel::unbounded();
        let mut link = WorkerLink::new(request_tx, reply_rx);
        link.mark_ready();

        drop(request_rx);
        assert_eq!(link.post(Request::Frame), Err(LinkError::Disconnected));
    }
}
