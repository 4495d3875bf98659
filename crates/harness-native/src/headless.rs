use crossbeam_channel::Sender;
use harness_app::{Phase, Surface};
use harness_core::prelude::*;
use log::{error, info};

const REPORT_EVERY: u64 = 60;

/// Surface without a window: logs progress and reports when to stop
pub struct HeadlessSurface {
    painted: u64,
    limit: Option<u64>,
    done: Sender<Phase>,
}

impl HeadlessSurface {
    /// `done` receives the phase to exit with: `Running` once `limit` frames
    /// have been painted, `Failed` as soon as startup or the machine fails
    pub fn new(limit: Option<u64>, done: Sender<Phase>) -> Self {
        Self {
            painted: 0,
            limit,
            done,
        }
    }
}

impl Surface for HeadlessSurface {
    fn paint(&mut self, frame: Frame) {
        self.painted += 1;
        if self.painted % REPORT_EVERY == 0 {
            info!(
                "[headless] {} frames painted ({}x{})",
                self.painted, frame.width, frame.height
            );
        }
        if self.limit == Some(self.painted) {
            info!("[headless] frame limit reached");
            self.done.send(Phase::Running).ok();
        }
    }

    fn show_phase(&mut self, phase: &Phase) {
        info!("[headless] {phase}");
        if let Phase::Failed(failure) = phase {
            error!("[headless] {failure}");
            self.done.send(phase.clone()).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_app::{Failure, FailureKind};

    #[test]
    fn reports_once_the_limit_is_reached() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut surface = HeadlessSurface::new(Some(3), tx);
        for _ in 0..2 {
            surface.paint(Frame::blank(2, 2).unwrap());
        }
        assert!(rx.try_recv().is_err());
        surface.paint(Frame::blank(2, 2).unwrap());
        assert_eq!(rx.try_recv(), Ok(Phase::Running));
        surface.paint(Frame::blank(2, 2).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn failure_is_reported_immediately() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut surface = HeadlessSurface::new(None, tx);
        surface.show_phase(&Phase::Loading);
        let failed = Phase::Failed(Failure::new(FailureKind::Resources, "no disk"));
        surface.show_phase(&failed);
        assert_eq!(rx.try_recv(), Ok(failed));
    }
}
