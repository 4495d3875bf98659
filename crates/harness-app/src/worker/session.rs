use harness_core::prelude::*;
use log::{debug, error, info, trace, warn};

/// Lifecycle of the machine owned by a worker
pub enum SessionState<M, C> {
    Uninitialized,
    Running { machine: M, controls: C },
    /// Construction or execution failed; nothing is served past this point
    Failed(String),
}

/// Worker-side dispatcher.
///
/// One session per worker thread. Each envelope is handled to completion
/// before the next is looked at, so the machine is never touched concurrently.
pub struct Session<F: MachineFactory> {
    factory: F,
    state: SessionState<F::Machine, F::Controls>,
    quantum: CycleQuantum,
}

impl<F: MachineFactory> Session<F> {
    pub fn new(factory: F, quantum: CycleQuantum) -> Self {
        Self {
            factory,
            state: SessionState::Uninitialized,
            quantum,
        }
    }

    /// Prepares the machine core; must succeed before `ready` is announced
    pub fn load(&mut self) -> Result<(), MachineError> {
        self.factory.load()
    }

    pub fn state_name(&self) -> &'static str {
        match self.state {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Running { .. } => "running",
            SessionState::Failed(_) => "failed",
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running { .. })
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self.state, SessionState::Failed(_))
    }

    #[inline]
    pub fn quantum(&self) -> CycleQuantum {
        self.quantum
    }

    /// Handles one envelope from the foreground, returning the reply to send back (if any)
    pub fn handle(&mut self, envelope: Envelope) -> Option<Reply> {
        let request = match Request::decode(envelope) {
            Ok(request) => request,
            Err(DecodeError::Malformed(envelope)) => {
                error!(
                    "[worker] dropping malformed envelope (kind: {}, data: {})",
                    envelope.kind_str(),
                    envelope.data.as_ref().map_or("<none>", Payload::shape)
                );
                return None;
            }
            Err(DecodeError::Unrecognized(envelope)) => {
                error!(
                    "[worker] unknown message {:?} while {}",
                    envelope.kind_str(),
                    self.state_name()
                );
                return Some(Reply::Unknown(envelope.data.unwrap_or(Payload::Empty)));
            }
        };
        trace!("[worker] <- {}", request.kind());

        let outcome = match &mut self.state {
            SessionState::Uninitialized => return self.handle_uninitialized(request),
            SessionState::Running { machine, controls } => {
                route(machine, controls, &mut self.quantum, request)
            }
            SessionState::Failed(reason) => {
                warn!("[worker] ignoring {} after failure", request.kind());
                return Some(Reply::Error(reason.clone()));
            }
        };

        match outcome {
            Ok(reply) => reply,
            Err(err) => Some(self.fail(err)),
        }
    }

    fn handle_uninitialized(&mut self, request: Request) -> Option<Reply> {
        let Request::Init { bootloader, disk } = request else {
            return Some(unknown_in_state(request, "uninitialized"));
        };

        info!(
            "[worker] constructing machine ({} byte bootloader, {} byte disk)",
            bootloader.len(),
            disk.len()
        );
        match self.factory.construct(bootloader, disk) {
            Ok((machine, controls)) => {
                self.state = SessionState::Running { machine, controls };
                info!("[worker] machine running, {} cycles per tick", self.quantum);
                Some(Reply::Init)
            }
            Err(err) => Some(self.fail(err)),
        }
    }

    fn fail(&mut self, err: MachineError) -> Reply {
        let reason = err.to_string();
        error!("[worker] session failed: {reason}");
        self.state = SessionState::Failed(reason.clone());
        Reply::Error(reason)
    }
}

fn route<M: Machine, C: Controls>(
    machine: &mut M,
    controls: &mut C,
    quantum: &mut CycleQuantum,
    request: Request,
) -> Result<Option<Reply>, MachineError> {
    let reply = match request {
        Request::Frame => {
            let frame = machine.get_frame();
            frame.validate()?;
            Some(Reply::Frame(frame))
        }
        Request::KeyDown(control) => {
            debug!("[worker] pressed {control:?}");
            controls.on_keydown(control);
            None
        }
        Request::KeyUp(control) => {
            debug!("[worker] released {control:?}");
            controls.on_keyup(control);
            None
        }
        Request::Scroll { dx, dy } => {
            controls.on_scroll(dx, dy);
            None
        }
        Request::Drive => {
            machine.run(quantum.get())?;
            Some(Reply::Drive)
        }
        Request::CyclesPerTick(raw) => {
            match raw.validate() {
                Ok(retuned) => {
                    info!("[worker] cycles per tick {} -> {}", quantum, retuned);
                    *quantum = retuned;
                }
                Err(err) => warn!("[worker] ignoring tuning request: {err}"),
            }
            None
        }
        request @ Request::Init { .. } => Some(unknown_in_state(request, "running")),
    };
    Ok(reply)
}

fn unknown_in_state(request: Request, state: &str) -> Reply {
    error!("[worker] unexpected {} while {}", request.kind(), state);
    let echo = request.into_envelope().data.unwrap_or(Payload::Empty);
    Reply::Unknown(echo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_core::test_utils::{CallLog, MachineCall, ScriptedFactory};

    fn session() -> (Session<ScriptedFactory>, CallLog) {
        let factory = ScriptedFactory::new(160, 128);
        let log = factory.log();
        (Session::new(factory, CycleQuantum::default()), log)
    }

    fn init_envelope() -> Envelope {
        Request::Init {
            bootloader: vec![1; 8],
            disk: vec![2; 16],
        }
        .into_envelope()
    }

    fn running_session() -> (Session<ScriptedFactory>, CallLog) {
        let (mut session, log) = session();
        assert_eq!(session.handle(init_envelope()), Some(Reply::Init));
        (session, log)
    }

    #[test]
    fn uninitialized_answers_everything_but_init_with_unknown() {
        let (mut session, log) = session();
        let requests = [
            Request::Frame,
            Request::Drive,
            Request::KeyDown(Control::Up),
            Request::KeyUp(Control::Up),
            Request::Scroll { dx: 0.0, dy: 2.0 },
            Request::CyclesPerTick(RawQuantum::Integer(64)),
        ];

        for request in requests {
            let reply = session.handle(request.into_envelope());
            assert!(matches!(reply, Some(Reply::Unknown(_))));
            assert_eq!(session.state_name(), "uninitialized");
        }
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn init_constructs_once_and_then_is_unknown() {
        let (mut session, log) = running_session();
        assert!(session.is_running());

        let reply = session.handle(init_envelope());
        assert!(matches!(reply, Some(Reply::Unknown(Payload::Init { .. }))));
        assert!(session.is_running());
        assert_eq!(
            log.count(|call| matches!(call, MachineCall::Construct { .. })),
            1
        );
    }

    #[test]
    fn unrecognized_kinds_echo_their_payload_in_any_state() {
        let (mut session, _) = session();
        let envelope = Envelope::raw(Some("reset"), Some(Payload::Text("now".into())));
        assert_eq!(
            session.handle(envelope.clone()),
            Some(Reply::Unknown(Payload::Text("now".into())))
        );

        let (mut session, _) = running_session();
        assert_eq!(
            session.handle(envelope),
            Some(Reply::Unknown(Payload::Text("now".into())))
        );
        assert!(session.is_running());
    }

    #[test]
    fn malformed_envelopes_get_no_reply_and_change_nothing() {
        let (mut session, log) = running_session();
        assert_eq!(session.handle(Envelope::raw(Some("frame"), None)), None);
        assert_eq!(session.handle(Envelope::raw(None, Some(Payload::Empty))), None);
        assert!(session.is_running());
        assert_eq!(log.count(|call| *call == MachineCall::GetFrame), 0);
    }

    #[test]
    fn frame_request_pulls_one_frame() {
        let (mut session, log) = running_session();
        let Some(Reply::Frame(frame)) = session.handle(Request::Frame.into_envelope()) else {
            panic!("expected a frame reply");
        };
        assert_eq!(frame.size(), [160, 128]);
        assert_eq!(log.count(|call| *call == MachineCall::GetFrame), 1);
    }

    #[test]
    fn missized_frame_fails_the_session_instead_of_crossing() {
        let factory = ScriptedFactory::new(160, 128).truncating_frames(4);
        let mut session = Session::new(factory, CycleQuantum::default());
        assert_eq!(session.handle(init_envelope()), Some(Reply::Init));

        let Some(Reply::Error(reason)) = session.handle(Request::Frame.into_envelope()) else {
            panic!("expected an error reply");
        };
        assert!(reason.contains("bad frame"), "{reason}");
        assert!(session.is_failed());
        assert!(matches!(
            session.handle(Request::Drive.into_envelope()),
            Some(Reply::Error(_))
        ));
    }

    #[test]
    fn drive_runs_one_quantum() {
        let (mut session, log) = running_session();
        assert_eq!(
            session.handle(Request::Drive.into_envelope()),
            Some(Reply::Drive)
        );
        assert_eq!(log.cycles_run(), 1024);
    }

    #[test]
    fn input_is_forwarded_without_reply() {
        let (mut session, log) = running_session();
        assert_eq!(session.handle(Request::KeyDown(Control::Hold).into_envelope()), None);
        assert_eq!(session.handle(Request::KeyUp(Control::Hold).into_envelope()), None);
        assert_eq!(
            session.handle(Request::Scroll { dx: 0.0, dy: -2.0 }.into_envelope()),
            None
        );

        let calls = log.snapshot();
        assert_eq!(
            &calls[1..],
            &[
                MachineCall::KeyDown(Control::Hold),
                MachineCall::KeyUp(Control::Hold),
                MachineCall::Scroll(0.0, -2.0),
            ]
        );
    }

    #[test]
    fn cycles_per_tick_retunes_only_with_valid_values() {
        let (mut session, log) = running_session();

        let retune = Request::CyclesPerTick(RawQuantum::Text("256".into()));
        assert_eq!(session.handle(retune.into_envelope()), None);
        assert_eq!(session.quantum().get(), 256);

        for bad in [
            RawQuantum::Text("256*1000".into()),
            RawQuantum::Text("".into()),
            RawQuantum::Integer(0),
            RawQuantum::Integer(-1),
            RawQuantum::Integer(i64::MAX),
        ] {
            assert_eq!(session.handle(Request::CyclesPerTick(bad).into_envelope()), None);
            assert_eq!(session.quantum().get(), 256);
        }

        session.handle(Request::Drive.into_envelope());
        assert_eq!(log.cycles_run(), 256);
    }

    #[test]
    fn construction_failure_is_terminal() {
        let (mut session, _) = session();
        let empty = Request::Init {
            bootloader: Vec::new(),
            disk: vec![1],
        };
        assert!(matches!(
            session.handle(empty.into_envelope()),
            Some(Reply::Error(_))
        ));
        assert!(session.is_failed());

        // no second chance at construction
        assert!(matches!(
            session.handle(init_envelope()),
            Some(Reply::Error(_))
        ));
        assert!(session.is_failed());
    }

    #[test]
    fn run_failure_is_terminal() {
        let factory = ScriptedFactory::new(4, 4).failing_run_after(1);
        let mut session = Session::new(factory, CycleQuantum::default());
        session.handle(init_envelope());

        assert_eq!(
            session.handle(Request::Drive.into_envelope()),
            Some(Reply::Drive)
        );
        assert!(matches!(
            session.handle(Request::Drive.into_envelope()),
            Some(Reply::Error(_))
        ));
        assert!(session.is_failed());
    }
}
