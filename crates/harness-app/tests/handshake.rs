use crossbeam_channel::{Receiver, Sender};
use harness_app::loader::{Fetch, LoadError, ResourceLoader};
use harness_app::worker::host::run_worker;
use harness_app::{FailureKind, Harness, Phase, Surface, Wiring};
use harness_core::config::ResourceConfig;
use harness_core::prelude::*;
use harness_core::test_utils::{MachineCall, ScriptedFactory};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn spawn_worker(factory: ScriptedFactory) -> (Sender<Envelope>, Receiver<Envelope>) {
    let (request_tx, request_rx) = crossbeam_channel::unbounded();
    let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || {
        run_worker(factory, CycleQuantum::default(), request_rx, reply_tx)
    });
    (request_tx, reply_rx)
}

fn next_reply(replies: &Receiver<Envelope>) -> Reply {
    Reply::decode(replies.recv_timeout(TIMEOUT).unwrap()).unwrap()
}

#[test]
fn worker_protocol_end_to_end() {
    let factory = ScriptedFactory::new(160, 128);
    let log = factory.log();
    let (requests, replies) = spawn_worker(factory);

    assert_eq!(next_reply(&replies), Reply::Ready);

    let init = Request::Init {
        bootloader: vec![0xAA; 64],
        disk: vec![0x55; 256],
    };
    requests.send(init.into_envelope()).unwrap();
    assert_eq!(next_reply(&replies), Reply::Init);

    requests.send(Request::Frame.into_envelope()).unwrap();
    let Reply::Frame(frame) = next_reply(&replies) else {
        panic!("expected a frame");
    };
    assert_eq!(frame.size(), [160, 128]);

    requests.send(Request::Drive.into_envelope()).unwrap();
    assert_eq!(next_reply(&replies), Reply::Drive);

    // malformed: no reply, and the worker keeps serving
    requests.send(Envelope::raw(Some("frame"), None)).unwrap();
    requests.send(Request::Drive.into_envelope()).unwrap();
    assert_eq!(next_reply(&replies), Reply::Drive);
    assert!(replies.recv_timeout(Duration::from_millis(50)).is_err());

    assert_eq!(log.count(|call| *call == MachineCall::GetFrame), 1);
    assert_eq!(log.cycles_run(), 2 * 1024);
}

#[test]
fn worker_exits_when_the_foreground_hangs_up() {
    let (requests, replies) = spawn_worker(ScriptedFactory::new(4, 4));
    assert_eq!(next_reply(&replies), Reply::Ready);

    drop(requests);
    assert!(matches!(
        replies.recv_timeout(TIMEOUT),
        Err(crossbeam_channel::RecvTimeoutError::Disconnected)
    ));
}

#[test]
fn failed_load_is_reported_instead_of_ready() {
    let (_requests, replies) = spawn_worker(ScriptedFactory::new(4, 4).failing_load("no core"));
    assert!(matches!(next_reply(&replies), Reply::Error(reason) if reason.contains("no core")));
}

struct MemFetch(HashMap<String, Vec<u8>>);

impl MemFetch {
    fn with_blobs() -> Self {
        let mut blobs = HashMap::new();
        blobs.insert("boot".to_string(), vec![1; 32]);
        blobs.insert("disk".to_string(), vec![2; 128]);
        Self(blobs)
    }
}

impl Fetch for MemFetch {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        self.0.get(location).cloned().ok_or_else(|| LoadError::Fetch {
            location: location.to_string(),
            source: std::io::ErrorKind::NotFound.into(),
        })
    }
}

/// Forwards everything the orchestrator shows to the test thread
struct ChannelSurface {
    frames: Sender<[usize; 2]>,
    phases: Sender<Phase>,
}

impl Surface for ChannelSurface {
    fn paint(&mut self, frame: Frame) {
        self.frames.send(frame.size()).ok();
    }

    fn show_phase(&mut self, phase: &Phase) {
        self.phases.send(phase.clone()).ok();
    }
}

struct Launched {
    harness: Harness,
    frames: Receiver<[usize; 2]>,
    phases: Receiver<Phase>,
}

fn launch(factory: ScriptedFactory, fetch: MemFetch) -> Launched {
    let (frames_tx, frames) = crossbeam_channel::unbounded();
    let (phases_tx, phases) = crossbeam_channel::unbounded();
    let wiring = Wiring {
        surface: ChannelSurface {
            frames: frames_tx,
            phases: phases_tx,
        },
        loader: ResourceLoader::new(
            Arc::new(fetch),
            ResourceConfig {
                bootloader: "boot".into(),
                disk: "disk".into(),
            },
        ),
        translator: InputTranslator::new(),
        ticks: crossbeam_channel::tick(Duration::from_millis(2)),
    };
    let harness = Harness::launch(factory, CycleQuantum::default(), wiring).unwrap();
    Launched {
        harness,
        frames,
        phases,
    }
}

fn wait_for_phase(phases: &Receiver<Phase>, wanted: impl Fn(&Phase) -> bool) -> Vec<Phase> {
    let mut seen = Vec::new();
    loop {
        let phase = phases.recv_timeout(TIMEOUT).unwrap();
        let done = wanted(&phase);
        seen.push(phase);
        if done {
            return seen;
        }
    }
}

#[test]
fn harness_boots_and_paces_both_loops() {
    let factory = ScriptedFactory::new(160, 128);
    let log = factory.log();
    let launched = launch(factory, MemFetch::with_blobs());

    let seen = wait_for_phase(&launched.phases, |phase| *phase == Phase::Running);
    assert_eq!(
        seen,
        vec![
            Phase::Starting,
            Phase::Loading,
            Phase::Initializing,
            Phase::Running
        ]
    );

    for _ in 0..5 {
        assert_eq!(launched.frames.recv_timeout(TIMEOUT).unwrap(), [160, 128]);
    }
    launched.harness.send(harness_app::ForegroundEvent::Input(RawInput::KeyDown(
        "Enter".into(),
    )));

    let phase = launched.harness.shutdown();
    assert_eq!(phase, Phase::Running);

    let calls = log.snapshot();
    assert_eq!(
        calls
            .iter()
            .filter(|call| matches!(call, MachineCall::Construct { .. }))
            .count(),
        1
    );
    assert!(calls.iter().any(|call| matches!(call, MachineCall::Run(1024))));
    assert!(calls.iter().all(|call| !matches!(call, MachineCall::Run(n) if *n != 1024)));
}

#[test]
fn missing_disk_fails_startup_without_init() {
    let factory = ScriptedFactory::new(160, 128);
    let log = factory.log();
    let mut fetch = MemFetch::with_blobs();
    fetch.0.remove("disk");
    let launched = launch(factory, fetch);

    let seen = wait_for_phase(&launched.phases, |phase| matches!(phase, Phase::Failed(_)));
    assert!(!seen.contains(&Phase::Initializing));
    assert!(matches!(
        seen.last(),
        Some(Phase::Failed(failure)) if failure.kind == FailureKind::Resources
    ));

    assert!(matches!(launched.harness.shutdown(), Phase::Failed(_)));
    assert!(
        log.snapshot()
            .iter()
            .all(|call| !matches!(call, MachineCall::Construct { .. }))
    );
}

#[test]
fn machine_fault_surfaces_as_failure() {
    let launched = launch(
        ScriptedFactory::new(8, 8).failing_run_after(3),
        MemFetch::with_blobs(),
    );

    let seen = wait_for_phase(&launched.phases, |phase| matches!(phase, Phase::Failed(_)));
    let Some(Phase::Failed(failure)) = seen.last() else {
        unreachable!();
    };
    assert_eq!(failure.kind, FailureKind::Machine);
    assert!(failure.reason.contains("scripted fault"));
    assert!(matches!(launched.harness.shutdown(), Phase::Failed(_)));
}
