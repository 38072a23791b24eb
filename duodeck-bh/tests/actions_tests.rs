//! Action handler behavior against fake decks and collaborators

use async_trait::async_trait;
use duodeck_bh::actions::{dispatch, ActionHandler, ActionOutcome, ActionSettings, PowerControl, SkipTrigger};
use duodeck_bh::gesture::Gesture;
use duodeck_common::{DeckId, Error, FadeCurve, PlaybackPort, Result, Track, TrackPosition, Volume};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Pause,
    Resume,
}

struct FakeDeck {
    id: DeckId,
    volume: Mutex<Volume>,
    calls: Mutex<Vec<Call>>,
    fail_status: bool,
    fail_pause: bool,
}

impl FakeDeck {
    fn new(port: u16, volume: u8) -> Self {
        Self {
            id: DeckId(port),
            volume: Mutex::new(Volume::new(volume)),
            calls: Mutex::new(Vec::new()),
            fail_status: false,
            fail_pause: false,
        }
    }

    fn volume_now(&self) -> Volume {
        *self.volume.lock().unwrap()
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaybackPort for FakeDeck {
    fn id(&self) -> DeckId {
        self.id
    }

    async fn play(&self, _track: &Track) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Resume);
        Ok(())
    }

    async fn pause_if_playing(&self) -> Result<()> {
        if self.fail_pause {
            return Err(Error::Command {
                command: "mpc pause-if-playing".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "connection refused".to_string(),
            });
        }
        self.calls.lock().unwrap().push(Call::Pause);
        Ok(())
    }

    async fn set_volume(&self, volume: Volume) -> Result<()> {
        *self.volume.lock().unwrap() = volume;
        Ok(())
    }

    async fn volume(&self) -> Result<Volume> {
        if self.fail_status {
            return Err(Error::Command {
                command: "mpc status".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "MPD error: Connection refused".to_string(),
            });
        }
        Ok(self.volume_now())
    }

    async fn position(&self) -> Result<Option<TrackPosition>> {
        Ok(None)
    }

    async fn seek(&self, _offset: Duration) -> Result<()> {
        Ok(())
    }

    async fn ensure_outputs_enabled(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct FakeSkip {
    requests: AtomicU32,
    fail: bool,
}

#[async_trait]
impl SkipTrigger for FakeSkip {
    async fn request_skip(&self) -> Result<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Http("connection refused".to_string()));
        }
        Ok(())
    }
}

struct FakePower {
    origin: Instant,
    at: Mutex<Vec<Duration>>,
}

impl FakePower {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            at: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PowerControl for FakePower {
    async fn power_off(&self) -> Result<()> {
        self.at.lock().unwrap().push(self.origin.elapsed());
        Ok(())
    }
}

fn settings() -> ActionSettings {
    ActionSettings {
        fade: Duration::from_secs(5),
        fade_steps: 50,
        fade_curve: FadeCurve::Linear,
        base_volume: Volume::FULL,
    }
}

struct Rig {
    a: Arc<FakeDeck>,
    b: Arc<FakeDeck>,
    skip: Arc<FakeSkip>,
    power: Arc<FakePower>,
    handler: Arc<ActionHandler>,
}

fn rig_with(a: FakeDeck, b: FakeDeck, skip: FakeSkip) -> Rig {
    let a = Arc::new(a);
    let b = Arc::new(b);
    let skip = Arc::new(skip);
    let power = Arc::new(FakePower::new());
    let handler = Arc::new(ActionHandler::new(
        vec![a.clone() as Arc<dyn PlaybackPort>, b.clone() as Arc<dyn PlaybackPort>],
        skip.clone(),
        power.clone(),
        settings(),
    ));
    Rig {
        a,
        b,
        skip,
        power,
        handler,
    }
}

fn rig(a_volume: u8, b_volume: u8) -> Rig {
    rig_with(
        FakeDeck::new(6601, a_volume),
        FakeDeck::new(6602, b_volume),
        FakeSkip::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_single_fades_down_then_pauses() {
    let rig = rig(100, 0);
    let started = Instant::now();

    assert_eq!(rig.handler.single().await, ActionOutcome::Paused);
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(rig.a.volume_now(), Volume::MUTED);
    assert_eq!(rig.b.volume_now(), Volume::MUTED);
    assert_eq!(rig.a.calls(), vec![Call::Pause]);
    assert_eq!(rig.b.calls(), vec![Call::Pause]);
}

#[tokio::test(start_paused = true)]
async fn test_single_when_silent_resumes_then_fades_up() {
    let rig = rig(0, 0);

    assert_eq!(rig.handler.single().await, ActionOutcome::Resumed);
    assert_eq!(rig.a.volume_now(), Volume::FULL);
    assert_eq!(rig.b.volume_now(), Volume::FULL);
    assert_eq!(rig.a.calls(), vec![Call::Resume]);
    assert_eq!(rig.b.calls(), vec![Call::Resume]);
}

#[tokio::test(start_paused = true)]
async fn test_single_pause_then_resume_round_trip() {
    let rig = rig(100, 0);
    assert_eq!(rig.handler.single().await, ActionOutcome::Paused);
    assert_eq!(rig.handler.single().await, ActionOutcome::Resumed);
    assert_eq!(rig.a.calls(), vec![Call::Pause, Call::Resume]);
}

#[tokio::test(start_paused = true)]
async fn test_pause_failure_on_one_deck_still_pauses_the_other() {
    let mut a = FakeDeck::new(6601, 80);
    a.fail_pause = true;
    let rig = rig_with(a, FakeDeck::new(6602, 0), FakeSkip::default());

    assert_eq!(rig.handler.single().await, ActionOutcome::Paused);
    assert_eq!(rig.a.volume_now(), Volume::MUTED);
    assert_eq!(rig.b.calls(), vec![Call::Pause]);
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_volume_aborts_single() {
    let mut a = FakeDeck::new(6601, 100);
    a.fail_status = true;
    let rig = rig_with(a, FakeDeck::new(6602, 0), FakeSkip::default());

    assert_eq!(rig.handler.single().await, ActionOutcome::Failed);
    assert!(rig.a.calls().is_empty());
    assert!(rig.b.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_double_requests_skip() {
    let rig = rig(0, 100);
    assert_eq!(rig.handler.double().await, ActionOutcome::SkipRequested);
    assert_eq!(rig.skip.requests.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_double_while_silent_is_ignored() {
    let rig = rig(0, 0);
    assert_eq!(rig.handler.double().await, ActionOutcome::SkipIgnored);
    assert_eq!(rig.skip.requests.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_double_with_failing_transport() {
    let rig = rig_with(
        FakeDeck::new(6601, 100),
        FakeDeck::new(6602, 0),
        FakeSkip {
            fail: true,
            ..FakeSkip::default()
        },
    );
    assert_eq!(rig.handler.double().await, ActionOutcome::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_long_powers_off() {
    let rig = rig(100, 0);
    assert_eq!(rig.handler.handle(Gesture::Long).await, ActionOutcome::PowerOffRequested);
    assert_eq!(rig.power.at.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_long_press_is_not_queued_behind_a_fade() {
    let rig = rig(100, 0);
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = tokio::spawn(dispatch(Arc::clone(&rig.handler), rx));

    tx.send(Gesture::Single).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    tx.send(Gesture::Long).unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    let power_at = rig.power.at.lock().unwrap().clone();
    assert_eq!(power_at.len(), 1);
    assert!(power_at[0] < Duration::from_secs(2), "power off at {:?}", power_at[0]);
    // The fade it overtook still finished
    assert_eq!(rig.a.calls(), vec![Call::Pause]);

    drop(tx);
    dispatcher.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_single_and_double_run_in_order() {
    let rig = rig(100, 0);
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = tokio::spawn(dispatch(Arc::clone(&rig.handler), rx));

    // The double lands after the pause finished: everything is muted
    tx.send(Gesture::Single).unwrap();
    tx.send(Gesture::Double).unwrap();
    drop(tx);
    dispatcher.await.unwrap();

    assert_eq!(rig.a.calls(), vec![Call::Pause]);
    assert_eq!(rig.skip.requests.load(Ordering::SeqCst), 0);
}
