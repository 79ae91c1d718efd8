//! Recording session integration tests against the in-process adapters

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use voice_memo::application::ports::{Clock, RecordingStore};
use voice_memo::application::{RecordingSessionController, SessionError, SessionOptions};
use voice_memo::domain::session::SessionState;
use voice_memo::infrastructure::{
    FlacSegmentEncoder, ManualClock, MemoryRecordingStore, SimulatedCaptureDevice,
};

type Controller = RecordingSessionController<
    Arc<SimulatedCaptureDevice>,
    FlacSegmentEncoder,
    Arc<MemoryRecordingStore>,
>;

struct Harness {
    device: Arc<SimulatedCaptureDevice>,
    store: Arc<MemoryRecordingStore>,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new() -> Self {
        Self {
            device: Arc::new(SimulatedCaptureDevice::new(16_000)),
            store: Arc::new(MemoryRecordingStore::new()),
            clock: Arc::new(ManualClock::new()),
        }
    }

    fn controller(&self) -> Controller {
        let clock: Arc<dyn Clock> = self.clock.clone();
        RecordingSessionController::new(
            Arc::clone(&self.device),
            FlacSegmentEncoder::new(),
            Arc::clone(&self.store),
            clock,
        )
        .with_options(SessionOptions {
            name: Some("Integration memo".to_string()),
            ..Default::default()
        })
    }

    fn advance(&self, secs: u64) {
        self.clock.advance(Duration::from_secs(secs));
    }
}

fn tone(len: usize) -> Vec<i16> {
    (0..len)
        .map(|i| ((i as f32 * 0.05).sin() * 8000.0) as i16)
        .collect()
}

#[tokio::test]
async fn pause_time_is_excluded_from_duration() {
    let h = Harness::new();
    let mut controller = h.controller();
    let feed = h.device.feed();

    controller.start().await.unwrap();
    assert!(feed.push(&tone(1600)));
    h.advance(2);
    controller.pause().await.unwrap();
    assert!(!feed.is_capturing());
    h.advance(5);
    controller.resume().await.unwrap();
    assert!(feed.push(&tone(1600)));
    h.advance(1);

    let recording = controller.stop().await.unwrap().unwrap();
    assert_eq!(recording.duration_seconds(), 3.0);
    assert_eq!(recording.name(), "Integration memo");
    assert_eq!(&recording.audio().data()[..4], b"fLaC");
    assert_eq!(controller.state(), SessionState::Stopped);
}

#[tokio::test]
async fn stored_audio_decodes_to_captured_samples() {
    let h = Harness::new();
    let mut controller = h.controller();
    let feed = h.device.feed();

    controller.start().await.unwrap();
    feed.push(&tone(8000));
    feed.push(&tone(8000));
    h.advance(1);
    let recording = controller.stop().await.unwrap().unwrap();

    let stored = h.store.get(recording.id()).await.unwrap();
    assert_eq!(stored.audio().data(), recording.audio().data());

    let decoder = rodio::Decoder::new(Cursor::new(stored.audio().data().to_vec())).unwrap();
    assert_eq!(rodio::Source::sample_rate(&decoder), 16_000);
    assert_eq!(rodio::Source::channels(&decoder), 1);
    assert_eq!(decoder.count(), 16_000);
}

#[tokio::test]
async fn immediate_stop_saves_empty_recording() {
    let h = Harness::new();
    let mut controller = h.controller();

    controller.start().await.unwrap();
    let recording = controller.stop().await.unwrap().unwrap();

    assert_eq!(recording.duration_seconds(), 0.0);
    assert_eq!(&recording.audio().data()[..4], b"fLaC");
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn stop_twice_saves_once() {
    let h = Harness::new();
    let mut controller = h.controller();

    controller.start().await.unwrap();
    h.advance(1);
    assert!(controller.stop().await.unwrap().is_some());
    assert!(controller.stop().await.unwrap().is_none());
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn held_device_rejects_second_session() {
    let h = Harness::new();
    let mut first = h.controller();
    let mut second = h.controller();

    first.start().await.unwrap();
    match second.start().await {
        Err(SessionError::DeviceUnavailable(reason)) => assert_eq!(reason, "busy"),
        other => panic!("expected DeviceUnavailable, got {:?}", other.err()),
    }
    assert_eq!(second.state(), SessionState::Idle);

    first.stop().await.unwrap();
    assert!(!h.device.is_held());
    second.start().await.unwrap();
}

#[tokio::test]
async fn unavailable_device_leaves_session_idle() {
    let store = Arc::new(MemoryRecordingStore::new());
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new());
    let mut controller = RecordingSessionController::new(
        SimulatedCaptureDevice::unavailable("permission denied"),
        FlacSegmentEncoder::new(),
        Arc::clone(&store),
        clock,
    );

    let err = controller.start().await.unwrap_err();
    assert!(matches!(err, SessionError::DeviceUnavailable(ref r) if r == "permission denied"));
    assert_eq!(controller.state(), SessionState::Idle);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn lost_device_salvages_recording() {
    let h = Harness::new();
    let mut controller = h.controller();
    let feed = h.device.feed();

    controller.start().await.unwrap();
    feed.push(&tone(3200));
    h.advance(2);
    feed.lose("unplugged");

    let err = loop {
        if let Err(e) = controller.pump().await {
            break e;
        }
    };

    match err {
        SessionError::StreamInterrupted { reason, recording } => {
            assert_eq!(reason, "unplugged");
            let recording = recording.expect("partial recording saved");
            assert_eq!(recording.duration_seconds(), 2.0);
            assert!(h.store.get(recording.id()).await.is_ok());
        }
        other => panic!("expected StreamInterrupted, got {:?}", other),
    }
    assert_eq!(controller.state(), SessionState::Stopped);
    assert!(!h.device.is_held());
}

#[tokio::test]
async fn dropping_controller_mid_recording_releases_device() {
    let h = Harness::new();
    {
        let mut controller = h.controller();
        controller.start().await.unwrap();
        assert!(h.device.is_held());
    }
    assert!(!h.device.is_held());
    assert!(h.store.is_empty().await);
}
