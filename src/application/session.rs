//! Recording session use case
//!
//! Drives the pure [`Session`] state machine and executes the effects it
//! returns against the capture, encoder, store and monitor ports.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Local, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::recording::{default_name, Recording, RecordingId, DEFAULT_NAME_PREFIX};
use crate::domain::session::{
    Effect, InvalidStateTransition, Segment, Session, SessionEvent, SessionSnapshot,
    SessionState,
};

use super::monitor::{LiveMonitor, MonitorHandle};
use super::ports::{
    CaptureDevice, CaptureError, CaptureEvent, CaptureFormat, CaptureStream, Clock,
    EncodingError, MonitorDisplay, RecordingStore, SegmentEncoder, StorageError,
};

/// Errors from the recording session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Microphone unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Failed to save recording: {0}")]
    StorageWriteFailure(StorageError),

    #[error("Recording interrupted: {reason}")]
    StreamInterrupted {
        reason: String,
        /// The recording salvaged from the collected segments, if saving worked
        recording: Option<Box<Recording>>,
    },

    #[error("Failed to encode recording: {0}")]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
}

impl From<CaptureError> for SessionError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::DeviceUnavailable(reason) | CaptureError::StartFailed(reason) => {
                Self::DeviceUnavailable(reason)
            }
        }
    }
}

/// Naming options for the finalized recording
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Explicit name; when unset the name is derived from the local time
    pub name: Option<String>,
    pub name_prefix: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            name: None,
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
        }
    }
}

/// Controller for one recording session.
///
/// Single use: once stopped it stays stopped. Dropping it ends the capture
/// stream and aborts the render loop.
pub struct RecordingSessionController<D, E, S>
where
    D: CaptureDevice,
    E: SegmentEncoder,
    S: RecordingStore,
{
    device: D,
    encoder: E,
    store: S,
    clock: Arc<dyn Clock>,
    options: SessionOptions,
    session: Session,
    stream: Option<Box<dyn CaptureStream>>,
    format: CaptureFormat,
    feed: watch::Sender<SessionSnapshot>,
    monitor: Option<(LiveMonitor, Box<dyn MonitorDisplay>)>,
    monitor_task: Option<MonitorHandle>,
}

impl<D, E, S> RecordingSessionController<D, E, S>
where
    D: CaptureDevice,
    E: SegmentEncoder,
    S: RecordingStore,
{
    pub fn new(device: D, encoder: E, store: S, clock: Arc<dyn Clock>) -> Self {
        let (feed, _) = watch::channel(SessionSnapshot::default());
        Self {
            device,
            encoder,
            store,
            clock,
            options: SessionOptions::default(),
            session: Session::new(),
            stream: None,
            format: CaptureFormat::default(),
            feed,
            monitor: None,
            monitor_task: None,
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Render frames to `display` while the session is active
    pub fn with_monitor(mut self, monitor: LiveMonitor, display: Box<dyn MonitorDisplay>) -> Self {
        self.monitor = Some((monitor, display));
        self
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Active recording time so far
    pub fn elapsed(&self) -> StdDuration {
        self.session.elapsed_at(self.clock.now())
    }

    /// Active time folded at the last pause or stop
    pub fn accumulated(&self) -> StdDuration {
        self.session.accumulated()
    }

    pub fn segments(&self) -> &[Segment] {
        self.session.segments()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Receive timing snapshots on every transition
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.feed.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Acquire the device and start recording.
    ///
    /// On `DeviceUnavailable` the controller stays idle and may be retried.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        let state = self.session.state();
        if state != SessionState::Idle {
            return Err(InvalidStateTransition {
                current_state: state,
                action: "start".to_string(),
            }
            .into());
        }

        let stream = self.device.acquire().await.map_err(|e| {
            warn!(error = %e, "Capture device could not be acquired");
            SessionError::from(e)
        })?;
        self.format = stream.format();
        self.stream = Some(stream);

        let at = self.clock.now();
        if let Err(err) = self.dispatch(SessionEvent::PermissionGranted { at }).await {
            self.release_stream();
            self.session = Session::new();
            self.publish();
            return Err(err);
        }

        info!(sample_rate = self.format.sample_rate, "Recording started");
        Ok(())
    }

    /// Pause a running recording. Returns false when not recording.
    pub async fn pause(&mut self) -> Result<bool, SessionError> {
        let at = self.clock.now();
        let changed = self.session.state() == SessionState::Recording;
        self.dispatch(SessionEvent::UserPause { at }).await?;
        Ok(changed)
    }

    /// Resume a paused recording. Returns false when not paused.
    pub async fn resume(&mut self) -> Result<bool, SessionError> {
        let at = self.clock.now();
        let changed = self.session.state() == SessionState::Paused;
        self.dispatch(SessionEvent::UserResume { at }).await?;
        Ok(changed)
    }

    /// Pause when recording, resume when paused
    pub async fn toggle_pause(&mut self) -> Result<bool, SessionError> {
        match self.session.state() {
            SessionState::Recording => self.pause().await,
            SessionState::Paused => self.resume().await,
            _ => Ok(false),
        }
    }

    /// Stop and persist the recording.
    ///
    /// Returns `Ok(None)` when there is no active session, so repeated
    /// calls are harmless.
    pub async fn stop(&mut self) -> Result<Option<Recording>, SessionError> {
        if !self.session.state().is_active() {
            return Ok(None);
        }

        // Chunks captured before the stop request still belong to the recording
        while let Some(event) = self.try_next_event() {
            self.handle_event(event).await?;
        }
        if !self.session.state().is_active() {
            return Ok(None);
        }

        let at = self.clock.now();
        self.dispatch(SessionEvent::UserStop { at }).await
    }

    /// Wait for the next capture event. Never resolves without a stream.
    pub async fn next_event(&mut self) -> CaptureEvent {
        match self.stream.as_mut() {
            Some(stream) => match stream.events().recv().await {
                Some(event) => event,
                None => CaptureEvent::Lost("capture stream closed".to_string()),
            },
            None => std::future::pending().await,
        }
    }

    fn try_next_event(&mut self) -> Option<CaptureEvent> {
        self.stream
            .as_mut()
            .and_then(|stream| stream.events().try_recv().ok())
    }

    /// Feed one capture event into the session.
    ///
    /// A lost device stops the session, saves what was collected and
    /// reports `StreamInterrupted`.
    pub async fn handle_event(&mut self, event: CaptureEvent) -> Result<(), SessionError> {
        match event {
            CaptureEvent::Chunk(segment) => {
                self.session.handle(SessionEvent::DataChunk(segment));
                Ok(())
            }
            CaptureEvent::Lost(reason) => {
                if !self.session.state().is_active() {
                    return Ok(());
                }
                warn!(%reason, "Capture device lost");
                let at = self.clock.now();
                let recording = match self.dispatch(SessionEvent::DeviceLost { at }).await {
                    Ok(recording) => recording,
                    Err(err) => {
                        error!(error = %err, "Could not salvage interrupted recording");
                        None
                    }
                };
                Err(SessionError::StreamInterrupted {
                    reason,
                    recording: recording.map(Box::new),
                })
            }
        }
    }

    /// Wait for and handle one capture event
    pub async fn pump(&mut self) -> Result<(), SessionError> {
        let event = self.next_event().await;
        self.handle_event(event).await
    }

    async fn dispatch(&mut self, event: SessionEvent) -> Result<Option<Recording>, SessionError> {
        let before = self.session.state();
        let effects = self.session.handle(event);
        let after = self.session.state();
        if before != after {
            debug!(from = %before, to = %after, "Session transition");
        }
        self.publish();
        self.apply(effects).await
    }

    async fn apply(&mut self, effects: Vec<Effect>) -> Result<Option<Recording>, SessionError> {
        let mut finalized = None;
        for effect in effects {
            match effect {
                Effect::BeginCapture => {
                    if let Some(stream) = self.stream.as_mut() {
                        stream.begin()?;
                    }
                }
                Effect::SuspendCapture => {
                    if let Some(stream) = self.stream.as_mut() {
                        stream.suspend();
                    }
                }
                Effect::ResumeCapture => {
                    if let Some(stream) = self.stream.as_mut() {
                        stream.resume();
                    }
                }
                Effect::StartMonitor => self.start_monitor(),
                Effect::StopMonitor => {
                    if let Some(task) = self.monitor_task.take() {
                        task.shutdown().await;
                    }
                }
                Effect::EndCapture => self.end_capture(),
                Effect::Finalize {
                    active,
                    interrupted,
                } => {
                    finalized = Some(self.finalize(active, interrupted).await?);
                }
            }
        }
        Ok(finalized)
    }

    fn start_monitor(&mut self) {
        if let Some((mut monitor, display)) = self.monitor.take() {
            if let Some(stream) = self.stream.as_ref() {
                monitor.attach(stream.tap());
            }
            let task = monitor.spawn(self.feed.subscribe(), Arc::clone(&self.clock), display);
            self.monitor_task = Some(task);
        }
    }

    /// End the stream, then keep every chunk it queued before closing
    fn end_capture(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        stream.end();

        let mut drained = 0usize;
        while let Ok(event) = stream.events().try_recv() {
            match event {
                CaptureEvent::Chunk(segment) => {
                    drained += 1;
                    self.session.append_drained(segment);
                }
                CaptureEvent::Lost(reason) => {
                    debug!(%reason, "Ignoring capture loss reported after stop");
                }
            }
        }
        if drained > 0 {
            debug!(chunks = drained, "Kept trailing capture chunks");
        }
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.end();
        }
    }

    async fn finalize(
        &mut self,
        active: StdDuration,
        interrupted: bool,
    ) -> Result<Recording, SessionError> {
        let segments = self.session.take_segments();
        let audio = self.encoder.encode(&segments, self.format)?;

        let created_at = Utc::now();
        let name = match self.options.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_name(&self.options.name_prefix, created_at.with_timezone(&Local)),
        };
        let recording = Recording::new(
            RecordingId::generate(created_at),
            name,
            created_at,
            active.as_secs_f64(),
            audio,
        );

        self.store.put(&recording).await.map_err(|e| {
            error!(id = %recording.id(), error = %e, "Failed to persist recording");
            SessionError::StorageWriteFailure(e)
        })?;

        info!(
            id = %recording.id(),
            duration_seconds = recording.duration_seconds(),
            segments = segments.len(),
            interrupted,
            "Recording saved"
        );
        Ok(recording)
    }

    fn publish(&self) {
        self.feed.send_replace(self.session.snapshot());
    }
}

impl<D, E, S> Drop for RecordingSessionController<D, E, S>
where
    D: CaptureDevice,
    E: SegmentEncoder,
    S: RecordingStore,
{
    fn drop(&mut self) {
        self.release_stream();
    }
}
