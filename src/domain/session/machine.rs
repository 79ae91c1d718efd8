//! Recording session state machine
//!
//! The session owns the transient recording state: the current state, the
//! accumulated active time and the captured segments. Every input is a
//! discrete [`SessionEvent`]; [`Session::handle`] applies the transition and
//! returns the side effects the caller has to carry out against the capture
//! device, the live monitor and the recording store. No I/O happens here.
//!
//! State machine:
//!   IDLE      -> RECORDING (PermissionGranted)
//!   RECORDING -> PAUSED    (UserPause)
//!   PAUSED    -> RECORDING (UserResume)
//!   RECORDING -> STOPPED   (UserStop, DeviceLost)
//!   PAUSED    -> STOPPED   (UserStop, DeviceLost)
//!
//! Every other (state, event) pair is a no-op and yields no effects.

use std::time::Duration as StdDuration;

use super::state::SessionState;

/// Point on the session clock, measured from an arbitrary monotonic origin
pub type Timestamp = StdDuration;

/// One incrementally delivered chunk of captured mono PCM
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    samples: Vec<i16>,
}

impl Segment {
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<i16>> for Segment {
    fn from(samples: Vec<i16>) -> Self {
        Self::new(samples)
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The capture device was acquired
    PermissionGranted { at: Timestamp },
    /// Captured data arrived from the collection stream
    DataChunk(Segment),
    /// The collection stream failed terminally
    DeviceLost { at: Timestamp },
    UserPause { at: Timestamp },
    UserResume { at: Timestamp },
    UserStop { at: Timestamp },
}

/// Side effects requested by a transition, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    BeginCapture,
    SuspendCapture,
    ResumeCapture,
    StartMonitor,
    StopMonitor,
    /// End the collection stream and release the device
    EndCapture,
    /// Concatenate the segments into one recording and persist it
    Finalize {
        active: StdDuration,
        interrupted: bool,
    },
}

/// Copyable view of the timing state, published to the live monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub accumulated: StdDuration,
    pub entered_at: Option<Timestamp>,
}

impl SessionSnapshot {
    /// Active time at `now`: the frozen total plus the open Recording interval
    pub fn elapsed_at(&self, now: Timestamp) -> StdDuration {
        match (self.state, self.entered_at) {
            (SessionState::Recording, Some(entry)) => {
                self.accumulated + now.saturating_sub(entry)
            }
            _ => self.accumulated,
        }
    }
}

/// Transient recording session
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    accumulated: StdDuration,
    entered_at: Option<Timestamp>,
    segments: Vec<Segment>,
}

impl Session {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Active time folded so far; excludes the currently open interval
    pub fn accumulated(&self) -> StdDuration {
        self.accumulated
    }

    pub fn elapsed_at(&self, now: Timestamp) -> StdDuration {
        self.snapshot().elapsed_at(now)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Hand the captured segments over for finalization
    pub fn take_segments(&mut self) -> Vec<Segment> {
        std::mem::take(&mut self.segments)
    }

    /// Keep a chunk the capture stream delivered before it closed.
    ///
    /// Only accepted once stopped and before the segments are taken.
    pub fn append_drained(&mut self, segment: Segment) {
        if self.state == SessionState::Stopped && !segment.is_empty() {
            self.segments.push(segment);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            accumulated: self.accumulated,
            entered_at: self.entered_at,
        }
    }

    /// Apply one event and return the effects to execute
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        use SessionEvent::*;
        use SessionState::*;

        match (self.state, event) {
            (Idle, PermissionGranted { at }) => {
                self.state = Recording;
                self.accumulated = StdDuration::ZERO;
                self.entered_at = Some(at);
                self.segments.clear();
                vec![Effect::BeginCapture, Effect::StartMonitor]
            }
            (Recording | Paused, DataChunk(segment)) => {
                // Chunks flushed right after a pause still belong to the recording
                if !segment.is_empty() {
                    self.segments.push(segment);
                }
                Vec::new()
            }
            (Recording, UserPause { at }) => {
                self.fold_open_interval(at);
                self.state = Paused;
                vec![Effect::SuspendCapture]
            }
            (Paused, UserResume { at }) => {
                self.entered_at = Some(at);
                self.state = Recording;
                vec![Effect::ResumeCapture]
            }
            (Recording | Paused, UserStop { at }) => self.stop(at, false),
            (Recording | Paused, DeviceLost { at }) => self.stop(at, true),
            _ => Vec::new(),
        }
    }

    fn stop(&mut self, at: Timestamp, interrupted: bool) -> Vec<Effect> {
        self.fold_open_interval(at);
        self.state = SessionState::Stopped;
        vec![
            Effect::StopMonitor,
            Effect::EndCapture,
            Effect::Finalize {
                active: self.accumulated,
                interrupted,
            },
        ]
    }

    fn fold_open_interval(&mut self, now: Timestamp) {
        if let Some(entry) = self.entered_at.take() {
            self.accumulated += now.saturating_sub(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Timestamp {
        StdDuration::from_secs_f64(s)
    }

    fn started_at(at: f64) -> Session {
        let mut session = Session::new();
        session.handle(SessionEvent::PermissionGranted { at: secs(at) });
        session
    }

    fn finalize_duration(effects: &[Effect]) -> Option<StdDuration> {
        effects.iter().find_map(|e| match e {
            Effect::Finalize { active, .. } => Some(*active),
            _ => None,
        })
    }

    #[test]
    fn new_session_is_idle() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.accumulated(), StdDuration::ZERO);
        assert!(session.segments().is_empty());
    }

    #[test]
    fn permission_granted_starts_recording() {
        let mut session = Session::new();
        let effects = session.handle(SessionEvent::PermissionGranted { at: secs(1.0) });
        assert_eq!(session.state(), SessionState::Recording);
        assert_eq!(effects, vec![Effect::BeginCapture, Effect::StartMonitor]);
    }

    #[test]
    fn pause_folds_open_interval() {
        let mut session = started_at(0.0);
        let effects = session.handle(SessionEvent::UserPause { at: secs(2.0) });
        assert_eq!(effects, vec![Effect::SuspendCapture]);
        assert_eq!(session.state(), SessionState::Paused);
        assert_eq!(session.accumulated(), secs(2.0));
        // Frozen while paused
        assert_eq!(session.elapsed_at(secs(100.0)), secs(2.0));
    }

    #[test]
    fn resume_continues_from_frozen_value() {
        let mut session = started_at(0.0);
        session.handle(SessionEvent::UserPause { at: secs(2.0) });
        let effects = session.handle(SessionEvent::UserResume { at: secs(7.0) });
        assert_eq!(effects, vec![Effect::ResumeCapture]);
        assert_eq!(session.elapsed_at(secs(8.0)), secs(3.0));
    }

    #[test]
    fn stop_from_recording_folds_before_finalize() {
        let mut session = started_at(0.0);
        session.handle(SessionEvent::UserPause { at: secs(2.0) });
        session.handle(SessionEvent::UserResume { at: secs(7.0) });
        let effects = session.handle(SessionEvent::UserStop { at: secs(8.0) });

        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(effects[0], Effect::StopMonitor);
        assert_eq!(effects[1], Effect::EndCapture);
        assert_eq!(finalize_duration(&effects), Some(secs(3.0)));
    }

    #[test]
    fn stop_from_paused_uses_frozen_value() {
        let mut session = started_at(0.0);
        session.handle(SessionEvent::UserPause { at: secs(1.5) });
        let effects = session.handle(SessionEvent::UserStop { at: secs(30.0) });
        assert_eq!(finalize_duration(&effects), Some(secs(1.5)));
    }

    #[test]
    fn duration_is_independent_of_pause_count() {
        let mut session = started_at(0.0);
        let mut now = 0.0;
        for _ in 0..10 {
            now += 0.5;
            session.handle(SessionEvent::UserPause { at: secs(now) });
            now += 3.0;
            session.handle(SessionEvent::UserResume { at: secs(now) });
        }
        now += 1.0;
        let effects = session.handle(SessionEvent::UserStop { at: secs(now) });
        let active = finalize_duration(&effects).unwrap();
        assert!((active.as_secs_f64() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn immediate_stop_yields_zero_duration() {
        let mut session = started_at(5.0);
        let effects = session.handle(SessionEvent::UserStop { at: secs(5.0) });
        assert_eq!(finalize_duration(&effects), Some(StdDuration::ZERO));
    }

    #[test]
    fn device_lost_finalizes_as_interrupted() {
        let mut session = started_at(0.0);
        session.handle(SessionEvent::DataChunk(Segment::new(vec![1, 2, 3])));
        let effects = session.handle(SessionEvent::DeviceLost { at: secs(4.0) });
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(effects.contains(&Effect::Finalize {
            active: secs(4.0),
            interrupted: true
        }));
        assert_eq!(session.segments().len(), 1);
    }

    #[test]
    fn chunks_append_in_order() {
        let mut session = started_at(0.0);
        session.handle(SessionEvent::DataChunk(Segment::new(vec![1])));
        session.handle(SessionEvent::UserPause { at: secs(1.0) });
        session.handle(SessionEvent::DataChunk(Segment::new(vec![2, 3])));
        session.handle(SessionEvent::DataChunk(Segment::new(Vec::new())));
        let samples: Vec<i16> = session
            .take_segments()
            .iter()
            .flat_map(|s| s.samples().to_vec())
            .collect();
        assert_eq!(samples, vec![1, 2, 3]);
    }

    #[test]
    fn invalid_transitions_are_no_ops() {
        let mut idle = Session::new();
        assert!(idle.handle(SessionEvent::UserPause { at: secs(1.0) }).is_empty());
        assert!(idle.handle(SessionEvent::UserResume { at: secs(1.0) }).is_empty());
        assert!(idle.handle(SessionEvent::UserStop { at: secs(1.0) }).is_empty());
        assert!(idle.handle(SessionEvent::DataChunk(Segment::new(vec![1]))).is_empty());
        assert_eq!(idle.state(), SessionState::Idle);
        assert!(idle.segments().is_empty());

        let mut recording = started_at(0.0);
        assert!(recording
            .handle(SessionEvent::UserResume { at: secs(1.0) })
            .is_empty());
        assert!(recording
            .handle(SessionEvent::PermissionGranted { at: secs(1.0) })
            .is_empty());
        assert_eq!(recording.state(), SessionState::Recording);
    }

    #[test]
    fn stopped_is_terminal() {
        let mut session = started_at(0.0);
        session.handle(SessionEvent::UserStop { at: secs(2.0) });
        let frozen = session.accumulated();

        for event in [
            SessionEvent::UserPause { at: secs(3.0) },
            SessionEvent::UserResume { at: secs(4.0) },
            SessionEvent::UserStop { at: secs(5.0) },
            SessionEvent::DeviceLost { at: secs(6.0) },
            SessionEvent::PermissionGranted { at: secs(7.0) },
            SessionEvent::DataChunk(Segment::new(vec![9])),
        ] {
            assert!(session.handle(event).is_empty());
        }
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(session.accumulated(), frozen);
        assert!(session.segments().is_empty());
    }

    #[test]
    fn drained_chunks_join_stopped_session() {
        let mut session = started_at(0.0);
        session.handle(SessionEvent::DataChunk(Segment::new(vec![1])));
        session.handle(SessionEvent::UserStop { at: secs(1.0) });
        session.append_drained(Segment::new(vec![2]));
        session.append_drained(Segment::new(Vec::new()));
        assert_eq!(session.segments().len(), 2);

        let mut recording = started_at(0.0);
        recording.append_drained(Segment::new(vec![5]));
        assert!(recording.segments().is_empty());
    }

    #[test]
    fn snapshot_elapsed_tracks_open_interval() {
        let session = started_at(10.0);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.elapsed_at(secs(12.5)), secs(2.5));
        // A clock reading before entry never underflows
        assert_eq!(snapshot.elapsed_at(secs(9.0)), StdDuration::ZERO);
    }
}
