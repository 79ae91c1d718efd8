//! Live monitor: periodic waveform and elapsed-time rendering

use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::domain::session::{format_elapsed, SessionSnapshot, SessionState, Timestamp};
use crate::domain::waveform::{
    render_waveform, Framebuffer, MonitorSettings, MonitorSettingsError,
};

use super::ports::{Clock, MonitorDisplay, MonitorFrame, SampleSource};

/// Renders frames from a live signal tap and the session timing snapshot
pub struct LiveMonitor {
    settings: MonitorSettings,
    framebuffer: Framebuffer,
    window: Vec<f32>,
    source: Option<Arc<dyn SampleSource>>,
    drawn: bool,
}

impl LiveMonitor {
    pub fn new(settings: MonitorSettings) -> Result<Self, MonitorSettingsError> {
        settings.validate()?;
        Ok(Self {
            settings,
            framebuffer: Framebuffer::new(settings.width, settings.height),
            window: vec![0.0; settings.window],
            source: None,
            drawn: false,
        })
    }

    pub fn settings(&self) -> MonitorSettings {
        self.settings
    }

    pub fn attach(&mut self, source: Arc<dyn SampleSource>) {
        self.source = Some(source);
    }

    pub fn detach(&mut self) {
        self.source = None;
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Pull one window from the source and redraw the framebuffer.
    /// Without a source (or when it is detached) the framebuffer is cleared.
    pub fn sample(&mut self) -> bool {
        let samples = match &self.source {
            Some(source) if source.read_window(&mut self.window) => Some(self.window.as_slice()),
            _ => None,
        };
        self.drawn = render_waveform(&mut self.framebuffer, samples);
        self.drawn
    }

    pub fn rows(&self) -> Vec<String> {
        self.framebuffer.rows()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Render one tick for `snapshot` at `now`.
    ///
    /// While paused the last waveform stays on screen and the timer is frozen.
    pub fn render_frame(&mut self, snapshot: &SessionSnapshot, now: Timestamp) -> MonitorFrame {
        if snapshot.state == SessionState::Recording || !self.drawn {
            self.sample();
        }
        MonitorFrame {
            state: snapshot.state,
            elapsed: format_elapsed(snapshot.elapsed_at(now)),
            rows: self.rows(),
            drawn: self.drawn,
        }
    }

    /// Run the render loop on the tokio runtime until the session leaves the
    /// active states, the feed closes, or the handle is shut down.
    pub fn spawn(
        mut self,
        mut feed: watch::Receiver<SessionSnapshot>,
        clock: Arc<dyn Clock>,
        mut display: Box<dyn MonitorDisplay>,
    ) -> MonitorHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let period = self.settings.frame_period();

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {}
                }

                if feed.has_changed().is_err() {
                    break;
                }
                let snapshot = *feed.borrow_and_update();
                if !snapshot.state.is_active() {
                    break;
                }

                let frame = self.render_frame(&snapshot, clock.now());
                display.present(&frame);
            }

            debug!("Monitor render loop finished");
            display.finish();
        });

        MonitorHandle {
            stop: Some(stop_tx),
            task,
        }
    }
}

/// Owner of a running render loop. Dropping it aborts the loop.
pub struct MonitorHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stop the loop and wait until the display is finished
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = (&mut self.task).await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
