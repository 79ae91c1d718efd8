//! Ring buffer of recent samples shared with the live monitor

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::application::ports::SampleSource;

const I16_SCALE: f32 = 32768.0;

#[derive(Debug)]
struct TapState {
    ring: VecDeque<f32>,
    attached: bool,
}

/// Producer side writes, monitor side reads the newest window.
#[derive(Debug)]
pub struct SignalTap {
    capacity: usize,
    state: Mutex<TapState>,
}

impl SignalTap {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(TapState {
                ring: VecDeque::with_capacity(capacity),
                attached: true,
            }),
        }
    }

    pub fn push_i16(&self, samples: &[i16]) {
        self.push_iter(samples.iter().map(|&s| s as f32 / I16_SCALE));
    }

    pub fn push_f32(&self, samples: &[f32]) {
        self.push_iter(samples.iter().map(|&s| s.clamp(-1.0, 1.0)));
    }

    fn push_iter(&self, samples: impl Iterator<Item = f32>) {
        if let Ok(mut state) = self.state.lock() {
            if !state.attached {
                return;
            }
            for sample in samples {
                if state.ring.len() == self.capacity {
                    state.ring.pop_front();
                }
                state.ring.push_back(sample);
            }
        }
    }

    /// Stop serving windows and drop buffered samples
    pub fn detach(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.attached = false;
            state.ring.clear();
        }
    }

    pub fn attach(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.attached = true;
        }
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().map(|s| s.attached).unwrap_or(false)
    }
}

impl SampleSource for SignalTap {
    fn read_window(&self, window: &mut [f32]) -> bool {
        let Ok(state) = self.state.lock() else {
            return false;
        };
        if !state.attached {
            return false;
        }

        // Left-pad with silence until enough samples have arrived
        let available = state.ring.len().min(window.len());
        let pad = window.len() - available;
        window[..pad].fill(0.0);
        let start = state.ring.len() - available;
        for (slot, sample) in window[pad..].iter_mut().zip(state.ring.range(start..)) {
            *slot = *sample;
        }
        true
    }
}
