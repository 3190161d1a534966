//! Shared spectrum store: the hand-off point between the capture thread and
//! the consumer.
//!
//! One mutex guards the latest frame, the waterfall history, and the mode
//! flag together, so `publish` and `snapshot` never expose a half-written
//! state to either side.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::params::DisplayMode;
use crate::spectrum::SpectrumFrame;

/// Consistent read of the store contents
#[derive(Debug, Clone)]
pub enum Snapshot {
    /// Latest frame, if any has been published yet
    Bars(Option<SpectrumFrame>),
    /// Bounded history, newest first
    Waterfall(Vec<SpectrumFrame>),
}

/// Latest frame plus, in waterfall mode, a bounded frame history
pub struct SpectrumStore {
    inner: Mutex<Inner>,
    history_capacity: usize,
}

struct Inner {
    latest: Option<SpectrumFrame>,
    history: VecDeque<SpectrumFrame>,
    mode: DisplayMode,
}

impl SpectrumStore {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                latest: None,
                history: VecDeque::with_capacity(history_capacity),
                mode: DisplayMode::Bars,
            }),
            history_capacity,
        }
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Replace the latest frame. In waterfall mode the frame is also inserted
    /// at the front of the history, evicting the oldest entry past capacity.
    pub fn publish(&self, frame: SpectrumFrame) {
        let mut inner = self.inner.lock().unwrap();
        if inner.mode == DisplayMode::Waterfall {
            inner.history.push_front(frame.clone());
            while inner.history.len() > self.history_capacity {
                inner.history.pop_back();
            }
        }
        inner.latest = Some(frame);
    }

    /// Read the current contents according to the active mode
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock().unwrap();
        match inner.mode {
            DisplayMode::Bars => Snapshot::Bars(inner.latest.clone()),
            DisplayMode::Waterfall => {
                Snapshot::Waterfall(inner.history.iter().cloned().collect())
            }
        }
    }

    /// Switch display mode. Leaving waterfall discards the history under the
    /// same lock publishes take, so a concurrent snapshot sees either the old
    /// history or none of it.
    pub fn set_mode(&self, mode: DisplayMode) {
        let mut inner = self.inner.lock().unwrap();
        if inner.mode == DisplayMode::Waterfall && mode == DisplayMode::Bars {
            inner.history.clear();
        }
        inner.mode = mode;
    }

    pub fn mode(&self) -> DisplayMode {
        self.inner.lock().unwrap().mode
    }
}
