use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::effects::Flashlight;
use crate::Result;

/// Playback position in milliseconds. Never goes negative.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaybackClock {
    pub time_ms: f64,
}

impl PlaybackClock {
    pub fn starting_at(time_ms: f64) -> Self {
        Self {
            time_ms: time_ms.max(0.0),
        }
    }

    pub fn advance(&mut self, delta_ms: f64) -> f64 {
        self.time_ms = (self.time_ms + delta_ms).max(0.0);
        self.time_ms
    }
}

/// Input-layer callback captured at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    Cursor { x: f32, y: f32 },
    Combo { combo: i64 },
    Sliding { active: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSignal {
    pub time_ms: f64,
    #[serde(flatten)]
    pub signal: Signal,
}

impl ScheduledSignal {
    pub fn new(time_ms: f64, signal: Signal) -> Self {
        Self { time_ms, signal }
    }
}

/// Replays recorded gameplay signals onto a [`Flashlight`] as playback passes
/// them. Each signal fires once, in time order; ties keep recording order.
#[derive(Debug, Default)]
pub struct SignalScheduler {
    signals: Vec<ScheduledSignal>,
    next_signal: usize,
    cursor: Vec2,
}

impl SignalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let signals: Vec<ScheduledSignal> = serde_json::from_str(&text)?;
        let mut scheduler = Self::new();
        scheduler.set_signals(signals);
        Ok(scheduler)
    }

    pub fn set_signals(&mut self, mut signals: Vec<ScheduledSignal>) {
        signals.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        self.signals = signals;
        self.next_signal = 0;
    }

    /// Dispatches every pending signal at or before `time_ms`. Cursor signals
    /// only move the target; the flashlight is eased towards it once per tick.
    /// Returns how many signals fired.
    pub fn tick(&mut self, time_ms: f64, flashlight: &mut Flashlight) -> usize {
        let start = self.next_signal;

        while let Some(scheduled) = self.signals.get(self.next_signal) {
            if scheduled.time_ms > time_ms {
                break;
            }

            match scheduled.signal {
                Signal::Cursor { x, y } => self.cursor = Vec2::new(x, y),
                Signal::Combo { combo } => flashlight.update_combo(combo),
                Signal::Sliding { active } => flashlight.set_sliding(active),
            }
            self.next_signal += 1;
        }

        flashlight.update_position(self.cursor);
        self.next_signal - start
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.signals.len() - self.next_signal
    }

    /// Time of the last recorded signal, if any.
    pub fn end_time(&self) -> Option<f64> {
        self.signals.last().map(|scheduled| scheduled.time_ms)
    }
}
