//! Time-driven scalar tracks.
//!
//! A [`Glider`] owns a base value and a list of transitions. Transitions are
//! kept in insertion order and are never sorted or removed; the value at a
//! given instant is resolved by scanning the whole list:
//!
//! 1. Among transitions whose `[start, end]` interval contains the instant,
//!    the most recently inserted one wins.
//! 2. Otherwise the transition that finished last (latest `end`, later
//!    insertion on ties) holds its end value.
//! 3. Otherwise nothing has fired yet and the base value is returned.

mod easing;

pub use easing::{out_quad, Easing};

/// A single scheduled transition of a [`Glider`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub start_time: f64,
    pub end_time: f64,
    pub start_value: f64,
    pub end_value: f64,
    pub easing: Easing,
}

impl Transition {
    fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time <= self.end_time
    }

    fn value_at(&self, time: f64) -> f64 {
        let length = self.end_time - self.start_time;
        // Zero (or negative) length intervals jump straight to the target.
        let progress = if length <= 0.0 {
            1.0
        } else {
            (time - self.start_time) / length
        };

        self.start_value + (self.end_value - self.start_value) * self.easing.apply(progress)
    }
}

/// Animation track producing a time-varying scalar from discrete transitions.
#[derive(Debug, Clone)]
pub struct Glider {
    base: f64,
    value: f64,
    events: Vec<Transition>,
}

impl Glider {
    pub fn new(base: f64) -> Self {
        Self {
            base,
            value: base,
            events: Vec::new(),
        }
    }

    /// Schedules a linear transition towards `target`. The start value is the
    /// track's resolved value at `start` given the transitions already queued.
    pub fn add_event(&mut self, start: f64, end: f64, target: f64) {
        self.add_event_eased(start, end, target, Easing::Linear);
    }

    pub fn add_event_eased(&mut self, start: f64, end: f64, target: f64, easing: Easing) {
        let from = self.value_at(start);
        self.add_event_from(start, end, from, target, easing);
    }

    /// Schedules a transition with an explicit start value. Ordering against
    /// the existing transitions is not checked; overlaps are settled at query
    /// time in favour of the later insertion.
    pub fn add_event_from(&mut self, start: f64, end: f64, from: f64, target: f64, easing: Easing) {
        self.events.push(Transition {
            start_time: start,
            end_time: end,
            start_value: from,
            end_value: target,
            easing,
        });
    }

    /// Resolves the value at `time` and caches it for [`Glider::value`].
    pub fn update(&mut self, time: f64) -> f64 {
        self.value = self.value_at(time);
        self.value
    }

    /// Last value resolved by [`Glider::update`].
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn events(&self) -> &[Transition] {
        &self.events
    }

    /// Pure resolution of the track at `time`; does not touch the cache.
    pub fn value_at(&self, time: f64) -> f64 {
        let mut active: Option<&Transition> = None;
        let mut finished: Option<&Transition> = None;

        for event in &self.events {
            if event.contains(time) {
                active = Some(event);
            } else if event.end_time < time
                && finished.map_or(true, |last| event.end_time >= last.end_time)
            {
                finished = Some(event);
            }
        }

        match (active, finished) {
            (Some(event), _) => event.value_at(time),
            (None, Some(event)) => event.end_value,
            (None, None) => self.base,
        }
    }
}
