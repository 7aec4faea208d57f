use glam::Vec2;

use crate::animation::{out_quad, Glider};
use crate::chart::Chart;

/// Flashlight radius, in playfield units, at low combo.
pub const DEFAULT_FLASHLIGHT_SIZE: f64 = 168.0;
/// Length of size transitions, in milliseconds.
pub const DEFAULT_FLASHLIGHT_DURATION: f64 = 800.0;

/// Radius multiplier used while the flashlight is "open" (intro, outro, breaks).
const OPEN_FACTOR: f64 = 2.5;
/// Time window over which the cursor position catches up with its target.
const POSITION_WINDOW: f64 = 120.0;
const SLIDE_DIM: f64 = 0.8;
const SLIDE_DIM_DURATION: f64 = 50.0;
/// Added to the hit50 window when placing the outro.
const OUTRO_GRACE: i64 = 5;

/// Gameplay-driven state of the flashlight effect.
///
/// Owns the size and dim tracks and turns combo, slider and break signals
/// into transitions on them. Cursor input is smoothed towards its target.
#[derive(Debug, Clone)]
pub struct Flashlight {
    time: f64,
    delta: f64,
    position: Vec2,
    size: Glider,
    dim: Glider,
    pauses: Vec<(f64, f64)>,
    break_index: Option<usize>,
    base_size: f64,
    duration: f64,
    target: f64,
    sliding: bool,
}

impl Flashlight {
    pub fn new(chart: &Chart) -> Self {
        Self::with_size(chart, DEFAULT_FLASHLIGHT_SIZE, DEFAULT_FLASHLIGHT_DURATION)
    }

    /// Builds the controller and schedules the intro and outro transitions:
    /// the radius closes down to `base_size` by the first hit object and
    /// opens up again once the last one can no longer be hit.
    pub fn with_size(chart: &Chart, base_size: f64, duration: f64) -> Self {
        let mut size = Glider::new(base_size * OPEN_FACTOR);

        match (chart.first_object(), chart.last_object()) {
            (Some(first), Some(last)) => {
                let start = first.start_time as f64;
                let end = (last.end_time + chart.difficulty.hit50() + OUTRO_GRACE) as f64;

                size.add_event(start - duration, start, base_size);
                size.add_event(end, end + duration, base_size * OPEN_FACTOR);

                tracing::debug!(start, end, base_size, "scheduled flashlight intro and outro");
            }
            _ => tracing::warn!("chart has no hit objects, flashlight stays open"),
        }

        Self {
            time: 0.0,
            delta: 0.0,
            position: Vec2::ZERO,
            size,
            dim: Glider::new(0.0),
            pauses: chart
                .pauses
                .iter()
                .map(|pause| (pause.start_time as f64, pause.end_time as f64))
                .collect(),
            break_index: None,
            base_size,
            duration,
            target: base_size,
            sliding: false,
        }
    }

    /// Eases the flashlight centre towards `target`. The remaining offset is
    /// closed by `OutQuad(min(delta, 120) / 120)`, so a frame of 120ms or more
    /// lands exactly on the target and shorter frames never overshoot.
    pub fn update_position(&mut self, target: Vec2) {
        let factor = out_quad(self.delta.clamp(0.0, POSITION_WINDOW) / POSITION_WINDOW) as f32;
        self.position += (target - self.position) * factor;
    }

    /// Radius for a combo count. Thresholds are exclusive: 100 and 200 still
    /// belong to the lower tier.
    pub fn size_for_combo(&self, combo: i64) -> f64 {
        match combo {
            c if c > 200 => self.base_size * 0.625,
            c if c > 100 => self.base_size * 0.8125,
            _ => self.base_size,
        }
    }

    pub fn update_combo(&mut self, combo: i64) {
        let target = self.size_for_combo(combo);
        self.target = target;
        self.size.add_event(self.time, self.time + self.duration, target);
    }

    /// Dims the playfield while a slider is held. Repeating the current
    /// state is a no-op.
    pub fn set_sliding(&mut self, sliding: bool) {
        if self.sliding == sliding {
            return;
        }

        let dim = if sliding { SLIDE_DIM } else { 0.0 };
        self.dim.add_event(self.time, self.time + SLIDE_DIM_DURATION, dim);
        self.sliding = sliding;
    }

    /// Advances to `time`: consumes breaks reached since the last call and
    /// resolves both tracks.
    pub fn update(&mut self, time: f64) {
        self.delta = time - self.time;
        self.time = time;

        let first = self.break_index.map_or(0, |index| index + 1);
        for index in first..self.pauses.len() {
            let (start, end) = self.pauses[index];
            if time < start {
                break;
            }

            self.break_index = Some(index);

            if end - start > self.duration * 2.0 {
                tracing::debug!(start, end, target = self.target, "opening flashlight for break");
                self.size.add_event(start, start + self.duration, self.base_size * OPEN_FACTOR);
                self.size.add_event(end - self.duration, end, self.target);
            }
        }

        let size = self.size.update(time);
        let dim = self.dim.update(time);
        tracing::trace!(time, size, dim, "flashlight updated");
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Radius resolved by the last [`Flashlight::update`].
    pub fn size(&self) -> f64 {
        self.size.value()
    }

    pub fn dim(&self) -> f64 {
        self.dim.value()
    }

    pub fn size_track(&self) -> &Glider {
        &self.size
    }

    pub fn dim_track(&self) -> &Glider {
        &self.dim
    }

    /// Radius derived from the most recent combo update.
    pub fn target_size(&self) -> f64 {
        self.target
    }

    pub fn break_index(&self) -> Option<usize> {
        self.break_index
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Difficulty, HitObject, Pause};

    fn chart(pauses: Vec<Pause>) -> Chart {
        Chart::new(
            vec![HitObject::circle(500), HitObject::new(9000, 9500)],
            pauses,
            Difficulty {
                overall_difficulty: 5.0,
            },
        )
    }

    #[test]
    fn bootstraps_intro_and_outro() {
        let flashlight = Flashlight::new(&chart(Vec::new()));
        let events = flashlight.size_track().events();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].end_time, 500.0);
        assert_eq!(events[0].end_value, DEFAULT_FLASHLIGHT_SIZE);
        // 9500 + hit50 (150) + 5
        assert_eq!(events[1].start_time, 9655.0);
        assert_eq!(events[1].end_value, DEFAULT_FLASHLIGHT_SIZE * 2.5);

        let size = flashlight.size_track();
        assert_eq!(size.value_at(-1000.0), DEFAULT_FLASHLIGHT_SIZE * 2.5);
        assert_eq!(size.value_at(500.0), DEFAULT_FLASHLIGHT_SIZE);
        assert_eq!(size.value_at(20_000.0), DEFAULT_FLASHLIGHT_SIZE * 2.5);
    }

    #[test]
    fn empty_chart_stays_open() {
        let mut flashlight = Flashlight::new(&Chart::default());
        flashlight.update(1000.0);

        assert!(flashlight.size_track().events().is_empty());
        assert_eq!(flashlight.size(), DEFAULT_FLASHLIGHT_SIZE * 2.5);
    }

    #[test]
    fn combo_tiers_have_exclusive_thresholds() {
        let flashlight = Flashlight::with_size(&chart(Vec::new()), 100.0, 800.0);

        assert_eq!(flashlight.size_for_combo(50), 100.0);
        assert_eq!(flashlight.size_for_combo(100), 100.0);
        assert_eq!(flashlight.size_for_combo(101), 81.25);
        assert_eq!(flashlight.size_for_combo(150), 81.25);
        assert_eq!(flashlight.size_for_combo(200), 81.25);
        assert_eq!(flashlight.size_for_combo(201), 62.5);
        assert_eq!(flashlight.size_for_combo(250), 62.5);
    }

    #[test]
    fn combo_update_schedules_transition_from_now() {
        let mut flashlight = Flashlight::with_size(&chart(Vec::new()), 100.0, 800.0);
        flashlight.update(2000.0);
        flashlight.update_combo(150);

        let last = *flashlight.size_track().events().last().unwrap();
        assert_eq!(last.start_time, 2000.0);
        assert_eq!(last.end_time, 2800.0);
        assert_eq!(last.start_value, 100.0);
        assert_eq!(last.end_value, 81.25);
        assert_eq!(flashlight.target_size(), 81.25);

        flashlight.update(2800.0);
        assert_eq!(flashlight.size(), 81.25);
    }

    #[test]
    fn sliding_is_idempotent() {
        let mut flashlight = Flashlight::new(&chart(Vec::new()));
        flashlight.update(1000.0);

        flashlight.set_sliding(true);
        flashlight.set_sliding(true);
        assert_eq!(flashlight.dim_track().events().len(), 1);

        flashlight.update(1050.0);
        assert_eq!(flashlight.dim(), 0.8);

        flashlight.set_sliding(false);
        assert_eq!(flashlight.dim_track().events().len(), 2);
        flashlight.update(1100.0);
        assert_eq!(flashlight.dim(), 0.0);
    }

    #[test]
    fn long_break_opens_and_closes() {
        let mut flashlight =
            Flashlight::with_size(&chart(vec![Pause::new(1000, 3000)]), 100.0, 800.0);
        flashlight.update(600.0);
        flashlight.update_combo(50);
        let before = flashlight.size_track().events().len();

        flashlight.update(1000.0);
        assert_eq!(flashlight.break_index(), Some(0));

        let events = flashlight.size_track().events();
        assert_eq!(events.len(), before + 2);

        let open = events[before];
        assert_eq!(open.start_time, 1000.0);
        assert_eq!(open.end_time, 1800.0);
        assert_eq!(open.end_value, 250.0);

        let close = events[before + 1];
        assert_eq!(close.start_time, 2200.0);
        assert_eq!(close.end_time, 3000.0);
        assert_eq!(close.start_value, 250.0);
        assert_eq!(close.end_value, 100.0);

        flashlight.update(1800.0);
        assert_eq!(flashlight.size(), 250.0);
        flashlight.update(3000.0);
        assert_eq!(flashlight.size(), 100.0);
    }

    #[test]
    fn break_closes_back_to_combo_size() {
        let mut flashlight =
            Flashlight::with_size(&chart(vec![Pause::new(2000, 4000)]), 100.0, 800.0);
        flashlight.update(600.0);
        flashlight.update_combo(150);
        flashlight.update(1500.0);
        assert_eq!(flashlight.size(), 81.25);

        flashlight.update(2000.0);
        let close = *flashlight.size_track().events().last().unwrap();
        assert_eq!(close.start_time, 3200.0);
        assert_eq!(close.end_time, 4000.0);
        assert_eq!(close.start_value, 250.0);
        assert_eq!(close.end_value, 81.25);

        flashlight.update(2800.0);
        assert_eq!(flashlight.size(), 250.0);
        flashlight.update(4000.0);
        assert_eq!(flashlight.size(), 81.25);
    }

    #[test]
    fn short_break_is_skipped_but_consumed() {
        let mut flashlight = Flashlight::with_size(
            &chart(vec![Pause::new(1000, 1500), Pause::new(4000, 7000)]),
            100.0,
            800.0,
        );
        let before = flashlight.size_track().events().len();

        flashlight.update(1200.0);
        assert_eq!(flashlight.break_index(), Some(0));
        assert_eq!(flashlight.size_track().events().len(), before);

        flashlight.update(3999.0);
        assert_eq!(flashlight.break_index(), Some(0));
    }

    #[test]
    fn breaks_are_consumed_once() {
        let mut flashlight =
            Flashlight::with_size(&chart(vec![Pause::new(1000, 3000)]), 100.0, 800.0);
        flashlight.update(1500.0);
        let count = flashlight.size_track().events().len();

        flashlight.update(1200.0);
        flashlight.update(2000.0);
        assert_eq!(flashlight.size_track().events().len(), count);
    }

    #[test]
    fn several_breaks_in_one_update() {
        let mut flashlight = Flashlight::with_size(
            &chart(vec![Pause::new(1000, 3000), Pause::new(4000, 6000)]),
            100.0,
            800.0,
        );
        let before = flashlight.size_track().events().len();

        flashlight.update(5000.0);
        assert_eq!(flashlight.break_index(), Some(1));
        assert_eq!(flashlight.size_track().events().len(), before + 4);
    }

    #[test]
    fn position_converges_on_target() {
        let mut flashlight = Flashlight::new(&chart(Vec::new()));
        let target = Vec2::new(256.0, 192.0);

        flashlight.update(60.0);
        flashlight.update_position(target);
        let halfway = flashlight.position();
        assert!(halfway.x > 0.0 && halfway.x < target.x);

        for step in 1..=6 {
            flashlight.update(60.0 + 120.0 * step as f64);
            flashlight.update_position(target);
        }
        assert!((flashlight.position() - target).length() <= target.length() * 0.001);
    }

    #[test]
    fn position_never_overshoots() {
        let mut flashlight = Flashlight::new(&chart(Vec::new()));
        let target = Vec2::new(100.0, -40.0);

        let mut time = 0.0;
        for frame in [16.0, 33.0, 7.0, 250.0, 1.0] {
            time += frame;
            flashlight.update(time);
            flashlight.update_position(target);
            assert!(flashlight.position().x <= target.x + 1e-3);
            assert!(flashlight.position().y >= target.y - 1e-3);
        }
    }
}
