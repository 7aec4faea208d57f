//! Read-only beatmap data consumed by the effect controllers.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{BeatVizError, Result};

/// A hit object reduced to its time span, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitObject {
    pub start_time: i64,
    pub end_time: i64,
}

impl HitObject {
    pub fn new(start_time: i64, end_time: i64) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Circles have no duration; the end time equals the start time.
    pub fn circle(time: i64) -> Self {
        Self::new(time, time)
    }
}

/// A break between hit objects, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pause {
    pub start_time: i64,
    pub end_time: i64,
}

impl Pause {
    pub fn new(start_time: i64, end_time: i64) -> Self {
        Self {
            start_time,
            end_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    #[serde(default = "Difficulty::default_od")]
    pub overall_difficulty: f64,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            overall_difficulty: Self::default_od(),
        }
    }
}

impl Difficulty {
    fn default_od() -> f64 {
        5.0
    }

    /// Hit window of the lowest scoring judgement, in whole milliseconds.
    pub fn hit50(&self) -> i64 {
        difficulty_rate(self.overall_difficulty, 200.0, 150.0, 100.0) as i64
    }
}

/// Maps a 0..10 difficulty value onto a range anchored at 0, 5 and 10.
pub fn difficulty_rate(value: f64, min: f64, mid: f64, max: f64) -> f64 {
    if value > 5.0 {
        mid + (max - mid) * (value - 5.0) / 5.0
    } else if value < 5.0 {
        mid - (mid - min) * (5.0 - value) / 5.0
    } else {
        mid
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub hit_objects: Vec<HitObject>,
    #[serde(default)]
    pub pauses: Vec<Pause>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Chart {
    pub fn new(hit_objects: Vec<HitObject>, pauses: Vec<Pause>, difficulty: Difficulty) -> Self {
        Self {
            hit_objects,
            pauses,
            difficulty,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let chart: Chart = serde_json::from_str(text)?;
        chart.validate()?;
        Ok(chart)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks that hit objects and pauses are time-ascending and that no
    /// interval ends before it starts.
    pub fn validate(&self) -> Result<()> {
        let check = |kind: &str, spans: Vec<(i64, i64)>| -> Result<()> {
            for (index, &(start, end)) in spans.iter().enumerate() {
                if end < start {
                    return Err(BeatVizError::Chart(format!(
                        "{kind} {index} ends at {end} before it starts at {start}"
                    )));
                }
                if index > 0 && start < spans[index - 1].0 {
                    return Err(BeatVizError::Chart(format!(
                        "{kind} {index} starts at {start}, before the previous one"
                    )));
                }
            }
            Ok(())
        };

        check(
            "hit object",
            self.hit_objects
                .iter()
                .map(|object| (object.start_time, object.end_time))
                .collect(),
        )?;
        check(
            "pause",
            self.pauses
                .iter()
                .map(|pause| (pause.start_time, pause.end_time))
                .collect(),
        )
    }

    pub fn first_object(&self) -> Option<&HitObject> {
        self.hit_objects.first()
    }

    pub fn last_object(&self) -> Option<&HitObject> {
        self.hit_objects.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit50_follows_overall_difficulty() {
        let od = |value| Difficulty {
            overall_difficulty: value,
        };

        assert_eq!(od(0.0).hit50(), 200);
        assert_eq!(od(5.0).hit50(), 150);
        assert_eq!(od(10.0).hit50(), 100);
        assert_eq!(od(8.0).hit50(), 120);
    }

    #[test]
    fn parses_json_with_defaults() {
        let chart = Chart::from_json(
            r#"{ "hit_objects": [ { "start_time": 1000, "end_time": 1200 } ] }"#,
        )
        .unwrap();

        assert_eq!(chart.hit_objects, vec![HitObject::new(1000, 1200)]);
        assert!(chart.pauses.is_empty());
        assert_eq!(chart.difficulty.overall_difficulty, 5.0);
    }

    #[test]
    fn rejects_unordered_pauses() {
        let chart = Chart::new(
            vec![HitObject::circle(0)],
            vec![Pause::new(5000, 8000), Pause::new(1000, 3000)],
            Difficulty::default(),
        );

        let err = chart.validate().unwrap_err();
        assert!(format!("{err}").contains("pause 1"));
    }

    #[test]
    fn rejects_backwards_hit_object() {
        let json = r#"{ "hit_objects": [ { "start_time": 500, "end_time": 100 } ] }"#;
        let err = Chart::from_json(json).unwrap_err();

        assert!(matches!(err, BeatVizError::Chart(_)));
    }
}
