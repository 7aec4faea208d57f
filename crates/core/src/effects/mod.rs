//! Gameplay-driven visual effects.

mod flashlight;

pub use flashlight::{Flashlight, DEFAULT_FLASHLIGHT_DURATION, DEFAULT_FLASHLIGHT_SIZE};
