//! Core library for the Beatviz beatmap visualiser.
//!
//! Gameplay signals (combo, slider holds, breaks, cursor motion) are turned
//! into animated effect parameters by controllers in [`effects`], resolved
//! through [`animation`] tracks and drawn by passes in [`render`] against a
//! [`render::RenderDevice`]. Settings are owned by a [`SettingsStore`]
//! created once at startup.

pub mod animation;
pub mod assets;
pub mod chart;
pub mod config;
pub mod effects;
pub mod error;
pub mod render;
pub mod timeline;

pub use animation::{Easing, Glider, Transition};
pub use assets::{BuiltinAssets, DirAssets, MemoryAssets, ShaderSource};
pub use chart::{Chart, Difficulty, HitObject, Pause};
pub use config::{Settings, SettingsStore, SETTINGS_VERSION};
pub use effects::{Flashlight, DEFAULT_FLASHLIGHT_DURATION, DEFAULT_FLASHLIGHT_SIZE};
pub use error::{BeatVizError, Result};
pub use render::{BlendScope, BlendState, FlashlightPass, HeadlessDevice, RenderDevice};
pub use timeline::{PlaybackClock, ScheduledSignal, Signal, SignalScheduler};
