//! Persistent user settings.
//!
//! Settings live in `settings.json` (or `settings-<n>.json` for a numbered
//! profile). Loading fills a default-initialised [`Settings`] from whatever
//! the file provides and writes the result straight back, so fields added in
//! newer builds appear on disk after the first run.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Format version stamped into every saved file.
pub const SETTINGS_VERSION: &str = "v1";

/// Top-level settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Settings {
    pub version: String,
    pub general: GeneralConfig,
    pub graphics: GraphicsConfig,
    pub audio: AudioConfig,
    pub cursor: CursorConfig,
    pub objects: ObjectsConfig,
    pub playfield: PlayfieldConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION.to_string(),
            general: GeneralConfig::default(),
            graphics: GraphicsConfig::default(),
            audio: AudioConfig::default(),
            cursor: CursorConfig::default(),
            objects: ObjectsConfig::default(),
            playfield: PlayfieldConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct GeneralConfig {
    pub osu_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        let local = std::env::var("LOCALAPPDATA").unwrap_or_default();
        let songs: PathBuf = [local.as_str(), "osu!", "Songs", ""].iter().collect();
        Self {
            osu_dir: songs.to_string_lossy().into_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct GraphicsConfig {
    pub width: i64,
    pub height: i64,
    pub window_width: i64,
    pub window_height: i64,
    pub fullscreen: bool,
    pub v_sync: bool,
    #[serde(rename = "FPSCap")]
    pub fps_cap: i64,
    #[serde(rename = "MSAA")]
    pub msaa: i32,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            window_width: 1280,
            window_height: 720,
            fullscreen: true,
            v_sync: false,
            fps_cap: 1000,
            msaa: 16,
        }
    }
}

impl GraphicsConfig {
    /// Output resolution for the current window mode.
    pub fn size(&self) -> (i64, i64) {
        if self.fullscreen {
            (self.width, self.height)
        } else {
            (self.window_width, self.window_height)
        }
    }

    pub fn size_f(&self) -> (f64, f64) {
        let (width, height) = self.size();
        (width as f64, height as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AudioConfig {
    pub general_volume: f64,
    pub music_volume: f64,
    pub sample_volume: f64,
    pub enable_beatmap_sample_volume: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            general_volume: 0.5,
            music_volume: 0.5,
            sample_volume: 0.5,
            enable_beatmap_sample_volume: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CursorConfig {
    pub enable_rainbow: bool,
    /// Degrees per second.
    pub rainbow_speed: f64,
    /// Base hue when the rainbow is disabled, 0..360.
    pub hue: f64,
    pub enable_custom_hue_offset: bool,
    pub hue_offset: f64,
    pub enable_custom_trail_glow_offset: bool,
    pub trail_glow_offset: f64,
    #[serde(rename = "ScaleToCS")]
    pub scale_to_cs: bool,
    /// Radius in playfield units.
    pub cursor_size: f64,
    pub scale_to_music_power: bool,
    pub show_cursors_on_breaks: bool,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enable_rainbow: true,
            rainbow_speed: 8.0,
            hue: 0.0,
            enable_custom_hue_offset: false,
            hue_offset: 0.0,
            enable_custom_trail_glow_offset: true,
            trail_glow_offset: -36.0,
            scale_to_cs: false,
            cursor_size: 18.0,
            scale_to_music_power: true,
            show_cursors_on_breaks: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ObjectsConfig {
    pub mandala_textures_trigger: i64,
    pub use_cursor_colors: bool,
    pub enable_rainbow: bool,
    pub rainbow_speed: f64,
    pub hue: f64,
    pub enable_custom_hue_offset: bool,
    pub hue_offset: f64,
    /// Negative means "use the beatmap's circle size".
    pub objects_size: f64,
    pub scale_to_music_power: bool,
}

impl Default for ObjectsConfig {
    fn default() -> Self {
        Self {
            mandala_textures_trigger: 5,
            use_cursor_colors: true,
            enable_rainbow: true,
            rainbow_speed: 8.0,
            hue: 0.0,
            enable_custom_hue_offset: false,
            hue_offset: 0.0,
            objects_size: -1.0,
            scale_to_music_power: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PlayfieldConfig {
    /// Seconds before the music starts.
    pub lead_in_time: f64,
    pub background_in_dim: f64,
    pub background_dim: f64,
    pub background_dim_breaks: f64,
    pub flash_to_music_power: bool,
    /// Scale and flash factor during kiai sections.
    pub kiai_factor: f64,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            lead_in_time: 5.0,
            background_in_dim: 0.0,
            background_dim: 0.95,
            background_dim_breaks: 0.95,
            flash_to_music_power: true,
            kiai_factor: 1.1,
        }
    }
}

/// File name for a settings profile; `0` is the unnumbered default.
pub fn settings_file_name(version: u32) -> String {
    if version > 0 {
        format!("settings-{version}.json")
    } else {
        "settings.json".to_string()
    }
}

/// Owner of the loaded [`Settings`] and the file they persist to.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Loads the profile `version` from `dir`, creating it with defaults when
    /// absent. The flag is `true` when the file was freshly created.
    pub fn load(dir: &Path, version: u32) -> Result<(Self, bool)> {
        let path = dir.join(settings_file_name(version));

        let (settings, fresh) = match std::fs::read_to_string(&path) {
            Ok(text) => (serde_json::from_str::<Settings>(&text)?, false),
            Err(err) if err.kind() == ErrorKind::NotFound => (Settings::default(), true),
            Err(err) => return Err(err.into()),
        };

        let mut store = Self { path, settings };
        store.save()?;

        if fresh {
            tracing::info!(path = %store.path.display(), "created default settings");
        } else {
            tracing::info!(path = %store.path.display(), "loaded settings");
        }

        Ok((store, fresh))
    }

    /// Writes the current values back to disk, stamping the format version.
    pub fn save(&mut self) -> Result<()> {
        self.settings.version = SETTINGS_VERSION.to_string();
        std::fs::write(&self.path, self.to_json()?)?;
        Ok(())
    }

    /// Tab-indented JSON as written to disk.
    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.settings.serialize(&mut serializer)?;
        out.push(b'\n');
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
