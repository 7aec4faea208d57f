use std::path::{Path, PathBuf};

use beatviz_core::render::DeviceCall;
use beatviz_core::{
    BeatVizError, BuiltinAssets, Chart, DirAssets, Flashlight, FlashlightPass, HeadlessDevice,
    PlaybackClock, SettingsStore, ShaderSource, SignalScheduler, DEFAULT_FLASHLIGHT_DURATION,
};
use clap::{Parser, Subcommand};
use glam::{Mat4, Vec3};
use tracing_subscriber::EnvFilter;

/// Playfield dimensions in osu!pixels.
const PLAYFIELD: (f32, f32) = (512.0, 384.0);

fn main() -> beatviz_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let (mut store, fresh) = SettingsStore::load(&cli.settings_dir, cli.profile)?;
    if fresh {
        tracing::info!(path = %store.path().display(), "first run, wrote default settings");
    }

    match cli.command {
        Commands::Play {
            chart,
            signals,
            fps,
            assets,
        } => {
            let fps = fps.unwrap_or(store.settings().graphics.fps_cap.max(1) as f64);
            match assets {
                Some(root) => {
                    run_play(&store, &chart, signals.as_deref(), fps, &DirAssets::new(root))
                }
                None => run_play(&store, &chart, signals.as_deref(), fps, &BuiltinAssets),
            }
        }
        Commands::Settings { fullscreen } => {
            if let Some(fullscreen) = fullscreen {
                store.settings_mut().graphics.fullscreen = fullscreen;
                store.save()?;
            }
            println!("{}", store.to_json()?);
            Ok(())
        }
    }
}

fn run_play(
    store: &SettingsStore,
    chart_path: &Path,
    signals_path: Option<&Path>,
    fps: f64,
    assets: &impl ShaderSource,
) -> beatviz_core::Result<()> {
    let frame = frame_interval(fps)?;
    let chart = Chart::load(chart_path)?;
    let mut scheduler = match signals_path {
        Some(path) => SignalScheduler::load(path)?,
        None => SignalScheduler::new(),
    };
    tracing::info!(
        chart = %chart_path.display(),
        objects = chart.hit_objects.len(),
        pauses = chart.pauses.len(),
        signals = scheduler.remaining(),
        fps,
        "starting headless playback"
    );

    let mut device = HeadlessDevice::new();
    let pass = FlashlightPass::new(&mut device, assets)?;
    let mut flashlight = Flashlight::new(&chart);

    let (width, height) = store.settings().graphics.size_f();
    let matrix = playfield_matrix(width as f32, height as f32);

    let chart_end = chart.last_object().map_or(0, |object| object.end_time) as f64;
    let end = (chart_end + 2.0 * DEFAULT_FLASHLIGHT_DURATION)
        .max(scheduler.end_time().unwrap_or(0.0));

    let mut clock = PlaybackClock::default();
    let mut frames = 0u64;
    let mut draws = 0usize;
    let mut smallest = f64::MAX;

    while clock.time_ms < end {
        let time = clock.advance(frame);

        flashlight.update(time);
        scheduler.tick(time, &mut flashlight);
        pass.draw(&mut device, &flashlight, matrix);

        draws += device
            .take_calls()
            .iter()
            .filter(|call| matches!(call, DeviceCall::Draw { .. }))
            .count();
        frames += 1;
        smallest = smallest.min(flashlight.size());
    }

    tracing::info!(
        frames,
        draws,
        smallest_radius = smallest,
        final_radius = flashlight.size(),
        final_dim = flashlight.dim(),
        breaks = flashlight.break_index().map_or(0, |index| index + 1),
        "playback finished"
    );
    Ok(())
}

/// Milliseconds per simulated frame. The rate must be positive and finite,
/// otherwise the clock would never reach the end of the chart.
fn frame_interval(fps: f64) -> beatviz_core::Result<f64> {
    if !fps.is_finite() || fps <= 0.0 {
        let message = format!("frame rate must be positive and finite, got {fps}");
        return Err(BeatVizError::msg(message));
    }
    Ok(1000.0 / fps)
}

/// Maps the playfield into the middle 80% of the output height, centred.
fn playfield_matrix(width: f32, height: f32) -> Mat4 {
    let scale = height * 0.8 / PLAYFIELD.1;
    let offset = Vec3::new(
        (width - PLAYFIELD.0 * scale) / 2.0,
        (height - PLAYFIELD.1 * scale) / 2.0,
        0.0,
    );

    Mat4::orthographic_rh_gl(0.0, width, height, 0.0, -1.0, 1.0)
        * Mat4::from_translation(offset)
        * Mat4::from_scale(Vec3::new(scale, scale, 1.0))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Beatmap visualiser", long_about = None)]
struct Cli {
    /// Directory holding the settings file.
    #[arg(long, default_value = ".", global = true)]
    settings_dir: PathBuf,
    /// Settings profile number; 0 uses `settings.json`.
    #[arg(long, default_value_t = 0, global = true)]
    profile: u32,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a chart through the flashlight effect without a window.
    Play {
        /// Chart JSON with hit objects, pauses and difficulty.
        chart: PathBuf,
        /// Recorded gameplay signals (cursor, combo, sliding) to replay.
        #[arg(short, long)]
        signals: Option<PathBuf>,
        /// Frame rate of the simulated loop; defaults to the configured FPS cap.
        #[arg(long)]
        fps: Option<f64>,
        /// Read shaders from this directory instead of the built-in copies.
        #[arg(long)]
        assets: Option<PathBuf>,
    },
    /// Print the active settings, optionally changing the window mode.
    Settings {
        #[arg(long)]
        fullscreen: Option<bool>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playfield_corners_land_inside_clip_space() {
        let matrix = playfield_matrix(1920.0, 1080.0);

        let top_left = matrix.project_point3(Vec3::ZERO);
        let bottom_right = matrix.project_point3(Vec3::new(PLAYFIELD.0, PLAYFIELD.1, 0.0));

        assert!(top_left.x > -1.0 && top_left.y < 1.0);
        assert!(bottom_right.x < 1.0 && bottom_right.y > -1.0);
        assert!((top_left.y - 0.8).abs() < 1e-5);
        assert!((top_left.x + bottom_right.x).abs() < 1e-5);
    }

    #[test]
    fn frame_interval_rejects_degenerate_rates() {
        assert_eq!(frame_interval(250.0).unwrap(), 4.0);
        for fps in [0.0, -60.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(frame_interval(fps).is_err(), "{fps} accepted");
        }
    }

    #[test]
    fn infinite_fps_is_refused_before_playback() {
        let store = SettingsStore::load(&std::env::temp_dir(), 9_999)
            .map(|(store, _)| store)
            .unwrap();
        let err = run_play(
            &store,
            Path::new("does-not-matter.json"),
            None,
            f64::INFINITY,
            &BuiltinAssets,
        )
        .unwrap_err();

        assert!(format!("{err}").contains("frame rate"));
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn parses_play_command() {
        let args = ["beatviz", "play", "map.json", "--fps", "60", "--profile", "2"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.profile, 2);
        match cli.command {
            Commands::Play { chart, fps, .. } => {
                assert_eq!(chart, PathBuf::from("map.json"));
                assert_eq!(fps, Some(60.0));
            }
            Commands::Settings { .. } => panic!("expected play"),
        }
    }
}
