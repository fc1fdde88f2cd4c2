#![deny(unsafe_code)]
//! Offline driver for sandfx effects.
//!
//! Subcommands:
//! - `render <effect>`: run an effect (or a scene file) for N frames, write PNG
//! - `sample <text>`: report how many glyph points a text produces
//! - `list`: print available effects

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use sandfx_core::color::NIGHT;
use sandfx_core::{Effect, HostEvent, PointerState, Scene, Srgb, Surface, WallClock};
use sandfx_effects::scene::{run_scene, run_scene_with};
use sandfx_effects::snapshot::write_png;
use sandfx_effects::EffectKind;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "sandfx", about = "Gold-dust particle effects, rendered offline")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (RUST_LOG still takes precedence per module).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an effect for N frames and write the last frame as PNG.
    Render {
        /// Effect name ("ambient", "dissolve" or "cursor"). Ignored with --scene.
        #[arg(default_value = "dissolve")]
        effect: String,

        /// Scene file (JSON) to replay instead of the flags below.
        #[arg(long)]
        scene: Option<PathBuf>,

        /// Container width in logical pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: u32,

        /// Container height in logical pixels.
        #[arg(short = 'H', long, default_value_t = 300)]
        height: u32,

        /// Device pixel ratio (clamped to 2).
        #[arg(long, default_value_t = 1.0)]
        dpr: f32,

        /// Text for the dissolve effect.
        #[arg(short, long, default_value = "PORTFOLIO")]
        text: String,

        /// Number of frames to run.
        #[arg(short, long, default_value_t = 180)]
        frames: u64,

        /// Frame interval in milliseconds.
        #[arg(long, default_value_t = sandfx_core::frame::FRAME_MS_60HZ)]
        frame_ms: f64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Effect parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Hold the pointer at "x,y" from the first frame.
        #[arg(long)]
        pointer: Option<String>,

        /// Background color the frame is composited over.
        #[arg(long, default_value = "#0a0a0a")]
        background: String,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Also write every Nth frame into --frames-dir.
        #[arg(long, requires = "frames_dir")]
        every: Option<u64>,

        /// Directory for intermediate frames.
        #[arg(long)]
        frames_dir: Option<PathBuf>,

        /// Pace frames on the wall clock instead of a fixed step. Output
        /// then depends on timing and is not reproducible.
        #[arg(long)]
        realtime: bool,
    },
    /// Report the glyph point count for a text and container size.
    Sample {
        /// Text to sample.
        text: String,

        /// Container width in logical pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: u32,

        /// Container height in logical pixels.
        #[arg(short = 'H', long, default_value_t = 300)]
        height: u32,

        /// Dissolve parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// List available effects and their parameters.
    List,
}

fn parse_params(raw: &str) -> Result<serde_json::Value, CliError> {
    let params: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    if !params.is_object() {
        return Err(CliError::Input("--params must be a JSON object".into()));
    }
    Ok(params)
}

/// Parses `"x,y"` in logical pixels.
fn parse_pointer(raw: &str) -> Result<(f32, f32), CliError> {
    let bad = || CliError::Input(format!("invalid --pointer '{raw}', expected x,y"));
    let (x, y) = raw.split_once(',').ok_or_else(bad)?;
    let x: f32 = x.trim().parse().map_err(|_| bad())?;
    let y: f32 = y.trim().parse().map_err(|_| bad())?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(bad());
    }
    Ok((x, y))
}

fn read_scene(path: &Path) -> Result<Scene, CliError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    Ok(Scene::from_json(&json)?)
}

fn frame_path(dir: &Path, frame: u64) -> PathBuf {
    dir.join(format!("frame_{frame:05}.png"))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let pointer = PointerState::new();
            let mut effects = Vec::new();
            for name in EffectKind::list_effects() {
                let effect =
                    EffectKind::from_name(name, 64, 64, 0, &serde_json::json!({}), "", pointer.clone())?;
                effects.push((*name, effect.param_schema()));
            }
            if cli.json {
                let info: serde_json::Map<String, serde_json::Value> = effects
                    .into_iter()
                    .map(|(name, schema)| (name.to_string(), schema))
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "effects": info }))?
                );
            } else {
                println!("Effects:");
                for (name, schema) in effects {
                    let keys: Vec<&str> = schema
                        .as_object()
                        .map(|o| o.keys().map(String::as_str).collect())
                        .unwrap_or_default();
                    println!("  {name}: {}", keys.join(", "));
                }
            }
        }
        Command::Sample {
            text,
            width,
            height,
            params,
        } => {
            let params = parse_params(&params)?;
            let effect = EffectKind::from_name(
                "dissolve",
                width,
                height,
                0,
                &params,
                &text,
                PointerState::new(),
            )?;
            let EffectKind::Dissolve(dissolve) = effect else {
                return Err(CliError::Effect(sandfx_core::FxError::UnknownEffect(
                    "dissolve".into(),
                )));
            };
            if cli.json {
                let info = serde_json::json!({
                    "text": text,
                    "width": width,
                    "height": height,
                    "font_px": dissolve.font_px(),
                    "points": dissolve.total_points(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!(
                    "{:?} at {width}x{height}: {} points ({:.1}px font)",
                    text,
                    dissolve.total_points(),
                    dissolve.font_px()
                );
            }
        }
        Command::Render {
            effect,
            scene,
            width,
            height,
            dpr,
            text,
            frames,
            frame_ms,
            seed,
            params,
            pointer,
            background,
            output,
            every,
            frames_dir,
            realtime,
        } => {
            let background = Srgb::from_hex(&background)?;
            let scene = match scene {
                Some(path) => read_scene(&path)?,
                None => {
                    let mut scene = Scene::new(&effect, width, height, seed)
                        .with_text(text)
                        .with_frames(frames);
                    scene.device_pixel_ratio = dpr;
                    scene.frame_ms = frame_ms;
                    scene.params = parse_params(&params)?;
                    if let Some(raw) = pointer {
                        let (x, y) = parse_pointer(&raw)?;
                        scene = scene.with_event(0, HostEvent::PointerMove { x, y });
                    }
                    scene
                }
            };

            if let Some(dir) = frames_dir.as_deref() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| CliError::Io(format!("{}: {e}", dir.display())))?;
            }
            let every = every.filter(|&n| n > 0);
            let mut written = 0u64;
            let snapshot = |frame: u64, surface: &Surface| -> Result<(), sandfx_core::FxError> {
                if let (Some(n), Some(dir)) = (every, frames_dir.as_deref()) {
                    if frame % n == 0 {
                        write_png(surface, background, &frame_path(dir, frame))?;
                        written += 1;
                    }
                }
                Ok(())
            };
            let anim = if realtime {
                log::debug!("pacing {} frames on the wall clock", scene.frames);
                run_scene_with(&scene, &mut WallClock::new(scene.frame_ms), snapshot)?
            } else {
                run_scene(&scene, snapshot)?
            };

            let Some(surface) = anim.surface() else {
                return Err(CliError::Effect(sandfx_core::FxError::InvalidDimensions));
            };
            write_png(surface, background, &output)?;
            log::info!(
                "{}: {} frames, {written} intermediate snapshots",
                scene.effect,
                anim.frames()
            );

            if cli.json {
                let info = serde_json::json!({
                    "effect": scene.effect,
                    "width": scene.width,
                    "height": scene.height,
                    "frames": anim.frames(),
                    "seed": scene.seed,
                    "output": output.display().to_string(),
                    "snapshots": written,
                    "realtime": realtime,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({}x{}, {} frames, seed {}) -> {}",
                    scene.effect,
                    scene.width,
                    scene.height,
                    anim.frames(),
                    scene.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn pointer_parses_pairs() {
        assert_eq!(parse_pointer("10,20").unwrap(), (10.0, 20.0));
        assert_eq!(parse_pointer(" 1.5 , -3 ").unwrap(), (1.5, -3.0));
    }

    #[test]
    fn pointer_rejects_garbage() {
        for raw in ["", "10", "a,b", "1,2,3", "inf,0"] {
            let err = parse_pointer(raw).unwrap_err();
            assert_eq!(err.exit_code(), 12, "{raw}");
        }
    }

    #[test]
    fn params_must_be_an_object() {
        assert!(parse_params(r#"{"stride": 2}"#).is_ok());
        assert_eq!(parse_params("[1]").unwrap_err().exit_code(), 12);
        assert_eq!(parse_params("{oops").unwrap_err().exit_code(), 12);
    }

    #[test]
    fn render_writes_final_and_intermediate_frames() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let frames_dir = dir.path().join("frames");
        let cli = Cli::parse_from([
            "sandfx",
            "render",
            "ambient",
            "-W",
            "40",
            "-H",
            "30",
            "--frames",
            "6",
            "--every",
            "2",
            "--frames-dir",
            frames_dir.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);
        run(cli).unwrap();
        assert!(output.exists());
        for frame in [2, 4, 6] {
            assert!(frame_path(&frames_dir, frame).exists(), "frame {frame}");
        }
        assert!(!frame_path(&frames_dir, 3).exists());
    }

    #[test]
    fn render_replays_scene_file() {
        let dir = tempfile::tempdir().unwrap();
        let scene_path = dir.path().join("scene.json");
        let scene = Scene::new("dissolve", 80, 40, 1).with_text("HI").with_frames(5);
        std::fs::write(&scene_path, serde_json::to_string(&scene).unwrap()).unwrap();
        let output = dir.path().join("out.png");
        let cli = Cli::parse_from([
            "sandfx",
            "render",
            "--scene",
            scene_path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);
        run(cli).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn realtime_render_runs_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cursor.png");
        let frames_dir = dir.path().join("frames");
        let cli = Cli::parse_from([
            "sandfx",
            "render",
            "cursor",
            "-W",
            "64",
            "-H",
            "64",
            "--frames",
            "4",
            "--frame-ms",
            "2",
            "--pointer",
            "32,32",
            "--realtime",
            "--every",
            "1",
            "--frames-dir",
            frames_dir.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);
        run(cli).unwrap();
        assert!(output.exists());
        for frame in 1..=4 {
            assert!(frame_path(&frames_dir, frame).exists(), "frame {frame}");
        }
    }

    #[test]
    fn render_reports_bad_background() {
        let cli = Cli::parse_from(["sandfx", "render", "--background", "gold"]);
        assert_eq!(run(cli).unwrap_err().exit_code(), 12);
    }

    #[test]
    fn missing_scene_file_is_io_error() {
        let cli = Cli::parse_from(["sandfx", "render", "--scene", "/nonexistent/scene.json"]);
        assert_eq!(run(cli).unwrap_err().exit_code(), 11);
    }
}
