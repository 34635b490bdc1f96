use std::path::Path;

use anyhow::{Context, Result};
use democonfig::{AntialiasSetting, DemoConfig};
use renderer::{Antialiasing, FragmentShader, Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;
use tuning::{ConsoleSession, Demo};

use crate::cli::RunArgs;
use crate::paths::AppPaths;

const DEFAULT_SIZE: (u32, u32) = (1280, 720);

pub fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;
    let session = build_session(&args, config.as_ref())?;
    let renderer_config = renderer_config(&args, config.as_ref(), session.demo())?;
    tracing::info!(
        demo = %session.demo(),
        params = session.registry().len(),
        size = ?renderer_config.surface_size,
        "launching demo"
    );
    Renderer::new(renderer_config).run(session)
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Reads the explicit `--config` file, or the default one when it exists.
pub fn load_config(args: &RunArgs) -> Result<Option<DemoConfig>> {
    if let Some(path) = args.config.as_deref() {
        return read_config(path).map(Some);
    }

    let paths = AppPaths::discover()?;
    let path = paths.default_config();
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no configuration file found");
        return Ok(None);
    }
    read_config(&path).map(Some)
}

fn read_config(path: &Path) -> Result<DemoConfig> {
    let config = DemoConfig::load(path)
        .with_context(|| format!("failed to load configuration {}", path.display()))?;
    tracing::debug!(path = %path.display(), params = config.params.len(), "loaded configuration");
    Ok(config)
}

/// Builds the session for the selected demo and applies startup overrides:
/// configuration values first, then `--set` arguments in order.
pub fn build_session(args: &RunArgs, config: Option<&DemoConfig>) -> Result<ConsoleSession> {
    let demo = args
        .demo
        .or_else(|| config.and_then(|config| config.demo))
        .unwrap_or_default();
    let seed = args
        .seed
        .or_else(|| config.and_then(|config| config.window.seed));
    let mut session = ConsoleSession::new(demo.profile(), seed)
        .with_context(|| format!("invalid parameter set for demo {demo}"))?;

    if let Some(config) = config {
        for (name, literal) in config.param_literals()? {
            session
                .apply_literal(&name, &literal)
                .with_context(|| format!("invalid configuration value for parameter '{name}'"))?;
        }
    }

    for text in &args.set {
        session
            .apply_override(text)
            .with_context(|| format!("invalid override '--set {text}'"))?;
    }

    Ok(session)
}

fn renderer_config(
    args: &RunArgs,
    config: Option<&DemoConfig>,
    demo: Demo,
) -> Result<RendererConfig> {
    let window = config.map(|config| &config.window);
    let surface_size = args
        .size
        .or_else(|| window.and_then(|window| window.size).map(|[w, h]| (w, h)))
        .unwrap_or(DEFAULT_SIZE);
    let target_fps = args
        .fps
        .or_else(|| window.and_then(|window| window.fps))
        .filter(|fps| *fps > 0.0);
    let antialiasing = args
        .antialias
        .or_else(|| window.and_then(|window| window.antialias).map(map_antialias))
        .unwrap_or_default();
    let title = args
        .title
        .clone()
        .or_else(|| window.and_then(|window| window.title.clone()))
        .unwrap_or_else(|| format!("circles: {demo}"));

    Ok(RendererConfig {
        surface_size,
        title,
        shader: load_shader(args.shader.as_deref(), demo)?,
        target_fps,
        antialiasing,
        shader_compiler: args.shader_compiler,
    })
}

fn map_antialias(setting: AntialiasSetting) -> Antialiasing {
    match setting {
        AntialiasSetting::Auto => Antialiasing::Auto,
        AntialiasSetting::Off => Antialiasing::Off,
        AntialiasSetting::Samples2 => Antialiasing::Samples(2),
        AntialiasSetting::Samples4 => Antialiasing::Samples(4),
        AntialiasSetting::Samples8 => Antialiasing::Samples(8),
        AntialiasSetting::Samples16 => Antialiasing::Samples(16),
    }
}

fn load_shader(path: Option<&Path>, demo: Demo) -> Result<FragmentShader> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read shader at {}", path.display()))?;
            Ok(FragmentShader {
                label: path.display().to_string(),
                source,
            })
        }
        None => Ok(FragmentShader {
            label: format!("{demo}.frag"),
            source: bundled_shader(demo).to_string(),
        }),
    }
}

fn bundled_shader(demo: Demo) -> &'static str {
    match demo {
        Demo::Rect => include_str!("../shaders/rect.frag"),
        Demo::Circle => include_str!("../shaders/circle.frag"),
        Demo::CircleV2 => include_str!("../shaders/circle_v2.frag"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tuning::Value;

    use crate::cli::Cli;

    fn args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["circles"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap().run
    }

    fn config(toml: &str) -> DemoConfig {
        DemoConfig::from_toml_str(toml).unwrap()
    }

    #[test]
    fn cli_overrides_follow_config_values() {
        let config = config("version = 1\ndemo = \"circle\"\n[params]\nblink_freq = 4.0\nwedges = 20\n");
        let args = args(&["--set", "blink_freq=5"]);
        let session = build_session(&args, Some(&config)).unwrap();
        assert_eq!(session.demo(), Demo::Circle);
        assert_eq!(session.registry().float("blink_freq").unwrap(), 5.0);
        assert_eq!(session.registry().int("wedges").unwrap(), 20);
    }

    #[test]
    fn cli_demo_beats_config_demo() {
        let config = config("version = 1\ndemo = \"circle\"\n");
        let session = build_session(&args(&["--demo", "rect"]), Some(&config)).unwrap();
        assert_eq!(session.demo(), Demo::Rect);
    }

    #[test]
    fn startup_overrides_are_strict() {
        let err = build_session(&args(&["--set", "blink_freq=99"]), None).unwrap_err();
        assert!(format!("{err:#}").contains("blink_freq"));

        let err = build_session(&args(&["--set", "no_such_param=1"]), None).unwrap_err();
        assert!(format!("{err:#}").contains("no_such_param"));

        let config = config("version = 1\n[params]\nring_edges = [0.1, 0.2, 2.0]\n");
        assert!(build_session(&args(&[]), Some(&config)).is_err());
    }

    #[test]
    fn sequences_can_be_replaced_at_startup() {
        let session = build_session(&args(&["--set", "ring_edges [0.25, 0.5, 1.0]"]), None).unwrap();
        assert_eq!(
            session.registry().get("ring_edges").unwrap(),
            &Value::FloatSeq(vec![0.25, 0.5, 1.0])
        );
    }

    #[test]
    fn window_settings_prefer_cli() {
        let config = config(
            "version = 1\n[window]\nsize = [640, 480]\nfps = 30\nantialias = \"off\"\ntitle = \"rings\"\n",
        );
        let from_config = renderer_config(&args(&[]), Some(&config), Demo::CircleV2).unwrap();
        assert_eq!(from_config.surface_size, (640, 480));
        assert_eq!(from_config.target_fps, Some(30.0));
        assert_eq!(from_config.antialiasing, Antialiasing::Off);
        assert_eq!(from_config.title, "rings");
        assert_eq!(from_config.shader.label, "circle-v2.frag");

        let cli = args(&["--size", "800x600", "--fps", "0", "--antialias", "4"]);
        let from_cli = renderer_config(&cli, Some(&config), Demo::CircleV2).unwrap();
        assert_eq!(from_cli.surface_size, (800, 600));
        assert_eq!(from_cli.target_fps, None);
        assert_eq!(from_cli.antialiasing, Antialiasing::Samples(4));
    }

    #[test]
    fn bundled_shaders_define_main_image() {
        for demo in Demo::ALL {
            assert!(bundled_shader(demo).contains("void mainImage(out vec4 color, in vec2 p)"));
        }
    }
}
