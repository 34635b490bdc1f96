use std::path::PathBuf;

use clap::{Parser, Subcommand};
use renderer::{Antialiasing, ShaderCompiler};
use tuning::Demo;

#[derive(Parser, Debug)]
#[command(
    name = "circles",
    author,
    version,
    about = "Circle shading demos with a live tuning console",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Demo to launch: `rect`, `circle` or `circle-v2` (default).
    #[arg(long, value_name = "NAME")]
    pub demo: Option<Demo>,

    /// Fragment shader defining `mainImage` to use instead of the bundled one.
    #[arg(long, value_name = "PATH")]
    pub shader: Option<PathBuf>,

    /// Configuration file; defaults to `circles.toml` in the config directory.
    #[arg(long, value_name = "FILE", env = "CIRCLES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Parameter override using the console grammar (e.g. `blink_freq=5`); repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Shader compiler backend: `naga` (default) or `shaderc`.
    #[arg(
        long,
        value_name = "COMPILER",
        value_parser = parse_shader_compiler,
        default_value_t = ShaderCompiler::default()
    )]
    pub shader_compiler: ShaderCompiler,

    /// Seed for hot-keys that pick random values.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Base window title.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved parameters (after config and `--set` overrides) and exit.
    Params(ParamsArgs),
}

#[derive(Parser, Debug)]
pub struct ParamsArgs {
    /// Emit JSON instead of `name=value` lines.
    #[arg(long)]
    pub json: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(Antialiasing::Auto),
        "off" | "none" | "disable" | "disabled" | "0" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;

            if samples == 0 || samples == 1 {
                return Ok(Antialiasing::Off);
            }

            if !matches!(samples, 2 | 4 | 8 | 16) {
                return Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                ));
            }

            Ok(Antialiasing::Samples(samples))
        }
    }
}

pub fn parse_shader_compiler(value: &str) -> Result<ShaderCompiler, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("shader compiler must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "shaderc" => {
            if cfg!(feature = "shaderc") {
                Ok(ShaderCompiler::Shaderc)
            } else {
                Err("shaderc support is not enabled in this build".to_string())
            }
        }
        "naga" | "naga-glsl" => Ok(ShaderCompiler::NagaGlsl),
        _ => Err("unknown shader compiler (expected shaderc or naga)".to_string()),
    }
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width in window size".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height in window size".to_string())?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".into());
    }
    Ok((width, height))
}
