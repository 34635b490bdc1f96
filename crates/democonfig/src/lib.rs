use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use tuning::{Demo, Literal};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("invalid value for parameter '{name}': {reason}")]
    Param { name: String, reason: String },
}

/// Startup configuration for the demo launcher.
///
/// ```toml
/// version = 1
/// demo = "circle-v2"
///
/// [window]
/// size = [1280, 720]
/// fps = 60
/// antialias = 4
///
/// [params]
/// blink_freq = 5.0
/// focus_color = [1.0, 0.5, 0.0]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<Demo>,
    #[serde(default)]
    pub window: WindowSettings,
    /// Initial parameter values, applied before any command-line overrides.
    #[serde(default)]
    pub params: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WindowSettings {
    pub size: Option<[u32; 2]>,
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    pub title: Option<String>,
    /// Seed for hot-keys that randomize parameters.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => Some(
            u32::try_from(value)
                .ok()
                .and_then(AntialiasSetting::from_samples)
                .ok_or_else(|| {
                    <D::Error as de::Error>::custom(format!(
                        "invalid antialias sample count {value}"
                    ))
                })?,
        ),
    };
    Ok(result)
}

fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" => Ok(AntialiasSetting::Off),
        other => other
            .parse::<u32>()
            .ok()
            .and_then(AntialiasSetting::from_samples)
            .ok_or_else(|| format!("invalid antialias setting '{other}'")),
    }
}

impl DemoConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: DemoConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if let Some([width, height]) = self.window.size {
            if width == 0 || height == 0 {
                return Err(ConfigError::Invalid(
                    "window.size dimensions must be greater than zero".into(),
                ));
            }
        }

        if let Some(fps) = self.window.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid("window.fps must be >= 0".into()));
            }
        }

        if let Some(title) = &self.window.title {
            if title.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "window.title may not be empty".into(),
                ));
            }
        }

        for name in self.params.keys() {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("parameter names may not be empty".into()));
            }
        }

        Ok(())
    }

    /// Parameter overrides converted into console literals, sorted by name.
    pub fn param_literals(&self) -> Result<Vec<(String, Literal)>, ConfigError> {
        self.params
            .iter()
            .map(|(name, value)| Ok((name.clone(), literal_from_toml(name, value)?)))
            .collect()
    }
}

fn literal_from_toml(name: &str, value: &toml::Value) -> Result<Literal, ConfigError> {
    match value {
        toml::Value::Integer(v) => Ok(Literal::int(*v)),
        toml::Value::Float(v) if v.is_finite() => Ok(Literal::float(*v)),
        toml::Value::Boolean(v) => Ok(Literal::Bool(*v)),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| literal_from_toml(name, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Literal::Group),
        other => Err(ConfigError::Param {
            name: name.to_string(),
            reason: format!("unsupported {} value", other.type_str()),
        }),
    }
}
