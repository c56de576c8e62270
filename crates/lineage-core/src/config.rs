use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::ErrorCode;

/// Environment variable overriding [`GraphConfig::allow_pruning`].
pub const ENV_ALLOW_PRUNING: &str = "LINEAGE_ALLOW_PRUNING";
/// Environment variable overriding [`ParserConfig::normalize_carriage_returns`].
pub const ENV_NORMALIZE_CR: &str = "LINEAGE_NORMALIZE_CR";

/// Fully resolved settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Drop parent references that point outside the batch instead of
    /// failing graph construction.
    #[serde(default)]
    pub allow_pruning: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Replace stray `\r` characters in input lines with spaces.
    #[serde(default = "default_true")]
    pub normalize_carriage_returns: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            normalize_carriage_returns: default_true(),
        }
    }
}

/// One source of settings (a file or the environment).
///
/// Unset fields leave the value from lower-precedence layers untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLayer {
    #[serde(default)]
    pub graph: GraphLayer,
    #[serde(default)]
    pub parser: ParserLayer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLayer {
    #[serde(default)]
    pub allow_pruning: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserLayer {
    #[serde(default)]
    pub normalize_carriage_returns: Option<bool>,
}

impl ConfigLayer {
    /// Read overrides from the environment through `lookup`.
    ///
    /// # Errors
    ///
    /// Fails when a variable is set to something other than a boolean word.
    pub fn from_env<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| -> Result<Option<bool>> {
            lookup(key)
                .map(|value| {
                    parse_bool(&value)
                        .with_context(|| format!("{key} must be a boolean, got '{value}'"))
                })
                .transpose()
        };

        Ok(Self {
            graph: GraphLayer {
                allow_pruning: read(ENV_ALLOW_PRUNING)?,
            },
            parser: ParserLayer {
                normalize_carriage_returns: read(ENV_NORMALIZE_CR)?,
            },
        })
    }
}

impl LineageConfig {
    /// Apply a layer on top of these settings.
    #[must_use]
    pub fn with_layer(mut self, layer: &ConfigLayer) -> Self {
        if let Some(allow) = layer.graph.allow_pruning {
            self.graph.allow_pruning = allow;
        }
        if let Some(normalize) = layer.parser.normalize_carriage_returns {
            self.parser.normalize_carriage_returns = normalize;
        }
        self
    }
}

/// Load `.lineage/config.toml` under `project_root`, if present.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_project_layer(project_root: &Path) -> Result<ConfigLayer> {
    load_layer(&project_root.join(".lineage/config.toml"))
}

/// Load `<config_dir>/lineage/config.toml`, if present.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_user_layer() -> Result<ConfigLayer> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigLayer::default());
    };
    load_layer(&config_dir.join("lineage/config.toml"))
}

/// Resolve settings: environment, then project file, then user file, then
/// defaults.
///
/// # Errors
///
/// Fails when a config file is unreadable or malformed, or an environment
/// override is not a boolean.
pub fn resolve_config(project_root: &Path) -> Result<LineageConfig> {
    let user = load_user_layer()?;
    let project = load_project_layer(project_root)?;
    let env_layer = ConfigLayer::from_env(|key| env::var(key).ok())?;

    let config = LineageConfig::default()
        .with_layer(&user)
        .with_layer(&project)
        .with_layer(&env_layer);
    tracing::debug!(?config, "resolved config");
    Ok(config)
}

fn load_layer(path: &Path) -> Result<ConfigLayer> {
    if !path.exists() {
        return Ok(ConfigLayer::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ConfigLayer>(&content).with_context(|| {
        format!(
            "{}: Failed to parse {}",
            ErrorCode::ConfigParseError,
            path.display()
        )
    })
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognized boolean '{other}'"),
    }
}

const fn default_true() -> bool {
    true
}
