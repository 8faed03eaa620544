use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CtxlogError, Result};
use crate::level::Level;

/// The single active logger configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    pub level: Level,
    pub pretty_print: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            pretty_print: false,
        }
    }
}

impl LoggerConfig {
    /// Returns a copy with every field set in `partial` applied.
    pub fn merged(&self, partial: &PartialConfig) -> Self {
        Self {
            level: partial.level.unwrap_or(self.level),
            pretty_print: partial.pretty_print.unwrap_or(self.pretty_print),
        }
    }
}

/// A configuration update. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartialConfig {
    pub level: Option<Level>,
    pub pretty_print: Option<bool>,
}

impl PartialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = Some(pretty_print);
        self
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: PartialConfig) -> Self {
        Self {
            level: other.level.or(self.level),
            pretty_print: other.pretty_print.or(self.pretty_print),
        }
    }

    /// Reads a partial configuration out of an arbitrary JSON value.
    ///
    /// Anything that is not understood (unknown keys, an unparseable level,
    /// a non-boolean flag, a non-object value) is ignored.
    pub fn from_value_lossy(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let level = obj
            .get("level")
            .and_then(Value::as_str)
            .and_then(|s| Level::from_str(s).ok());
        let pretty_print = obj
            .get("prettyPrint")
            .or_else(|| obj.get("pretty_print"))
            .and_then(Value::as_bool);

        Self {
            level,
            pretty_print,
        }
    }

    /// Loads overrides from the config file and then the environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| env::var(key).ok())
    }

    /// Like [`PartialConfig::load`], reading variables through `lookup`.
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let config_path = config_file_path(&lookup);
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides(&lookup)?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(file_overrides) = load_file_overrides(path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        Ok(cfg)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    level: Option<String>,
    #[serde(alias = "prettyPrint")]
    pretty_print: Option<bool>,
}

fn config_file_path<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("CTXLOG_CONFIG") {
        return PathBuf::from(path);
    }

    let home = lookup("HOME").unwrap_or_else(|| ".".to_string());
    let config_home = lookup("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(home).join(".config"));
    config_home.join("ctxlog/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| CtxlogError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| CtxlogError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides<F>(lookup: &F) -> Result<ConfigOverrides>
where
    F: Fn(&str) -> Option<String>,
{
    let pretty_print = match lookup("CTXLOG_PRETTY_PRINT") {
        Some(v) => Some(parse_flag(&v).ok_or_else(|| {
            CtxlogError::Config(format!(
                "bad CTXLOG_PRETTY_PRINT in environment: expected a boolean (value={v})"
            ))
        })?),
        None => None,
    };

    Ok(ConfigOverrides {
        level: lookup("CTXLOG_LEVEL"),
        pretty_print,
    })
}

fn apply_overrides(
    cfg: &mut PartialConfig,
    overrides: ConfigOverrides,
    source: &str,
) -> Result<()> {
    if let Some(v) = overrides.level {
        cfg.level = Some(Level::from_str(&v).map_err(|e| {
            CtxlogError::Config(format!("bad level in {source}: {e} (value={v})"))
        })?);
    }
    if let Some(v) = overrides.pretty_print {
        cfg.pretty_print = Some(v);
    }
    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
