//! `js2py.toml` project settings.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "js2py.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub convert: ConvertConfig,
    pub emit: EmitConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Parse inputs as ES modules
    pub module: bool,
    pub strict: bool,
    pub runtime: RuntimeMode,
    pub out_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitConfig {
    pub indent: usize,
    pub trailing_newline: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indent: 4,
            trailing_newline: true,
        }
    }
}

/// Whether helper snippets are appended to the emitted module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Include,
    #[default]
    Skip,
}

impl Config {
    /// Read `explicit`, or `./js2py.toml` when it exists, or fall back to
    /// defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
