//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Everything lives in one directory (`~/.config/rat` on Linux): the
//! optional `config.toml` and the `.rhai` scripts loaded at startup.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::exec::shell_from_env;
use super::key::{KeyEvent, KeyParseError, KeySequence};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub shell: Option<String>,
    pub spawn_policy: Option<SpawnPolicy>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PromptConfig {
    pub affirmative: Option<String>,
}

/// What pressing a spawn chord again does when the parent pager already
/// spawned a child for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnPolicy {
    /// Bring back the existing child with its state intact.
    #[default]
    Reuse,
    /// Always build a fresh child.
    Duplicate,
}

// ============================================================================
// Defaults
// ============================================================================

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_AFFIRMATIVE: &str = "y";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config_dir: PathBuf,
    pub shell: String,
    pub spawn_policy: SpawnPolicy,
    pub affirmative: KeyEvent,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid affirmative key `{value}`: {source}")]
    Affirmative {
        value: String,
        #[source]
        source: KeyParseError,
    },
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the configuration directory: CLI flag → `RAT_CONFIG_DIR` →
/// platform config dir → `./.rat`.
pub fn config_dir(cli_dir: Option<&Path>) -> PathBuf {
    cli_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("RAT_CONFIG_DIR").map(PathBuf::from))
        .or_else(|| dirs::config_dir().map(|d| d.join("rat")))
        .unwrap_or_else(|| PathBuf::from(".rat"))
}

/// Loads `config.toml` from `dir`. A missing file yields the defaults; a
/// malformed one is an error.
pub fn load_config(dir: &Path) -> Result<RatConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(RatConfig::default());
    }

    let contents = fs::read_to_string(&path)?;
    let config: RatConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing defaults, the config file and env vars.
pub fn resolve(config: &RatConfig, config_dir: PathBuf) -> Result<ResolvedConfig, ConfigError> {
    // Shell: config → $SHELL → /bin/sh
    let shell = config
        .general
        .shell
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(shell_from_env);

    let affirmative = config
        .prompt
        .affirmative
        .as_deref()
        .unwrap_or(DEFAULT_AFFIRMATIVE);

    Ok(ResolvedConfig {
        config_dir,
        shell,
        spawn_policy: config.general.spawn_policy.unwrap_or_default(),
        affirmative: parse_single_key(affirmative)?,
    })
}

fn parse_single_key(value: &str) -> Result<KeyEvent, ConfigError> {
    let invalid = |source| ConfigError::Affirmative {
        value: value.to_string(),
        source,
    };
    let keys: KeySequence = value.parse().map_err(invalid)?;
    match keys.keys() {
        [key] => Ok(*key),
        _ => Err(invalid(KeyParseError::NotSingle(value.to_string()))),
    }
}
