use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Local configuration file name, looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "rowdelta.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "ROWDELTA_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub compare: CompareConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompareConfig {
    /// Default key column when none is given on the command line
    pub key_column: Option<String>,
    /// Text values treated as null when loading input files (e.g. "N/A")
    pub null_markers: Vec<String>,
    /// Diff matched rows in parallel
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub worksheet_title: String,
    /// chrono format string for the generation date
    pub date_format: String,
    pub include_unchanged: bool,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub delimiter: char,
    pub include_header: bool,
    /// Write the title, table descriptions and generation date above CSV and
    /// XLSX reports
    pub include_metadata: bool,
    pub force: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            key_column: None,
            null_markers: Vec::new(),
            parallel: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Data comparison tool".to_string(),
            worksheet_title: "Data changes".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            include_unchanged: true,
            link: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
            include_metadata: true,
            force: false,
        }
    }
}

/// Where the effective configuration was loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    EnvVar(PathBuf),
    Local(PathBuf),
    Global(PathBuf),
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::EnvVar(path) => write!(f, "{CONFIG_ENV_VAR} ({})", path.display()),
            ConfigSource::Local(path) => write!(f, "local ({})", path.display()),
            ConfigSource::Global(path) => write!(f, "global ({})", path.display()),
            ConfigSource::Default => write!(f, "built-in defaults"),
        }
    }
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rowdelta").join("global.toml"))
}

pub fn local_config_path() -> Result<PathBuf> {
    Ok(env::current_dir()
        .context("Failed to determine current directory")?
        .join(LOCAL_CONFIG_FILE))
}

fn read_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Load the effective configuration and report where it came from.
///
/// Priority order (highest to lowest):
/// 1. Explicit config file via the `ROWDELTA_CONFIG` env var
/// 2. Local config file (`rowdelta.toml` in the current directory)
/// 3. Global config file (`~/.rowdelta/global.toml`)
/// 4. Default configuration
pub fn get_config_resolution_info() -> Result<(Config, ConfigSource)> {
    if let Ok(config_path) = env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(config_path);
        let config = read_config_file(&path)?;
        return Ok((config, ConfigSource::EnvVar(path)));
    }

    let local = local_config_path()?;
    if local.exists() {
        let config = read_config_file(&local)?;
        return Ok((config, ConfigSource::Local(local)));
    }

    if let Some(global) = global_config_path() {
        if global.exists() {
            let config = read_config_file(&global)?;
            return Ok((config, ConfigSource::Global(global)));
        }
    }

    Ok((Config::default(), ConfigSource::Default))
}

pub fn get_config() -> Result<Config> {
    let (config, source) = get_config_resolution_info()?;
    log::debug!("Using configuration from {source}");
    Ok(config)
}

/// Write `config` to the local config file
pub fn save_config(config: &Config) -> Result<PathBuf> {
    let path = local_config_path()?;
    save_config_to(config, &path)?;
    Ok(path)
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}
