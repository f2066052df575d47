use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::search::PrefixTokens;

const APP_DIR_NAME: &str = "onec-search";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Parse(error) => write!(f, "parse error: {error}"),
            Self::Invalid(error) => write!(f, "invalid config: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ibases_path: PathBuf,
    pub designer_prefix: String,
    pub enterprise_prefix: String,
    pub min_results: u16,
    pub executable: Option<PathBuf>,
    pub install_roots: Vec<PathBuf>,
    pub launch_args: Vec<String>,
    pub ibname_placeholder: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let prefixes = PrefixTokens::default();
        Self {
            ibases_path: default_ibases_path(),
            designer_prefix: prefixes.designer,
            enterprise_prefix: prefixes.enterprise,
            min_results: 5,
            executable: None,
            install_roots: vec![PathBuf::from("/opt/1cv8")],
            launch_args: vec!["/IBName".to_string()],
            ibname_placeholder: "/IBName".to_string(),
            config_path: default_config_path(),
        }
    }
}

impl Config {
    pub fn prefixes(&self) -> PrefixTokens {
        PrefixTokens {
            designer: self.designer_prefix.clone(),
            enterprise: self.enterprise_prefix.clone(),
        }
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// `~/.1C/1cestart/ibases.v8i`, the list maintained by the 1C starter.
pub fn default_ibases_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".1C")
        .join("1cestart")
        .join("ibases.v8i")
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.designer_prefix.trim().is_empty() || cfg.enterprise_prefix.trim().is_empty() {
        return Err("mode prefixes must not be empty".into());
    }

    if cfg.designer_prefix == cfg.enterprise_prefix {
        return Err("designer and enterprise prefixes must differ".into());
    }

    if cfg.min_results < 1 || cfg.min_results > 50 {
        return Err("min_results out of range".into());
    }

    if cfg.ibname_placeholder.is_empty() {
        return Err("ibname_placeholder is required".into());
    }

    if cfg.ibases_path.as_os_str().is_empty() {
        return Err("ibases_path is required".into());
    }

    Ok(())
}

/// Loads the config at `path` (or the default location). A missing file yields defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if !config_path.exists() {
        return Ok(Config {
            config_path,
            ..Config::default()
        });
    }

    let raw = std::fs::read_to_string(&config_path)?;
    let mut cfg = parse(&raw, &config_path)?;
    cfg.config_path = config_path;
    validate(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = toml::to_string_pretty(cfg).map_err(|e| ConfigError::Parse(e.to_string()))?;
    std::fs::write(&cfg.config_path, encoded)?;
    Ok(())
}

fn parse(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" | "json5" => json5::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string())),
        _ => toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string())),
    }
}
