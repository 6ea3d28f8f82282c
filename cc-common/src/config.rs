//! Configuration loading and resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or malformed TOML file never stops a binary from starting; it
//! is logged and the remaining tiers are used.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::Result;

/// Backend base URL
pub const ENV_BACKEND_URL: &str = "CLOSETCLEAR_BACKEND_URL";
/// Alternative backend URL variable, as used by PocketBase tooling
pub const ENV_POCKETBASE_URL: &str = "POCKETBASE_URL";
/// Generative-AI provider key
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
/// Model name override
pub const ENV_GEMINI_MODEL: &str = "CLOSETCLEAR_GEMINI_MODEL";
/// Where the CLI reaches the AI proxy service
pub const ENV_AI_URL: &str = "CLOSETCLEAR_AI_URL";
/// Folder holding the CLI session file
pub const ENV_DATA_FOLDER: &str = "CLOSETCLEAR_DATA_FOLDER";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backend_url: Option<String>,
    #[serde(default)]
    pub google_api_key: Option<String>,
    #[serde(default)]
    pub gemini_model: Option<String>,
    #[serde(default)]
    pub ai_service_url: Option<String>,
    #[serde(default)]
    pub data_folder: Option<PathBuf>,
}

/// Fallback values compiled into the binaries
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub backend_url: String,
    pub ai_service_url: String,
    pub ai_port: u16,
    pub gemini_model: String,
    pub data_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            backend_url: "http://localhost:8090".to_string(),
            ai_service_url: "http://127.0.0.1:5730".to_string(),
            ai_port: 5730,
            gemini_model: "gemini-1.5-flash".to_string(),
            data_folder: dirs::data_local_dir()
                .map(|d| d.join("closetclear"))
                .unwrap_or_else(|| PathBuf::from("./closetclear_data")),
            log_level: "info".to_string(),
        }
    }
}

/// Default location of the shared config file:
/// `<config dir>/closetclear/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("closetclear").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Outcome of looking for the config file
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigLoad {
    NoConfigDir,
    NotFound(PathBuf),
    Loaded(PathBuf),
    /// File exists but could not be read or parsed; defaults are used
    Invalid { path: PathBuf, error: String },
}

impl ConfigLoad {
    /// Log the outcome; call once the tracing subscriber is installed
    pub fn report(&self) {
        match self {
            ConfigLoad::NoConfigDir => debug!("No config directory on this platform; using defaults"),
            ConfigLoad::NotFound(path) => {
                debug!("Config file {} not found; using defaults", path.display())
            }
            ConfigLoad::Loaded(path) => info!("Loaded config from {}", path.display()),
            ConfigLoad::Invalid { path, error } => {
                warn!("Ignoring config file {}: {}", path.display(), error)
            }
        }
    }
}

/// Load the config file if there is one, otherwise defaults.
///
/// Never fails; the returned [`ConfigLoad`] says what happened.
pub fn read_toml_config(path: Option<&Path>) -> (TomlConfig, ConfigLoad) {
    let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
        return (TomlConfig::default(), ConfigLoad::NoConfigDir);
    };

    if !path.exists() {
        return (TomlConfig::default(), ConfigLoad::NotFound(path));
    }

    match load_toml_config(&path) {
        Ok(config) => (config, ConfigLoad::Loaded(path)),
        Err(e) => (
            TomlConfig::default(),
            ConfigLoad::Invalid {
                path,
                error: e.to_string(),
            },
        ),
    }
}

/// [`read_toml_config`], logging the outcome right away
pub fn load_toml_config_or_default(path: Option<&Path>) -> TomlConfig {
    let (config, load) = read_toml_config(path);
    load.report();
    config
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolves individual settings across the four tiers
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    toml: TomlConfig,
    defaults: CompiledDefaults,
}

impl ConfigResolver {
    pub fn new(toml: TomlConfig) -> Self {
        Self {
            toml,
            defaults: CompiledDefaults::for_current_platform(),
        }
    }

    pub fn defaults(&self) -> &CompiledDefaults {
        &self.defaults
    }

    /// Backend base URL, without trailing slash
    pub fn backend_url(&self, cli_arg: Option<&str>) -> String {
        let url = first_non_blank([
            cli_arg.map(str::to_string),
            env_non_blank(ENV_BACKEND_URL),
            env_non_blank(ENV_POCKETBASE_URL),
            self.toml.backend_url.clone(),
        ])
        .unwrap_or_else(|| self.defaults.backend_url.clone());
        url.trim_end_matches('/').to_string()
    }

    /// AI proxy base URL, without trailing slash
    pub fn ai_service_url(&self, cli_arg: Option<&str>) -> String {
        let url = first_non_blank([
            cli_arg.map(str::to_string),
            env_non_blank(ENV_AI_URL),
            self.toml.ai_service_url.clone(),
        ])
        .unwrap_or_else(|| self.defaults.ai_service_url.clone());
        url.trim_end_matches('/').to_string()
    }

    /// Provider API key; `None` when unset everywhere
    pub fn google_api_key(&self, cli_arg: Option<&str>) -> Option<String> {
        let mut sources = Vec::new();
        let env_key = env_non_blank(ENV_GOOGLE_API_KEY);
        if env_key.is_some() {
            sources.push("environment");
        }
        let toml_key = self.toml.google_api_key.clone().filter(|k| is_valid_key(k));
        if toml_key.is_some() {
            sources.push("TOML");
        }
        if sources.len() > 1 && cli_arg.is_none() {
            warn!(
                "Provider API key found in multiple sources: {}. Using environment.",
                sources.join(", ")
            );
        }

        first_non_blank([cli_arg.map(str::to_string), env_key, toml_key])
    }

    pub fn gemini_model(&self) -> String {
        first_non_blank([env_non_blank(ENV_GEMINI_MODEL), self.toml.gemini_model.clone()])
            .unwrap_or_else(|| self.defaults.gemini_model.clone())
    }

    /// Folder for local state (session file)
    pub fn data_folder(&self, cli_arg: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }
        if let Some(path) = env_non_blank(ENV_DATA_FOLDER) {
            return PathBuf::from(path);
        }
        if let Some(path) = &self.toml.data_folder {
            return path.clone();
        }
        self.defaults.data_folder.clone()
    }

    pub fn log_level(&self) -> String {
        self.toml.logging.level.clone()
    }
}

fn env_non_blank(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_valid_key(v))
}

fn first_non_blank<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|v| is_valid_key(v))
}
