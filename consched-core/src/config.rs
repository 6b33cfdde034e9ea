//! Global consched configuration.
//!
//! Read from `~/.config/consched/config.toml`, then overridden by
//! `CONSCHED_*` environment variables (nested keys use `__`, e.g.
//! `CONSCHED_ENDPOINT__API_KEY`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_TIMEZONE, ENV_PREFIX};
use crate::error::{SchedError, SchedResult};
use crate::store::Collation;

static DEFAULT_BASE_URL: &str = "https://animedetour.sched.com";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedConfig {
    /// Where the local schedule cache lives
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// IANA zone the remote timestamps are written in
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Whether search matching respects letter case
    #[serde(default)]
    pub case_sensitive: bool,

    #[serde(default)]
    pub endpoint: EndpointConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request deadline, e.g. "30s" (none by default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            base_url: default_base_url(),
            api_key: None,
            timeout: None,
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> SchedResult<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|t| {
                humantime::parse_duration(t)
                    .map_err(|e| SchedError::Config(format!("Invalid endpoint timeout '{t}': {e}")))
            })
            .transpose()
    }
}

impl Default for SchedConfig {
    fn default() -> Self {
        SchedConfig {
            data_dir: default_data_dir(),
            timezone: default_timezone(),
            case_sensitive: false,
            endpoint: EndpointConfig::default(),
        }
    }
}

impl SchedConfig {
    pub fn config_path() -> SchedResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SchedError::Config("Could not determine config directory".into()))?
            .join("consched");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user's config, writing a commented default file on first run.
    pub fn load() -> SchedResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path, None)
    }

    /// Load from `path`, then apply environment overrides.
    ///
    /// `env` replaces the process environment when given.
    pub fn load_from(path: &Path, env: Option<HashMap<String, String>>) -> SchedResult<Self> {
        let config: SchedConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(|e| SchedError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SchedError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> SchedResult<()> {
        self.tz()?;
        self.endpoint.timeout()?;
        if self.endpoint.base_url.trim().is_empty() {
            return Err(SchedError::Config("endpoint.base_url is empty".into()));
        }
        Ok(())
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn tz(&self) -> SchedResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| SchedError::Config(format!("Unknown timezone '{}'", self.timezone)))
    }

    pub fn collation(&self) -> Collation {
        Collation::from_case_sensitive(self.case_sensitive)
    }

    /// Render the effective config as TOML.
    pub fn to_toml(&self) -> SchedResult<String> {
        toml::to_string_pretty(self).map_err(|e| SchedError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SchedResult<()> {
        let contents = format!(
            "\
# consched configuration

# Where the local schedule cache lives:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Time zone of the convention (used to read schedule timestamps):
# timezone = \"{DEFAULT_TIMEZONE}\"

# Match search terms case-sensitively:
# case_sensitive = false

[endpoint]
# base_url = \"{DEFAULT_BASE_URL}\"
# api_key = \"...\"
# timeout = \"30s\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SchedError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SchedError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
