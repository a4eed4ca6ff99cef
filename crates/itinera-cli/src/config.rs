//! Configuration file management for itinera.
//!
//! Provides a TOML-based config file at `~/.config/itinera/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use itinera_core::{
    BaselineFallback, ChatCompletionsClient, ChatCompletionsConfig, FallbackPolicy, ModelClient,
    NoFallback,
};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub runtime: RuntimeSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API root of an OpenAI-compatible provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RuntimeSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackMode>,
}

/// Deployment environment. Decides the default fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        })
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => bail!("unknown environment {other:?} (expected development, test, or production)"),
        }
    }
}

/// What to do once a generation run has spent its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Fail the run.
    None,
    /// Substitute the canned baseline plan.
    Baseline,
}

impl FallbackMode {
    fn default_for(environment: Environment) -> Self {
        match environment {
            Environment::Test => FallbackMode::Baseline,
            Environment::Development | Environment::Production => FallbackMode::None,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the itinera config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/itinera` or `~/.config/itinera`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("itinera");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("itinera")
}

/// Return the path to the itinera config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(config, &config_path())
}

pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // The file may hold an API key.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values supplied on the command line. `None` defers to the next layer.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub model_url: Option<String>,
    pub model: Option<String>,
    pub environment: Option<Environment>,
    pub fallback: Option<FallbackMode>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct ItineraConfig {
    pub model: ChatCompletionsConfig,
    pub environment: Environment,
    pub fallback: FallbackMode,
}

impl ItineraConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `ITINERA_API_KEY` env > `XAI_API_KEY` env > `model.api_key` > error
    /// - Base URL: `--model-url` > `ITINERA_MODEL_URL` env > `model.base_url` > xAI
    /// - Model: `--model` > `ITINERA_MODEL` env > `model.model` > `grok-2`
    /// - Environment: `--env` > `ITINERA_ENV` env > `runtime.environment` > development
    /// - Fallback: `--fallback` > `runtime.fallback` > baseline in test, none otherwise
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        Self::resolve_with(cli, load_config().ok())
    }

    /// Resolve against an already-loaded (or absent) config file.
    pub fn resolve_with(cli: &CliOverrides, file: Option<ConfigFile>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let api_key = env_var("ITINERA_API_KEY")
            .or_else(|| env_var("XAI_API_KEY"))
            .or(file.model.api_key)
            .filter(|key| !key.trim().is_empty());
        let Some(api_key) = api_key else {
            bail!(
                "API key not found; set ITINERA_API_KEY (or XAI_API_KEY) or run `itinera init --api-key ...`"
            );
        };

        let mut model = ChatCompletionsConfig::new(api_key);
        if let Some(url) = cli
            .model_url
            .clone()
            .or_else(|| env_var("ITINERA_MODEL_URL"))
            .or(file.model.base_url)
        {
            model.base_url = url;
        }
        if let Some(name) = cli
            .model
            .clone()
            .or_else(|| env_var("ITINERA_MODEL"))
            .or(file.model.model)
        {
            model.model = name;
        }
        if let Some(temperature) = file.model.temperature {
            model.temperature = temperature;
        }
        model.request_timeout = file.model.request_timeout_secs.map(Duration::from_secs);

        let environment = match cli.environment {
            Some(environment) => environment,
            None => match env_var("ITINERA_ENV") {
                Some(value) => value.parse().context("invalid ITINERA_ENV")?,
                None => file.runtime.environment.unwrap_or_default(),
            },
        };

        let fallback = cli
            .fallback
            .or(file.runtime.fallback)
            .unwrap_or_else(|| FallbackMode::default_for(environment));
        if environment == Environment::Production && fallback == FallbackMode::Baseline {
            bail!("baseline fallback cannot be enabled in the production environment");
        }

        Ok(Self {
            model,
            environment,
            fallback,
        })
    }

    /// Build the HTTP model client.
    pub fn model_client(&self) -> Result<Arc<dyn ModelClient>> {
        let client = ChatCompletionsClient::new(self.model.clone())
            .context("failed to build model client")?;
        Ok(Arc::new(client))
    }

    /// The fallback policy selected by [`Self::fallback`].
    pub fn fallback_policy(&self) -> Arc<dyn FallbackPolicy> {
        match self.fallback {
            FallbackMode::None => Arc::new(NoFallback),
            FallbackMode::Baseline => Arc::new(BaselineFallback::new()),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
