
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::checker::ToolchainVersion;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub checks: CheckConfig,
}

/// How the server introduces itself to MCP clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub instructions: String,
}

impl Default for ServerConfig {
    #[inline]
    fn default() -> Self {
        Self {
            name: "unified-stack".to_string(),
            instructions: "Tools for the Next.js + Supabase stack: scaffold components, \
                           query the database, generate images and deploy."
                .to_string(),
        }
    }
}

/// Inputs for the environment checker. Paths are relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CheckConfig {
    pub min_rust_version: String,
    pub server_manifest: PathBuf,
    pub server_marker: String,
    pub server_command: String,
    pub config_file: PathBuf,
    pub env_file: PathBuf,
    pub required_env_vars: Vec<String>,
    pub placeholder_prefix: String,
}

impl Default for CheckConfig {
    #[inline]
    fn default() -> Self {
        Self {
            min_rust_version: "1.86".to_string(),
            server_manifest: PathBuf::from("Cargo.toml"),
            server_marker: format!("name = \"{}\"", env!("CARGO_PKG_NAME")),
            server_command: env!("CARGO_PKG_NAME").to_string(),
            config_file: PathBuf::from("mcp-config.json"),
            env_file: PathBuf::from("web/.env.local"),
            required_env_vars: vec![
                "NEXT_PUBLIC_SUPABASE_URL".to_string(),
                "NEXT_PUBLIC_SUPABASE_ANON_KEY".to_string(),
                "ANTHROPIC_API_KEY".to_string(),
            ],
            placeholder_prefix: "your_".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid server name: {0:?} (cannot be empty)")]
    InvalidServerName(String),
    #[error("Invalid minimum Rust version: {0:?} (expected MAJOR.MINOR[.PATCH])")]
    InvalidRustVersion(String),
    #[error("Invalid path for {0} (cannot be empty)")]
    EmptyPath(&'static str),
    #[error("Invalid server command (cannot be empty)")]
    EmptyServerCommand,
    #[error("At least one required environment variable must be listed")]
    NoRequiredEnvVars,
}

impl Config {
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".unified-stack-mcp"))
            .or({
                #[cfg(windows)]
                {
                    dirs::data_dir().map(|data| data.join("unified-stack-mcp"))
                }
                #[cfg(not(windows))]
                {
                    None
                }
            })
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the user configuration, falling back to defaults when none exists
    #[inline]
    pub fn load() -> Result<Self> {
        let config_path =
            Self::config_file_path().context("Failed to determine config file path")?;
        Self::load_from(&config_path)
    }

    #[inline]
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<PathBuf> {
        let config_path =
            Self::config_file_path().context("Failed to determine config file path")?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    #[inline]
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).with_context(|| {
                format!(
                    "Failed to create config directory: {}",
                    config_dir.display()
                )
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.checks.validate()
    }
}

impl ServerConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidServerName(self.name.clone()));
        }
        Ok(())
    }
}

impl CheckConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.min_rust_version()?;

        for (label, path) in [
            ("server_manifest", &self.server_manifest),
            ("config_file", &self.config_file),
            ("env_file", &self.env_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath(label));
            }
        }

        if self.server_command.trim().is_empty() {
            return Err(ConfigError::EmptyServerCommand);
        }

        if self.required_env_vars.iter().all(|v| v.trim().is_empty()) {
            return Err(ConfigError::NoRequiredEnvVars);
        }

        Ok(())
    }

    /// The parsed minimum toolchain version
    #[inline]
    pub fn min_rust_version(&self) -> Result<ToolchainVersion, ConfigError> {
        ToolchainVersion::parse(&self.min_rust_version)
            .ok_or_else(|| ConfigError::InvalidRustVersion(self.min_rust_version.clone()))
    }
}
