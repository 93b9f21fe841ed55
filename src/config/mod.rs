// Configuration management module
// TOML settings for the server identity and the environment checker

pub mod settings;

#[cfg(test)]
mod tests;

pub use settings::{CheckConfig, Config, ConfigError, ServerConfig};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
