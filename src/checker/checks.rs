//! The individual environment checks
//!
//! Every check is read-only and turns its own failures into a failing
//! [`CheckOutcome`] instead of returning an error.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;

use super::env_file::{EnvAudit, parse_env_file};
use super::CheckOutcome;
use super::toolchain::ToolchainVersion;
use super::version_source::VersionSource;
use crate::config::CheckConfig;
use crate::mcp::protocol::MCP_VERSION;

/// Read a file, mapping "not there" to `None`
fn read_optional(path: &Path) -> std::io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// The installed compiler meets the minimum version
#[inline]
pub async fn check_toolchain_version(source: &VersionSource, minimum: ToolchainVersion) -> CheckOutcome {
    let line = match source.version_line("rustc").await {
        Ok(line) => line,
        Err(e) => {
            return CheckOutcome::fail(format!("Rust toolchain not found: {:#}", e))
                .with_hint("Install Rust from https://rustup.rs");
        }
    };

    let Some(version) = ToolchainVersion::from_rustc_output(&line) else {
        return CheckOutcome::fail(format!("Could not parse rustc version from: {}", line));
    };

    if version >= minimum {
        CheckOutcome::pass(format!("rustc {} is compatible", version))
    } else {
        CheckOutcome::fail(format!(
            "rustc {} is too old (need {}+)",
            version, minimum
        ))
        .with_hint("Run: rustup update stable")
    }
}

/// The command the host config launches for `server_name`, if it names one
#[inline]
pub fn host_command(root: &Path, checks: &CheckConfig, server_name: &str) -> Option<String> {
    let content = read_optional(&root.join(&checks.config_file)).ok()??;
    let config: Value = serde_json::from_str(&content).ok()?;

    config
        .get("servers")?
        .get(server_name)?
        .get("command")?
        .as_str()
        .filter(|command| !command.trim().is_empty())
        .map(str::to_string)
}

/// The server binary the host launches is installed and runs
///
/// The command comes from the host config entry, falling back to the
/// configured default when the entry is absent.
#[inline]
pub async fn check_mcp_runtime(
    root: &Path,
    checks: &CheckConfig,
    server_name: &str,
    source: &VersionSource,
) -> CheckOutcome {
    let command =
        host_command(root, checks, server_name).unwrap_or_else(|| checks.server_command.clone());

    match source.version_line(&command).await {
        Ok(line) => CheckOutcome::pass(format!(
            "MCP runtime is available: {} (protocol {})",
            line, MCP_VERSION
        )),
        Err(e) => CheckOutcome::fail(format!("MCP runtime is not available: {:#}", e))
            .with_hint("Install the server with: cargo install --path ."),
    }
}

/// The server manifest exists and declares the server package
#[inline]
pub fn check_server_manifest(root: &Path, checks: &CheckConfig) -> CheckOutcome {
    let path = root.join(&checks.server_manifest);
    let display = checks.server_manifest.display();

    match read_optional(&path) {
        Ok(None) => CheckOutcome::fail(format!("Server manifest not found: {}", display)),
        Ok(Some(content)) if content.contains(&checks.server_marker) => {
            CheckOutcome::pass(format!("Server manifest looks valid: {}", display))
        }
        Ok(Some(_)) => CheckOutcome::warn(format!(
            "Server manifest exists but may be incomplete: {}",
            display
        )),
        Err(e) => CheckOutcome::fail(format!("Error reading server manifest: {}", e)),
    }
}

/// The host configuration parses and has an entry for this server
#[inline]
pub fn check_config_file(root: &Path, checks: &CheckConfig, server_name: &str) -> CheckOutcome {
    let path = root.join(&checks.config_file);
    let display = checks.config_file.display();

    let content = match read_optional(&path) {
        Ok(Some(content)) => content,
        Ok(None) => return CheckOutcome::fail(format!("Config file not found: {}", display)),
        Err(e) => return CheckOutcome::fail(format!("Error reading config file: {}", e)),
    };

    let config: Value = match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => return CheckOutcome::fail(format!("Config file has invalid JSON: {}", e)),
    };

    let has_entry = config
        .get("servers")
        .and_then(Value::as_object)
        .is_some_and(|servers| servers.contains_key(server_name));

    if has_entry {
        CheckOutcome::pass(format!("Config file is valid: {}", display))
    } else {
        CheckOutcome::warn(format!(
            "Config file exists but may be incomplete: {}",
            display
        ))
        .with_hint(format!("Add a \"servers\" entry named \"{}\"", server_name))
    }
}

/// The env file defines every required variable with a real value
#[inline]
pub fn check_environment(root: &Path, checks: &CheckConfig) -> CheckOutcome {
    let path = root.join(&checks.env_file);
    let display = checks.env_file.display();

    let content = match read_optional(&path) {
        Ok(Some(content)) => content,
        Ok(None) => {
            return CheckOutcome::warn(format!("Environment file not found: {}", display));
        }
        Err(e) => {
            return CheckOutcome::fail(format!("Error reading environment file: {}", e));
        }
    };

    let vars = parse_env_file(&content);
    let audit = EnvAudit::new(&vars, &checks.required_env_vars, &checks.placeholder_prefix);

    if audit.is_clean() {
        CheckOutcome::pass("Environment variables are configured")
    } else if !audit.missing.is_empty() {
        CheckOutcome::fail(format!(
            "Missing environment variables: {}",
            audit.missing.join(", ")
        ))
    } else {
        CheckOutcome::warn(format!(
            "Environment variables have placeholder values: {}",
            audit.placeholders.join(", ")
        ))
        .with_hint(format!("Update {} with your actual API keys", display))
    }
}

/// The server manifest is well-formed TOML
#[inline]
pub fn check_manifest_syntax(root: &Path, checks: &CheckConfig) -> CheckOutcome {
    let path = root.join(&checks.server_manifest);

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            return CheckOutcome::fail(format!("Error checking server manifest syntax: {}", e));
        }
    };

    match toml::from_str::<toml::Table>(&content) {
        Ok(_) => CheckOutcome::pass("Server manifest has valid TOML syntax"),
        Err(e) => CheckOutcome::fail(format!(
            "Server manifest has syntax error: {}",
            e.to_string().trim_end()
        )),
    }
}
