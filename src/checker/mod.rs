//! Environment checker
//!
//! Runs the six setup checks against a project root and collects a report.
//! Nothing here writes to disk or propagates errors; every problem becomes a
//! failing outcome.

pub mod checks;
pub mod env_file;
pub mod toolchain;
pub mod version_source;


use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;

pub use toolchain::ToolchainVersion;
pub use version_source::VersionSource;

/// Result level of a single check. Only `Pass` counts as passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    #[inline]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Pass => "✅",
            Self::Warn => "⚠️ ",
            Self::Fail => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub message: String,
    pub hints: Vec<String>,
}

impl CheckOutcome {
    #[inline]
    pub fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            hints: Vec::new(),
        }
    }

    #[inline]
    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Pass, message)
    }

    #[inline]
    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Warn, message)
    }

    #[inline]
    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Fail, message)
    }

    #[inline]
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    #[inline]
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

impl fmt::Display for CheckOutcome {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.icon(), self.message)?;
        for hint in &self.hints {
            write!(f, "\n   {}", hint)?;
        }
        Ok(())
    }
}

/// One named check and how it went
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub outcome: CheckOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub results: Vec<CheckResult>,
}

impl CheckReport {
    #[inline]
    pub fn push(&mut self, name: &str, outcome: CheckOutcome) {
        debug!("Check '{}' finished: {:?}", name, outcome.status);
        self.results.push(CheckResult {
            name: name.to_string(),
            outcome,
        });
    }

    #[inline]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.passed()).count()
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    #[inline]
    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }

    /// Process exit status: 0 only when every check passed
    #[inline]
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() { 0 } else { 1 }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&CheckOutcome> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.outcome)
    }
}

pub const TOOLCHAIN_VERSION: &str = "Toolchain Version";
pub const MCP_RUNTIME: &str = "MCP Runtime";
pub const SERVER_MANIFEST: &str = "Server Manifest";
pub const CONFIG_FILE: &str = "Config File";
pub const ENVIRONMENT_VARIABLES: &str = "Environment Variables";
pub const MANIFEST_SYNTAX: &str = "Manifest Syntax";

/// Check names in the order they run
pub const CHECK_NAMES: [&str; 6] = [
    TOOLCHAIN_VERSION,
    MCP_RUNTIME,
    SERVER_MANIFEST,
    CONFIG_FILE,
    ENVIRONMENT_VARIABLES,
    MANIFEST_SYNTAX,
];

pub struct EnvironmentChecker {
    root: PathBuf,
    config: Config,
    toolchain: VersionSource,
    runtime: VersionSource,
}

impl EnvironmentChecker {
    #[inline]
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
            toolchain: VersionSource::System,
            runtime: VersionSource::System,
        }
    }

    /// Replace how `rustc --version` is obtained
    #[inline]
    #[must_use]
    pub fn with_toolchain(mut self, toolchain: VersionSource) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Replace how the server binary's `--version` is obtained
    #[inline]
    #[must_use]
    pub fn with_runtime(mut self, runtime: VersionSource) -> Self {
        self.runtime = runtime;
        self
    }

    /// Run one check by name, printing nothing
    #[inline]
    pub async fn run_check(&self, name: &str) -> Option<CheckOutcome> {
        let checks = &self.config.checks;
        let server_name = &self.config.server.name;
        let outcome = match name {
            TOOLCHAIN_VERSION => match checks.min_rust_version() {
                Ok(minimum) => checks::check_toolchain_version(&self.toolchain, minimum).await,
                Err(e) => CheckOutcome::fail(e.to_string()),
            },
            MCP_RUNTIME => {
                checks::check_mcp_runtime(&self.root, checks, server_name, &self.runtime).await
            }
            SERVER_MANIFEST => checks::check_server_manifest(&self.root, checks),
            CONFIG_FILE => checks::check_config_file(&self.root, checks, server_name),
            ENVIRONMENT_VARIABLES => checks::check_environment(&self.root, checks),
            MANIFEST_SYNTAX => checks::check_manifest_syntax(&self.root, checks),
            _ => return None,
        };
        Some(outcome)
    }

    /// Run every check in order
    #[inline]
    pub async fn run(&self) -> CheckReport {
        self.run_with(|_, _| {}).await
    }

    /// Run every check in order, calling `on_check` as each one finishes
    #[inline]
    pub async fn run_with<F>(&self, mut on_check: F) -> CheckReport
    where
        F: FnMut(&str, &CheckOutcome),
    {
        info!("Running environment checks in {}", self.root.display());

        let mut report = CheckReport::default();
        for name in CHECK_NAMES {
            if let Some(outcome) = self.run_check(name).await {
                on_check(name, &outcome);
                report.push(name, outcome);
            }
        }
        report
    }
}
