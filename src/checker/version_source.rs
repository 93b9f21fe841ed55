//! Running external programs for their `--version` line

use anyhow::{Context, Result, anyhow};
use tokio::process::Command;
use tracing::debug;

/// Where a check gets a program's `--version` line from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// Run `<program> --version` from `PATH`
    System,
    /// Use a fixed `--version` line
    Fixed(String),
    /// Behave as if the program is not installed
    Missing,
}

impl VersionSource {
    #[inline]
    pub async fn version_line(&self, program: &str) -> Result<String> {
        match self {
            Self::System => {
                let output = Command::new(program)
                    .arg("--version")
                    .output()
                    .await
                    .with_context(|| format!("Failed to run {}", program))?;

                if !output.status.success() {
                    return Err(anyhow!(
                        "{} --version exited with {}: {}",
                        program,
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    ));
                }

                let line = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if line.is_empty() {
                    return Err(anyhow!("{} --version printed nothing", program));
                }

                debug!("{} reported: {}", program, line);
                Ok(line)
            }
            Self::Fixed(line) => Ok(line.clone()),
            Self::Missing => Err(anyhow!("{} not found on PATH", program)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_and_missing_lines() {
        let fixed = VersionSource::Fixed("rustc 1.88.0 (abc 2025-06-23)".to_string());
        assert_eq!(
            fixed.version_line("rustc").await.expect("fixed line"),
            "rustc 1.88.0 (abc 2025-06-23)"
        );

        let missing = VersionSource::Missing
            .version_line("unified-stack-mcp")
            .await
            .expect_err("missing program");
        assert!(missing.to_string().contains("unified-stack-mcp"));
    }

    #[tokio::test]
    async fn system_lookup_reports_unknown_program() {
        let result = VersionSource::System
            .version_line("definitely-not-an-installed-program-7f3a")
            .await;
        assert!(result.is_err());
    }
}
