use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::checker::{CheckReport, CheckStatus, EnvironmentChecker};
use crate::config::Config;
use crate::mcp::build_stack_server;

/// Start the MCP server on stdio and run until the client disconnects
#[inline]
pub async fn serve_mcp() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let server = Arc::new(build_stack_server(&config.server).await);
    let health = server.health_status().await;
    info!(
        "MCP server '{}' ready with {} tools and {} resources",
        server.server_info.name, health.tools_registered, health.resources_registered
    );

    server.serve_stdio().await
}

/// Run every environment check, printing progress and a summary
///
/// Returns the report so the caller can pick the exit status.
#[inline]
pub async fn run_checks(root: &Path) -> Result<CheckReport> {
    let config = Config::load().context("Failed to load configuration")?;
    let checker = EnvironmentChecker::new(root, config);

    println!("{}", style("🧪 MCP Server Test Suite").bold().cyan());
    println!("========================");

    let report = checker
        .run_with(|name, outcome| {
            println!();
            println!("📋 Testing: {}", style(name).bold());
            println!("{}", outcome);
        })
        .await;

    print_summary(&report);
    Ok(report)
}

fn print_summary(report: &CheckReport) {
    println!();
    println!("{}", "=".repeat(50));
    println!("📊 Test Results Summary");
    println!("{}", "=".repeat(50));

    for result in &report.results {
        let status = match result.outcome.status {
            CheckStatus::Pass => style("✅ PASS").green(),
            CheckStatus::Warn | CheckStatus::Fail => style("❌ FAIL").red(),
        };
        println!("{}: {}", status, result.name);
    }

    println!();
    println!("Score: {}/{} tests passed", report.passed(), report.total());

    if report.all_passed() {
        println!();
        println!(
            "{}",
            style("🎉 All tests passed! Your MCP server is ready to use.").green()
        );
        println!();
        println!("Next steps:");
        println!("1. Restart your MCP host (e.g. Claude Desktop)");
        println!("2. Try asking the assistant to create a component or query your database");
        println!("3. Your AI assistant now has full stack access!");
    } else {
        let failed = report.total() - report.passed();
        println!();
        println!(
            "{}",
            style(format!(
                "⚠️  {} test(s) failed. Please fix the issues above.",
                failed
            ))
            .yellow()
        );
        println!();
        println!("For help, see:");
        println!("- unified-stack-mcp config");
        println!("- mcp-config.json in the project root");
    }
}

/// Print the effective configuration, or write the defaults with `init`
#[inline]
pub fn show_config(init: bool) -> Result<()> {
    if init {
        let path = Config::default()
            .save()
            .context("Failed to save default configuration")?;
        println!(
            "{}",
            style("✓ Default configuration written").green()
        );
        println!("Configuration saved to: {}", style(path.display()).cyan());
        return Ok(());
    }

    let config = Config::load().context("Failed to load configuration")?;
    let config_path = Config::config_file_path().context("Failed to get config file path")?;

    println!("{}", style("📋 Current Configuration").bold().cyan());
    println!();
    if config_path.exists() {
        println!("File: {}", style(config_path.display()).cyan());
    } else {
        println!(
            "File: {} {}",
            style(config_path.display()).cyan(),
            style("(not created, showing defaults)").dim()
        );
    }
    println!();
    print!(
        "{}",
        toml::to_string_pretty(&config).context("Failed to serialize configuration")?
    );

    Ok(())
}
