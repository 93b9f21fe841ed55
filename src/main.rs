use clap::{Parser, Subcommand};
use std::path::PathBuf;
use unified_stack_mcp::Result;
use unified_stack_mcp::commands::{run_checks, serve_mcp, show_config};

#[derive(Parser)]
#[command(name = "unified-stack-mcp")]
#[command(about = "MCP server exposing full-stack tools to AI assistants")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio
    Serve,
    /// Check that the local environment is ready to run the server
    Check {
        /// Project root to check (defaults to the current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Show current configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP stream, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            serve_mcp().await?;
        }
        Commands::Check { root } => {
            let root = match root {
                Some(root) => root,
                None => std::env::current_dir()?,
            };
            let report = run_checks(&root).await?;
            if !report.all_passed() {
                std::process::exit(report.exit_code());
            }
        }
        Commands::Config { init } => {
            show_config(init)?;
        }
    }

    Ok(())
}
