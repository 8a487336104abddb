// Project Gate - Main Entry Point
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// CLI and MCP stdio server. Every tool call is bounded by the root.
// Usage:
//   project-gate serve                          # Run MCP server (stdio)
//   project-gate check <path>                   # One-shot guard check
//   project-gate call <tool> [params]           # One-shot tool call
//   project-gate tools                          # Print tool definitions
//   project-gate status                         # Show root and settings

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use project_gate::{
    config::GateConfig, dispatch::Dispatcher, guard::PathGuard, mcp, paths,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "project-gate")]
#[command(author = "Joseph Stone")]
#[command(version)]
#[command(about = "Project Gate - root-bounded MCP tool server")]
struct Cli {
    /// Root boundary (default: $PROJECT_GATE_ROOT, then current directory)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Server settings JSON (default: <root>/project-gate.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run MCP server (stdio JSON-RPC)
    Serve,

    /// One-shot guard check: prints allow/deny, exit 1 when denied
    Check {
        /// Path relative to the root
        path: String,
    },

    /// One-shot tool call: prints the response envelope, exit 1 on failure
    Call {
        /// Tool name (read_file, write_file, list_files, ...)
        tool: String,

        /// Arguments as JSON object
        #[arg(default_value = "{}")]
        params: String,
    },

    /// Print tool definitions as advertised over MCP
    Tools,

    /// Show root boundary and effective settings
    Status,
}

fn main() -> Result<()> {
    // Initialize logging (stderr; stdout is the protocol stream)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    let cli = Cli::parse();

    let root = paths::resolve_root(cli.root.as_deref())
        .context("Failed to resolve root boundary")?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| root.join(paths::CONFIG_FILE_NAME));
    let config = GateConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    let guard = PathGuard::new(&root)?;
    let dispatcher = Dispatcher::new(guard, config);

    match &cli.command {
        Commands::Serve => {
            mcp::run(dispatcher)?;
        }

        Commands::Check { path } => {
            let decision = dispatcher.guard().validate(path);
            println!("{}", serde_json::to_string_pretty(&decision)?);
            if !decision.is_allowed() {
                std::process::exit(1);
            }
        }

        Commands::Call { tool, params } => {
            let args: serde_json::Value = serde_json::from_str(params)
                .with_context(|| format!("Invalid params JSON: {}", params))?;
            let response = dispatcher
                .call(tool, &args)
                .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", tool))?;
            println!("{}", response.to_text());
            if !response.is_success() {
                std::process::exit(1);
            }
        }

        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&dispatcher.definitions())?);
        }

        Commands::Status => {
            println!("Project Gate v{}", mcp::SERVER_VERSION);
            println!("Root:   {}", dispatcher.root().display());
            println!("Config: {:?}", config_path);
            println!();
            println!("{}", serde_json::to_string_pretty(dispatcher.config())?);
            println!();
            println!("Tools:");
            for spec in dispatcher.specs() {
                println!("  {:<22} {}", spec.name, spec.description);
            }
        }
    }

    Ok(())
}
