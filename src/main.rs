//! mcp-toolkit: host binary for the bundled MCP tool servers
//!
//! Serves one of the bundled tool sets (calculator, file manager,
//! weather) over stdio. Logging goes to stderr; stdout carries only
//! protocol messages.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use mcp_toolkit::config::{self, Config};
use mcp_toolkit::mcp::server::{McpServer, MessageSink};
use mcp_toolkit::mcp::transport;
use mcp_toolkit::mcp::SchemaError;
use mcp_toolkit::tools;

/// The bundled tool sets this binary can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ToolSet {
    /// Integer arithmetic tools.
    Calculator,
    /// Sandboxed file management tools.
    FileManager,
    /// Canned weather lookup tools.
    Weather,
}

/// MCP server runtime with bundled example tool servers.
///
/// Speaks JSON-RPC 2.0 over stdio: newline-delimited requests on stdin,
/// responses on stdout.
#[derive(Parser, Debug)]
#[command(name = "mcp-toolkit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Tool set to serve
    #[arg(short, long, value_enum, default_value = "calculator")]
    server: ToolSet,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the selected tool server.
fn build_server(
    tool_set: ToolSet,
    cfg: &Config,
    sink: MessageSink,
) -> Result<McpServer, SchemaError> {
    let server = match tool_set {
        ToolSet::Calculator => tools::calculator::server(sink)?,
        ToolSet::FileManager => tools::files::server(sink, cfg.sandbox_path.clone())?,
        ToolSet::Weather => tools::weather::server(sink)?,
    };
    Ok(server.with_strict_arguments(cfg.strict_arguments))
}

/// Entry point for the mcp-toolkit server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "mcp-toolkit {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        tool_set = ?args.server,
        "Starting mcp-toolkit server"
    );

    let (sink, rx) = transport::channel_sink();
    let server = match build_server(args.server, &cfg, sink) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Failed to build tool server");
            return ExitCode::FAILURE;
        }
    };

    info!("MCP server ready, waiting for client connection...");

    // Run the server
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(transport::serve(server, rx));

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
