//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Issue-reporting web service (`SQLite` + JSON over HTTP)
#[derive(Parser, Debug)]
#[command(name = "issue-report", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// YAML config file (default: ./issues.yaml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Log output format: text or json
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service (default)
    Serve(ServeArgs),

    /// Create the issues table if needed and report the issue count
    Init,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long)]
    pub bind: Option<String>,

    /// Directory served under /static (empty string disables)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}
