use clap::Parser;
use issue_report::cli::commands;
use issue_report::cli::{Cli, Commands, ServeArgs};
use issue_report::config::{self, ServerConfig};
use issue_report::logging::init_logging;
use issue_report::{IssueError, StructuredError};
use std::io::{self, IsTerminal};
use tracing::warn;

#[tokio::main]
async fn main() {
    let mut cli = Cli::parse();
    let command = cli
        .command
        .take()
        .unwrap_or_else(|| Commands::Serve(ServeArgs::default()));
    let overrides = build_cli_overrides(&cli, &command);

    let layer = match config::load_config(cli.config.as_deref(), &overrides) {
        Ok(layer) => layer,
        Err(e) => handle_error(&e),
    };
    let server_config = match ServerConfig::from_layer(&layer) {
        Ok(server_config) => server_config,
        Err(e) => handle_error(&e),
    };

    // Initialize logging
    if let Err(e) = init_logging(cli.verbose, cli.quiet, server_config.log_format) {
        eprintln!("Failed to initialize logging: {e}");
        // Don't exit, just continue without logging or with basic stderr
    }

    for key in layer.unknown_keys() {
        warn!(key, "Ignoring unknown config key");
    }

    let result = match command {
        Commands::Serve(_) => commands::serve::execute(&server_config).await,
        Commands::Init => commands::init::execute(&server_config, cli.quiet),
    };

    if let Err(e) = result {
        handle_error(&e);
    }
}

/// Handle errors with structured output support.
///
/// When stderr is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &IssueError) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    if io::stderr().is_terminal() {
        eprintln!("{}", structured.to_human(true));
    } else {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli, command: &Commands) -> config::CliOverrides {
    let (bind, static_dir) = match command {
        Commands::Serve(args) => (args.bind.clone(), args.static_dir.clone()),
        Commands::Init => (None, None),
    };

    config::CliOverrides {
        db: cli.db.clone(),
        bind,
        static_dir,
        lock_timeout: cli.lock_timeout,
        log_format: cli.log_format.clone(),
    }
}
