use clap::Parser;
use pmu::cli::commands;
use pmu::cli::{Cli, Commands};
use pmu::logging::init_logging;
use pmu::PmuError;
use serde_json::json;
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {e}");
        // Continue without logging rather than aborting the command.
    }

    let result = match &cli.command {
        Commands::List(args) => commands::list::execute(args, cli.json),
        Commands::Projects(args) => commands::projects::execute(args, cli.json),
        Commands::Sub { command } => commands::sub::execute(command, cli.json),
        Commands::Split(args) => commands::split::execute(args, cli.json),
        Commands::Move(args) => commands::mv::execute(args, cli.json),
        Commands::Version => commands::version::execute(cli.json),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Report a failure and exit.
///
/// JSON mode (or a non-terminal stdout) gets a structured object on
/// stderr; otherwise a human-readable message with the recovery hint.
fn handle_error(err: &PmuError, json_mode: bool) -> ! {
    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let payload = json!({
            "error": err.to_string(),
            "suggestion": err.suggestion(),
        });
        eprintln!("{payload}");
    } else {
        eprintln!("Error: {err}");
        if let Some(suggestion) = err.suggestion() {
            eprintln!("  hint: {suggestion}");
        }
    }

    std::process::exit(err.exit_code());
}
