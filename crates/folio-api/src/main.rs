//! folio CLI entry point.
//!
//! Parses arguments, sets up tracing, opens the data directory and
//! dispatches to one command handler per invocation.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::navigate::Move;
use cli::{Cli, Commands};
use folio_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,folio_core=debug",
        _ => "trace",
    };
    let options = TracingOptions {
        json: cli.json,
        otel: std::env::var_os("FOLIO_OTEL").is_some(),
        default_filter: default_filter.to_string(),
    };
    if let Err(err) = init_tracing(&options) {
        eprintln!("Warning: tracing setup failed: {err}");
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "folio", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.owner).await?;

    let result = match cli.command {
        Commands::Status => cli::status::status(&state, cli.json).await,
        Commands::Show { section } => cli::show::show(&state, section.as_deref(), cli.json).await,
        Commands::Edit { section, fields } => {
            cli::edit::edit(&state, &section, &fields, cli.json).await
        }
        Commands::Save => cli::save::save(&state, cli.json).await,
        Commands::Next => cli::navigate::navigate(&state, Move::Next, cli.json).await,
        Commands::Prev => cli::navigate::navigate(&state, Move::Prev, cli.json).await,
        Commands::Goto { section } => {
            cli::navigate::navigate(&state, Move::To(&section), cli.json).await
        }
        Commands::Finalize => cli::save::finalize(&state, cli.json).await,
        Commands::Discard { yes } => cli::discard::discard(&state, yes, cli.json).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}
