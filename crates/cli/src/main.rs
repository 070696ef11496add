// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! herald - event pipeline operator CLI

mod commands;
mod completions;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{catalog, emit};
use completions::CompletionsArgs;

#[derive(Parser)]
#[command(
    name = "herald",
    version,
    about = "Herald - audit and telemetry event pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Template catalog tools
    Catalog(catalog::CatalogArgs),
    /// Create and publish an event
    Emit(emit::EmitArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    match cli.command {
        Commands::Catalog(args) => catalog::run(args),
        Commands::Emit(args) => emit::run(args),
        Commands::Completions(args) => {
            completions::generate_completions::<Cli>(args.shell);
            Ok(())
        }
    }
}

/// Log to stderr so stdout stays machine-readable
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
