// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! amon - access monitor demo/ops CLI (SPEC_FULL.md §2 "Demo/ops CLI").

mod commands;
mod exit_error;
mod output;
mod patch_ops;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{fold, run};

#[derive(Parser)]
#[command(name = "amon", version, about = "Access monitor demo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command under the access monitor and print its access summary
    Run(run::RunArgs),
    /// Fold a session directory into a path access summary
    Fold(fold::FoldArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(amon_runtime::config::log_filter()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_cli() {
        let code = e.downcast_ref::<exit_error::ExitError>().map_or(1, |c| c.code);
        eprintln!("Error: {e}");
        std::process::exit(code);
    }
}

fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run::handle(args),
        Commands::Fold(args) => fold::handle(args),
    }
}
