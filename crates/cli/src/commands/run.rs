// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amon run -- <command> [args...]`: starts a session, runs `command` as
//! a participant, waits for it to exit, stops the session and prints the
//! folded access map — exercising `start_session`/`stop_session` (spec.md
//! §6) end to end in one process without requiring a build driver.
//!
//! The child is spawned directly rather than through the injector: a real
//! build driver would hand the session id to the injector (spec.md §4.F)
//! so the child's own process image loads the monitor library and patches
//! itself; this demo only has one executable and exercises the session
//! lifecycle and participant bookkeeping around it, not cross-process
//! propagation (that is covered by `amon-inject`'s own unit tests).

use crate::output::{format_or_json, OutputFormat};
use crate::patch_ops;
use amon_core::LogAspects;
use amon_engine::SessionRegistry;
use amon_runtime::{start_session, stop_session, PollingWaiter, SessionRequest, StartOptions};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command to run as the session's root participant.
    #[arg(required = true, last = true)]
    pub command: Vec<String>,

    /// Session base directory (defaults to `AMON_BASE_DIR`/system temp dir).
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Comma-separated debug log aspects (e.g. `FileAccesses,WriteTime`).
    #[arg(long)]
    pub log_aspects: Option<String>,

    #[arg(short = 'o', long = "output", value_enum, default_value_t)]
    pub output: OutputFormat,
}

pub fn handle(args: RunArgs) -> Result<()> {
    let (program, rest) = args.command.split_first().context("no command given")?;

    let ops = patch_ops::default_ops();
    let symbols = amon_interceptors::intercepted_symbols();
    let options = StartOptions {
        directory: args.directory,
        log_aspects: args.log_aspects.as_deref().map(LogAspects::from_names),
    };

    let id = start_session(options, SessionRequest::New, &symbols, ops.as_ref())
        .map_err(|e| anyhow::anyhow!("failed to start session: {e}"))?;

    let mut child = std::process::Command::new(program)
        .args(rest)
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    SessionRegistry::global()
        .add_participant(id, child.id())
        .map_err(|e| anyhow::anyhow!("failed to register participant: {e}"))?;

    let status = child.wait().context("failed to wait for participant")?;

    let map = stop_session(id, &PollingWaiter::default(), ops.as_ref())
        .map_err(|e| anyhow::anyhow!("failed to stop session: {e}"))?;

    let mut records: Vec<(PathBuf, amon_core::AccessRecord)> = map.into_iter().collect();
    records.sort_by(|a, b| a.0.cmp(&b.0));

    format_or_json(args.output, &records, || {
        if records.is_empty() {
            println!("No accesses observed");
        }
        for (path, record) in &records {
            println!("{} {}", path.display(), record.effective_mode.to_token_string());
        }
    })?;

    if !status.success() {
        let code = status.code().unwrap_or(1);
        return Err(crate::exit_error::ExitError::new(code, format!("{program} exited with status {status}")).into());
    }

    Ok(())
}
