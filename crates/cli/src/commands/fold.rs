// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amon fold <session-directory>`: folds a session directory left behind
//! by a (possibly crashed) prior run, without needing a live session —
//! the standalone-tool use of the collector (spec.md §4.H, SPEC_FULL.md
//! §4.H), matching `original_source/accessMonitor/test/collectEvents.cpp`.

use crate::output::OutputFormat;
use amon_storage::fold_streaming;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct FoldArgs {
    /// Session directory (e.g. `.../AccessMonitorData/Session_3`).
    pub session_directory: PathBuf,

    #[arg(short = 'o', long = "output", value_enum, default_value_t)]
    pub output: OutputFormat,
}

pub fn handle(args: FoldArgs) -> Result<()> {
    let mut any = false;
    match args.output {
        OutputFormat::Text => {
            fold_streaming(&args.session_directory, |path, record| {
                any = true;
                println!("{} {}", path.display(), record.effective_mode.to_token_string());
            })
            .context("fold failed")?;
            if !any {
                println!("No accesses observed");
            }
        }
        OutputFormat::Json => {
            let mut records = Vec::new();
            fold_streaming(&args.session_directory, |path, record| {
                records.push((path.to_path_buf(), *record));
            })
            .context("fold failed")?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
