// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marginalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marginalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Marginalia CLI entrypoint.
//!
//! Offline inspection of saved canvases: export the Q&A tree, print what a page shows, or run
//! collision resolution on a page and print the repaired snapshot. Output goes to stdout as JSON.

use std::error::Error;
use std::path::PathBuf;

use marginalia::layout::{resolve_collisions, LayoutConfig};
use marginalia::query::{extract_export, visible_view};
use marginalia::store::{Snapshot, SnapshotFile};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} export <snapshot.json> [--config <layout.json>]\n  {program} visible <snapshot.json> [--page <n>]\n  {program} resolve <snapshot.json> [--page <n>] [--config <layout.json>]\n\n--page defaults to the page stored in the snapshot.\n--config overrides layout tunables; unknown keys are rejected.\n\nLogging is controlled with RUST_LOG (default: warn)."
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Export,
    Visible,
    Resolve,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    command: Command,
    snapshot: PathBuf,
    page: Option<u32>,
    config: Option<PathBuf>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let command = match args.next().as_deref() {
        Some("export") => Command::Export,
        Some("visible") => Command::Visible,
        Some("resolve") => Command::Resolve,
        _ => return Err(()),
    };

    let mut snapshot = None;
    let mut page = None;
    let mut config = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--page" => {
                if page.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                page = Some(raw.parse::<u32>().map_err(|_| ())?);
            }
            "--config" => {
                if config.is_some() {
                    return Err(());
                }
                config = Some(PathBuf::from(args.next().ok_or(())?));
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if snapshot.is_some() {
                    return Err(());
                }
                snapshot = Some(PathBuf::from(arg));
            }
        }
    }

    let snapshot = snapshot.ok_or(())?;
    if command == Command::Export && page.is_some() {
        return Err(());
    }
    if command == Command::Visible && config.is_some() {
        return Err(());
    }

    Ok(CliOptions { command, snapshot, page, config })
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(options: CliOptions) -> Result<(), Box<dyn Error>> {
    let snapshot = SnapshotFile::new(&options.snapshot).load()?;
    let config = match &options.config {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    let page = options.page.unwrap_or(snapshot.active_page);
    tracing::debug!(
        command = ?options.command,
        snapshot = %options.snapshot.display(),
        page,
        nodes = snapshot.graph.nodes().len(),
        "loaded snapshot"
    );

    let json = match options.command {
        Command::Export => {
            serde_json::to_string_pretty(&extract_export(&snapshot.graph, config.extraction_depth_cap))?
        }
        Command::Visible => serde_json::to_string_pretty(&visible_view(&snapshot.graph, page))?,
        Command::Resolve => {
            let outcome = resolve_collisions(visible_view(&snapshot.graph, page), &config);
            tracing::info!(
                page,
                moved = outcome.moved.len(),
                passes = outcome.passes,
                converged = outcome.converged,
                "resolved collisions"
            );
            let mut graph = snapshot.graph;
            graph.merge_geometry_from(&outcome.graph);
            serde_json::to_string_pretty(&Snapshot::new(graph, page))?
        }
    };
    println!("{json}");
    Ok(())
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "marginalia".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    init_tracing();
    if let Err(err) = run(options) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
