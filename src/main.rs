//! # flowviz
//!
//! Generates a weighted directed graph, records BFS and DFS (or max-flow augmenting
//! paths) over it, and writes the animations to the output directory.
//!
//! Log verbosity follows `RUST_LOG` and defaults to `info`. Logs go to stderr so
//! `compare --json` output stays machine-readable.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use flowviz::cli::Cli;
use flowviz::commands;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    commands::execute(cli)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
