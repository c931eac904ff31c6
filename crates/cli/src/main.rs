// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tiltbar - Tilt build status from the terminal

mod cmd;
mod color;
mod config;
mod env;
mod logging;
mod output;
#[cfg(test)]
mod test_env;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tb_adapters::{TiltCli, TracedTilt};
use tb_core::{Clock, SystemClock};
use tb_engine::SupervisorConfig;

use crate::cmd::status::StatusArgs;
use crate::config::{Config, FileConfig};
use crate::logging::LogTarget;
use crate::output::{OutputFormat, Renderer};

#[derive(Parser, Debug)]
#[command(
    name = "tiltbar",
    version,
    about = "Live build status for a running Tilt instance"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    /// Path or name of the tilt executable
    #[arg(long = "tilt", global = true)]
    tilt_path: Option<PathBuf>,

    /// Base address of the Tilt web UI
    #[arg(long, global = true)]
    web_url: Option<String>,

    /// Host of the Tilt instance to observe
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port of the Tilt instance to observe
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Write logs to stderr instead of the state directory
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stream status changes until interrupted (default)
    Watch,
    /// Print a one-off status snapshot
    Status(StatusArgs),
    /// Trigger a manual update of a resource
    Trigger {
        /// Resource name
        name: String,
    },
    /// Show which resources depend on which
    Deps,
    /// Print the web UI link for a resource
    Url {
        /// Resource name
        name: String,
    },
}

impl Cli {
    fn flags(&self) -> FileConfig {
        FileConfig {
            tilt_path: self.tilt_path.clone(),
            web_url: self.web_url.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(1);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain to avoid noisy duplicate output. Otherwise we render
/// the full chain so context isn't lost.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.flags())?;
    let _log_guard = logging::setup_logging(&LogTarget::resolve(cli.log_stderr)?)?;
    tracing::debug!(tilt = %config.tilt_path.display(), "configuration loaded");

    let renderer = Renderer::new(cli.output);
    let adapter = TracedTilt::new(config.tilt());

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch(adapter, renderer).await,
        Commands::Status(args) => {
            let snapshot = cmd::status::collect(
                adapter,
                SystemClock,
                SupervisorConfig::default(),
                args.settle(),
                args.timeout(),
            )
            .await?;
            println!("{}", renderer.snapshot(&snapshot, SystemClock.utc_now())?);
            Ok(())
        }
        Commands::Trigger { name } => {
            cmd::trigger::trigger(&adapter, &name).await?;
            println!("{}", renderer.triggered(&name)?);
            Ok(())
        }
        Commands::Deps => {
            let map = cmd::deps::deps(&adapter).await?;
            println!("{}", renderer.dependents(&map)?);
            Ok(())
        }
        Commands::Url { name } => {
            let link = cmd::url::url(&config.web_url, &name);
            println!("{}", renderer.url(&name, &link)?);
            Ok(())
        }
    }
}

async fn watch(adapter: TracedTilt<TiltCli>, renderer: Renderer) -> Result<()> {
    let mut stdout = std::io::stdout();
    cmd::watch::watch(
        adapter,
        SystemClock,
        SupervisorConfig::default(),
        renderer,
        &mut stdout,
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        },
    )
    .await
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
