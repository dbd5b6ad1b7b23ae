// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! `kanban-workflow`: the CLI front door over the autopilot's decision
//! engine and adapters (§6). Parses arguments, wires up the configured
//! adapter, dispatches to one `commands::*` module, and maps the result to
//! an exit code.

mod adapter_factory;
mod commands;
mod exit_error;
mod output;
mod paths;
mod ticket_context;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{autopilot, cron_dispatch, mutate, next, setup};
use exit_error::ExitError;
use output::OutputFormat;
use paths::Paths;

#[derive(Parser)]
#[command(name = "kanban-workflow", about = "Single-worker Kanban autopilot over an external ticket platform")]
struct Cli {
    /// Root directory `config/` and `.tmp/` are resolved relative to
    #[arg(short = 'C', long = "root", global = true)]
    root: Option<PathBuf>,

    /// Output rendering mode
    #[arg(short = 'o', long = "output", global = true, value_enum, default_value_t = OutputFormat::Human)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate connectivity and write config/clawban.json
    Setup(setup::SetupArgs),
    /// Print the next backlog ticket's details
    Next,
    /// Move a ticket from todo to in-progress
    Start(mutate::IdArgs),
    /// Post a status comment on a ticket
    Update(mutate::TextArgs),
    /// Move a ticket to blocked with a reason
    Ask(mutate::TextArgs),
    /// Move a ticket to in-review with a completion summary
    Complete(mutate::SummaryArgs),
    /// Create a ticket in the backlog, assigned to the autopilot identity
    Create(mutate::CreateArgs),
    /// Print a ticket's full detail
    Show(mutate::IdArgs),
    /// Run one decision-engine tick
    AutopilotTick(autopilot::AutopilotTickArgs),
    /// Run a tick, dispatch the worker agent, and apply its response
    CronDispatch(cron_dispatch::CronDispatchArgs),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(run()) {
        Ok(()) => ExitCode::from(0),
        Err(err) => {
            exit_error::report(&err);
            let code = err.downcast_ref::<ExitError>().map(|e| e.code).unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let paths = Paths::discover(cli.root);
    let format = cli.output;

    match cli.command {
        Commands::Setup(args) => return setup::handle(args, &paths, format).await,
        command => {
            let config = kwf_storage::load_config(&paths.config)?.adapter;
            let adapter = adapter_factory::build(config)?;

            match command {
                Commands::Setup(_) => unreachable!("handled above"),
                Commands::Next => next::handle(adapter.as_ref(), format).await,
                Commands::Start(args) => mutate::start(adapter.as_ref(), args, format).await,
                Commands::Update(args) => mutate::update(adapter.as_ref(), args, format).await,
                Commands::Ask(args) => mutate::ask(adapter.as_ref(), args, format).await,
                Commands::Complete(args) => mutate::complete(adapter.as_ref(), args, format).await,
                Commands::Create(args) => mutate::create(adapter.as_ref(), args, format).await,
                Commands::Show(args) => mutate::show(adapter.as_ref(), args, format).await,
                Commands::AutopilotTick(args) => autopilot::handle(adapter.as_ref(), args, &paths, format).await,
                Commands::CronDispatch(args) => cron_dispatch::handle(adapter.as_ref(), args, &paths, format).await,
            }
        }
    }
}
