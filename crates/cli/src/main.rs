// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quaero`: a thin operator CLI over `quaerod`'s HTTP surface (§6),
//! in the style of the teacher's `oj` binary talking to its daemon —
//! here over HTTP/JSON rather than a length-prefixed socket protocol,
//! since `quaerod` is an axum server rather than a Unix-socket daemon.

mod client;
mod commands;
mod exit_error;
mod output;

use clap::Parser;

use client::DaemonClient;
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "quaero", version, about = "Quaero job scheduling CLI")]
struct Cli {
    /// Base URL of the `quaerod` instance to talk to.
    #[arg(long, env = "QUAERO_URL", default_value = "http://127.0.0.1:8080")]
    url: String,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let client = DaemonClient::new(cli.url);
    if let Err(err) = commands::run(&client, cli.command).await {
        report_and_exit(err);
    }
}

fn report_and_exit(err: ExitError) -> ! {
    eprintln!("error: {err}");
    std::process::exit(err.code);
}
