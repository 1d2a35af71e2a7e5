// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `quaero` subcommands: one operator-facing action per `quaerod` endpoint
//! (§6 External Interfaces).

use clap::Subcommand;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output;

#[derive(Subcommand)]
pub enum Command {
    /// Launch a Job Definition by id (`POST /api/job-definitions/{id}/execute`).
    Execute {
        definition_id: String,
        /// Print the raw JSON response instead of a summary line.
        #[arg(long)]
        json: bool,
    },
    /// Launch the crawler whose `url_patterns` matches `url`, or an ad-hoc
    /// crawl if none match (`POST /api/job-definitions/quick-crawl`).
    QuickCrawl {
        url: String,
        #[arg(long)]
        json: bool,
    },
    /// Show one job (`GET /api/jobs/{id}`).
    Show {
        job_id: String,
        #[arg(long)]
        json: bool,
    },
    /// List jobs, optionally filtered (`GET /api/jobs`).
    List {
        #[arg(long)]
        parent_id: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show a job's manager/step tree (`GET /api/jobs/{id}/tree`).
    Tree {
        job_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Tail a step's (or a leaf job's) logs (`GET /api/jobs/{id}/tree/logs`).
    Logs {
        job_id: String,
        #[arg(long)]
        step: Option<String>,
        /// Comma-separated level filter, e.g. "INF,WRN,ERR".
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        after: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Cancel a job and its descendants (`POST /api/jobs/{id}/cancel`).
    Cancel {
        job_id: String,
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(client: &DaemonClient, command: Command) -> Result<(), ExitError> {
    match command {
        Command::Execute { definition_id, json } => {
            let response = client.execute(&definition_id).await?;
            if json {
                output::print_json(&response);
            } else {
                println!("launched {}", response.job_id);
            }
        }
        Command::QuickCrawl { url, json } => {
            let response = client.quick_crawl(&url).await?;
            if json {
                output::print_json(&response);
            } else {
                println!("launched {}", response.job_id);
            }
        }
        Command::Show { job_id, json } => {
            let job = client.get_job(&job_id).await?;
            if json {
                output::print_json(&job);
            } else {
                output::print_job(&job);
            }
        }
        Command::List { parent_id, status, json } => {
            let response = client.list_jobs(parent_id.as_deref(), status.as_deref()).await?;
            if json {
                output::print_json(&response);
            } else {
                output::print_job_list(&response.jobs);
            }
        }
        Command::Tree { job_id, json } => {
            let tree = client.tree(&job_id).await?;
            if json {
                output::print_json(&tree);
            } else {
                output::print_tree(&tree);
            }
        }
        Command::Logs { job_id, step, level, after, json } => {
            let page = client.tree_logs(&job_id, step.as_deref(), level.as_deref(), after).await?;
            if json {
                output::print_json(&page);
            } else {
                output::print_logs(&page);
            }
        }
        Command::Cancel { job_id, json } => {
            let response = client.cancel(&job_id).await?;
            if json {
                output::print_json(&response);
            } else {
                println!("{} is now {}", response.job_id, response.status);
            }
        }
    }
    Ok(())
}
