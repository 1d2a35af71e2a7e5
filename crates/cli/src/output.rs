// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable and `--json` rendering for command results.

use quaero_wire::{JobTreeView, JobView, LogPageView};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => eprintln!("failed to render JSON: {err}"),
    }
}

pub fn print_job(job: &JobView) {
    println!("{}  {:<10}  {}", job.id, job.status, job.name);
    println!(
        "  pending={} running={} completed={} failed={} cancelled={}",
        job.stats.pending_children, job.stats.running_children, job.stats.completed_children,
        job.stats.failed_children, job.stats.cancelled_children,
    );
}

pub fn print_job_list(jobs: &[JobView]) {
    if jobs.is_empty() {
        println!("no jobs");
        return;
    }
    for job in jobs {
        println!("{}  {:<10}  {:<12}  {}", job.id, job.status, job.job_type, job.name);
    }
}

pub fn print_tree(tree: &JobTreeView) {
    println!("{}  {:<10}  {}", tree.manager.id, tree.manager.status, tree.manager.name);
    for step in &tree.steps {
        let status = step.status.map(|s| s.to_string()).unwrap_or_else(|| "not started".to_string());
        let marker = if step.expanded { "*" } else { " " };
        println!("  {marker} {:<20} {:<10}  {} logs", step.step_name, status, step.logs.total_count);
    }
}

pub fn print_logs(page: &LogPageView) {
    if page.earlier_count > 0 {
        println!("... {} earlier entries omitted", page.earlier_count);
    }
    for entry in &page.entries {
        println!("{:>6}  {:<4}  {}", entry.line_number, entry.level, entry.message);
    }
}
