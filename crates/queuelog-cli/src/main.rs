// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Command line front end over the queue log analytics engine. Every
//! subcommand maps to one query on [`QueueLogService`] and prints the
//! result as pretty JSON, so output pipes cleanly into `jq`.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use queuelog::service::QueueLogConfig;
use queuelog::QueueLogService;

#[derive(Parser)]
#[command(name = "queuelog", about = "Call-center reporting from the switch's queue log")]
struct Cli {
    /// Path to the queue log file; overrides QUEUE_LOG_PATH.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Correlated calls, most recent first
    Calls {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        queue: Option<String>,
    },
    /// Raw event timeline, newest first
    Timeline {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        queue: Option<String>,
    },
    /// Whole-window headline numbers
    Summary {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        queue: Option<String>,
    },
    /// Calls grouped per agent with per-call detail
    CallsByAgent {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        agent: Option<String>,
    },
    /// Call volume by hour of day
    Hourly {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Per-day call summaries, most recent first
    Daily {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Event counts by wire token
    Dispositions {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Per-queue statistics
    QueueStats {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        queue: Option<String>,
    },
    /// Every queue seen in the log
    Queues,
    /// Per-queue, per-hour performance
    QueueHourly {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        queue: Option<String>,
    },
    /// Queue snapshot over the trailing five minutes
    QueueRealtime,
    /// Per-agent statistics, busiest first
    AgentStats {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        agent: Option<String>,
    },
    /// Agents seen over the trailing week
    Agents,
    /// One agent's performance broken down by queue
    AgentQueues {
        #[arg(long)]
        agent: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Per-agent, per-hour performance
    AgentHourly {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        agent: Option<String>,
    },
    /// Agents ranked by call count with relative efficiency
    AgentComparison {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// One agent's call events, newest first
    AgentHistory {
        #[arg(long)]
        agent: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Agent states over the trailing thirty minutes
    AgentRealtime,
    /// Log-file precondition check
    Health,
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "failed to serialize query result"),
    }
}

fn main() {
    let log_level = env::var("QUEUE_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("warn".to_string());

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(log_level).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_target(true)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    let config = match cli.log_file {
        Some(log_path) => QueueLogConfig { log_path },
        None => QueueLogConfig::from_env(),
    };
    let service = QueueLogService::new(config);

    match cli.command {
        Command::Calls { start, end, queue } => print_json(&service.calls(
            start.as_deref(),
            end.as_deref(),
            queue.as_deref(),
        )),
        Command::Timeline { start, end, queue } => print_json(&service.call_timeline(
            start.as_deref(),
            end.as_deref(),
            queue.as_deref(),
        )),
        Command::Summary { start, end, queue } => print_json(&service.call_summary(
            start.as_deref(),
            end.as_deref(),
            queue.as_deref(),
        )),
        Command::CallsByAgent { start, end, agent } => print_json(&service.calls_by_agent(
            start.as_deref(),
            end.as_deref(),
            agent.as_deref(),
        )),
        Command::Hourly { start, end } => {
            print_json(&service.hourly_distribution(start.as_deref(), end.as_deref()));
        }
        Command::Daily { start, end } => {
            print_json(&service.daily_summary(start.as_deref(), end.as_deref()));
        }
        Command::Dispositions { start, end } => {
            print_json(&service.disposition_summary(start.as_deref(), end.as_deref()));
        }
        Command::QueueStats { start, end, queue } => print_json(&service.queue_statistics(
            start.as_deref(),
            end.as_deref(),
            queue.as_deref(),
        )),
        Command::Queues => print_json(&service.available_queues()),
        Command::QueueHourly { start, end, queue } => print_json(&service.queue_hourly(
            start.as_deref(),
            end.as_deref(),
            queue.as_deref(),
        )),
        Command::QueueRealtime => print_json(&service.realtime_queue_status()),
        Command::AgentStats { start, end, agent } => print_json(&service.agent_statistics(
            start.as_deref(),
            end.as_deref(),
            agent.as_deref(),
        )),
        Command::Agents => print_json(&service.available_agents()),
        Command::AgentQueues { agent, start, end } => print_json(
            &service.agent_performance_by_queue(start.as_deref(), end.as_deref(), &agent),
        ),
        Command::AgentHourly { start, end, agent } => print_json(&service.agent_hourly(
            start.as_deref(),
            end.as_deref(),
            agent.as_deref(),
        )),
        Command::AgentComparison { start, end } => {
            print_json(&service.agent_comparison(start.as_deref(), end.as_deref()));
        }
        Command::AgentHistory {
            agent,
            start,
            end,
            limit,
        } => print_json(&service.agent_call_history(
            start.as_deref(),
            end.as_deref(),
            &agent,
            limit,
        )),
        Command::AgentRealtime => print_json(&service.realtime_agent_status()),
        Command::Health => print_json(&service.health()),
    }
}
