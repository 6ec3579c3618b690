// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Agent-keyed rollups: statistics, listing, per-queue and per-hour
//! performance, call history, grouped call detail, and cross-agent
//! comparison.
//!
//! The grouping key is always the extension (the segment after the last
//! `/` of the agent ref). Agent filters from the presentation layer match
//! by substring containment on the extension, which is intentionally
//! permissive.

use hashbrown::HashMap;
use serde::Serialize;
use ustr::Ustr;

use crate::event::{EventKind, QueueEvent};
use crate::rollup::Samples;
use crate::util::{fmt_hms, fmt_min_sec, hour_of, iso_timestamp, parse_seconds, round2};

fn matches_agent(extension: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |f| extension.contains(f))
}

/// One agent's statistics over a window.
#[derive(Clone, Debug, Serialize)]
pub struct AgentStats {
    pub agent: String,
    pub agent_full: String,
    pub total_calls: u64,
    pub completed_calls: u64,
    pub total_talk_time: u64,
    pub total_talk_time_formatted: String,
    pub avg_talk_time: f64,
    pub max_talk_time: u64,
    pub min_talk_time: u64,
    pub avg_wait_before_answer: f64,
}

#[derive(Default)]
struct AgentAcc {
    agent_full: String,
    total: u64,
    completed: u64,
    talks: Samples,
    waits: Samples,
}

/// Summarizes a window into per-agent statistics, busiest agent first.
///
/// CONNECT counts a taken call (wait sample from `data1`); COMPLETE*
/// counts a completion (talk sample from `data2`). `NONE`/empty agent
/// refs are excluded; `agent_filter` narrows by extension substring.
pub fn agent_statistics(events: &[QueueEvent], agent_filter: Option<&str>) -> Vec<AgentStats> {
    let mut agents: HashMap<String, AgentAcc> = HashMap::new();

    for event in events {
        if !matches!(
            event.kind,
            EventKind::Connect | EventKind::CompleteAgent | EventKind::CompleteCaller
        ) {
            continue;
        }
        let Some(extension) = event.agent_extension() else {
            continue;
        };
        if !matches_agent(extension, agent_filter) {
            continue;
        }
        let acc = agents.entry(extension.to_string()).or_default();
        if acc.agent_full.is_empty() {
            acc.agent_full = event.agent_ref.to_string();
        }
        match event.kind {
            EventKind::Connect => {
                acc.total += 1;
                if let Some(wait) = parse_seconds(event.data1()) {
                    acc.waits.push(wait);
                }
            }
            EventKind::CompleteAgent | EventKind::CompleteCaller => {
                acc.completed += 1;
                if let Some(talk) = parse_seconds(event.data2()) {
                    acc.talks.push(talk);
                }
            }
            _ => {}
        }
    }

    let mut results: Vec<AgentStats> = agents
        .into_iter()
        .map(|(extension, acc)| AgentStats {
            agent: extension,
            agent_full: acc.agent_full,
            total_calls: acc.total,
            completed_calls: acc.completed,
            total_talk_time: acc.talks.sum(),
            total_talk_time_formatted: fmt_hms(acc.talks.sum()),
            avg_talk_time: acc.talks.avg(),
            max_talk_time: acc.talks.max(),
            min_talk_time: acc.talks.min(),
            avg_wait_before_answer: acc.waits.avg(),
        })
        .collect();
    results.sort_by(|a, b| {
        b.total_calls
            .cmp(&a.total_calls)
            .then_with(|| a.agent.cmp(&b.agent))
    });
    results
}

/// An agent seen recently in the log, with the queues they served.
#[derive(Clone, Debug, Serialize)]
pub struct AgentListing {
    pub agent: String,
    pub agent_full: String,
    pub queues: Vec<String>,
}

/// Lists every agent in the window with the queues they appeared in,
/// ordered by extension.
pub fn available_agents(events: &[QueueEvent]) -> Vec<AgentListing> {
    struct Listing {
        agent_full: String,
        queues: hashbrown::HashSet<Ustr>,
    }
    let mut agents: HashMap<String, Listing> = HashMap::new();

    for event in events {
        let Some(extension) = event.agent_extension() else {
            continue;
        };
        let entry = agents.entry(extension.to_string()).or_insert_with(|| Listing {
            agent_full: event.agent_ref.to_string(),
            queues: hashbrown::HashSet::new(),
        });
        if event.queue().is_some() {
            entry.queues.insert(event.queue_name);
        }
    }

    let mut results: Vec<AgentListing> = agents
        .into_iter()
        .map(|(extension, listing)| {
            let mut queues: Vec<String> =
                listing.queues.into_iter().map(|q| q.to_string()).collect();
            queues.sort();
            AgentListing {
                agent: extension,
                agent_full: listing.agent_full,
                queues,
            }
        })
        .collect();
    results.sort_by(|a, b| a.agent.cmp(&b.agent));
    results
}

/// One agent's performance within one queue.
#[derive(Clone, Debug, Serialize)]
pub struct AgentQueueStats {
    pub queue_name: String,
    pub calls_answered: u64,
    pub total_talk_time: u64,
    pub avg_talk_time: f64,
    pub avg_wait_time: f64,
}

#[derive(Default)]
struct AgentQueueAcc {
    answered: u64,
    talks: Samples,
    waits: Samples,
}

/// Breaks one agent's window down by queue, most-answered queue first.
pub fn agent_performance_by_queue(events: &[QueueEvent], agent: &str) -> Vec<AgentQueueStats> {
    let mut queues: HashMap<Ustr, AgentQueueAcc> = HashMap::new();

    for event in events {
        if !matches!(
            event.kind,
            EventKind::Connect | EventKind::CompleteAgent | EventKind::CompleteCaller
        ) {
            continue;
        }
        let Some(extension) = event.agent_extension() else {
            continue;
        };
        if !extension.contains(agent) || event.queue().is_none() {
            continue;
        }
        let acc = queues.entry(event.queue_name).or_default();
        match event.kind {
            EventKind::Connect => {
                acc.answered += 1;
                if let Some(wait) = parse_seconds(event.data1()) {
                    acc.waits.push(wait);
                }
            }
            EventKind::CompleteAgent | EventKind::CompleteCaller => {
                if let Some(talk) = parse_seconds(event.data2()) {
                    acc.talks.push(talk);
                }
            }
            _ => {}
        }
    }

    let mut results: Vec<AgentQueueStats> = queues
        .into_iter()
        .map(|(queue, acc)| AgentQueueStats {
            queue_name: queue.to_string(),
            calls_answered: acc.answered,
            total_talk_time: acc.talks.sum(),
            avg_talk_time: acc.talks.avg(),
            avg_wait_time: acc.waits.avg(),
        })
        .collect();
    results.sort_by(|a, b| {
        b.calls_answered
            .cmp(&a.calls_answered)
            .then_with(|| a.queue_name.cmp(&b.queue_name))
    });
    results
}

/// First-class composite grouping key for per-agent-per-hour rollups.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AgentHourKey {
    pub agent: String,
    pub hour: u32,
}

/// One agent's performance within one hour of the day.
#[derive(Clone, Debug, Serialize)]
pub struct AgentHourlyStats {
    pub agent: String,
    pub hour: u32,
    pub calls_answered: u64,
    pub avg_talk_time: f64,
}

#[derive(Default)]
struct AgentHourAcc {
    answered: u64,
    talks: Samples,
}

/// Summarizes a window into per-(agent, hour) performance, ordered by
/// agent then hour.
pub fn agent_hourly(events: &[QueueEvent], agent_filter: Option<&str>) -> Vec<AgentHourlyStats> {
    let mut hours: HashMap<AgentHourKey, AgentHourAcc> = HashMap::new();

    for event in events {
        if !matches!(
            event.kind,
            EventKind::Connect | EventKind::CompleteAgent | EventKind::CompleteCaller
        ) {
            continue;
        }
        let Some(extension) = event.agent_extension() else {
            continue;
        };
        if !matches_agent(extension, agent_filter) {
            continue;
        }
        let key = AgentHourKey {
            agent: extension.to_string(),
            hour: hour_of(event.occurred_at),
        };
        let acc = hours.entry(key).or_default();
        match event.kind {
            EventKind::Connect => acc.answered += 1,
            EventKind::CompleteAgent | EventKind::CompleteCaller => {
                if let Some(talk) = parse_seconds(event.data2()) {
                    acc.talks.push(talk);
                }
            }
            _ => {}
        }
    }

    let mut results: Vec<AgentHourlyStats> = hours
        .into_iter()
        .map(|(key, acc)| AgentHourlyStats {
            agent: key.agent,
            hour: key.hour,
            calls_answered: acc.answered,
            avg_talk_time: acc.talks.avg(),
        })
        .collect();
    results.sort_by(|a, b| (a.agent.as_str(), a.hour).cmp(&(b.agent.as_str(), b.hour)));
    results
}

/// One row of the agent comparison/ranking: the agent's stats plus their
/// rank and relative efficiency.
#[derive(Clone, Debug, Serialize)]
pub struct AgentComparison {
    pub rank: usize,
    /// `calls / max(calls) * 100`; the busiest agent scores 100.
    pub efficiency: f64,
    #[serde(flatten)]
    pub stats: AgentStats,
}

/// Ranks all agents by call count descending. `max = 1` is substituted
/// for an empty agent set so the division is always defined.
pub fn agent_comparison(events: &[QueueEvent]) -> Vec<AgentComparison> {
    let stats = agent_statistics(events, None);
    let max_calls = stats.iter().map(|s| s.total_calls).max().unwrap_or(1).max(1);

    stats
        .into_iter()
        .enumerate()
        .map(|(i, stats)| AgentComparison {
            rank: i + 1,
            efficiency: round2(stats.total_calls as f64 / max_calls as f64 * 100.0),
            stats,
        })
        .collect()
}

/// One raw event row of an agent's call history. Aux fields are echoed
/// untouched; the presentation layer decides how to render them.
#[derive(Clone, Debug, Serialize)]
pub struct AgentCallRecord {
    pub time: String,
    #[serde(rename = "callid")]
    pub correlation_id: String,
    #[serde(rename = "queuename")]
    pub queue_name: String,
    pub event: String,
    pub wait_time: String,
    pub talk_time: String,
    pub position: String,
}

/// One agent's CONNECT/COMPLETE*/TRANSFER events, newest first, capped at
/// `limit`.
pub fn agent_call_history(
    events: &[QueueEvent],
    agent: &str,
    limit: usize,
) -> Vec<AgentCallRecord> {
    let mut records: Vec<(i64, AgentCallRecord)> = events
        .iter()
        .filter(|event| {
            matches!(
                event.kind,
                EventKind::Connect
                    | EventKind::CompleteAgent
                    | EventKind::CompleteCaller
                    | EventKind::Transfer
            )
        })
        .filter(|event| {
            event
                .agent_extension()
                .is_some_and(|ext| ext.contains(agent))
        })
        .map(|event| {
            (
                event.occurred_at,
                AgentCallRecord {
                    time: iso_timestamp(event.occurred_at),
                    correlation_id: event.correlation_id.clone(),
                    queue_name: event.queue_name.to_string(),
                    event: event.kind.as_wire().to_string(),
                    wait_time: event.data1().to_string(),
                    talk_time: event.data2().to_string(),
                    position: event.data3().to_string(),
                },
            )
        })
        .collect();
    records.sort_by_key(|(ts, _)| std::cmp::Reverse(*ts));
    records.truncate(limit);
    records.into_iter().map(|(_, r)| r).collect()
}

/// One call row nested under an agent in [`CallsByAgent`].
#[derive(Clone, Debug, Serialize)]
pub struct AgentCallInfo {
    #[serde(rename = "callid")]
    pub correlation_id: String,
    #[serde(rename = "queuename")]
    pub queue_name: String,
    pub time: String,
    pub event: String,
    pub wait_time: u64,
    pub talk_time: u64,
    pub wait_time_formatted: String,
    pub talk_time_formatted: String,
}

/// One agent's block in the calls-grouped-by-agent view.
#[derive(Clone, Debug, Serialize)]
pub struct AgentCallGroup {
    pub agent: String,
    pub agent_full: String,
    pub total_calls: u64,
    pub completed_calls: u64,
    pub total_talk_time: u64,
    pub total_wait_time: u64,
    pub avg_talk_time: f64,
    pub avg_wait_time: f64,
    pub total_talk_time_formatted: String,
    pub calls: Vec<AgentCallInfo>,
}

/// Calls grouped per agent with per-call detail rows.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CallsByAgent {
    pub total_agents: usize,
    pub agents: Vec<AgentCallGroup>,
}

/// Groups CONNECT/COMPLETE* events per agent, attaching a detail row per
/// event. Agents are ordered busiest first; each agent's rows newest
/// first.
pub fn calls_by_agent(events: &[QueueEvent], agent_filter: Option<&str>) -> CallsByAgent {
    struct GroupAcc {
        agent_full: String,
        total: u64,
        completed: u64,
        talk_sum: u64,
        wait_sum: u64,
        calls: Vec<(i64, AgentCallInfo)>,
    }
    let mut groups: HashMap<String, GroupAcc> = HashMap::new();

    for event in events {
        if !matches!(
            event.kind,
            EventKind::Connect | EventKind::CompleteAgent | EventKind::CompleteCaller
        ) {
            continue;
        }
        let Some(extension) = event.agent_extension() else {
            continue;
        };
        if !matches_agent(extension, agent_filter) {
            continue;
        }
        let acc = groups
            .entry(extension.to_string())
            .or_insert_with(|| GroupAcc {
                agent_full: event.agent_ref.to_string(),
                total: 0,
                completed: 0,
                talk_sum: 0,
                wait_sum: 0,
                calls: Vec::new(),
            });

        let mut wait_time = 0;
        let mut talk_time = 0;
        match event.kind {
            EventKind::Connect => {
                acc.total += 1;
                if let Some(wait) = parse_seconds(event.data1()) {
                    wait_time = wait;
                    acc.wait_sum = acc.wait_sum.saturating_add(wait);
                }
            }
            EventKind::CompleteAgent | EventKind::CompleteCaller => {
                acc.completed += 1;
                if let Some(wait) = parse_seconds(event.data1()) {
                    wait_time = wait;
                    acc.wait_sum = acc.wait_sum.saturating_add(wait);
                }
                if let Some(talk) = parse_seconds(event.data2()) {
                    talk_time = talk;
                    acc.talk_sum = acc.talk_sum.saturating_add(talk);
                }
            }
            _ => {}
        }

        acc.calls.push((
            event.occurred_at,
            AgentCallInfo {
                correlation_id: event.correlation_id.clone(),
                queue_name: event.queue_name.to_string(),
                time: iso_timestamp(event.occurred_at),
                event: event.kind.as_wire().to_string(),
                wait_time,
                talk_time,
                wait_time_formatted: fmt_min_sec(wait_time),
                talk_time_formatted: fmt_min_sec(talk_time),
            },
        ));
    }

    let mut agents: Vec<AgentCallGroup> = groups
        .into_iter()
        .map(|(extension, mut acc)| {
            acc.calls.sort_by_key(|(ts, _)| std::cmp::Reverse(*ts));
            let (avg_wait, avg_talk) = if acc.total > 0 {
                (
                    round2(acc.wait_sum as f64 / acc.total as f64),
                    round2(acc.talk_sum as f64 / acc.total as f64),
                )
            } else {
                (0.0, 0.0)
            };
            AgentCallGroup {
                agent: extension,
                agent_full: acc.agent_full,
                total_calls: acc.total,
                completed_calls: acc.completed,
                total_talk_time: acc.talk_sum,
                total_wait_time: acc.wait_sum,
                avg_talk_time: avg_talk,
                avg_wait_time: avg_wait,
                total_talk_time_formatted: fmt_hms(acc.talk_sum),
                calls: acc.calls.into_iter().map(|(_, c)| c).collect(),
            }
        })
        .collect();
    agents.sort_by(|a, b| {
        b.total_calls
            .cmp(&a.total_calls)
            .then_with(|| a.agent.cmp(&b.agent))
    });

    CallsByAgent {
        total_agents: agents.len(),
        agents,
    }
}
