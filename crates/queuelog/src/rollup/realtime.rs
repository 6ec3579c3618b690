// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Near-realtime snapshots derived from the trailing edge of the log.
//!
//! These rollups only make sense over a short recent window (the service
//! layer scans the last 5 minutes for queues and 30 minutes for agents);
//! the functions themselves are pure over whatever window they are given.

use derive_more::Display;
use hashbrown::{HashMap, HashSet};
use serde::Serialize;
use ustr::Ustr;

use crate::event::{EventKind, QueueEvent};
use crate::util::{iso_timestamp, percent};

/// Snapshot of one queue's activity over the recent window.
#[derive(Clone, Debug, Serialize)]
pub struct RealtimeQueueStatus {
    pub queue_name: String,
    /// The log records transitions, not standing state, so calls currently
    /// on hold cannot be derived from it. Pinned to zero.
    pub calls_waiting: u64,
    pub available_agents: usize,
    pub calls_completed_5min: u64,
    pub calls_abandoned_5min: u64,
    pub service_level_5min: f64,
}

#[derive(Default)]
struct RealtimeQueueAcc {
    entered: u64,
    answered: u64,
    abandoned: u64,
    agents: HashSet<Ustr>,
}

/// Summarizes a recent window per queue, ordered by queue name.
///
/// An agent counts as present in a queue when the window shows them
/// joining it or handling a call in it.
pub fn realtime_queue_status(events: &[QueueEvent]) -> Vec<RealtimeQueueStatus> {
    let mut queues: HashMap<Ustr, RealtimeQueueAcc> = HashMap::new();

    for event in events {
        if event.queue().is_none() {
            continue;
        }
        let acc = queues.entry(event.queue_name).or_default();
        match event.kind {
            EventKind::EnterQueue => acc.entered += 1,
            EventKind::Connect => acc.answered += 1,
            EventKind::Abandon => acc.abandoned += 1,
            _ => {}
        }
        let handling = matches!(
            event.kind,
            EventKind::AddMember
                | EventKind::Connect
                | EventKind::CompleteAgent
                | EventKind::CompleteCaller
        );
        if handling && event.agent().is_some() {
            acc.agents.insert(event.agent_ref);
        }
    }

    let mut results: Vec<RealtimeQueueStatus> = queues
        .into_iter()
        .map(|(name, acc)| RealtimeQueueStatus {
            queue_name: name.to_string(),
            calls_waiting: 0,
            available_agents: acc.agents.len(),
            calls_completed_5min: acc.answered,
            calls_abandoned_5min: acc.abandoned,
            service_level_5min: percent(acc.answered, acc.entered),
        })
        .collect();
    results.sort_by(|a, b| a.queue_name.cmp(&b.queue_name));
    results
}

/// Agent presence state inferred from their most recent log event.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
pub enum AgentState {
    #[display("IN_CALL")]
    #[serde(rename = "IN_CALL")]
    InCall,
    #[display("AVAILABLE")]
    #[serde(rename = "AVAILABLE")]
    Available,
    #[display("PAUSED")]
    #[serde(rename = "PAUSED")]
    Paused,
    #[display("UNAVAILABLE")]
    #[serde(rename = "UNAVAILABLE")]
    Unavailable,
    #[display("UNKNOWN")]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl AgentState {
    fn from_last_event(kind: &EventKind) -> Self {
        match kind {
            EventKind::Connect => AgentState::InCall,
            EventKind::CompleteAgent | EventKind::CompleteCaller => AgentState::Available,
            EventKind::Pause => AgentState::Paused,
            EventKind::AddMember => AgentState::Available,
            EventKind::RemoveMember => AgentState::Unavailable,
            _ => AgentState::Unknown,
        }
    }
}

/// Snapshot of one agent's state at the end of the recent window.
#[derive(Clone, Debug, Serialize)]
pub struct RealtimeAgentStatus {
    pub agent: String,
    pub status: AgentState,
    pub queue: String,
    pub last_activity: String,
    pub last_event: String,
}

/// Infers each agent's current state from their latest event in the
/// window, ordered by extension. Timestamp ties resolve to the later
/// line in file order.
pub fn realtime_agent_status(events: &[QueueEvent]) -> Vec<RealtimeAgentStatus> {
    let mut latest: HashMap<String, &QueueEvent> = HashMap::new();

    for event in events {
        let Some(extension) = event.agent_extension() else {
            continue;
        };
        match latest.entry(extension.to_string()) {
            hashbrown::hash_map::Entry::Occupied(mut slot) => {
                if event.occurred_at >= slot.get().occurred_at {
                    slot.insert(event);
                }
            }
            hashbrown::hash_map::Entry::Vacant(slot) => {
                slot.insert(event);
            }
        }
    }

    let mut results: Vec<RealtimeAgentStatus> = latest
        .into_iter()
        .map(|(extension, event)| RealtimeAgentStatus {
            agent: extension,
            status: AgentState::from_last_event(&event.kind),
            queue: event.queue_name.to_string(),
            last_activity: iso_timestamp(event.occurred_at),
            last_event: event.kind.as_wire().to_string(),
        })
        .collect();
    results.sort_by(|a, b| a.agent.cmp(&b.agent));
    results
}
