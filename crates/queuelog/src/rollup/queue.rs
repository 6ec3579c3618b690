// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-queue statistics, queue listing, and per-(queue, hour) performance.

use hashbrown::HashMap;
use serde::Serialize;
use ustr::Ustr;

use crate::constants::SERVICE_LEVEL_THRESHOLD_SECS;
use crate::event::{EventKind, QueueEvent};
use crate::rollup::Samples;
use crate::util::{hour_of, parse_seconds, percent};

/// One queue's statistics over a window.
#[derive(Clone, Debug, Serialize)]
pub struct QueueStats {
    pub queue_name: String,
    pub total_calls: u64,
    pub answered_calls: u64,
    pub abandoned_calls: u64,
    pub avg_wait_time: f64,
    pub max_wait_time: u64,
    pub min_wait_time: u64,
    pub avg_talk_time: f64,
    pub service_level: f64,
    pub answer_rate: f64,
    pub abandon_rate: f64,
}

#[derive(Default)]
struct QueueAcc {
    total: u64,
    answered: u64,
    abandoned: u64,
    waits: Samples,
    talks: Samples,
    within_threshold: u64,
}

/// Summarizes a window into per-queue statistics, ordered by queue name.
///
/// ENTERQUEUE counts a call entering, CONNECT an answer (sampling its wait
/// from `data1`), ABANDON an abandonment, COMPLETE* a talk sample from
/// `data2`. Events without queue context are excluded.
pub fn queue_statistics(events: &[QueueEvent]) -> Vec<QueueStats> {
    let mut queues: HashMap<Ustr, QueueAcc> = HashMap::new();

    for event in events {
        if event.queue().is_none() {
            continue;
        }
        let acc = queues.entry(event.queue_name).or_default();
        match event.kind {
            EventKind::EnterQueue => acc.total += 1,
            EventKind::Connect => {
                acc.answered += 1;
                if let Some(wait) = parse_seconds(event.data1()) {
                    acc.waits.push(wait);
                    if wait <= SERVICE_LEVEL_THRESHOLD_SECS {
                        acc.within_threshold += 1;
                    }
                }
            }
            EventKind::Abandon => acc.abandoned += 1,
            EventKind::CompleteAgent | EventKind::CompleteCaller => {
                if let Some(talk) = parse_seconds(event.data2()) {
                    acc.talks.push(talk);
                }
            }
            _ => {}
        }
    }

    let mut results: Vec<QueueStats> = queues
        .into_iter()
        .map(|(name, acc)| QueueStats {
            queue_name: name.to_string(),
            total_calls: acc.total,
            answered_calls: acc.answered,
            abandoned_calls: acc.abandoned,
            avg_wait_time: acc.waits.avg(),
            max_wait_time: acc.waits.max(),
            min_wait_time: acc.waits.min(),
            avg_talk_time: acc.talks.avg(),
            service_level: percent(acc.within_threshold, acc.answered),
            answer_rate: percent(acc.answered, acc.total),
            abandon_rate: percent(acc.abandoned, acc.total),
        })
        .collect();
    results.sort_by(|a, b| a.queue_name.cmp(&b.queue_name));
    results
}

/// A queue known to the log, with how many distinct agents served it.
#[derive(Clone, Debug, Serialize)]
pub struct QueueListing {
    pub queue_name: String,
    pub total_agents: usize,
}

/// Lists every queue seen in the window with its distinct agent count,
/// ordered by queue name.
pub fn available_queues(events: &[QueueEvent]) -> Vec<QueueListing> {
    let mut agents_by_queue: HashMap<Ustr, hashbrown::HashSet<Ustr>> = HashMap::new();

    for event in events {
        if event.queue().is_none() {
            continue;
        }
        let agents = agents_by_queue.entry(event.queue_name).or_default();
        if event.agent().is_some() {
            agents.insert(event.agent_ref);
        }
    }

    let mut results: Vec<QueueListing> = agents_by_queue
        .into_iter()
        .map(|(name, agents)| QueueListing {
            queue_name: name.to_string(),
            total_agents: agents.len(),
        })
        .collect();
    results.sort_by(|a, b| a.queue_name.cmp(&b.queue_name));
    results
}

/// First-class composite grouping key for per-queue-per-hour rollups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QueueHourKey {
    pub queue: Ustr,
    pub hour: u32,
}

/// One queue's performance within one hour of the day.
#[derive(Clone, Debug, Serialize)]
pub struct QueueHourlyStats {
    #[serde(rename = "queuename")]
    pub queue_name: String,
    pub hour: u32,
    pub calls_entered: u64,
    pub calls_answered: u64,
    pub calls_abandoned: u64,
    pub answer_rate: f64,
    pub avg_wait_time: f64,
}

#[derive(Default)]
struct QueueHourAcc {
    entered: u64,
    answered: u64,
    abandoned: u64,
    waits: Samples,
}

/// Summarizes a window into per-(queue, hour) performance, ordered by
/// queue then hour.
pub fn queue_hourly(events: &[QueueEvent]) -> Vec<QueueHourlyStats> {
    let mut hours: HashMap<QueueHourKey, QueueHourAcc> = HashMap::new();

    for event in events {
        if event.queue().is_none() {
            continue;
        }
        let key = QueueHourKey {
            queue: event.queue_name,
            hour: hour_of(event.occurred_at),
        };
        let acc = hours.entry(key).or_default();
        match event.kind {
            EventKind::EnterQueue => acc.entered += 1,
            EventKind::Connect => {
                acc.answered += 1;
                if let Some(wait) = parse_seconds(event.data1()) {
                    acc.waits.push(wait);
                }
            }
            EventKind::Abandon => acc.abandoned += 1,
            _ => {}
        }
    }

    let mut results: Vec<QueueHourlyStats> = hours
        .into_iter()
        .map(|(key, acc)| QueueHourlyStats {
            queue_name: key.queue.to_string(),
            hour: key.hour,
            calls_entered: acc.entered,
            calls_answered: acc.answered,
            calls_abandoned: acc.abandoned,
            answer_rate: percent(acc.answered, acc.entered),
            avg_wait_time: acc.waits.avg(),
        })
        .collect();
    results.sort_by(|a, b| (a.queue_name.as_str(), a.hour).cmp(&(b.queue_name.as_str(), b.hour)));
    results
}
