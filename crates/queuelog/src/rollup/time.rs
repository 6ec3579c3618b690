// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Time-bucketed rollups: hour-of-day distribution, per-day summaries,
//! and the whole-window call summary.

use chrono::NaiveDate;
use hashbrown::HashMap;
use serde::Serialize;

use crate::event::{EventKind, QueueEvent};
use crate::rollup::Samples;
use crate::util::{date_of, hour_of, parse_seconds, percent};

/// Call volume and durations within one hour of the day (0..=23),
/// aggregated across all days in the window.
#[derive(Clone, Debug, Serialize)]
pub struct HourlyDistribution {
    pub hour: u32,
    pub total_calls: u64,
    pub answered_calls: u64,
    pub missed_calls: u64,
    pub avg_duration: f64,
    pub avg_wait_time: f64,
}

#[derive(Default)]
struct HourAcc {
    total: u64,
    answered: u64,
    missed: u64,
    talks: Samples,
    waits: Samples,
}

/// Distributes a window over the 24 hours of the day, ordered by hour.
/// Hours with no traffic are omitted rather than zero-filled.
pub fn hourly_distribution(events: &[QueueEvent]) -> Vec<HourlyDistribution> {
    let mut hours: HashMap<u32, HourAcc> = HashMap::new();

    for event in events {
        let acc = hours.entry(hour_of(event.occurred_at)).or_default();
        match event.kind {
            EventKind::EnterQueue => acc.total += 1,
            EventKind::Connect => {
                acc.answered += 1;
                if let Some(wait) = parse_seconds(event.data1()) {
                    acc.waits.push(wait);
                }
            }
            EventKind::Abandon => acc.missed += 1,
            EventKind::CompleteAgent | EventKind::CompleteCaller => {
                if let Some(talk) = parse_seconds(event.data2()) {
                    acc.talks.push(talk);
                }
            }
            _ => {}
        }
    }

    let mut results: Vec<HourlyDistribution> = hours
        .into_iter()
        .map(|(hour, acc)| HourlyDistribution {
            hour,
            total_calls: acc.total,
            answered_calls: acc.answered,
            missed_calls: acc.missed,
            avg_duration: acc.talks.avg(),
            avg_wait_time: acc.waits.avg(),
        })
        .collect();
    results.sort_by_key(|d| d.hour);
    results
}

/// Call volume and durations for one calendar day.
#[derive(Clone, Debug, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub total_calls: u64,
    pub answered_calls: u64,
    pub missed_calls: u64,
    pub avg_duration: f64,
    pub total_duration: u64,
}

#[derive(Default)]
struct DayAcc {
    total: u64,
    answered: u64,
    missed: u64,
    talks: Samples,
}

/// Summarizes a window per calendar day, most recent day first.
pub fn daily_summary(events: &[QueueEvent]) -> Vec<DailySummary> {
    let mut days: HashMap<NaiveDate, DayAcc> = HashMap::new();

    for event in events {
        let acc = days.entry(date_of(event.occurred_at)).or_default();
        match event.kind {
            EventKind::EnterQueue => acc.total += 1,
            EventKind::Connect => acc.answered += 1,
            EventKind::Abandon => acc.missed += 1,
            EventKind::CompleteAgent | EventKind::CompleteCaller => {
                if let Some(talk) = parse_seconds(event.data2()) {
                    acc.talks.push(talk);
                }
            }
            _ => {}
        }
    }

    let mut results: Vec<(NaiveDate, DailySummary)> = days
        .into_iter()
        .map(|(date, acc)| {
            (
                date,
                DailySummary {
                    date: date.format("%Y-%m-%d").to_string(),
                    total_calls: acc.total,
                    answered_calls: acc.answered,
                    missed_calls: acc.missed,
                    avg_duration: acc.talks.avg(),
                    total_duration: acc.talks.sum(),
                },
            )
        })
        .collect();
    results.sort_by_key(|(date, _)| std::cmp::Reverse(*date));
    results.into_iter().map(|(_, s)| s).collect()
}

/// Whole-window headline numbers for a dashboard tile.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CallSummary {
    pub total_calls: u64,
    pub answered_calls: u64,
    pub abandoned_calls: u64,
    pub total_duration: u64,
    pub avg_duration: f64,
    pub avg_wait_time: f64,
    pub max_wait_time: u64,
    pub min_wait_time: u64,
    pub max_talk_time: u64,
    pub answer_rate: f64,
}

/// Collapses a window into one summary row.
///
/// Counts come from events carrying queue context; duration samples are
/// taken from every event in the window regardless of queue.
pub fn call_summary(events: &[QueueEvent]) -> CallSummary {
    let mut summary = CallSummary::default();
    let mut waits = Samples::default();
    let mut talks = Samples::default();

    for event in events {
        if event.queue().is_some() {
            match event.kind {
                EventKind::EnterQueue => summary.total_calls += 1,
                EventKind::Connect => summary.answered_calls += 1,
                EventKind::Abandon => summary.abandoned_calls += 1,
                _ => {}
            }
        }
        match event.kind {
            EventKind::Connect => {
                if let Some(wait) = parse_seconds(event.data1()) {
                    waits.push(wait);
                }
            }
            EventKind::CompleteAgent | EventKind::CompleteCaller => {
                if let Some(talk) = parse_seconds(event.data2()) {
                    talks.push(talk);
                }
            }
            _ => {}
        }
    }

    summary.total_duration = talks.sum();
    summary.avg_duration = talks.avg();
    summary.avg_wait_time = waits.avg();
    summary.max_wait_time = waits.max();
    summary.min_wait_time = waits.min();
    summary.max_talk_time = talks.max();
    summary.answer_rate = percent(summary.answered_calls, summary.total_calls);
    summary
}
