// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Query façade over the queue log.
//!
//! [`QueueLogService`] is the only surface the web layer talks to. Every
//! query re-scans the log through [`LogReader`] and aggregates with the
//! [`crate::rollup`] and [`crate::call`] modules. Internally each query is
//! a `try_` method returning a typed `Result`; the public methods collapse
//! any failure to an empty result after logging it, so a missing log file
//! or a garbled date range degrades a dashboard to empty panels instead of
//! erroring it.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

use crate::call::{correlate, CallStatus};
use crate::constants::{
    AGENT_LISTING_LOOKBACK_SECS, DEFAULT_CALL_HISTORY_LIMIT, DEFAULT_LOG_PATH,
    MAX_TIMELINE_EVENTS, REALTIME_AGENT_WINDOW_SECS, REALTIME_QUEUE_WINDOW_SECS,
};
use crate::errors::QueryError;
use crate::event::QueueEvent;
use crate::filter::EventFilter;
use crate::reader::{LogHealth, LogReader};
use crate::rollup::agent::{
    agent_call_history, agent_comparison, agent_hourly, agent_performance_by_queue,
    agent_statistics, available_agents, calls_by_agent, AgentCallRecord, AgentComparison,
    AgentHourlyStats, AgentListing, AgentQueueStats, AgentStats, CallsByAgent,
};
use crate::rollup::disposition::{disposition_summary, DispositionSummary};
use crate::rollup::queue::{
    available_queues, queue_hourly, queue_statistics, QueueHourlyStats, QueueListing, QueueStats,
};
use crate::rollup::realtime::{
    realtime_agent_status, realtime_queue_status, RealtimeAgentStatus, RealtimeQueueStatus,
};
use crate::rollup::time::{
    call_summary, daily_summary, hourly_distribution, CallSummary, DailySummary,
    HourlyDistribution,
};
use crate::util::{fmt_min_sec, iso_timestamp};

/// Environment variable overriding the queue log location.
pub const LOG_PATH_ENV_VAR: &str = "QUEUE_LOG_PATH";

/// Where the engine reads the queue log from.
#[derive(Clone, Debug)]
pub struct QueueLogConfig {
    pub log_path: PathBuf,
}

impl Default for QueueLogConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

impl QueueLogConfig {
    /// Builds the config from the environment, falling back to the
    /// conventional switch log location.
    pub fn from_env() -> Self {
        let log_path = std::env::var(LOG_PATH_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_PATH));
        debug!(path = %log_path.display(), "resolved queue log path");
        Self { log_path }
    }
}

/// One correlated call, shaped for presentation.
#[derive(Clone, Debug, Serialize)]
pub struct CallRecord {
    #[serde(rename = "callid")]
    pub correlation_id: String,
    #[serde(rename = "calldate")]
    pub call_date: String,
    #[serde(rename = "queuename")]
    pub queue_name: String,
    pub agent: String,
    pub agent_full: String,
    pub phone_number: String,
    pub status: CallStatus,
    pub wait_time: u64,
    pub talk_time: u64,
    pub total_time: u64,
    pub wait_time_formatted: String,
    pub talk_time_formatted: String,
    pub enter_time: Option<String>,
    pub connect_time: Option<String>,
    pub complete_time: Option<String>,
    pub position_in_queue: String,
    /// Recording correlation needs the media store, which this engine has
    /// no access to. Always false.
    pub has_recording: bool,
}

/// One raw event row of the timeline view. Aux fields are echoed verbatim.
#[derive(Clone, Debug, Serialize)]
pub struct TimelineEvent {
    pub time: String,
    #[serde(rename = "callid")]
    pub correlation_id: String,
    #[serde(rename = "queuename")]
    pub queue_name: String,
    pub agent: String,
    pub event: String,
    pub data1: String,
    pub data2: String,
    pub data3: String,
}

/// The public query surface. Cheap to clone; holds only the log path.
#[derive(Clone, Debug)]
pub struct QueueLogService {
    reader: LogReader,
}

/// Seconds from midnight to 23:59:59; UTC days are exactly 86 400 s.
const END_OF_DAY_OFFSET_SECS: i64 = 86_399;

/// Inclusive epoch window parsed from `YYYY-MM-DD` date strings. The end
/// date is extended to the last second of its day.
fn parse_date_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<(Option<i64>, Option<i64>), QueryError> {
    let midnight = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| QueryError::InvalidDate(s.to_string()))
            .map(|date| date.and_time(NaiveTime::MIN).and_utc().timestamp())
    };
    let start = match start_date {
        Some(s) => Some(midnight(s)?),
        None => None,
    };
    let end = match end_date {
        Some(s) => Some(midnight(s)? + END_OF_DAY_OFFSET_SECS),
        None => None,
    };
    Ok((start, end))
}

fn window_filter(
    start_date: Option<&str>,
    end_date: Option<&str>,
    queue: Option<&str>,
) -> Result<EventFilter, QueryError> {
    let (start, end) = parse_date_range(start_date, end_date)?;
    let mut filter = EventFilter::new();
    if let Some(start) = start {
        filter = filter.since(start);
    }
    if let Some(end) = end {
        filter = filter.until(end);
    }
    if let Some(queue) = queue {
        filter = filter.for_queue(queue);
    }
    Ok(filter)
}

fn collapse<T: Default>(query: &'static str, result: Result<T, QueryError>) -> T {
    result.unwrap_or_else(|e| {
        error!(query, error = %e, "queue log query failed, returning empty result");
        T::default()
    })
}

impl QueueLogService {
    pub fn new(config: QueueLogConfig) -> Self {
        Self {
            reader: LogReader::new(config.log_path),
        }
    }

    /// Log-file precondition state for the health surface.
    pub fn health(&self) -> LogHealth {
        self.reader.health()
    }

    fn scan(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        queue: Option<&str>,
    ) -> Result<Vec<QueueEvent>, QueryError> {
        let filter = window_filter(start_date, end_date, queue)?;
        Ok(self.reader.read_filtered(&filter)?)
    }

    fn scan_trailing(&self, window_secs: i64, now: i64) -> Result<Vec<QueueEvent>, QueryError> {
        let filter = EventFilter::new().since(now - window_secs).until(now);
        Ok(self.reader.read_filtered(&filter)?)
    }

    // Call queries.

    /// Correlated calls in the window, most recent first.
    pub fn calls(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        queue: Option<&str>,
    ) -> Vec<CallRecord> {
        collapse("calls", self.try_calls(start_date, end_date, queue))
    }

    fn try_calls(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        queue: Option<&str>,
    ) -> Result<Vec<CallRecord>, QueryError> {
        let events = self.scan(start_date, end_date, queue)?;
        let records = correlate(&events)
            .into_iter()
            .map(|call| CallRecord {
                call_date: iso_timestamp(call.sort_time()),
                wait_time_formatted: fmt_min_sec(call.wait_seconds),
                talk_time_formatted: fmt_min_sec(call.talk_seconds),
                enter_time: call.enter_time.map(iso_timestamp),
                connect_time: call.connect_time.map(iso_timestamp),
                complete_time: call.complete_time.map(iso_timestamp),
                correlation_id: call.correlation_id,
                queue_name: call.queue_name,
                agent: call.agent,
                agent_full: call.agent_full,
                phone_number: call.phone_number,
                status: call.status,
                wait_time: call.wait_seconds,
                talk_time: call.talk_seconds,
                total_time: call.total_seconds,
                position_in_queue: call.position_in_queue,
                has_recording: false,
            })
            .collect();
        Ok(records)
    }

    /// Raw event rows in the window, newest first, capped.
    pub fn call_timeline(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        queue: Option<&str>,
    ) -> Vec<TimelineEvent> {
        collapse(
            "call_timeline",
            self.try_call_timeline(start_date, end_date, queue),
        )
    }

    fn try_call_timeline(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        queue: Option<&str>,
    ) -> Result<Vec<TimelineEvent>, QueryError> {
        let events = self.scan(start_date, end_date, queue)?;
        let mut rows: Vec<(i64, TimelineEvent)> = events
            .iter()
            .map(|event| {
                (
                    event.occurred_at,
                    TimelineEvent {
                        time: iso_timestamp(event.occurred_at),
                        correlation_id: event.correlation_id.clone(),
                        queue_name: event.queue_name.to_string(),
                        agent: event.agent_ref.to_string(),
                        event: event.kind.as_wire().to_string(),
                        data1: event.data1().to_string(),
                        data2: event.data2().to_string(),
                        data3: event.data3().to_string(),
                    },
                )
            })
            .collect();
        rows.sort_by_key(|(ts, _)| std::cmp::Reverse(*ts));
        rows.truncate(MAX_TIMELINE_EVENTS);
        Ok(rows.into_iter().map(|(_, r)| r).collect())
    }

    /// Whole-window headline numbers, optionally narrowed to one queue.
    pub fn call_summary(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        queue: Option<&str>,
    ) -> CallSummary {
        collapse(
            "call_summary",
            self.scan(start_date, end_date, queue)
                .map(|events| call_summary(&events)),
        )
    }

    /// Calls grouped per agent with per-call detail rows.
    pub fn calls_by_agent(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        agent: Option<&str>,
    ) -> CallsByAgent {
        collapse(
            "calls_by_agent",
            self.scan(start_date, end_date, None)
                .map(|events| calls_by_agent(&events, agent)),
        )
    }

    /// Call volume distributed over the 24 hours of the day.
    pub fn hourly_distribution(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Vec<HourlyDistribution> {
        collapse(
            "hourly_distribution",
            self.scan(start_date, end_date, None)
                .map(|events| hourly_distribution(&events)),
        )
    }

    /// Per-day call summaries, most recent day first.
    pub fn daily_summary(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Vec<DailySummary> {
        collapse(
            "daily_summary",
            self.scan(start_date, end_date, None)
                .map(|events| daily_summary(&events)),
        )
    }

    /// Event counts by wire token, most frequent first.
    pub fn disposition_summary(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Vec<DispositionSummary> {
        collapse(
            "disposition_summary",
            self.scan(start_date, end_date, None)
                .map(|events| disposition_summary(&events)),
        )
    }

    // Queue queries.

    /// Per-queue statistics over the window, optionally narrowed to one
    /// queue.
    pub fn queue_statistics(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        queue: Option<&str>,
    ) -> Vec<QueueStats> {
        collapse(
            "queue_statistics",
            self.scan(start_date, end_date, queue)
                .map(|events| queue_statistics(&events)),
        )
    }

    /// Every queue present anywhere in the log.
    pub fn available_queues(&self) -> Vec<QueueListing> {
        collapse(
            "available_queues",
            self.scan(None, None, None)
                .map(|events| available_queues(&events)),
        )
    }

    /// Per-(queue, hour) performance over the window, optionally narrowed
    /// to one queue.
    pub fn queue_hourly(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        queue: Option<&str>,
    ) -> Vec<QueueHourlyStats> {
        collapse(
            "queue_hourly",
            self.scan(start_date, end_date, queue)
                .map(|events| queue_hourly(&events)),
        )
    }

    /// Snapshot of each queue over the trailing five minutes.
    pub fn realtime_queue_status(&self) -> Vec<RealtimeQueueStatus> {
        self.realtime_queue_status_at(Utc::now().timestamp())
    }

    /// [`Self::realtime_queue_status`] with an explicit clock.
    pub fn realtime_queue_status_at(&self, now: i64) -> Vec<RealtimeQueueStatus> {
        collapse(
            "realtime_queue_status",
            self.scan_trailing(REALTIME_QUEUE_WINDOW_SECS, now)
                .map(|events| realtime_queue_status(&events)),
        )
    }

    // Agent queries.

    /// Per-agent statistics over the window, busiest first.
    pub fn agent_statistics(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        agent: Option<&str>,
    ) -> Vec<AgentStats> {
        collapse(
            "agent_statistics",
            self.scan(start_date, end_date, None)
                .map(|events| agent_statistics(&events, agent)),
        )
    }

    /// Agents seen over the trailing week, with the queues they served.
    pub fn available_agents(&self) -> Vec<AgentListing> {
        self.available_agents_at(Utc::now().timestamp())
    }

    /// [`Self::available_agents`] with an explicit clock.
    pub fn available_agents_at(&self, now: i64) -> Vec<AgentListing> {
        collapse(
            "available_agents",
            self.scan_trailing(AGENT_LISTING_LOOKBACK_SECS, now)
                .map(|events| available_agents(&events)),
        )
    }

    /// One agent's window broken down by queue.
    pub fn agent_performance_by_queue(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        agent: &str,
    ) -> Vec<AgentQueueStats> {
        collapse(
            "agent_performance_by_queue",
            self.scan(start_date, end_date, None)
                .map(|events| agent_performance_by_queue(&events, agent)),
        )
    }

    /// Per-(agent, hour) performance over the window.
    pub fn agent_hourly(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        agent: Option<&str>,
    ) -> Vec<AgentHourlyStats> {
        collapse(
            "agent_hourly",
            self.scan(start_date, end_date, None)
                .map(|events| agent_hourly(&events, agent)),
        )
    }

    /// All agents ranked by call count with relative efficiency.
    pub fn agent_comparison(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Vec<AgentComparison> {
        collapse(
            "agent_comparison",
            self.scan(start_date, end_date, None)
                .map(|events| agent_comparison(&events)),
        )
    }

    /// One agent's call events in the window, newest first.
    pub fn agent_call_history(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        agent: &str,
        limit: Option<usize>,
    ) -> Vec<AgentCallRecord> {
        let limit = limit.unwrap_or(DEFAULT_CALL_HISTORY_LIMIT);
        collapse(
            "agent_call_history",
            self.scan(start_date, end_date, None)
                .map(|events| agent_call_history(&events, agent, limit)),
        )
    }

    /// Each agent's inferred state over the trailing thirty minutes.
    pub fn realtime_agent_status(&self) -> Vec<RealtimeAgentStatus> {
        self.realtime_agent_status_at(Utc::now().timestamp())
    }

    /// [`Self::realtime_agent_status`] with an explicit clock.
    pub fn realtime_agent_status_at(&self, now: i64) -> Vec<RealtimeAgentStatus> {
        collapse(
            "realtime_agent_status",
            self.scan_trailing(REALTIME_AGENT_WINDOW_SECS, now)
                .map(|events| realtime_agent_status(&events)),
        )
    }
}
