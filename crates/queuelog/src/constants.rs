// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fixed policy constants shared across the engine.

/// Default location of the switch's queue log.
pub const DEFAULT_LOG_PATH: &str = "/var/log/asterisk/queue_log";

/// A line must carry at least this many `|`-delimited fields to parse:
/// timestamp, correlation id, queue, agent, event kind.
pub const MIN_LINE_FIELDS: usize = 5;

/// Lines are padded with empty strings up to this many fields so the five
/// aux slots (`data1..data5`) are always addressable.
pub const PADDED_LINE_FIELDS: usize = 10;

/// Answered calls whose wait time is within this threshold count toward the
/// service level.
pub const SERVICE_LEVEL_THRESHOLD_SECS: u64 = 30;

/// Ceiling on correlated call results returned by one query.
pub const MAX_CALL_RESULTS: usize = 1000;

/// Ceiling on raw timeline events returned by one query.
pub const MAX_TIMELINE_EVENTS: usize = 1000;

/// Default ceiling on per-agent call history rows.
pub const DEFAULT_CALL_HISTORY_LIMIT: usize = 100;

/// Trailing window for the realtime queue snapshot.
pub const REALTIME_QUEUE_WINDOW_SECS: i64 = 5 * 60;

/// Trailing window for the realtime agent snapshot.
pub const REALTIME_AGENT_WINDOW_SECS: i64 = 30 * 60;

/// Lookback used when listing agents seen recently in the log.
pub const AGENT_LISTING_LOOKBACK_SECS: i64 = 7 * 24 * 60 * 60;

/// Sentinel the switch writes when a field has no queue or agent context.
pub const NONE_SENTINEL: &str = "NONE";

/// Placeholder rendered for call fields never filled in by any event.
pub const NOT_AVAILABLE: &str = "N/A";
