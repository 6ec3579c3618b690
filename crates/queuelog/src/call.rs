// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Call correlation: folds the discrete events sharing a correlation id
//! into one per-call aggregate.
//!
//! Events are applied in ascending `occurred_at` order; ties keep file
//! order, which is the only finer-grained ordering the format offers. The
//! status transition is a pure function of (status, event kind) so every
//! transition is unit-testable without I/O.

use derive_more::Display;
use serde::Serialize;

use crate::constants::MAX_CALL_RESULTS;
use crate::event::{extension_of, EventKind, QueueEvent};
use crate::util::parse_seconds;

/// Lifecycle of one correlated call.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Serialize)]
pub enum CallStatus {
    #[display("UNKNOWN")]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[display("ENTERED")]
    #[serde(rename = "ENTERED")]
    Entered,
    #[display("ANSWERED")]
    #[serde(rename = "ANSWERED")]
    Answered,
    #[display("COMPLETED")]
    #[serde(rename = "COMPLETED")]
    Completed,
    #[display("ABANDONED")]
    #[serde(rename = "ABANDONED")]
    Abandoned,
    #[display("TIMEOUT")]
    #[serde(rename = "TIMEOUT")]
    Timeout,
    #[display("EXITED_WITH_KEY")]
    #[serde(rename = "EXITED_WITH_KEY")]
    ExitedWithKey,
}

impl CallStatus {
    /// The pure status transition. ENTERQUEUE only promotes an UNKNOWN
    /// call; terminal-ish kinds overwrite whatever came before, matching
    /// how the switch emits them. Kinds outside the table leave the status
    /// untouched.
    pub fn apply(self, kind: &EventKind) -> CallStatus {
        match kind {
            EventKind::EnterQueue if self == CallStatus::Unknown => CallStatus::Entered,
            EventKind::Connect => CallStatus::Answered,
            EventKind::CompleteAgent | EventKind::CompleteCaller => CallStatus::Completed,
            EventKind::Abandon => CallStatus::Abandoned,
            EventKind::ExitWithTimeout => CallStatus::Timeout,
            EventKind::ExitWithKey => CallStatus::ExitedWithKey,
            _ => self,
        }
    }
}

/// Per-call summary reconstructed by folding all events with one
/// correlation id inside the query window. Built fresh per query, never
/// persisted.
#[derive(Clone, Debug, Serialize)]
pub struct CallAggregate {
    #[serde(rename = "callid")]
    pub correlation_id: String,
    pub status: CallStatus,
    #[serde(rename = "queuename")]
    pub queue_name: String,
    /// Extension only, e.g. `201`; `N/A` until a CONNECT names an agent.
    pub agent: String,
    pub agent_full: String,
    pub phone_number: String,
    pub position_in_queue: String,
    /// Epoch of the earliest event seen for this id; presentation key.
    #[serde(skip)]
    pub first_seen: i64,
    #[serde(skip)]
    pub enter_time: Option<i64>,
    #[serde(skip)]
    pub connect_time: Option<i64>,
    #[serde(skip)]
    pub complete_time: Option<i64>,
    pub wait_seconds: u64,
    pub talk_seconds: u64,
    pub total_seconds: u64,
}

impl CallAggregate {
    fn new(event: &QueueEvent) -> Self {
        use crate::constants::NOT_AVAILABLE;
        Self {
            correlation_id: event.correlation_id.clone(),
            status: CallStatus::Unknown,
            queue_name: event.queue_name.to_string(),
            agent: NOT_AVAILABLE.to_string(),
            agent_full: NOT_AVAILABLE.to_string(),
            phone_number: NOT_AVAILABLE.to_string(),
            position_in_queue: NOT_AVAILABLE.to_string(),
            first_seen: event.occurred_at,
            enter_time: None,
            connect_time: None,
            complete_time: None,
            wait_seconds: 0,
            talk_seconds: 0,
            total_seconds: 0,
        }
    }

    /// Folds one event into the aggregate. Duration aux fields are only
    /// accepted when they are non-negative integer literals; garbage never
    /// overwrites a prior value.
    fn absorb(&mut self, event: &QueueEvent) {
        self.status = self.status.apply(&event.kind);

        match event.kind {
            EventKind::EnterQueue => {
                self.enter_time = Some(event.occurred_at);
                if !event.data2().is_empty() {
                    self.phone_number = event.data2().to_string();
                }
                if !event.data3().is_empty() {
                    self.position_in_queue = event.data3().to_string();
                }
            }
            EventKind::Connect => {
                self.connect_time = Some(event.occurred_at);
                if let Some(agent) = event.agent() {
                    self.agent = extension_of(agent).to_string();
                    self.agent_full = agent.to_string();
                }
                if let Some(wait) = parse_seconds(event.data1()) {
                    self.wait_seconds = wait;
                }
            }
            EventKind::CompleteAgent | EventKind::CompleteCaller => {
                self.complete_time = Some(event.occurred_at);
                if let Some(wait) = parse_seconds(event.data1()) {
                    self.wait_seconds = wait;
                }
                if let Some(talk) = parse_seconds(event.data2()) {
                    self.talk_seconds = talk;
                }
            }
            EventKind::Abandon => {
                if let Some(position) = parse_seconds(event.data1()) {
                    self.position_in_queue = position.to_string();
                }
                if let Some(wait) = parse_seconds(event.data2()) {
                    self.wait_seconds = wait;
                }
            }
            EventKind::ExitWithTimeout => {
                if let Some(wait) = parse_seconds(event.data2()) {
                    self.wait_seconds = wait;
                }
            }
            _ => {}
        }
    }

    /// Presentation ordering key: queue-entry time, or the earliest event
    /// when the window never saw the ENTERQUEUE.
    pub fn sort_time(&self) -> i64 {
        self.enter_time.unwrap_or(self.first_seen)
    }
}

/// Correlates a filtered window into per-call aggregates.
///
/// Emits exactly one aggregate per distinct correlation id, most recent
/// first, capped at [`MAX_CALL_RESULTS`]. `total_seconds` is recomputed as
/// `wait + talk` after the fold.
pub fn correlate(events: &[QueueEvent]) -> Vec<CallAggregate> {
    // Stable sort: ties at the same timestamp keep file order, the
    // format's secondary ordering key.
    let mut ordered: Vec<&QueueEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.occurred_at);

    let mut calls: hashbrown::HashMap<&str, CallAggregate> = hashbrown::HashMap::new();
    for event in ordered {
        calls
            .entry(event.correlation_id.as_str())
            .or_insert_with(|| CallAggregate::new(event))
            .absorb(event);
    }

    let mut results: Vec<CallAggregate> = calls
        .into_values()
        .map(|mut call| {
            // Aux fields near u64::MAX are valid literals; saturate rather
            // than overflow the sum.
            call.total_seconds = call.wait_seconds.saturating_add(call.talk_seconds);
            call
        })
        .collect();
    results.sort_by_key(|c| std::cmp::Reverse((c.sort_time(), c.correlation_id.clone())));
    results.truncate(MAX_CALL_RESULTS);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::parse_line;
    use proptest::prelude::*;

    fn events(lines: &[&str]) -> Vec<QueueEvent> {
        lines
            .iter()
            .map(|l| parse_line(l).expect("test line must parse"))
            .collect()
    }

    #[test]
    fn test_every_status_transition() {
        use CallStatus::*;
        let enter = EventKind::EnterQueue;
        let connect = EventKind::Connect;
        let abandon = EventKind::Abandon;

        assert_eq!(Unknown.apply(&enter), Entered);
        // ENTERQUEUE does not demote an already-progressed call.
        assert_eq!(Answered.apply(&enter), Answered);
        assert_eq!(Completed.apply(&enter), Completed);

        assert_eq!(Unknown.apply(&connect), Answered);
        assert_eq!(Entered.apply(&connect), Answered);

        assert_eq!(Answered.apply(&EventKind::CompleteAgent), Completed);
        assert_eq!(Answered.apply(&EventKind::CompleteCaller), Completed);

        assert_eq!(Entered.apply(&abandon), Abandoned);
        assert_eq!(Entered.apply(&EventKind::ExitWithTimeout), Timeout);
        assert_eq!(Entered.apply(&EventKind::ExitWithKey), ExitedWithKey);

        // Kinds outside the table never move the status.
        assert_eq!(Answered.apply(&EventKind::Transfer), Answered);
        assert_eq!(
            Entered.apply(&EventKind::Other(ustr::Ustr::from("QUEUESTART"))),
            Entered
        );
    }

    #[test]
    fn test_full_call_lifecycle() {
        let evs = events(&[
            "1000|C1|support|NONE|ENTERQUEUE||5550001|3",
            "1005|C1|support|SIP/201|CONNECT|5",
            "1030|C1|support|SIP/201|COMPLETEAGENT|5|25",
        ]);
        let calls = correlate(&evs);
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.status, CallStatus::Completed);
        assert_eq!(call.queue_name, "support");
        assert_eq!(call.agent, "201");
        assert_eq!(call.agent_full, "SIP/201");
        assert_eq!(call.phone_number, "5550001");
        assert_eq!(call.position_in_queue, "3");
        assert_eq!(call.enter_time, Some(1000));
        assert_eq!(call.connect_time, Some(1005));
        assert_eq!(call.complete_time, Some(1030));
        assert_eq!(call.wait_seconds, 5);
        assert_eq!(call.talk_seconds, 25);
        assert_eq!(call.total_seconds, 30);
    }

    #[test]
    fn test_abandoned_call_has_zero_talk() {
        let evs = events(&[
            "1000|C1|support|NONE|ENTERQUEUE||5550001|1",
            "1020|C1|support|NONE|ABANDON|1|20",
        ]);
        let calls = correlate(&evs);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].status, CallStatus::Abandoned);
        assert_eq!(calls[0].talk_seconds, 0);
        assert_eq!(calls[0].wait_seconds, 20);
        assert_eq!(calls[0].position_in_queue, "1");
        assert_eq!(calls[0].agent, "N/A");
    }

    #[test]
    fn test_garbage_duration_never_overwrites() {
        let evs = events(&[
            "1000|C1|support|NONE|ENTERQUEUE",
            "1005|C1|support|SIP/201|CONNECT|5",
            "1030|C1|support|SIP/201|COMPLETEAGENT|abc|xyz",
        ]);
        let calls = correlate(&evs);
        assert_eq!(calls[0].wait_seconds, 5);
        assert_eq!(calls[0].talk_seconds, 0);
        assert_eq!(calls[0].total_seconds, 5);
        assert_eq!(calls[0].status, CallStatus::Completed);
    }

    #[test]
    fn test_unordered_events_fold_in_timestamp_order() {
        // Same call, events out of file order: the CONNECT must still win
        // over ENTERQUEUE and the COMPLETE over both.
        let evs = events(&[
            "1030|C1|support|SIP/201|COMPLETEAGENT|5|25",
            "1000|C1|support|NONE|ENTERQUEUE||5550001|1",
            "1005|C1|support|SIP/201|CONNECT|5",
        ]);
        let calls = correlate(&evs);
        assert_eq!(calls[0].status, CallStatus::Completed);
        assert_eq!(calls[0].enter_time, Some(1000));
        assert_eq!(calls[0].complete_time, Some(1030));
    }

    #[test]
    fn test_timeout_and_exit_with_key() {
        let evs = events(&[
            "1000|C1|support|NONE|ENTERQUEUE",
            "1090|C1|support|NONE|EXITWITHTIMEOUT||90",
            "2000|C2|support|NONE|ENTERQUEUE",
            "2010|C2|support|NONE|EXITWITHKEY",
        ]);
        let calls = correlate(&evs);
        assert_eq!(calls.len(), 2);
        // Most recent first.
        assert_eq!(calls[0].correlation_id, "C2");
        assert_eq!(calls[0].status, CallStatus::ExitedWithKey);
        assert_eq!(calls[1].status, CallStatus::Timeout);
        assert_eq!(calls[1].wait_seconds, 90);
    }

    #[test]
    fn test_max_value_durations_saturate_not_overflow() {
        // u64::MAX is a valid non-negative integer literal, so it passes
        // field validation; the total must saturate instead of wrapping.
        let max = u64::MAX.to_string();
        let evs = events(&[
            "1000|C1|support|NONE|ENTERQUEUE",
            &format!("1030|C1|support|SIP/201|COMPLETEAGENT|{max}|{max}"),
        ]);
        let calls = correlate(&evs);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].wait_seconds, u64::MAX);
        assert_eq!(calls[0].talk_seconds, u64::MAX);
        assert_eq!(calls[0].total_seconds, u64::MAX);
    }

    #[test]
    fn test_result_cap() {
        let mut lines = Vec::new();
        for i in 0..1100 {
            lines.push(format!("{}|C{}|support|NONE|ENTERQUEUE", 1000 + i, i));
        }
        let evs: Vec<QueueEvent> = lines
            .iter()
            .map(|l| parse_line(l).expect("test line must parse"))
            .collect();
        let calls = correlate(&evs);
        assert_eq!(calls.len(), MAX_CALL_RESULTS);
        // Cap keeps the most recent calls.
        assert_eq!(calls[0].correlation_id, "C1099");
    }

    proptest! {
        // Correlation completeness: one aggregate per distinct id and the
        // total is always the sum of its parts.
        #[test]
        fn prop_one_aggregate_per_id_and_total_consistent(
            specs in proptest::collection::vec(
                (0..50i64, 0..8usize, 0..7usize, "[0-9a-z]{0,3}"),
                0..120,
            ),
        ) {
            let kinds = [
                "ENTERQUEUE", "CONNECT", "COMPLETEAGENT", "COMPLETECALLER",
                "ABANDON", "EXITWITHTIMEOUT", "EXITWITHKEY", "TRANSFER",
            ];
            let evs: Vec<QueueEvent> = specs
                .iter()
                .map(|(ts, id, kind, data)| {
                    parse_line(&format!(
                        "{ts}|C{id}|support|SIP/201|{}|{data}|{data}",
                        kinds[*kind]
                    ))
                    .expect("generated line must parse")
                })
                .collect();
            let mut ids: Vec<&str> =
                evs.iter().map(|e| e.correlation_id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();

            let calls = correlate(&evs);
            prop_assert_eq!(calls.len(), ids.len());
            for call in &calls {
                prop_assert_eq!(
                    call.total_seconds,
                    call.wait_seconds.saturating_add(call.talk_seconds)
                );
            }
        }
    }
}
