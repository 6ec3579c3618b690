// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Event disposition breakdown: how a window's events distribute over the
//! wire vocabulary, with human-readable labels for known tokens.

use hashbrown::HashMap;
use serde::Serialize;
use ustr::Ustr;

use crate::event::QueueEvent;
use crate::util::percent;

/// Human-readable label for a wire event token. `None` for vocabulary
/// this engine does not know; callers echo the raw token instead.
pub fn disposition_label(token: &str) -> Option<&'static str> {
    Some(match token {
        "ENTERQUEUE" => "Call Entered Queue",
        "CONNECT" => "Call Connected",
        "COMPLETEAGENT" => "Completed By Agent",
        "COMPLETECALLER" => "Completed By Caller",
        "ABANDON" => "Call Abandoned",
        "EXITWITHTIMEOUT" => "Exited By Timeout",
        "EXITWITHKEY" => "Exited By Key Press",
        "RINGNOANSWER" => "Ring With No Answer",
        "RINGCANCELED" => "Ring Canceled",
        "TRANSFER" => "Call Transferred",
        "BLINDTRANSFER" => "Blind Transfer",
        "ATTENDEDTRANSFER" => "Attended Transfer",
        "AGENTDUMP" => "Agent Dumped Call",
        "ADDMEMBER" => "Agent Added To Queue",
        "REMOVEMEMBER" => "Agent Removed From Queue",
        "PAUSE" => "Agent Paused",
        "UNPAUSE" => "Agent Unpaused",
        "DID" => "Inbound Number",
        "SYSCOMPAT" => "System Compatibility",
        "CONFIGRELOAD" => "Configuration Reloaded",
        "QUEUESTART" => "Queue Subsystem Started",
        _ => return None,
    })
}

/// One row of the disposition breakdown.
#[derive(Clone, Debug, Serialize)]
pub struct DispositionSummary {
    pub event: String,
    pub label: String,
    pub count: u64,
    pub percentage: f64,
}

/// Counts every event in the window by wire token, most frequent first.
/// Unknown vocabulary is counted too, labeled with its raw token.
pub fn disposition_summary(events: &[QueueEvent]) -> Vec<DispositionSummary> {
    let mut counts: HashMap<Ustr, u64> = HashMap::new();
    for event in events {
        *counts.entry(Ustr::from(event.kind.as_wire())).or_default() += 1;
    }

    let total = events.len() as u64;
    let mut results: Vec<DispositionSummary> = counts
        .into_iter()
        .map(|(token, count)| DispositionSummary {
            event: token.to_string(),
            label: disposition_label(&token)
                .map_or_else(|| token.to_string(), str::to_string),
            count,
            percentage: percent(count, total),
        })
        .collect();
    results.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.event.cmp(&b.event)));
    results
}
