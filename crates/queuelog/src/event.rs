// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Queue event model and wire-format parsing.
//!
//! Each line of the switch's log is:
//!
//! ```text
//! <epoch_seconds>|<correlation_id>|<queue_name>|<agent_ref>|<event_kind>|<data1>|<data2>|<data3>|<data4>|<data5>
//! ```
//!
//! The leading five fields are mandatory; the aux slots default to empty
//! strings. Field meaning beyond the fifth is event-kind-dependent (e.g.
//! CONNECT's `data1` is the wait in seconds, COMPLETE*'s `data2` the talk
//! in seconds).

use std::fmt;

use ustr::Ustr;

use crate::constants::{MIN_LINE_FIELDS, NONE_SENTINEL, PADDED_LINE_FIELDS};
use crate::errors::ParseError;

/// The event vocabulary written by the switch.
///
/// Kinds outside the closed set are carried through as [`EventKind::Other`]
/// so unknown vocabulary is counted and echoed but never aggregated into
/// call state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    EnterQueue,
    Connect,
    CompleteAgent,
    CompleteCaller,
    Abandon,
    ExitWithTimeout,
    ExitWithKey,
    Transfer,
    AddMember,
    RemoveMember,
    Pause,
    Unpause,
    /// Any kind this engine does not interpret, preserved verbatim.
    Other(Ustr),
}

impl EventKind {
    /// Maps a raw wire token to an event kind. Unrecognized tokens are
    /// preserved as [`EventKind::Other`].
    pub fn from_wire(token: &str) -> Self {
        match token {
            "ENTERQUEUE" => Self::EnterQueue,
            "CONNECT" => Self::Connect,
            "COMPLETEAGENT" => Self::CompleteAgent,
            "COMPLETECALLER" => Self::CompleteCaller,
            "ABANDON" => Self::Abandon,
            "EXITWITHTIMEOUT" => Self::ExitWithTimeout,
            "EXITWITHKEY" => Self::ExitWithKey,
            "TRANSFER" => Self::Transfer,
            "ADDMEMBER" => Self::AddMember,
            "REMOVEMEMBER" => Self::RemoveMember,
            "PAUSE" => Self::Pause,
            "UNPAUSE" => Self::Unpause,
            other => Self::Other(Ustr::from(other)),
        }
    }

    /// The wire token for this kind, bit-exact with what was parsed.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::EnterQueue => "ENTERQUEUE",
            Self::Connect => "CONNECT",
            Self::CompleteAgent => "COMPLETEAGENT",
            Self::CompleteCaller => "COMPLETECALLER",
            Self::Abandon => "ABANDON",
            Self::ExitWithTimeout => "EXITWITHTIMEOUT",
            Self::ExitWithKey => "EXITWITHKEY",
            Self::Transfer => "TRANSFER",
            Self::AddMember => "ADDMEMBER",
            Self::RemoveMember => "REMOVEMEMBER",
            Self::Pause => "PAUSE",
            Self::Unpause => "UNPAUSE",
            Self::Other(token) => token.as_str(),
        }
    }

    /// True for either completion kind (agent or caller hangup).
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::CompleteAgent | Self::CompleteCaller)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// One parsed line of the queue log. Immutable once constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct QueueEvent {
    /// Epoch seconds; the sole ordering key the format provides.
    pub occurred_at: i64,
    /// Opaque id grouping all events of one call attempt.
    pub correlation_id: String,
    /// Queue name, or the `NONE` sentinel when there is no queue context.
    pub queue_name: Ustr,
    /// Agent ref of the form `<channel>/<extension>`, or `NONE`.
    pub agent_ref: Ustr,
    pub kind: EventKind,
    /// The five aux slots `data1..data5`, padded to empty strings.
    pub aux: [String; 5],
}

impl QueueEvent {
    pub fn data1(&self) -> &str {
        &self.aux[0]
    }

    pub fn data2(&self) -> &str {
        &self.aux[1]
    }

    pub fn data3(&self) -> &str {
        &self.aux[2]
    }

    /// The queue name, unless it is empty or the `NONE` sentinel.
    pub fn queue(&self) -> Option<&str> {
        let name = self.queue_name.as_str();
        if name.is_empty() || name == NONE_SENTINEL {
            None
        } else {
            Some(name)
        }
    }

    /// The agent ref, unless it is empty or the `NONE` sentinel.
    pub fn agent(&self) -> Option<&str> {
        let agent = self.agent_ref.as_str();
        if agent.is_empty() || agent == NONE_SENTINEL {
            None
        } else {
            Some(agent)
        }
    }

    /// The agent's display key: the extension after the last `/`, or the
    /// whole ref when no `/` is present. `None` for empty/`NONE` refs.
    pub fn agent_extension(&self) -> Option<&str> {
        self.agent().map(extension_of)
    }
}

/// Extracts the extension segment from an agent ref (`SIP/201` -> `201`).
pub fn extension_of(agent_ref: &str) -> &str {
    agent_ref.rsplit('/').next().unwrap_or(agent_ref)
}

/// Parses one log line into a [`QueueEvent`].
///
/// Lines with fewer than five `|`-delimited fields or a non-integer first
/// field are rejected; fields 6-10 are padded with empty strings when
/// absent. Trailing newline/whitespace is trimmed before splitting.
pub fn parse_line(line: &str) -> Result<QueueEvent, ParseError> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    let mut fields: Vec<&str> = trimmed.split('|').collect();
    if fields.len() < MIN_LINE_FIELDS {
        return Err(ParseError::TooFewFields(fields.len()));
    }
    fields.resize(PADDED_LINE_FIELDS, "");

    let occurred_at = fields[0]
        .trim()
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidTimestamp(fields[0].to_string()))?;

    Ok(QueueEvent {
        occurred_at,
        correlation_id: fields[1].to_string(),
        queue_name: Ustr::from(fields[2]),
        agent_ref: Ustr::from(fields[3]),
        kind: EventKind::from_wire(fields[4]),
        aux: [
            fields[5].to_string(),
            fields[6].to_string(),
            fields[7].to_string(),
            fields[8].to_string(),
            fields[9].to_string(),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_full_line() {
        let event = parse_line("1700000000|1699999990.123|support|SIP/201|CONNECT|5|2|1|x|y")
            .expect("line should parse");
        assert_eq!(event.occurred_at, 1_700_000_000);
        assert_eq!(event.correlation_id, "1699999990.123");
        assert_eq!(event.queue_name.as_str(), "support");
        assert_eq!(event.agent_ref.as_str(), "SIP/201");
        assert_eq!(event.kind, EventKind::Connect);
        assert_eq!(event.aux, ["5", "2", "1", "x", "y"]);
    }

    #[test]
    fn test_parse_pads_missing_trailing_fields() {
        let event = parse_line("1000|C1|support|NONE|ENTERQUEUE").expect("line should parse");
        assert_eq!(event.aux, ["", "", "", "", ""]);

        let event = parse_line("1000|C1|support|NONE|ENTERQUEUE||5551234|2")
            .expect("line should parse");
        assert_eq!(event.data2(), "5551234");
        assert_eq!(event.data3(), "2");
        assert_eq!(event.aux[3], "");
    }

    #[test]
    fn test_parse_rejects_short_line() {
        assert_eq!(
            parse_line("1000|C1|support"),
            Err(ParseError::TooFewFields(3))
        );
        assert_eq!(parse_line(""), Err(ParseError::TooFewFields(1)));
    }

    #[test]
    fn test_parse_rejects_non_integer_epoch() {
        assert_eq!(
            parse_line("nope|C1|support|NONE|ENTERQUEUE"),
            Err(ParseError::InvalidTimestamp("nope".to_string()))
        );
    }

    #[test]
    fn test_parse_trims_line_ending_only() {
        let event = parse_line("1000|C1|support|NONE|ENTERQUEUE\n").expect("line should parse");
        assert_eq!(event.kind, EventKind::EnterQueue);
    }

    #[test]
    fn test_unknown_kind_round_trips() {
        let event =
            parse_line("1000|C1|NONE|NONE|QUEUESTART||").expect("line should parse");
        assert_eq!(event.kind, EventKind::Other(Ustr::from("QUEUESTART")));
        assert_eq!(event.kind.as_wire(), "QUEUESTART");
    }

    #[test]
    fn test_agent_extension() {
        let event = parse_line("1000|C1|support|SIP/201|CONNECT|5").expect("line should parse");
        assert_eq!(event.agent_extension(), Some("201"));

        let event = parse_line("1000|C1|support|Local/202@ctx/n|CONNECT|5")
            .expect("line should parse");
        assert_eq!(event.agent_extension(), Some("n"));

        let event = parse_line("1000|C1|support|203|CONNECT|5").expect("line should parse");
        assert_eq!(event.agent_extension(), Some("203"));

        let event = parse_line("1000|C1|support|NONE|ENTERQUEUE").expect("line should parse");
        assert_eq!(event.agent_extension(), None);
    }

    #[test]
    fn test_none_queue_is_filtered() {
        let event = parse_line("1000|C1|NONE|SIP/201|TRANSFER").expect("line should parse");
        assert_eq!(event.queue(), None);

        let event = parse_line("1000|C1||SIP/201|TRANSFER").expect("line should parse");
        assert_eq!(event.queue(), None);
    }

    proptest! {
        // Parsing total: any well-formed line with >=5 fields and an integer
        // first field parses, and every provided field survives unchanged.
        #[test]
        fn prop_well_formed_lines_round_trip(
            epoch in any::<i64>(),
            callid in "[A-Za-z0-9.\\-]{1,20}",
            queue in "[a-z]{1,10}",
            agent in "(SIP/[0-9]{3}|NONE)",
            kind in "[A-Z]{3,16}",
            data in proptest::collection::vec("[a-z0-9]{0,6}", 0..=5),
        ) {
            let mut line = format!("{epoch}|{callid}|{queue}|{agent}|{kind}");
            for d in &data {
                line.push('|');
                line.push_str(d);
            }
            let event = parse_line(&line).expect("well-formed line must parse");
            prop_assert_eq!(event.occurred_at, epoch);
            prop_assert_eq!(event.correlation_id, callid);
            prop_assert_eq!(event.queue_name.as_str(), queue.as_str());
            prop_assert_eq!(event.agent_ref.as_str(), agent.as_str());
            prop_assert_eq!(event.kind.as_wire(), kind.as_str());
            for (i, d) in data.iter().enumerate() {
                prop_assert_eq!(&event.aux[i], d);
            }
            for i in data.len()..5 {
                prop_assert_eq!(&event.aux[i], "");
            }
        }
    }
}
