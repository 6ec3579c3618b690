// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Time and attribute filtering of the parsed event stream.

use ustr::Ustr;

use crate::event::{EventKind, QueueEvent};

/// A predicate narrowing an event stream to a time window and optional
/// queue / event-kind match.
///
/// Bounds are inclusive; an absent `start` means "from the beginning of
/// time", an absent `end` means "unbounded forward". Queue and kind
/// matching is exact, no wildcards.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    start: Option<i64>,
    end: Option<i64>,
    queue: Option<Ustr>,
    kinds: Option<Vec<EventKind>>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to events at or after `start` (epoch seconds).
    #[must_use]
    pub fn since(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    /// Restricts to events at or before `end` (epoch seconds).
    #[must_use]
    pub fn until(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    /// Restricts to events between `start` and `end`, both inclusive.
    #[must_use]
    pub fn between(self, start: i64, end: i64) -> Self {
        self.since(start).until(end)
    }

    /// Restricts to events whose raw queue name equals `queue`.
    #[must_use]
    pub fn for_queue(mut self, queue: &str) -> Self {
        self.queue = Some(Ustr::from(queue));
        self
    }

    /// Restricts to events whose kind is one of `kinds`.
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<EventKind>) -> Self {
        self.kinds = Some(kinds);
        self
    }

    pub fn matches(&self, event: &QueueEvent) -> bool {
        if let Some(start) = self.start {
            if event.occurred_at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if event.occurred_at > end {
                return false;
            }
        }
        if let Some(queue) = self.queue {
            if event.queue_name != queue {
                return false;
            }
        }
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }
        true
    }
}
