// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Grouped statistical rollups over a filtered event window.
//!
//! Each summarizer makes one pass over the same materialized window,
//! keyed by queue, agent extension, hour-of-day, calendar date, or a
//! composite of those. None of them consume the correlator's output;
//! they sample the raw events directly (CONNECT `data1` for waits,
//! COMPLETE* `data2` for talks) and ignore kinds they do not know.

pub mod agent;
pub mod disposition;
pub mod queue;
pub mod realtime;
pub mod time;

use crate::util::round2;

/// Running duration samples for one grouping key: count, sum, min, max.
///
/// Malformed samples are simply never pushed, so a group's average is
/// unaffected by garbage fields.
#[derive(Clone, Debug, Default)]
pub(crate) struct Samples {
    count: u64,
    sum: u64,
    min: Option<u64>,
    max: Option<u64>,
}

impl Samples {
    pub fn push(&mut self, value: u64) {
        self.count += 1;
        self.sum = self.sum.saturating_add(value);
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn sum(&self) -> u64 {
        self.sum
    }

    pub fn min(&self) -> u64 {
        self.min.unwrap_or(0)
    }

    pub fn max(&self) -> u64 {
        self.max.unwrap_or(0)
    }

    /// Mean rounded to 2 decimals; 0.0 for an empty group, never NaN.
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round2(self.sum as f64 / self.count as f64)
    }
}
