// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for the queue-log engine.
//!
//! Internal stages return these typed errors; only the query façade
//! collapses them into the empty-result contract the presentation layer
//! expects.

use std::path::PathBuf;

/// Errors raised while parsing a single log line.
///
/// A parse error never aborts a scan: the offending line is logged and
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line has {0} fields, at least 5 required")]
    TooFewFields(usize),

    #[error("timestamp field {0:?} is not an integer epoch")]
    InvalidTimestamp(String),
}

/// Errors raised while opening the queue log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("queue log not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to open queue log at {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while resolving one façade query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid calendar date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error(transparent)]
    Log(#[from] LogError),
}
