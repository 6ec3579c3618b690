// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Streaming reader over the switch's queue log file.
//!
//! The reader is restartable: every scan re-opens the file, so there is no
//! cursor to invalidate when the log is appended to or rotated between
//! queries. Malformed lines are dropped with an error log and never abort
//! a scan.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error};

use crate::errors::LogError;
use crate::event::{parse_line, QueueEvent};
use crate::filter::EventFilter;

/// Result of the log-file precondition check, consumed by the surrounding
/// service's startup code and health endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct LogHealth {
    pub path: String,
    pub exists: bool,
    pub readable: bool,
}

impl LogHealth {
    /// Degraded means queries will succeed but only ever return empty
    /// results.
    pub fn is_degraded(&self) -> bool {
        !self.exists || !self.readable
    }
}

/// Read-only handle on the queue log path. Holds no open file and no
/// mutable state; clones and shared references are equally usable.
#[derive(Clone, Debug)]
pub struct LogReader {
    path: PathBuf,
}

impl LogReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks whether the log file exists and is readable, without parsing
    /// anything.
    pub fn health(&self) -> LogHealth {
        let exists = self.path.exists();
        let readable = exists && File::open(&self.path).is_ok();
        LogHealth {
            path: self.path.display().to_string(),
            exists,
            readable,
        }
    }

    /// Opens a fresh lazy stream over the whole file.
    ///
    /// A missing or unreadable file is a typed error here; the query façade
    /// collapses it to an empty result set while the health surface reports
    /// the degraded state.
    pub fn open(&self) -> Result<EventStream, LogError> {
        if !self.path.exists() {
            return Err(LogError::NotFound(self.path.clone()));
        }
        let file = File::open(&self.path).map_err(|source| LogError::Open {
            path: self.path.clone(),
            source,
        })?;
        Ok(EventStream {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Performs one filtered scan, materializing the events so several
    /// aggregators can consume the same window without re-reading the file.
    pub fn read_filtered(&self, filter: &EventFilter) -> Result<Vec<QueueEvent>, LogError> {
        let stream = self.open()?;
        let events: Vec<QueueEvent> = stream.filter(|e| filter.matches(e)).collect();
        debug!(
            count = events.len(),
            path = %self.path.display(),
            "scanned queue log"
        );
        Ok(events)
    }
}

/// Lazy iterator of parsed events in file order.
///
/// Short or garbled lines are logged at error level and skipped; an I/O
/// error mid-file ends the stream early rather than failing the query.
pub struct EventStream {
    lines: Lines<BufReader<File>>,
    line_no: u64,
}

impl Iterator for EventStream {
    type Item = QueueEvent;

    fn next(&mut self) -> Option<QueueEvent> {
        loop {
            self.line_no += 1;
            match self.lines.next()? {
                Ok(line) => match parse_line(&line) {
                    Ok(event) => return Some(event),
                    Err(e) => {
                        error!(line = self.line_no, error = %e, "skipping malformed queue log line");
                    }
                },
                Err(e) => {
                    error!(line = self.line_no, error = %e, "read error, ending queue log scan");
                    return None;
                }
            }
        }
    }
}
