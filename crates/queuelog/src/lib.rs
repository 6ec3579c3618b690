// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Queue-log analytics engine for call-center reporting.
//!
//! This crate reconstructs call-center activity from the telephony switch's
//! append-only, pipe-delimited queue log. It parses the raw line format into
//! [`event::QueueEvent`] values, narrows them with [`filter::EventFilter`],
//! correlates them into per-call aggregates ([`call`]), and derives grouped
//! statistics ([`rollup`]) for queues, agents, hours, days, and trailing
//! realtime windows.
//!
//! [`service::QueueLogService`] is the public query façade the surrounding
//! web layer calls. Every query is a full, bounded re-scan of the log file:
//! nothing is persisted or cached between calls, so arbitrarily many queries
//! may run concurrently against the same read-only file.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod call;
pub mod constants;
pub mod errors;
pub mod event;
pub mod filter;
pub mod reader;
pub mod rollup;
pub mod service;
pub mod util;

pub use call::{correlate, CallAggregate, CallStatus};
pub use errors::{LogError, ParseError, QueryError};
pub use event::{EventKind, QueueEvent};
pub use filter::EventFilter;
pub use reader::{LogHealth, LogReader};
pub use service::{QueueLogConfig, QueueLogService};
