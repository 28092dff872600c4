// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! This crate provides a logging facade which routes each record to any
//! number of sinks.
//!
//! The core of this crate is the `Facade` type. It holds a global threshold
//! and a registry of sinks, each registered with its own threshold and
//! formatter. A record reaches a sink only if it passes both thresholds.
//! Records emitted with an "always" variant skip the global threshold but are
//! still subject to each sink's threshold.
//!
//! A facade is started once, either explicitly through `Facade::initialize`
//! or a `Builder`, or implicitly by its first operation. The default
//! configuration depends on the build profile. Debug builds log every
//! severity to standard error and to a rolling log file. Release builds log
//! warnings and errors to the rolling log file only.
//!
//! Text sinks (`ConsoleSink`, `FileSink`) format records into pooled buffers
//! and queue them. Queued records are written when the facade is flushed,
//! either by the host or by a background flusher. Records emitted with a
//! "sync" variant are written out before the log call returns. Adapters for
//! crash reporting and analytics services (`CrashReportSink`,
//! `AnalyticsSink`) translate severities into the service's levels.
//!
//! The macros in this crate log through the process-wide facade returned by
//! `global()`, or through any facade passed as a leading `logger:` argument.
//! `Facade::install` also routes records from the `log` crate.
//!
//! ```no_run
//! use sinklog::{Builder, Severity};
//!
//! let facade = Builder::new().minimum_severity(Severity::Info).start();
//! sinklog::info!(logger: &facade, "listening on {}", 8080);
//! sinklog::sync_always_error!(logger: &facade, "shutting down");
//! ```

#[macro_use]
mod macros;

mod adapters;
mod config;
mod datetime;
mod device;
mod errors;
mod facade;
mod file;
mod format;
mod global;
mod outputs;
mod record;
mod registry;
mod severity;
mod sink;

pub use adapters::*;
pub use config::*;
pub use datetime::*;
pub use device::{AppInfo, DeviceInfo};
pub use errors::*;
pub use facade::*;
pub use file::*;
pub use format::*;
pub use global::{global, set_global, try_global};
pub use outputs::{ConsoleSink, DEFAULT_QUEUE_DEPTH};
pub use record::*;
pub use severity::*;
pub use sink::*;

#[cfg(feature = "metrics")]
mod metrics;

#[cfg(feature = "metrics")]
use metrics::*;
