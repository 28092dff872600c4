// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Severity, Timestamp};
use std::borrow::Cow;

/// Where a log call was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub module: Cow<'static, str>,
    pub file: Cow<'static, str>,
    pub line: u32,
}

impl SourceLocation {
    pub const fn new(module: &'static str, file: &'static str, line: u32) -> Self {
        Self {
            module: Cow::Borrowed(module),
            file: Cow::Borrowed(file),
            line,
        }
    }

    /// Used for records that have no meaningful call site, such as the
    /// startup announcement.
    pub const fn unknown() -> Self {
        Self::new("<unnamed>", "<unknown>", 0)
    }

    pub(crate) fn from_log(record: &log::Record<'_>) -> Self {
        let module = match (record.module_path_static(), record.module_path()) {
            (Some(module), _) => Cow::Borrowed(module),
            (None, Some(module)) => Cow::Owned(module.to_string()),
            (None, None) => Cow::Owned(record.target().to_string()),
        };
        let file = match (record.file_static(), record.file()) {
            (Some(file), _) => Cow::Borrowed(file),
            (None, Some(file)) => Cow::Owned(file.to_string()),
            (None, None) => Cow::Borrowed("<unknown>"),
        };
        Self {
            module,
            file,
            line: record.line().unwrap_or(0),
        }
    }
}

/// Expands to the `SourceLocation` of the macro call site.
#[macro_export]
macro_rules! location {
    () => {
        $crate::SourceLocation::new(::std::module_path!(), ::std::file!(), ::std::line!())
    };
}

/// Whether a record is subject to the facade's global threshold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Drop the record unless it passes the global threshold.
    Threshold,
    /// Ignore the global threshold. Sink thresholds still apply.
    Always,
}

/// How buffered sinks should hand a record to their output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Push onto the sink's queue. It is written on the next flush.
    Queued,
    /// Write and flush the output before the log call returns.
    Immediate,
}

/// The pair of independently selectable emission properties.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Emission {
    pub filter: Filter,
    pub delivery: Delivery,
}

impl Emission {
    pub const NORMAL: Emission = Emission {
        filter: Filter::Threshold,
        delivery: Delivery::Queued,
    };

    pub const ALWAYS: Emission = Emission {
        filter: Filter::Always,
        delivery: Delivery::Queued,
    };

    pub const SYNC: Emission = Emission {
        filter: Filter::Threshold,
        delivery: Delivery::Immediate,
    };

    pub const SYNC_ALWAYS: Emission = Emission {
        filter: Filter::Always,
        delivery: Delivery::Immediate,
    };
}

impl Default for Emission {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// A single, already interpolated log message and its metadata.
///
/// Records are created at the call site and are never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    timestamp: Timestamp,
    severity: Severity,
    message: String,
    location: SourceLocation,
    thread: String,
    delivery: Delivery,
}

impl LogRecord {
    /// Capture a record for the current thread at the current time.
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        location: SourceLocation,
        delivery: Delivery,
    ) -> Self {
        Self::with_parts(
            Timestamp::now(),
            severity,
            message,
            location,
            thread_label(),
            delivery,
        )
    }

    /// Build a record from explicit parts. Useful for deterministic output.
    pub fn with_parts(
        timestamp: Timestamp,
        severity: Severity,
        message: impl Into<String>,
        location: SourceLocation,
        thread: impl Into<String>,
        delivery: Delivery,
    ) -> Self {
        Self {
            timestamp,
            severity,
            message: message.into(),
            location,
            thread: thread.into(),
            delivery,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The thread name, or its id if the thread is unnamed.
    pub fn thread(&self) -> &str {
        &self.thread
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }
}

fn thread_label() -> String {
    let current = std::thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id()),
    }
}
