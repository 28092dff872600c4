// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::*;

use parking_lot::Mutex;
use std::sync::Arc;

/// The broad category a sink belongs to. Reported by `Facade::list_sinks`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Console,
    File,
    CrashReport,
    Analytics,
    Custom,
}

/// A destination for log records.
///
/// The facade decides whether a record reaches a sink: the record must pass
/// both the global threshold and the threshold the sink was registered with.
/// Text sinks should render the record with the formatter they are handed.
/// Adapters for external services are free to ignore it.
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> SinkKind {
        SinkKind::Custom
    }

    fn emit(&self, record: &LogRecord, format: &dyn Format) -> Result<(), Error>;

    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }

    /// A formatter this sink insists on. When `None`, the sink is paired with
    /// the facade's default formatter at registration.
    fn formatter(&self) -> Option<Arc<dyn Format>> {
        None
    }
}

/// Identifies a registered sink. Derived from the sink's allocation, so it is
/// only meaningful while the sink is registered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SinkId(usize);

impl SinkId {
    pub fn of(sink: &Arc<dyn Sink>) -> Self {
        SinkId(Arc::as_ptr(sink) as *const () as usize)
    }
}

/// A point in time description of a registered sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkInfo {
    pub id: SinkId,
    pub name: String,
    pub kind: SinkKind,
    pub threshold: Severity,
}

/// A sink which keeps every record it receives, along with its rendered line.
#[derive(Default)]
pub struct MemorySink {
    name: String,
    entries: Mutex<Vec<(LogRecord, String)>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.entries.lock().iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(_, l)| l.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, record: &LogRecord, format: &dyn Format) -> Result<(), Error> {
        let line = format.format_line(record);
        self.entries.lock().push((record.clone(), line));
        Ok(())
    }
}
