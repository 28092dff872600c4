// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sinks which forward records to external crash reporting and analytics
//! services.
//!
//! Each service is reached through a small trait so the host application can
//! plug in its SDK client. Severities are translated through fixed tables.
//! When a service has fewer levels than `Severity`, neighboring severities
//! collapse into the less severe bucket, so a record is never reported as
//! more serious than it was logged.

use crate::*;

use core::sync::atomic::{AtomicU64, Ordering};

/// Levels understood by the crash reporter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CrashLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl CrashLevel {
    /// | Severity | CrashLevel |
    /// |----------|------------|
    /// | Off      | Debug      |
    /// | Error    | Error      |
    /// | Warning  | Warning    |
    /// | Info     | Info       |
    /// | Debug    | Debug      |
    /// | Verbose  | Debug      |
    pub const fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Error => CrashLevel::Error,
            Severity::Warning => CrashLevel::Warning,
            Severity::Info => CrashLevel::Info,
            Severity::Debug | Severity::Verbose | Severity::Off => CrashLevel::Debug,
        }
    }
}

impl From<Severity> for CrashLevel {
    fn from(severity: Severity) -> Self {
        Self::from_severity(severity)
    }
}

/// Levels understood by the analytics client.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnalyticsLevel {
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
    Assert,
    None,
}

impl AnalyticsLevel {
    /// | Severity | AnalyticsLevel |
    /// |----------|----------------|
    /// | Off      | None           |
    /// | Error    | Error          |
    /// | Warning  | Warning        |
    /// | Info     | Info           |
    /// | Debug    | Debug          |
    /// | Verbose  | Verbose        |
    ///
    /// `Assert` is never produced.
    pub const fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Off => AnalyticsLevel::None,
            Severity::Error => AnalyticsLevel::Error,
            Severity::Warning => AnalyticsLevel::Warning,
            Severity::Info => AnalyticsLevel::Info,
            Severity::Debug => AnalyticsLevel::Debug,
            Severity::Verbose => AnalyticsLevel::Verbose,
        }
    }
}

impl From<Severity> for AnalyticsLevel {
    fn from(severity: Severity) -> Self {
        Self::from_severity(severity)
    }
}

/// The log entry point of a crash reporting SDK.
pub trait CrashReporter: Send + Sync {
    fn record(&self, level: CrashLevel, message: &str) -> Result<(), SdkError>;
}

/// The log entry point of an analytics SDK.
pub trait AnalyticsClient: Send + Sync {
    fn track(&self, level: AnalyticsLevel, tag: &str, message: &str) -> Result<(), SdkError>;
}

/// Forwards records to a `CrashReporter`.
pub struct CrashReportSink<C> {
    name: String,
    reporter: C,
    rejected: AtomicU64,
}

impl<C: CrashReporter> CrashReportSink<C> {
    pub fn new(reporter: C) -> Self {
        Self {
            name: "crash-report".to_string(),
            reporter,
            rejected: AtomicU64::new(0),
        }
    }

    pub fn reporter(&self) -> &C {
        &self.reporter
    }

    /// Number of entries the SDK refused.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

impl<C: CrashReporter> Sink for CrashReportSink<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SinkKind {
        SinkKind::CrashReport
    }

    fn emit(&self, record: &LogRecord, _format: &dyn Format) -> Result<(), Error> {
        let level = CrashLevel::from(record.severity());
        self.reporter.record(level, record.message()).map_err(|e| {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            Error::Sdk(e)
        })
    }
}

/// Forwards records to an `AnalyticsClient`, tagged with the module path of
/// the call site.
pub struct AnalyticsSink<A> {
    name: String,
    client: A,
    rejected: AtomicU64,
}

impl<A: AnalyticsClient> AnalyticsSink<A> {
    pub fn new(client: A) -> Self {
        Self {
            name: "analytics".to_string(),
            client,
            rejected: AtomicU64::new(0),
        }
    }

    pub fn client(&self) -> &A {
        &self.client
    }

    /// Number of entries the SDK refused.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

impl<A: AnalyticsClient> Sink for AnalyticsSink<A> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Analytics
    }

    fn emit(&self, record: &LogRecord, _format: &dyn Format) -> Result<(), Error> {
        let level = AnalyticsLevel::from(record.severity());
        self.client
            .track(level, &record.location().module, record.message())
            .map_err(|e| {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                Error::Sdk(e)
            })
    }
}
