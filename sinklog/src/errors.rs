// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

/// Boxed error type returned by external SDK seams.
pub type SdkError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the facade, its sinks, and its helpers.
///
/// Sink failures never surface through `Facade::log`. They are contained by
/// the facade and reported through its failure counter and error hook.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    #[error("no global facade has been installed")]
    NotInitialized,
    #[error("sink `{sink}` failed to deliver a record: {source}")]
    SinkDelivery {
        sink: String,
        #[source]
        source: Box<Error>,
    },
    #[error("sink `{sink}` panicked")]
    SinkPanicked { sink: String },
    #[error("failed to create temporary directory: {0}")]
    TempDirectory(#[source] std::io::Error),
    #[error("failed to create log archive: {0}")]
    Archive(#[source] std::io::Error),
    #[error("sdk rejected log entry: {0}")]
    Sdk(#[source] SdkError),
    #[error("log level is fixed for this facade")]
    LevelFixed,
    #[error("invalid time format description: {0}")]
    TimeFormat(String),
    #[error("unrecognized severity `{0}`")]
    ParseSeverity(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("another logger is already installed")]
    SetLogger(#[from] log::SetLoggerError),
}
