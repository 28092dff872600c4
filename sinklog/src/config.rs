// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::*;

use core::time::Duration;
use std::path::PathBuf;

/// Plain data configuration for a `Facade`.
///
/// The defaults depend on the build profile. Debug builds log everything and
/// write to the console. Release builds log warnings and errors only, and
/// skip the console. Both write to a rolling file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(default))]
pub struct Config {
    /// The global threshold.
    pub minimum_severity: Severity,
    /// Reject `Facade::set_level` calls.
    pub level_fixed: bool,
    /// Install a console sink writing to standard error.
    pub console: bool,
    /// Threshold for the default console sink.
    pub console_severity: Severity,
    /// Install a rolling file sink.
    pub file: Option<FileConfig>,
    /// Emit an info line once initialization completes.
    pub announce: bool,
    /// Interval for the background flusher. `None` leaves flushing to the
    /// host, through `Facade::flush` or immediate emission.
    pub flush_interval: Option<Duration>,
    /// Number of records buffered per console sink before new ones are
    /// dropped.
    pub queue_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minimum_severity: Severity::profile_default(),
            level_fixed: false,
            console: cfg!(debug_assertions),
            console_severity: Severity::Verbose,
            file: Some(FileConfig::default()),
            announce: true,
            flush_interval: Some(Duration::from_millis(100)),
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl Config {
    /// A configuration with no default sinks, no announcement, and no
    /// background flusher.
    pub fn quiet(minimum_severity: Severity) -> Self {
        Self {
            minimum_severity,
            console: false,
            file: None,
            announce: false,
            flush_interval: None,
            ..Default::default()
        }
    }
}

/// Configuration for a rolling `FileSink`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(default))]
pub struct FileConfig {
    pub directory: PathBuf,
    /// File names are `{prefix}-{millis}-{sequence}.log`.
    pub prefix: String,
    /// A file is rolled before a write would take it past this size.
    pub max_file_size: u64,
    /// A file is rolled once it has been open this long.
    pub roll_interval: Option<Duration>,
    /// Older files beyond this count are deleted when a new file is opened.
    pub max_files: usize,
    /// Threshold for the file sink when it is installed by default.
    pub severity: Severity,
    pub queue_depth: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        let prefix = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "sinklog".to_string());

        Self {
            directory: std::env::temp_dir().join("sinklog"),
            prefix,
            max_file_size: 1024 * 1024,
            roll_interval: Some(Duration::from_secs(24 * 60 * 60)),
            max_files: 10,
            severity: Severity::Verbose,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl FileConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }
}
