// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A buffered sink which writes to a set of rolling log files.

use crate::outputs::Buffered;
use crate::*;

use clocksource::precise::Instant;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The most files `log_files` will report.
pub const MAX_REPORTED_FILES: usize = 10;

/// Writes formatted lines into `{directory}/{prefix}-{millis}-{sequence}.log`,
/// starting a new file when the current one grows too large or too old.
pub struct FileSink {
    name: String,
    directory: PathBuf,
    prefix: String,
    buffered: Buffered<RollingFile>,
}

impl FileSink {
    /// Creates the log directory if needed. The first file is opened lazily
    /// on the first write.
    pub fn new(config: FileConfig) -> Result<Self, Error> {
        fs::create_dir_all(&config.directory)?;

        let rolling = RollingFile {
            directory: config.directory.clone(),
            prefix: config.prefix.clone(),
            max_size: config.max_file_size.max(1),
            roll_interval: config.roll_interval,
            max_files: config.max_files.max(1),
            active: None,
            sequence: 0,
        };

        Ok(Self {
            name: "file".to_string(),
            directory: config.directory,
            prefix: config.prefix,
            buffered: Buffered::new(rolling, config.queue_depth),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The file currently being written, if one has been opened.
    pub fn current_file(&self) -> Option<PathBuf> {
        self.buffered
            .with_output(|rolling| rolling.active.as_ref().map(|a| a.path.clone()))
    }

    /// Up to the ten most recent log files, newest first.
    pub fn log_files(&self) -> Vec<PathBuf> {
        let mut files = self.retained_files();
        files.truncate(MAX_REPORTED_FILES);
        files
    }

    /// Every log file in the directory which belongs to this sink, newest
    /// first.
    pub fn retained_files(&self) -> Vec<PathBuf> {
        list_files(&self.directory, &self.prefix)
    }

    /// A gzip compressed tar archive holding every retained log file. Pending
    /// records are flushed first, and writes are held off while the archive is
    /// built.
    pub fn archive(&self) -> Result<Vec<u8>, Error> {
        self.buffered.flush()?;
        self.buffered.with_output(|_| {
            let files = self.retained_files();
            build_archive(&files).map_err(Error::Archive)
        })
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    fn emit(&self, record: &LogRecord, format: &dyn Format) -> Result<(), Error> {
        self.buffered.emit(record, format)
    }

    fn flush(&self) -> Result<(), Error> {
        self.buffered.flush()
    }
}

struct ActiveFile {
    file: File,
    path: PathBuf,
    size: u64,
    opened: Instant,
}

pub(crate) struct RollingFile {
    directory: PathBuf,
    prefix: String,
    max_size: u64,
    roll_interval: Option<core::time::Duration>,
    max_files: usize,
    active: Option<ActiveFile>,
    sequence: u64,
}

impl RollingFile {
    fn needs_roll(&self, incoming: usize) -> bool {
        match &self.active {
            None => true,
            Some(active) => {
                let too_big = active.size > 0 && active.size + incoming as u64 > self.max_size;
                let too_old = self
                    .roll_interval
                    .map(|interval| active.opened.elapsed().as_nanos() as u128 >= interval.as_nanos())
                    .unwrap_or(false);
                too_big || too_old
            }
        }
    }

    fn roll(&mut self) -> std::io::Result<()> {
        if let Some(mut previous) = self.active.take() {
            let _ = previous.file.flush();
        }

        let path = self.directory.join(format!(
            "{}-{:013}-{:06}.log",
            self.prefix,
            Timestamp::now().as_millis(),
            self.sequence,
        ));
        self.sequence += 1;

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);

        self.active = Some(ActiveFile {
            file,
            path,
            size,
            opened: Instant::now(),
        });

        self.prune();
        Ok(())
    }

    fn prune(&self) {
        let active = self.active.as_ref().map(|active| active.path.as_path());
        let files = list_files(&self.directory, &self.prefix);
        for stale in files
            .iter()
            .filter(|path| Some(path.as_path()) != active)
            .skip(self.max_files.saturating_sub(1))
        {
            let _ = fs::remove_file(stale);
        }
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.needs_roll(buf.len()) {
            self.roll()?;
        }

        match self.active.as_mut() {
            Some(active) => {
                // a record is never split across files
                active.file.write_all(buf)?;
                active.size += buf.len() as u64;
                Ok(buf.len())
            }
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no active log file",
            )),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.active.as_mut() {
            Some(active) => active.file.flush(),
            None => Ok(()),
        }
    }
}

fn list_files(directory: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match fs::read_dir(directory) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .map(|name| is_log_file(name, prefix))
                        .unwrap_or(false)
            })
            .collect(),
        Err(_) => Vec::new(),
    };

    // names embed a zero padded timestamp and sequence, so they sort by age
    files.sort_unstable_by(|a, b| b.file_name().cmp(&a.file_name()));
    files
}

/// Matches exactly `{prefix}-{13 digits}-{6 digits}.log`, so files written
/// under a longer prefix which happens to start with this one are left alone.
fn is_log_file(name: &str, prefix: &str) -> bool {
    let rest = match name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|rest| rest.strip_suffix(".log"))
    {
        Some(rest) => rest,
        None => return false,
    };

    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());

    match rest.split_once('-') {
        Some((millis, sequence)) => digits(millis, 13) && digits(sequence, 6),
        None => false,
    }
}

fn build_archive(files: &[PathBuf]) -> std::io::Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.mode(tar::HeaderMode::Deterministic);

    for path in files {
        let name = match path.file_name() {
            Some(name) => name,
            None => continue,
        };
        builder.append_path_with_name(path, name)?;
    }

    builder.into_inner()?.finish()
}

/// Create a fresh, uniquely named directory under the system temporary
/// directory. Returns `None` if it could not be created.
pub fn temp_directory() -> Option<PathBuf> {
    create_temp_directory(&std::env::temp_dir()).ok()
}

fn create_temp_directory(parent: &Path) -> Result<PathBuf, Error> {
    let path = parent.join(format!("sinklog-{}", uuid::Uuid::new_v4().simple()));
    fs::create_dir(&path).map_err(Error::TempDirectory)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str) -> LogRecord {
        LogRecord::with_parts(
            Timestamp::EPOCH,
            Severity::Info,
            message,
            SourceLocation::new("test", "test.rs", 1),
            "main",
            Delivery::Immediate,
        )
    }

    #[test]
    fn lazily_opens_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(FileConfig::new(dir.path())).unwrap();
        assert!(sink.current_file().is_none());
        assert!(sink.log_files().is_empty());

        sink.emit(&record("hello"), &compact_format).unwrap();
        let current = sink.current_file().unwrap();
        assert_eq!(sink.log_files(), vec![current.clone()]);

        let contents = fs::read_to_string(current).unwrap();
        assert_eq!(contents, "1970-01-01T00:00:00.000+00:00 hello\n");
    }

    #[test]
    fn rolls_and_prunes() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig {
            prefix: "app".to_string(),
            max_file_size: 40,
            max_files: 3,
            ..FileConfig::new(dir.path())
        };
        let sink = FileSink::new(config).unwrap();

        // each line is longer than half the limit, so every write rolls
        for i in 0..6 {
            sink.emit(&record(&format!("message {i}")), &compact_format)
                .unwrap();
        }

        let files = sink.retained_files();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0], sink.current_file().unwrap());
        let newest = fs::read_to_string(&files[0]).unwrap();
        assert!(newest.ends_with("message 5\n"));
    }

    #[test]
    fn ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("other-0000000000001-000000.log"), "x").unwrap();
        fs::write(dir.path().join("app-notes.txt"), "x").unwrap();

        let config = FileConfig {
            prefix: "app".to_string(),
            ..FileConfig::new(dir.path())
        };
        let sink = FileSink::new(config).unwrap();
        sink.emit(&record("mine"), &compact_format).unwrap();

        assert_eq!(sink.retained_files().len(), 1);
    }

    #[test]
    fn longer_prefixes_are_not_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let foreign = dir.path().join("app-admin-0000000000001-000000.log");
        fs::write(&foreign, "x").unwrap();

        let config = FileConfig {
            prefix: "app".to_string(),
            max_files: 1,
            ..FileConfig::new(dir.path())
        };
        let sink = FileSink::new(config).unwrap();
        sink.emit(&record("mine"), &compact_format).unwrap();

        let current = sink.current_file().unwrap();
        assert!(current.is_file());
        assert!(foreign.is_file());
        assert_eq!(sink.log_files(), vec![current]);
    }

    #[test]
    fn log_file_names() {
        assert!(is_log_file("app-1700000000123-000042.log", "app"));
        assert!(!is_log_file("app-admin-1700000000123-000042.log", "app"));
        assert!(!is_log_file("app-1700000000123-000042.txt", "app"));
        assert!(!is_log_file("app-170000000012-000042.log", "app"));
        assert!(!is_log_file("app-1700000000123-00004x.log", "app"));
        assert!(!is_log_file("app-1700000000123.log", "app"));
        assert!(is_log_file("app-admin-1700000000123-000042.log", "app-admin"));
    }

    #[test]
    fn temp_directories_are_unique() {
        let a = temp_directory().unwrap();
        let b = temp_directory().unwrap();
        assert_ne!(a, b);
        assert!(a.is_dir() && b.is_dir());
        fs::remove_dir(a).unwrap();
        fs::remove_dir(b).unwrap();
    }

    #[test]
    fn temp_directory_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            create_temp_directory(&missing),
            Err(Error::TempDirectory(_))
        ));
    }

    #[test]
    fn archive_contains_every_retained_file() {
        use std::io::Read;

        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig {
            prefix: "app".to_string(),
            max_file_size: 40,
            ..FileConfig::new(dir.path())
        };
        let sink = FileSink::new(config).unwrap();
        for i in 0..3 {
            sink.emit(&record(&format!("message {i}")), &compact_format)
                .unwrap();
        }

        let archive = sink.archive().unwrap();
        let mut entries = tar::Archive::new(flate2::read::GzDecoder::new(&archive[..]));
        let mut names = Vec::new();
        for entry in entries.entries().unwrap() {
            let mut entry = entry.unwrap();
            let mut contents = String::new();
            entry.read_to_string(&mut contents).unwrap();
            assert!(contents.contains("message"));
            names.push(entry.path().unwrap().display().to_string());
        }
        names.sort();

        let mut expected: Vec<String> = sink
            .retained_files()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        expected.sort();
        assert_eq!(names, expected);
        assert_eq!(names.len(), 3);
    }
}
