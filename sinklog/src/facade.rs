// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::global::LogBridge;
use crate::registry::{Registry, Slot};
use crate::*;

use core::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use core::time::Duration;
use once_cell::sync::OnceCell;
use std::io::Stderr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Weak};

type SinkFactory = Box<dyn FnOnce(&Config) -> Vec<(Arc<dyn Sink>, Severity)> + Send>;
type StartedCallback = Box<dyn FnOnce(&Facade) + Send>;
type ErrorHook = Arc<dyn Fn(&Error) + Send + Sync>;

/// The outcome of `Facade::initialize`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Startup {
    Started,
    AlreadyStarted,
}

/// Collects everything needed to start a `Facade`.
///
/// The plain data lives in `Config`. The builder adds the parts which can't
/// be expressed as data: the default formatter, a factory for the initial
/// sinks, a callback run once the sinks are in place, and a hook which is
/// told about sink failures.
pub struct Builder {
    config: Config,
    formatter: Option<Arc<dyn Format>>,
    sinks: Option<SinkFactory>,
    on_started: Option<StartedCallback>,
    on_sink_error: Option<ErrorHook>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::from(Config::default())
    }
}

impl From<Config> for Builder {
    fn from(config: Config) -> Self {
        Self {
            config,
            formatter: None,
            sinks: None,
            on_started: None,
            on_sink_error: None,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn minimum_severity(mut self, severity: Severity) -> Self {
        self.config.minimum_severity = severity;
        self
    }

    /// Reject later calls to `Facade::set_level`.
    pub fn level_fixed(mut self, fixed: bool) -> Self {
        self.config.level_fixed = fixed;
        self
    }

    pub fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    pub fn file(mut self, file: Option<FileConfig>) -> Self {
        self.config.file = file;
        self
    }

    pub fn announce(mut self, announce: bool) -> Self {
        self.config.announce = announce;
        self
    }

    pub fn flush_interval(mut self, interval: Option<Duration>) -> Self {
        self.config.flush_interval = interval;
        self
    }

    /// The formatter paired with sinks which don't bring their own.
    pub fn formatter(mut self, formatter: impl Format + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Replace the default console and file sinks with the sinks returned by
    /// `factory`. It is called once, during initialization.
    pub fn sinks<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&Config) -> Vec<(Arc<dyn Sink>, Severity)> + Send + 'static,
    {
        self.sinks = Some(Box::new(factory));
        self
    }

    /// Called after the sinks are installed and before the announcement line
    /// is logged.
    ///
    /// Only the initializing thread is held back until the callback returns.
    /// Once the sinks are in place, other threads may log through the facade
    /// before the callback has run.
    pub fn on_started<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&Facade) + Send + 'static,
    {
        self.on_started = Some(Box::new(callback));
        self
    }

    /// Called whenever a sink fails. The hook must not log through the same
    /// facade at a severity the failing sink accepts.
    pub fn on_sink_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_sink_error = Some(Arc::new(hook));
        self
    }

    /// Consumes the builder and returns a started `Facade`.
    pub fn start(self) -> Facade {
        let facade = Facade::new();
        facade.initialize(self);
        facade
    }
}

struct Started {
    config: Config,
    formatter: Arc<dyn Format>,
    on_sink_error: Option<ErrorHook>,
    console: Option<Arc<ConsoleSink<Stderr>>>,
    file: Option<Arc<FileSink>>,
}

struct Inner {
    started: OnceCell<Started>,
    level: AtomicU8,
    level_fixed: AtomicBool,
    bridged: AtomicBool,
    failures: AtomicU64,
    registry: Registry,
}

impl Drop for Inner {
    fn drop(&mut self) {
        for slot in self.registry.snapshot().iter() {
            let _ = catch_unwind(AssertUnwindSafe(|| slot.sink().flush()));
        }
    }
}

/// Routes log records to a set of sinks.
///
/// A record is delivered to a sink when it passes the facade's global
/// threshold (unless emitted with `Filter::Always`) and the threshold the
/// sink was registered with. Sinks are visited in registration order. A sink
/// which fails or panics is skipped and counted, and never affects the caller
/// or the remaining sinks.
///
/// Cloning a `Facade` produces another handle to the same state. Every
/// operation other than `initialize` starts the facade with the default
/// `Builder` if it hasn't been started yet.
#[derive(Clone)]
pub struct Facade {
    inner: Arc<Inner>,
}

impl Default for Facade {
    fn default() -> Self {
        Self::new()
    }
}

impl Facade {
    /// Create a facade which has not been started yet.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                started: OnceCell::new(),
                level: AtomicU8::new(Severity::profile_default() as u8),
                level_fixed: AtomicBool::new(false),
                bridged: AtomicBool::new(false),
                failures: AtomicU64::new(0),
                registry: Registry::default(),
            }),
        }
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Install sinks and apply the configuration. Only the first call, or the
    /// first implicit start, has any effect.
    pub fn initialize(&self, builder: impl Into<Builder>) -> Startup {
        self.start(builder.into()).1
    }

    fn start(&self, mut builder: Builder) -> (&Started, Startup) {
        let mut ran = false;

        let started = self.inner.started.get_or_init(|| {
            ran = true;
            self.install_sinks(&mut builder)
        });

        if !ran {
            return (started, Startup::AlreadyStarted);
        }

        if let Some(callback) = builder.on_started.take() {
            callback(self);
        }

        if builder.config.announce {
            self.log(Severity::Info, "logging initialized", crate::location!());
        }

        (started, Startup::Started)
    }

    fn install_sinks(&self, builder: &mut Builder) -> Started {
        let config = builder.config.clone();
        let formatter = builder.formatter.take().unwrap_or_else(format::default_formatter);
        let on_sink_error = builder.on_sink_error.take();

        self.inner
            .level
            .store(config.minimum_severity as u8, Ordering::Relaxed);
        self.inner
            .level_fixed
            .store(config.level_fixed, Ordering::Relaxed);

        let mut console = None;
        let mut file = None;

        let sinks: Vec<(Arc<dyn Sink>, Severity)> = match builder.sinks.take() {
            Some(factory) => factory(&config),
            None => {
                let mut sinks: Vec<(Arc<dyn Sink>, Severity)> = Vec::new();
                if config.console {
                    let sink = Arc::new(ConsoleSink::with_writer(
                        "console",
                        std::io::stderr(),
                        config.queue_depth,
                    ));
                    console = Some(sink.clone());
                    sinks.push((sink, config.console_severity));
                }
                if let Some(file_config) = &config.file {
                    match FileSink::new(file_config.clone()) {
                        Ok(sink) => {
                            let sink = Arc::new(sink);
                            file = Some(sink.clone());
                            sinks.push((sink, file_config.severity));
                        }
                        Err(e) => {
                            self.inner.failures.fetch_add(1, Ordering::Relaxed);
                            if let Some(hook) = &on_sink_error {
                                hook(&e);
                            }
                        }
                    }
                }
                sinks
            }
        };

        for (sink, threshold) in sinks {
            let formatter = sink.formatter().unwrap_or_else(|| formatter.clone());
            self.inner.registry.add(sink, threshold, formatter);
        }

        if let Some(interval) = config.flush_interval {
            if let Err(e) = spawn_flusher(Arc::downgrade(&self.inner), interval) {
                self.inner.failures.fetch_add(1, Ordering::Relaxed);
                if let Some(hook) = &on_sink_error {
                    hook(&e);
                }
            }
        }

        Started {
            config,
            formatter,
            on_sink_error,
            console,
            file,
        }
    }

    fn started(&self) -> &Started {
        match self.inner.started.get() {
            Some(started) => started,
            None => self.start(Builder::default()).0,
        }
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.get().is_some()
    }

    /// The configuration the facade was started with.
    pub fn config(&self) -> &Config {
        &self.started().config
    }

    /// The global threshold.
    pub fn level(&self) -> Severity {
        self.started();
        Severity::from_u8(self.inner.level.load(Ordering::Relaxed))
    }

    /// Change the global threshold. Takes effect for the next log call.
    pub fn set_level(&self, severity: Severity) -> Result<(), Error> {
        self.started();
        if self.inner.level_fixed.load(Ordering::Relaxed) {
            return Err(Error::LevelFixed);
        }
        self.inner.level.store(severity as u8, Ordering::Relaxed);
        if self.inner.bridged.load(Ordering::Relaxed) {
            log::set_max_level(severity.into());
        }
        Ok(())
    }

    /// True if a record at `severity` passes the global threshold.
    pub fn enabled(&self, severity: Severity) -> bool {
        severity.passes(self.level())
    }

    /// True if a record emitted this way could reach any sink. Used by the
    /// macros to skip formatting.
    pub fn would_emit(&self, emission: Emission, severity: Severity) -> bool {
        match emission.filter {
            Filter::Threshold => self.enabled(severity),
            Filter::Always => {
                self.started();
                severity != Severity::Off
            }
        }
    }

    /// Log a message, subject to the global threshold, through each sink's
    /// queue.
    pub fn log(&self, severity: Severity, message: impl Into<String>, location: SourceLocation) {
        self.log_with(Emission::NORMAL, severity, message, location)
    }

    pub fn log_with(
        &self,
        emission: Emission,
        severity: Severity,
        message: impl Into<String>,
        location: SourceLocation,
    ) {
        if !self.would_emit(emission, severity) {
            return;
        }
        let record = LogRecord::new(severity, message, location, emission.delivery);
        self.dispatch(&record);
    }

    /// Deliver an already built record. Only sink thresholds are applied.
    pub fn dispatch(&self, record: &LogRecord) {
        if record.severity() == Severity::Off {
            return;
        }

        for slot in self.inner.registry.snapshot().iter() {
            if !slot.accepts(record.severity()) {
                continue;
            }
            let Some(_live) = slot.enter() else {
                continue;
            };
            let formatter = slot.formatter();
            match catch_unwind(AssertUnwindSafe(|| slot.sink().emit(record, &*formatter))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => self.report(slot, e),
                Err(_) => self.report_panic(slot),
            }
        }
    }

    /// Write out everything the sinks have buffered.
    pub fn flush(&self) {
        self.started();
        for slot in self.inner.registry.snapshot().iter() {
            let Some(_live) = slot.enter() else {
                continue;
            };
            self.flush_slot(slot);
        }
    }

    fn flush_slot(&self, slot: &Slot) {
        match catch_unwind(AssertUnwindSafe(|| slot.sink().flush())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.report(slot, e),
            Err(_) => self.report_panic(slot),
        }
    }

    /// Number of times a sink has failed to accept a record or to flush.
    pub fn delivery_failures(&self) -> u64 {
        self.inner.failures.load(Ordering::Relaxed)
    }

    fn report(&self, slot: &Slot, error: Error) {
        let error = Error::SinkDelivery {
            sink: slot.sink().name().to_string(),
            source: Box::new(error),
        };
        self.notify(error);
    }

    fn report_panic(&self, slot: &Slot) {
        let error = Error::SinkPanicked {
            sink: slot.sink().name().to_string(),
        };
        self.notify(error);
    }

    fn notify(&self, error: Error) {
        self.inner.failures.fetch_add(1, Ordering::Relaxed);

        metrics! {
            SINK_FAILURE.increment();
        }

        if let Some(hook) = self.inner.started.get().and_then(|s| s.on_sink_error.as_ref()) {
            let _ = catch_unwind(AssertUnwindSafe(|| hook(&error)));
        }
    }

    /// Register a sink. It is paired with the facade's default formatter
    /// unless it supplies its own. Adding a sink which is already registered
    /// keeps its position and replaces its threshold and formatter.
    pub fn add_sink(&self, sink: Arc<dyn Sink>, threshold: Severity) -> SinkId {
        let formatter = sink
            .formatter()
            .unwrap_or_else(|| self.started().formatter.clone());
        self.inner.registry.add(sink, threshold, formatter)
    }

    pub fn add_sink_with_formatter(
        &self,
        sink: Arc<dyn Sink>,
        threshold: Severity,
        formatter: Arc<dyn Format>,
    ) -> SinkId {
        self.started();
        self.inner.registry.add(sink, threshold, formatter)
    }

    /// Unregister a sink. Returns false if it wasn't registered.
    ///
    /// Waits for any delivery to this sink which is in progress, so once this
    /// returns the sink receives nothing further. It must not be called from
    /// inside the sink's own `emit` or `flush`. The removed sink is flushed
    /// before this returns.
    pub fn remove_sink(&self, id: SinkId) -> bool {
        self.started();
        match self.inner.registry.remove(id) {
            Some(removed) => {
                self.flush_slot(&removed);
                true
            }
            None => false,
        }
    }

    /// Unregister every sink, returning how many were removed. Each removed
    /// sink is flushed.
    pub fn remove_all_sinks(&self) -> usize {
        self.started();
        let removed = self.inner.registry.clear();
        for slot in removed.iter() {
            self.flush_slot(slot);
        }
        removed.len()
    }

    pub fn list_sinks(&self) -> Vec<SinkInfo> {
        self.started();
        self.inner.registry.list()
    }

    pub fn sink_info(&self, id: SinkId) -> Option<SinkInfo> {
        self.started();
        self.inner.registry.get(id).map(|slot| slot.info())
    }

    /// Returns false if the sink isn't registered.
    pub fn set_sink_threshold(&self, id: SinkId, threshold: Severity) -> bool {
        self.started();
        self.inner.registry.set_threshold(id, threshold)
    }

    /// The console sink installed by default, if any.
    pub fn console_sink(&self) -> Option<Arc<ConsoleSink<Stderr>>> {
        self.started().console.clone()
    }

    /// The file sink installed by default, if any.
    pub fn file_sink(&self) -> Option<Arc<FileSink>> {
        self.started().file.clone()
    }

    /// Up to the ten most recent log files of the default file sink, newest
    /// first. Empty when there is no file sink.
    pub fn log_files(&self) -> Vec<PathBuf> {
        match self.file_sink() {
            Some(file) => file.log_files(),
            None => Vec::new(),
        }
    }

    /// A gzip compressed tar archive of every retained log file. `None` when
    /// there is no file sink or the archive could not be built.
    pub fn logs_archive(&self) -> Option<Vec<u8>> {
        let file = self.file_sink()?;
        match file.archive() {
            Ok(archive) => Some(archive),
            Err(e) => {
                self.notify(e);
                None
            }
        }
    }

    /// Log a single info line describing the application and the device.
    pub fn log_app_and_device_info(&self, app: &AppInfo) {
        let line = device::describe(app, &DeviceInfo::current());
        self.log(Severity::Info, line, crate::location!());
    }

    /// Register this facade as the `log` crate's logger, so `log::info!` and
    /// friends are routed through it.
    pub fn install(&self) -> Result<(), Error> {
        let level = self.level();
        log::set_boxed_logger(Box::new(LogBridge::new(self.clone())))?;
        self.inner.bridged.store(true, Ordering::Relaxed);
        log::set_max_level(level.into());
        Ok(())
    }
}

fn spawn_flusher(inner: Weak<Inner>, interval: Duration) -> Result<(), Error> {
    std::thread::Builder::new()
        .name("sinklog-flush".to_string())
        .spawn(move || loop {
            std::thread::sleep(interval);
            match inner.upgrade() {
                Some(inner) => Facade { inner }.flush(),
                None => break,
            }
        })?;
    Ok(())
}
