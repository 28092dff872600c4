// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::*;

use mpmc::Queue;
use parking_lot::Mutex;
use std::io::{Stderr, Stdout, Write};

pub(crate) type LogBuffer = Vec<u8>;

/// Default number of records which may be waiting for a flush.
pub const DEFAULT_QUEUE_DEPTH: usize = 4096;

/// Buffers larger than this are not returned to the pool.
const MAX_RECYCLED_BUFFER: usize = 16 * 1024;

/// Formats records into pooled buffers and hands them to an output.
///
/// Queued records are pushed onto `filled` and written by `flush`. Immediate
/// records drain anything pending first, so a thread's records reach the
/// output in the order they were logged.
pub(crate) struct Buffered<W: Write> {
    filled: Queue<LogBuffer>,
    cleared: Queue<LogBuffer>,
    output: Mutex<W>,
}

impl<W: Write> Buffered<W> {
    pub fn new(output: W, queue_depth: usize) -> Self {
        let depth = queue_depth.max(1);
        Self {
            filled: Queue::with_capacity(depth),
            cleared: Queue::with_capacity(depth),
            output: Mutex::new(output),
        }
    }

    pub fn emit(&self, record: &LogRecord, format: &dyn Format) -> Result<(), Error> {
        let mut buffer = self.cleared.pop().unwrap_or_default();
        format.format(&mut buffer, record)?;

        match record.delivery() {
            Delivery::Queued => {
                if let Err(buffer) = self.filled.push(buffer) {
                    metrics! {
                        LOG_DROP.increment();
                        LOG_DROP_BYTE.add(buffer.len() as u64);
                    }
                    let _ = buffer;
                }
                Ok(())
            }
            Delivery::Immediate => {
                let mut output = self.output.lock();
                self.drain(&mut *output)?;
                let result = self.write(&mut *output, &buffer);
                self.recycle(buffer);
                result?;
                output.flush()?;
                Ok(())
            }
        }
    }

    pub fn flush(&self) -> Result<(), Error> {
        let mut output = self.output.lock();
        self.drain(&mut *output)?;
        let result = output.flush();

        metrics! {
            LOG_FLUSH.increment();
            if result.is_err() {
                LOG_FLUSH_EX.increment();
            }
        }

        Ok(result?)
    }

    /// Run a closure against the output while holding its lock. Pending
    /// records are not drained first.
    pub fn with_output<T>(&self, f: impl FnOnce(&mut W) -> T) -> T {
        f(&mut *self.output.lock())
    }

    fn drain(&self, output: &mut W) -> Result<(), Error> {
        while let Some(buffer) = self.filled.pop() {
            let result = self.write(output, &buffer);
            self.recycle(buffer);
            result?;
        }
        Ok(())
    }

    fn write(&self, output: &mut W, buffer: &[u8]) -> Result<(), Error> {
        match output.write_all(buffer) {
            Ok(()) => {
                metrics! {
                    LOG_WRITE.increment();
                    LOG_WRITE_BYTE.add(buffer.len() as u64);
                }
                Ok(())
            }
            Err(e) => {
                metrics! {
                    LOG_WRITE_EX.increment();
                }
                Err(e.into())
            }
        }
    }

    fn recycle(&self, mut buffer: LogBuffer) {
        if buffer.capacity() <= MAX_RECYCLED_BUFFER {
            buffer.clear();
            let _ = self.cleared.push(buffer);
        }
    }
}

impl<W: Write> Drop for Buffered<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Writes formatted lines to standard output, standard error, or any other
/// writer.
pub struct ConsoleSink<W: Write + Send = Stderr> {
    name: String,
    buffered: Buffered<W>,
}

impl ConsoleSink<Stderr> {
    pub fn stderr() -> Self {
        Self::with_writer("console", std::io::stderr(), DEFAULT_QUEUE_DEPTH)
    }
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::with_writer("console", std::io::stdout(), DEFAULT_QUEUE_DEPTH)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn with_writer(name: impl Into<String>, writer: W, queue_depth: usize) -> Self {
        Self {
            name: name.into(),
            buffered: Buffered::new(writer, queue_depth),
        }
    }

    /// Run a closure against the underlying writer.
    pub fn with_output<T>(&self, f: impl FnOnce(&mut W) -> T) -> T {
        self.buffered.with_output(f)
    }
}

impl<W: Write + Send> Sink for ConsoleSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn emit(&self, record: &LogRecord, format: &dyn Format) -> Result<(), Error> {
        self.buffered.emit(record, format)
    }

    fn flush(&self) -> Result<(), Error> {
        self.buffered.flush()
    }
}
