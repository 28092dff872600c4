use metriken::{metric, Counter, Gauge};

#[metric(name = "sink_add", description = "sinks registered with a facade")]
pub static SINK_ADD: Counter = Counter::new();

#[metric(name = "sink_remove", description = "sinks removed from a facade")]
pub static SINK_REMOVE: Counter = Counter::new();

#[metric(name = "sink_curr", description = "current number of registered sinks")]
pub static SINK_CURR: Gauge = Gauge::new();

#[metric(
    name = "sink_failure",
    description = "number of times a sink failed or panicked while handling a record"
)]
pub static SINK_FAILURE: Counter = Counter::new();

#[metric(
    name = "log_write",
    description = "number of writes to all logging destinations"
)]
pub static LOG_WRITE: Counter = Counter::new();

#[metric(
    name = "log_write_byte",
    description = "number of bytes written to all logging destinations"
)]
pub static LOG_WRITE_BYTE: Counter = Counter::new();

#[metric(
    name = "log_write_ex",
    description = "number of exceptions while writing to logging destinations"
)]
pub static LOG_WRITE_EX: Counter = Counter::new();

#[metric(
    name = "log_drop",
    description = "number of log messages dropped due to full queues"
)]
pub static LOG_DROP: Counter = Counter::new();

#[metric(
    name = "log_drop_byte",
    description = "number of bytes dropped due to full queues"
)]
pub static LOG_DROP_BYTE: Counter = Counter::new();

#[metric(
    name = "log_flush",
    description = "number of times logging destinations have been flushed"
)]
pub static LOG_FLUSH: Counter = Counter::new();

#[metric(
    name = "log_flush_ex",
    description = "number of exceptions while flushing logging destinations"
)]
pub static LOG_FLUSH_EX: Counter = Counter::new();
