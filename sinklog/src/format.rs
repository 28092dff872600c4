// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::*;

use std::io::Write;
use std::sync::Arc;
use time::format_description::OwnedFormatItem;

/// Renders a record into a writer. Implemented by `LineFormatter` and by any
/// closure or function with the `FormatFunction` signature.
pub trait Format: Send + Sync {
    fn format(&self, w: &mut dyn Write, record: &LogRecord) -> Result<(), std::io::Error>;

    /// Render the record into an owned string.
    fn format_line(&self, record: &LogRecord) -> String {
        let mut buffer = Vec::new();
        // writes into a `Vec` only fail if a custom format returns an error,
        // in which case the partial output is still returned
        let _ = self.format(&mut buffer, record);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

pub type FormatFunction =
    fn(write: &mut dyn Write, record: &LogRecord) -> Result<(), std::io::Error>;

impl<F> Format for F
where
    F: Fn(&mut dyn Write, &LogRecord) -> Result<(), std::io::Error> + Send + Sync,
{
    fn format(&self, w: &mut dyn Write, record: &LogRecord) -> Result<(), std::io::Error> {
        self(w, record)
    }
}

/// How the timestamp portion of a line is rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TimeFormat {
    /// `2023-11-14T22:13:20.123+00:00`
    #[default]
    Rfc3339Millis,
    /// A `time` format description, already parsed.
    Custom(CustomTimeFormat),
}

#[derive(Clone, Debug)]
pub struct CustomTimeFormat {
    description: String,
    items: OwnedFormatItem,
}

impl PartialEq for CustomTimeFormat {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
    }
}

impl Eq for CustomTimeFormat {}

impl CustomTimeFormat {
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl TimeFormat {
    /// Parse a format description such as
    /// `"[year]/[month]/[day] [hour]:[minute]:[second]"`.
    pub fn custom(description: &str) -> Result<Self, Error> {
        let items = time::format_description::parse_owned::<2>(description)
            .map_err(|e| Error::TimeFormat(e.to_string()))?;
        Ok(TimeFormat::Custom(CustomTimeFormat {
            description: description.to_string(),
            items,
        }))
    }

    pub fn write(&self, w: &mut dyn Write, timestamp: Timestamp) -> Result<(), std::io::Error> {
        match self {
            TimeFormat::Rfc3339Millis => write!(w, "{timestamp}"),
            TimeFormat::Custom(custom) => {
                let rendered = timestamp.to_offset_datetime().format(&custom.items);
                write_rendered(w, timestamp, rendered)
            }
        }
    }
}

// a custom description which can't be rendered falls back to the default
fn write_rendered(
    w: &mut dyn Write,
    timestamp: Timestamp,
    rendered: Result<String, time::error::Format>,
) -> Result<(), std::io::Error> {
    match rendered {
        Ok(rendered) => w.write_all(rendered.as_bytes()),
        Err(_) => write!(w, "{timestamp}"),
    }
}

/// The default line layout:
///
/// ```text
/// 2023-11-14T22:13:20.123+00:00 WARN    [main] app::net:42 | connection reset
/// ```
///
/// Messages spanning multiple lines are continued on lines which begin with a
/// tab, so every record starts on a line that does not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineFormatter {
    time_format: TimeFormat,
}

impl LineFormatter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_time_format(time_format: TimeFormat) -> Self {
        Self { time_format }
    }

    pub fn time_format(&self) -> &TimeFormat {
        &self.time_format
    }
}

impl Format for LineFormatter {
    fn format(&self, w: &mut dyn Write, record: &LogRecord) -> Result<(), std::io::Error> {
        let location = record.location();
        self.time_format.write(w, record.timestamp())?;
        write!(
            w,
            " {:<7} [{}] {}:{} | ",
            record.severity(),
            record.thread(),
            location.module,
            location.line,
        )?;
        write_delimited(w, record.message())?;
        writeln!(w)
    }
}

/// Timestamp and message only.
pub fn compact_format(w: &mut dyn Write, record: &LogRecord) -> Result<(), std::io::Error> {
    write!(w, "{} ", record.timestamp())?;
    write_delimited(w, record.message())?;
    writeln!(w)
}

fn write_delimited(w: &mut dyn Write, message: &str) -> Result<(), std::io::Error> {
    for (i, line) in message.lines().enumerate() {
        if i > 0 {
            w.write_all(b"\n\t")?;
        }
        w.write_all(line.as_bytes())?;
    }
    Ok(())
}

pub(crate) fn default_formatter() -> Arc<dyn Format> {
    Arc::new(LineFormatter::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str) -> LogRecord {
        LogRecord::with_parts(
            Timestamp::from_nanos(1_700_000_000_123_456_789),
            Severity::Warning,
            message,
            SourceLocation::new("app::net", "src/net.rs", 42),
            "main",
            Delivery::Queued,
        )
    }

    #[test]
    fn line_layout() {
        let line = LineFormatter::new().format_line(&record("connection reset"));
        assert_eq!(
            line,
            "2023-11-14T22:13:20.123+00:00 WARN    [main] app::net:42 | connection reset\n"
        );
    }

    #[test]
    fn deterministic() {
        let formatter = LineFormatter::new();
        let record = record("same");
        assert_eq!(formatter.format_line(&record), formatter.format_line(&record));
    }

    #[test]
    fn multiline_messages_are_delimited() {
        let line = LineFormatter::new().format_line(&record("first\nsecond\r\nthird"));
        let mut lines = line.lines();
        assert!(lines.next().unwrap().ends_with("| first"));
        assert_eq!(lines.next(), Some("\tsecond"));
        assert_eq!(lines.next(), Some("\tthird"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn custom_time_format() {
        let time_format =
            TimeFormat::custom("[year]/[month]/[day] [hour]:[minute]:[second]").unwrap();
        let line = LineFormatter::with_time_format(time_format).format_line(&record("x"));
        assert!(line.starts_with("2023/11/14 22:13:20 WARN"), "{line}");
    }

    #[test]
    fn invalid_time_format() {
        assert!(matches!(
            TimeFormat::custom("[not a component"),
            Err(Error::TimeFormat(_))
        ));
    }

    #[test]
    fn custom_offset() {
        let time_format = TimeFormat::custom("[offset_hour sign:mandatory]:[offset_minute]").unwrap();
        let mut buffer = Vec::new();
        time_format.write(&mut buffer, Timestamp::EPOCH).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "+00:00");
    }

    #[test]
    fn render_failure_falls_back() {
        let mut buffer = Vec::new();
        write_rendered(
            &mut buffer,
            Timestamp::from_nanos(1_700_000_000_123_456_789),
            Err(time::error::Format::StdIo(std::io::Error::new(
                std::io::ErrorKind::Other,
                "unrenderable",
            ))),
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "2023-11-14T22:13:20.123+00:00"
        );
    }

    #[test]
    fn compact() {
        let line = compact_format.format_line(&record("ready"));
        assert_eq!(line, "2023-11-14T22:13:20.123+00:00 ready\n");
    }

    #[test]
    fn closures_are_formatters() {
        let formatter = |w: &mut dyn Write, record: &LogRecord| -> Result<(), std::io::Error> {
            writeln!(w, "{}: {}", record.severity(), record.message())
        };
        assert_eq!(formatter.format_line(&record("hi")), "WARN: hi\n");
    }
}
