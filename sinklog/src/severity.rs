// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Error;
use core::fmt::Display;
use core::str::FromStr;

/// Ordered log severity. Lower values are more severe.
///
/// A record with severity `s` passes a threshold `t` when `s <= t`. Records
/// with severity `Off` never pass.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(rename_all = "lowercase"))]
pub enum Severity {
    Off = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
    Debug = 4,
    Verbose = 5,
}

impl Severity {
    /// Every severity, most severe first.
    pub const ALL: [Severity; 6] = [
        Severity::Off,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Debug,
        Severity::Verbose,
    ];

    /// Returns true if a record at this severity passes the given threshold.
    pub const fn passes(self, threshold: Severity) -> bool {
        !matches!(self, Severity::Off) && self as u8 <= threshold as u8
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            0 => Severity::Off,
            1 => Severity::Error,
            2 => Severity::Warning,
            3 => Severity::Info,
            4 => Severity::Debug,
            _ => Severity::Verbose,
        }
    }

    /// The fixed tag used in rendered log lines.
    pub const fn tag(self) -> &'static str {
        match self {
            Severity::Off => "OFF",
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Verbose => "VERBOSE",
        }
    }

    /// The threshold used when nothing else is configured: `Verbose` for
    /// debug builds and `Warning` for release builds.
    pub const fn profile_default() -> Self {
        if cfg!(debug_assertions) {
            Severity::Verbose
        } else {
            Severity::Warning
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // use `pad` so width and alignment flags work on the tag
        f.pad(self.tag())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Severity::Off),
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            "verbose" | "trace" => Ok(Severity::Verbose),
            _ => Err(Error::ParseSeverity(s.to_string())),
        }
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warning,
            log::Level::Info => Severity::Info,
            log::Level::Debug => Severity::Debug,
            log::Level::Trace => Severity::Verbose,
        }
    }
}

impl From<log::LevelFilter> for Severity {
    fn from(filter: log::LevelFilter) -> Self {
        match filter.to_level() {
            Some(level) => level.into(),
            None => Severity::Off,
        }
    }
}

impl From<Severity> for log::LevelFilter {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Off => log::LevelFilter::Off,
            Severity::Error => log::LevelFilter::Error,
            Severity::Warning => log::LevelFilter::Warn,
            Severity::Info => log::LevelFilter::Info,
            Severity::Debug => log::LevelFilter::Debug,
            Severity::Verbose => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Severity::Off < Severity::Error);
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
        assert!(Severity::Info < Severity::Debug);
        assert!(Severity::Debug < Severity::Verbose);
    }

    #[test]
    fn passes() {
        assert!(Severity::Error.passes(Severity::Error));
        assert!(Severity::Error.passes(Severity::Verbose));
        assert!(!Severity::Info.passes(Severity::Warning));
        assert!(!Severity::Error.passes(Severity::Off));

        // `Off` is never a deliverable severity
        for threshold in Severity::ALL {
            assert!(!Severity::Off.passes(threshold));
        }
    }

    #[test]
    fn u8_roundtrip() {
        for severity in Severity::ALL {
            assert_eq!(Severity::from_u8(severity as u8), severity);
        }
    }

    #[test]
    fn parse() {
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!(" trace ".parse::<Severity>().unwrap(), Severity::Verbose);
        assert_eq!("off".parse::<Severity>().unwrap(), Severity::Off);
        assert!(matches!(
            "loud".parse::<Severity>(),
            Err(Error::ParseSeverity(_))
        ));
    }

    #[test]
    fn log_levels() {
        assert_eq!(Severity::from(log::Level::Trace), Severity::Verbose);
        assert_eq!(Severity::from(log::LevelFilter::Off), Severity::Off);
        assert_eq!(
            log::LevelFilter::from(Severity::Warning),
            log::LevelFilter::Warn
        );
    }

    #[test]
    fn padded_display() {
        assert_eq!(format!("{:<7}|", Severity::Info), "INFO   |");
    }
}
