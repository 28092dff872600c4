// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Wall clock timestamps attached to log records.

use clocksource::datetime::DateTime;
use clocksource::precise::UnixInstant;
use core::fmt::Display;
use time::OffsetDateTime;

/// A reading of the system realtime clock, with nanosecond precision.
///
/// Like `UnixInstant` these are not steady. The clock may jump forward or
/// backward, so two records taken in order are not guaranteed to carry
/// increasing timestamps.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    instant: UnixInstant,
}

impl Timestamp {
    /// `1970-01-01T00:00:00.000Z`
    pub const EPOCH: Timestamp = Timestamp {
        instant: UnixInstant::EPOCH,
    };

    /// Return a `Timestamp` for the current moment.
    pub fn now() -> Self {
        Self {
            instant: UnixInstant::now(),
        }
    }

    pub fn from_nanos(ns: u64) -> Self {
        Self {
            instant: UnixInstant::EPOCH + core::time::Duration::from_nanos(ns),
        }
    }

    pub fn as_nanos(&self) -> u64 {
        self.instant.duration_since(UnixInstant::EPOCH).as_nanos()
    }

    pub fn as_millis(&self) -> u64 {
        self.as_nanos() / 1_000_000
    }

    pub fn as_unix_instant(&self) -> UnixInstant {
        self.instant
    }

    pub(crate) fn to_offset_datetime(self) -> OffsetDateTime {
        // u64 nanoseconds always fit in the representable range
        OffsetDateTime::from_unix_timestamp_nanos(self.as_nanos() as i128)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{}", DateTime::from(self.instant))
    }
}

impl From<UnixInstant> for Timestamp {
    fn from(instant: UnixInstant) -> Self {
        Self { instant }
    }
}
