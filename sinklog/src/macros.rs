// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[cfg(feature = "metrics")]
macro_rules! metrics {
    { $( $tt:tt )* } => { $( $tt )* }
}

#[cfg(not(feature = "metrics"))]
macro_rules! metrics {
    { $( $tt:tt)* } => {}
}

/// Shared body of the logging macros. The message is only formatted when the
/// record could reach a sink.
#[doc(hidden)]
#[macro_export]
macro_rules! __emit {
    (logger: $logger:expr, $emission:expr, $severity:expr, $($arg:tt)+) => {{
        let facade: &$crate::Facade = $logger;
        let emission: $crate::Emission = $emission;
        let severity: $crate::Severity = $severity;
        if facade.would_emit(emission, severity) {
            facade.log_with(
                emission,
                severity,
                ::std::format!($($arg)+),
                $crate::location!(),
            );
        }
    }};
    ($emission:expr, $severity:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $crate::global(), $emission, $severity, $($arg)+)
    };
}

/// Logs a message at error severity, subject to the global threshold.
#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::NORMAL, $crate::Severity::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::NORMAL, $crate::Severity::Error, $($arg)+)
    };
}

/// Logs a message at warning severity, subject to the global threshold.
#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::NORMAL, $crate::Severity::Warning, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::NORMAL, $crate::Severity::Warning, $($arg)+)
    };
}

/// Logs a message at info severity, subject to the global threshold.
#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::NORMAL, $crate::Severity::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::NORMAL, $crate::Severity::Info, $($arg)+)
    };
}

/// Logs a message at debug severity, subject to the global threshold.
#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::NORMAL, $crate::Severity::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::NORMAL, $crate::Severity::Debug, $($arg)+)
    };
}

/// Logs a message at verbose severity, subject to the global threshold.
#[macro_export]
macro_rules! verbose {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::NORMAL, $crate::Severity::Verbose, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::NORMAL, $crate::Severity::Verbose, $($arg)+)
    };
}

/// Logs a message at error severity regardless of the global threshold.
#[macro_export]
macro_rules! always_error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::ALWAYS, $crate::Severity::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::ALWAYS, $crate::Severity::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! always_warn {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::ALWAYS, $crate::Severity::Warning, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::ALWAYS, $crate::Severity::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! always_info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::ALWAYS, $crate::Severity::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::ALWAYS, $crate::Severity::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! always_debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::ALWAYS, $crate::Severity::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::ALWAYS, $crate::Severity::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! always_verbose {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::ALWAYS, $crate::Severity::Verbose, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::ALWAYS, $crate::Severity::Verbose, $($arg)+)
    };
}

/// Logs a message at error severity and writes it out before returning.
#[macro_export]
macro_rules! sync_error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::SYNC, $crate::Severity::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::SYNC, $crate::Severity::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! sync_warn {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::SYNC, $crate::Severity::Warning, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::SYNC, $crate::Severity::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! sync_info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::SYNC, $crate::Severity::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::SYNC, $crate::Severity::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! sync_debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::SYNC, $crate::Severity::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::SYNC, $crate::Severity::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! sync_verbose {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::SYNC, $crate::Severity::Verbose, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::SYNC, $crate::Severity::Verbose, $($arg)+)
    };
}

/// Logs a message at error severity regardless of the global threshold,
/// and writes it out before returning.
#[macro_export]
macro_rules! sync_always_error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::SYNC_ALWAYS, $crate::Severity::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::SYNC_ALWAYS, $crate::Severity::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! sync_always_warn {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::SYNC_ALWAYS, $crate::Severity::Warning, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::SYNC_ALWAYS, $crate::Severity::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! sync_always_info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::SYNC_ALWAYS, $crate::Severity::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::SYNC_ALWAYS, $crate::Severity::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! sync_always_debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::SYNC_ALWAYS, $crate::Severity::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::SYNC_ALWAYS, $crate::Severity::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! sync_always_verbose {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::__emit!(logger: $logger, $crate::Emission::SYNC_ALWAYS, $crate::Severity::Verbose, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__emit!($crate::Emission::SYNC_ALWAYS, $crate::Severity::Verbose, $($arg)+)
    };
}

/// Builds an `AppInfo` from the calling crate's Cargo metadata.
#[macro_export]
macro_rules! app_info {
    () => {
        $crate::AppInfo::new(
            ::std::env!("CARGO_PKG_NAME"),
            ::std::module_path!(),
            ::std::env!("CARGO_PKG_VERSION"),
        )
    };
}
