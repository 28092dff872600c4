// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::*;

use once_cell::sync::OnceCell;

static GLOBAL: OnceCell<Facade> = OnceCell::new();

/// The process-wide facade used by the logging macros. Created on first use,
/// and started with the default `Builder` on its first operation unless
/// `set_global` installed a facade first.
pub fn global() -> &'static Facade {
    GLOBAL.get_or_init(Facade::new)
}

/// Install `facade` as the process-wide facade. Fails, handing the facade
/// back, if one is already installed.
pub fn set_global(facade: Facade) -> Result<(), Facade> {
    GLOBAL.set(facade)
}

/// The process-wide facade, without creating one.
pub fn try_global() -> Result<&'static Facade, Error> {
    GLOBAL.get().ok_or(Error::NotInitialized)
}

/// Adapts a `Facade` to the `log` crate's `Log` trait.
pub(crate) struct LogBridge {
    facade: Facade,
}

impl LogBridge {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.facade.enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.facade.log(
            record.level().into(),
            record.args().to_string(),
            SourceLocation::from_log(record),
        );
    }

    fn flush(&self) {
        self.facade.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use std::sync::Arc;

    #[test]
    fn bridge_applies_the_global_threshold() {
        let facade = Builder::from(Config::quiet(Severity::Info)).start();
        let memory = Arc::new(MemorySink::new("memory"));
        facade.add_sink(memory.clone(), Severity::Verbose);

        let bridge = LogBridge::new(facade.clone());
        bridge.log(
            &log::Record::builder()
                .level(log::Level::Debug)
                .target("app::db")
                .args(format_args!("hidden"))
                .build(),
        );
        bridge.log(
            &log::Record::builder()
                .level(log::Level::Warn)
                .target("app::db")
                .line(Some(7))
                .args(format_args!("slow query {}", 3))
                .build(),
        );

        let records = memory.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity(), Severity::Warning);
        assert_eq!(records[0].message(), "slow query 3");
        assert_eq!(records[0].location().module, "app::db");
        assert_eq!(records[0].location().line, 7);
    }
}
