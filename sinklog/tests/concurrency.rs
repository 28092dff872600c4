use sinklog::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Counts deliveries, and fails the test if one arrives after removal.
struct Counting {
    delivered: AtomicU64,
    removed: AtomicBool,
    late: AtomicU64,
}

impl Sink for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn emit(&self, _: &LogRecord, _: &dyn Format) -> Result<(), Error> {
        if self.removed.load(Ordering::SeqCst) {
            self.late.fetch_add(1, Ordering::SeqCst);
        }
        // widen the window in which removal races with delivery
        thread::yield_now();
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn nothing_is_delivered_after_removal() {
    for _ in 0..20 {
        let facade = Builder::from(Config::quiet(Severity::Verbose)).start();
        let sink = Arc::new(Counting {
            delivered: AtomicU64::new(0),
            removed: AtomicBool::new(false),
            late: AtomicU64::new(0),
        });
        let id = facade.add_sink(sink.clone(), Severity::Verbose);

        let stop = Arc::new(AtomicBool::new(false));
        let loggers: Vec<_> = (0..4)
            .map(|_| {
                let facade = facade.clone();
                let stop = stop.clone();
                thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        facade.log(Severity::Info, "tick", location!());
                    }
                })
            })
            .collect();

        while sink.delivered.load(Ordering::SeqCst) < 10 {
            thread::yield_now();
        }

        assert!(facade.remove_sink(id));
        sink.removed.store(true, Ordering::SeqCst);
        let at_removal = sink.delivered.load(Ordering::SeqCst);

        thread::sleep(Duration::from_millis(5));
        stop.store(true, Ordering::Relaxed);
        for logger in loggers {
            logger.join().unwrap();
        }

        assert_eq!(sink.late.load(Ordering::SeqCst), 0);
        assert_eq!(sink.delivered.load(Ordering::SeqCst), at_removal);
    }
}

#[test]
fn every_record_reaches_every_sink() {
    let facade = Builder::from(Config::quiet(Severity::Verbose)).start();
    let a = Arc::new(MemorySink::new("a"));
    let b = Arc::new(MemorySink::new("b"));
    facade.add_sink(a.clone(), Severity::Verbose);
    facade.add_sink(b.clone(), Severity::Verbose);

    let threads: Vec<_> = (0..8)
        .map(|t| {
            let facade = facade.clone();
            thread::spawn(move || {
                for i in 0..250 {
                    facade.log(Severity::Debug, format!("{t}:{i}"), location!());
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    assert_eq!(a.len(), 2000);
    assert_eq!(b.len(), 2000);

    // each thread's records arrive in the order they were logged
    for t in 0..8 {
        let prefix = format!("{t}:");
        let seen: Vec<usize> = a
            .records()
            .iter()
            .filter_map(|r| r.message().strip_prefix(&prefix)?.parse().ok())
            .collect();
        assert_eq!(seen, (0..250).collect::<Vec<_>>());
    }
}

#[test]
fn sinks_change_while_logging() {
    let facade = Builder::from(Config::quiet(Severity::Verbose)).start();
    let stop = Arc::new(AtomicBool::new(false));

    let logger = {
        let facade = facade.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                facade.log(Severity::Info, "busy", location!());
            }
        })
    };

    for _ in 0..200 {
        let sink = Arc::new(MemorySink::new("churn"));
        let id = facade.add_sink(sink.clone(), Severity::Verbose);
        facade.set_sink_threshold(id, Severity::Info);
        assert!(facade.remove_sink(id));
        let len = sink.len();
        thread::yield_now();
        assert_eq!(sink.len(), len);
    }

    stop.store(true, Ordering::Relaxed);
    logger.join().unwrap();
    assert!(facade.list_sinks().is_empty());
}
