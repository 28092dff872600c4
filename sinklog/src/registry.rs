// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Copy-on-write registry of sinks.
//!
//! Readers clone the current snapshot under a short read lock and iterate it
//! without holding any registry lock, so a log call always observes either the
//! state before a mutation or the state after it.

use crate::*;

use ahash::RandomState;
use core::sync::atomic::{AtomicU8, Ordering};
use parking_lot::{RwLock, RwLockReadGuard};
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

thread_local! {
    // number of deliveries in progress on this thread
    static DEPTH: Cell<usize> = Cell::new(0);
}

/// Keeps a slot registered until dropped.
pub(crate) struct Entered<'a> {
    _live: RwLockReadGuard<'a, bool>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

pub(crate) struct Slot {
    id: SinkId,
    sink: Arc<dyn Sink>,
    threshold: AtomicU8,
    formatter: RwLock<Arc<dyn Format>>,
    // cleared on removal, held for reading while the sink runs
    live: RwLock<bool>,
}

impl Slot {
    fn new(sink: Arc<dyn Sink>, threshold: Severity, formatter: Arc<dyn Format>) -> Self {
        Self {
            id: SinkId::of(&sink),
            sink,
            threshold: AtomicU8::new(threshold as u8),
            formatter: RwLock::new(formatter),
            live: RwLock::new(true),
        }
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    pub fn threshold(&self) -> Severity {
        Severity::from_u8(self.threshold.load(Ordering::Relaxed))
    }

    pub fn accepts(&self, severity: Severity) -> bool {
        severity.passes(self.threshold())
    }

    pub fn formatter(&self) -> Arc<dyn Format> {
        self.formatter.read().clone()
    }

    /// Returns a guard if the slot is still registered. Removal waits for all
    /// outstanding guards to be dropped.
    pub fn enter(&self) -> Option<Entered<'_>> {
        // a nested delivery must not queue behind a pending removal while
        // this thread already holds a guard
        let live = if DEPTH.with(|depth| depth.get()) > 0 {
            self.live.read_recursive()
        } else {
            self.live.read()
        };

        if !*live {
            return None;
        }

        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Some(Entered { _live: live })
    }

    fn retire(&self) {
        *self.live.write() = false;
    }

    pub fn info(&self) -> SinkInfo {
        SinkInfo {
            id: self.id,
            name: self.sink.name().to_string(),
            kind: self.sink.kind(),
            threshold: self.threshold(),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct Snapshot {
    slots: Vec<Arc<Slot>>,
    index: HashMap<SinkId, usize, RandomState>,
}

impl Snapshot {
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Slot>> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    fn get(&self, id: SinkId) -> Option<&Arc<Slot>> {
        self.index.get(&id).map(|i| &self.slots[*i])
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, slot) in self.slots.iter().enumerate() {
            self.index.insert(slot.id, i);
        }
    }
}

#[derive(Default)]
pub(crate) struct Registry {
    current: RwLock<Arc<Snapshot>>,
}

impl Registry {
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Register a sink. A sink which is already registered keeps its position
    /// and has its threshold and formatter replaced.
    pub fn add(&self, sink: Arc<dyn Sink>, threshold: Severity, formatter: Arc<dyn Format>) -> SinkId {
        let id = SinkId::of(&sink);
        let mut current = self.current.write();

        if let Some(slot) = current.get(id) {
            slot.threshold.store(threshold as u8, Ordering::Relaxed);
            *slot.formatter.write() = formatter;
            return id;
        }

        let mut next = Snapshot::clone(&current);
        next.index.insert(id, next.slots.len());
        next.slots.push(Arc::new(Slot::new(sink, threshold, formatter)));
        *current = Arc::new(next);

        metrics! {
            SINK_ADD.increment();
            SINK_CURR.increment();
        }

        id
    }

    /// Returns false if the sink was not registered. Once this returns, the
    /// removed sink will not be handed any further records.
    /// Unregister a sink. Returns its slot once every in-flight delivery to
    /// it has finished, so the caller can flush it.
    pub fn remove(&self, id: SinkId) -> Option<Arc<Slot>> {
        let removed = {
            let mut current = self.current.write();
            let position = match current.index.get(&id) {
                Some(position) => *position,
                None => return None,
            };
            let mut next = Snapshot::clone(&current);
            let removed = next.slots.remove(position);
            next.reindex();
            *current = Arc::new(next);
            removed
        };

        removed.retire();

        metrics! {
            SINK_REMOVE.increment();
            SINK_CURR.decrement();
        }

        Some(removed)
    }

    pub fn clear(&self) -> Vec<Arc<Slot>> {
        let previous = std::mem::take(&mut *self.current.write());
        for slot in previous.iter() {
            slot.retire();
        }

        metrics! {
            SINK_REMOVE.add(previous.len() as u64);
            SINK_CURR.sub(previous.len() as i64);
        }

        previous.slots.clone()
    }

    pub fn set_threshold(&self, id: SinkId, threshold: Severity) -> bool {
        match self.current.read().get(id) {
            Some(slot) => {
                slot.threshold.store(threshold as u8, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: SinkId) -> Option<Arc<Slot>> {
        self.current.read().get(id).cloned()
    }

    pub fn list(&self) -> Vec<SinkInfo> {
        self.snapshot().iter().map(|slot| slot.info()).collect()
    }
}
