//! # Guard Queue Building
//!
//! A transition between two matched chains touches three groups of records:
//!
//! - **updated**: the shared prefix, reused by the new route
//! - **deactivated**: records of the current chain past the prefix
//! - **activated**: records of the next chain past the prefix
//!
//! Records are compared by identity, never by value. The functions below pull
//! the in-component guards of each group out of their [`HookSource`]s and bind
//! them into queue items for the [`QueueRunner`](crate::runner::QueueRunner).

use crate::runner::GuardQueue;
use navgate_core::{
    ComponentDef, ComponentInstance, DynComponentGuard, DynGuard, EnterCallback, GuardOutcome,
    GuardResult, HookSource, NavigationGuard, Route, RouteRecord,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// The three-way diff between the current and the next matched chain.
#[derive(Debug, Default, Clone)]
pub struct ChainDiff {
    /// Records shared by both chains.
    pub updated: Vec<Arc<RouteRecord>>,
    /// Records only in the next chain.
    pub activated: Vec<Arc<RouteRecord>>,
    /// Records only in the current chain.
    pub deactivated: Vec<Arc<RouteRecord>>,
}

/// Diff `current` against `next` by the longest common identity prefix.
pub fn resolve_queue(current: &[Arc<RouteRecord>], next: &[Arc<RouteRecord>]) -> ChainDiff {
    let shared = current
        .iter()
        .zip(next)
        .take_while(|(a, b)| Arc::ptr_eq(a, b))
        .count();

    ChainDiff {
        updated: next[..shared].to_vec(),
        activated: next[shared..].to_vec(),
        deactivated: current[shared..].to_vec(),
    }
}

// Visit every resolved slot of `records` in declaration order.
fn flat_map_components<T>(
    records: &[Arc<RouteRecord>],
    mut f: impl FnMut(&Arc<dyn HookSource>, &Arc<RouteRecord>, &str) -> Vec<T>,
) -> Vec<T> {
    let mut out = Vec::new();
    for record in records {
        for (slot, def) in record.components() {
            if let ComponentDef::Resolved(source) = def {
                out.extend(f(&source, record, &slot));
            }
        }
    }
    out
}

/// A component guard bound to the live instance it belongs to.
pub struct BoundGuard {
    guard: Arc<dyn DynComponentGuard>,
    instance: ComponentInstance,
}

impl BoundGuard {
    /// Bind `guard` to `instance`.
    pub fn new(guard: Arc<dyn DynComponentGuard>, instance: ComponentInstance) -> Self {
        Self { guard, instance }
    }
}

impl NavigationGuard for BoundGuard {
    async fn guard(&self, to: &Route, from: &Route) -> GuardResult {
        self.guard.guard_dyn(&self.instance, to, from).await
    }
}

fn bind(
    guards: Vec<Arc<dyn DynComponentGuard>>,
    record: &RouteRecord,
    slot: &str,
) -> Vec<Option<Arc<dyn DynGuard>>> {
    let instance = record.instance(slot);
    guards
        .into_iter()
        .map(|guard| {
            instance
                .clone()
                .map(|instance| Arc::new(BoundGuard::new(guard, instance)) as Arc<dyn DynGuard>)
        })
        .collect()
}

/// Leave guards of `deactivated`, innermost first.
///
/// A guard whose component has no live instance becomes an absent item.
pub fn extract_leave_guards(deactivated: &[Arc<RouteRecord>]) -> GuardQueue {
    let mut queue = flat_map_components(deactivated, |source, record, slot| {
        bind(source.leave_guards(), record, slot)
    });
    queue.reverse();
    queue
}

/// Update guards of `updated`, outermost first.
pub fn extract_update_guards(updated: &[Arc<RouteRecord>]) -> GuardQueue {
    flat_map_components(updated, |source, record, slot| {
        bind(source.update_guards(), record, slot)
    })
}

/// The per-route `before_enter` guards of `activated`.
pub fn extract_before_enter(activated: &[Arc<RouteRecord>]) -> GuardQueue {
    activated
        .iter()
        .filter_map(|record| record.before_enter())
        .map(Some)
        .collect()
}

/// Enter guards of `activated`, wrapped so that deferred callbacks land in `entered`.
pub fn extract_enter_guards(
    activated: &[Arc<RouteRecord>],
    entered: &Arc<EnteredCallbacks>,
) -> GuardQueue {
    flat_map_components(activated, |source, record, slot| {
        source
            .enter_guards()
            .into_iter()
            .map(|guard| {
                Some(Arc::new(EnterGuard {
                    guard,
                    record: record.clone(),
                    slot: slot.to_string(),
                    entered: entered.clone(),
                }) as Arc<dyn DynGuard>)
            })
            .collect()
    })
}

struct EnterGuard {
    guard: Arc<dyn DynGuard>,
    record: Arc<RouteRecord>,
    slot: String,
    entered: Arc<EnteredCallbacks>,
}

impl NavigationGuard for EnterGuard {
    async fn guard(&self, to: &Route, from: &Route) -> GuardResult {
        match self.guard.guard_dyn(to, from).await? {
            GuardOutcome::Enter(callback) => {
                self.entered.push(self.record.clone(), &self.slot, callback);
                Ok(GuardOutcome::Proceed)
            }
            outcome => Ok(outcome),
        }
    }
}

struct EnteredEntry {
    record: Arc<RouteRecord>,
    slot: String,
    callback: EnterCallback,
}

/// Callbacks deferred by enter guards, keyed by record and view slot.
///
/// Entries wait here until the instance of their slot is registered on the
/// record; [`deliver`](Self::deliver) runs the ones that are ready.
#[derive(Default)]
pub struct EnteredCallbacks {
    entries: Mutex<Vec<EnteredEntry>>,
}

impl EnteredCallbacks {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `callback` for the instance mounted in `slot` of `record`.
    pub fn push(&self, record: Arc<RouteRecord>, slot: &str, callback: EnterCallback) {
        self.entries.lock().push(EnteredEntry {
            record,
            slot: slot.to_string(),
            callback,
        });
    }

    /// Number of undelivered callbacks.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Move every entry of `other` into this table.
    pub fn absorb(&self, other: &EnteredCallbacks) {
        let moved = std::mem::take(&mut *other.entries.lock());
        self.entries.lock().extend(moved);
    }

    /// Run the callbacks whose instance is mounted and keep the rest.
    ///
    /// Returns how many callbacks ran. Callbacks run without the table locked.
    pub fn deliver(&self) -> usize {
        let entries = std::mem::take(&mut *self.entries.lock());
        let mut waiting = Vec::new();
        let mut delivered = 0;
        for entry in entries {
            match entry.record.instance(&entry.slot) {
                Some(instance) => {
                    (entry.callback)(&instance);
                    delivered += 1;
                }
                None => waiting.push(entry),
            }
        }
        if !waiting.is_empty() {
            let mut entries = self.entries.lock();
            waiting.append(&mut entries);
            *entries = waiting;
        }
        delivered
    }
}
