//! Lazy component resolution as a single guard step.

use futures::future::try_join_all;
use navgate_core::{
    ComponentDef, GuardOutcome, GuardResult, NavigationGuard, ResolveError, Route, RouteRecord,
};
use std::sync::Arc;

/// Loads every lazy slot of the activated records, concurrently.
///
/// Each loaded definition replaces its slot in place as soon as it arrives.
/// The first failure turns the step into [`GuardOutcome::Error`] carrying a
/// [`ResolveError`]; loads still in flight are dropped.
pub struct LazyResolver {
    records: Vec<Arc<RouteRecord>>,
}

impl LazyResolver {
    /// Create a resolver for `records`.
    pub fn new(records: Vec<Arc<RouteRecord>>) -> Self {
        Self { records }
    }
}

impl NavigationGuard for LazyResolver {
    async fn guard(&self, _to: &Route, _from: &Route) -> GuardResult {
        let loads = self
            .records
            .iter()
            .flat_map(|record| {
                record
                    .components()
                    .into_iter()
                    .filter_map(move |(slot, def)| match def {
                        ComponentDef::Lazy(loader) => Some((record.clone(), slot, loader)),
                        ComponentDef::Resolved(_) => None,
                    })
            })
            .map(|(record, slot, loader)| async move {
                crate::log_event!(trace, slot = %slot, record = record.path(), "loading lazy component");
                match loader.load().await {
                    Ok(source) => {
                        record.set_component(&slot, ComponentDef::Resolved(source));
                        Ok(())
                    }
                    Err(source) => Err(ResolveError { slot, source }),
                }
            });

        match try_join_all(loads).await {
            Ok(_) => Ok(GuardOutcome::Proceed),
            Err(err) => Ok(GuardOutcome::error(err)),
        }
    }
}
