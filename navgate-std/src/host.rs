//! Tokio-backed host application.

use navgate_core::{HostApp, HostTask};
use tokio::runtime::Handle;

/// Drives navigator tasks on a Tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioHost {
    handle: Handle,
}

impl TokioHost {
    /// Use the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    /// Use an explicit runtime handle.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl HostApp for TokioHost {
    fn spawn(&self, task: HostTask) {
        self.handle.spawn(task);
    }
}
