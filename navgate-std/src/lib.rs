//! # navgate-std
//!
//! Standard implementations for the navgate navigation engine.
//!
//! This crate provides:
//! - **Orchestration**: [`history::Navigator`], the state holder that runs
//!   the two-phase guard pipeline and commits routes
//! - **Queue building**: [`queue`] (chain diffing, guard extraction and binding)
//! - **Execution**: [`runner::QueueRunner`], [`resolve::LazyResolver`]
//! - **Backends**: [`backend::MemoryBackend`] and the [`url`] helpers
//! - **Standard guards**: Logging, Timeout
//! - **Testing**: [`testing`] utilities for guards, matchers and hosts

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Emits a tracing event when the `tracing` feature is enabled.
macro_rules! log_event {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::$level!($($arg)+);
        }
    };
}
pub(crate) use log_event;

// Re-export core traits
pub use navgate_core;

// Modules
pub mod backend;
pub mod history;
pub mod hooks;
#[cfg(feature = "tokio")]
pub mod host;
pub mod queue;
pub mod resolve;
pub mod runner;
pub mod testing;
pub mod url;
