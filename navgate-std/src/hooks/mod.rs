//! Standard guards.

pub mod logging;
#[cfg(feature = "timeout")]
pub mod timeout;

pub use logging::LoggingGuard;
#[cfg(feature = "timeout")]
pub use timeout::{TimeoutError, TimeoutGuard};
