//! Location backends.
//!
//! Browser-style backends live with the host integration; this crate ships
//! [`MemoryBackend`], an in-process history stack for servers, tests and
//! non-browser hosts.

mod memory;

pub use memory::MemoryBackend;
