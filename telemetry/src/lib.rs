//! Logging setup shared by the semaphore binaries and tests.

pub mod tracing;
