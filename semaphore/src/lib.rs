//! Run-coordination semaphore for concurrent pipeline runs.
//!
//! Runs coordinate through a shared lock registry table instead of in-process primitives:
//! a run queues its intent to use a set of paths, polls until no other run holds them,
//! does its work and finally releases its rows. The protocol is cooperative. Queueing and
//! checking are not one transaction, so it behaves as a best-effort semaphore rather than
//! a strict mutex.

pub mod acquisition;
pub mod checker;
pub mod error;
mod macros;
pub mod policy;
pub mod queue;
pub mod registry;
pub mod release;
pub mod semaphore;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
