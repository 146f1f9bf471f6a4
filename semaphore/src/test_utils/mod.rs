//! Test doubles for the lock registry.
//!
//! [`ScriptedExecutor`] stands in for the database behind [`crate::registry::SqlLockRegistry`]
//! and records every statement it receives. [`FaultyRegistry`] wraps the in-memory registry
//! and fails a chosen operation on a chosen call.

mod executor;
mod faulty;

pub use executor::ScriptedExecutor;
pub use faulty::{FaultyRegistry, RegistryMethod};
