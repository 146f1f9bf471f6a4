mod base;
mod connection;
mod runner;
mod semaphore;

pub use base::*;
pub use connection::*;
pub use runner::*;
pub use semaphore::*;
