//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! unit testing and for running the server without a database.

mod task;

pub use task::InMemoryTaskRepository;
