//! Task lifecycle management for Taskly.
//!
//! A task belongs to exactly one owner, carries a slug derived once from its
//! title, and moves between the active and done states until it is removed.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
