//! Taskly: personal task tracking.
//!
//! This crate provides the task model, its persistence, and the HTML and JSON
//! surfaces through which an authenticated owner creates, completes, edits,
//! and deletes their own tasks.
//!
//! # Architecture
//!
//! Taskly follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`config`]: Environment-driven application settings
//! - [`task`]: Task model, slug generation, and lifecycle service
//! - [`telemetry`]: Tracing subscriber installation
//! - [`web`]: HTTP router, HTML pages, and JSON API

pub mod config;
pub mod task;
pub mod telemetry;
pub mod web;
