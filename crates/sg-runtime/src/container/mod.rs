//! # Service Container
//!
//! Holds the store, its change feed and every subsystem service, built in
//! dependency order:
//!
//! 1. Event bus and document store (with the bus as change feed)
//! 2. Notification and relationship stores
//! 3. Follow request machine and fanout engine

pub mod config;
pub mod services;

pub use config::{ConfigError, DispatcherConfig, RuntimeConfig};
pub use services::ServiceContainer;
