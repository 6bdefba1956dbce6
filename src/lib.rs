//! # Date/Time Daemon
//!
//! Publishes the date/time preferences of the desktop on the message bus.
//!
//! ## Features
//! - `AutoSetTime` and `TimeShowFormat` properties persisted in a settings store
//! - `CurrentTimeZone` snapshot taken from the system date-time mechanism at startup
//! - Optional HTTP health endpoints
//! - Persistent storage with SQLite

/// Bus identity, the served object and its registration handle
pub mod bus;
/// Configuration management and environment variables
pub mod config;
/// Bus properties backed by settings keys
pub mod property;
/// Collaborators: timezone mechanism and health server
pub mod services;
/// Persistent namespaced settings store
pub mod settings;
/// Logging helpers
pub mod utils;
