//! Shared types
//!
//! Configuration structures used across the host.

pub mod config;

pub use config::HostConfig;
