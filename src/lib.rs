//! Tracker Host Library
//!
//! Host-side adapter for the tracker application: notification permission checks
//! at startup and a bridge channel that clears persisted notification state.

pub mod bridge;
pub mod host;
pub mod logging;
pub mod reset;
pub mod storage;
pub mod types;
