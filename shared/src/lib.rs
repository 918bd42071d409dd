//! Shared types for the lounge venue platform
//!
//! Data models exchanged between the lounge-server API and its clients,
//! plus small utilities (timestamps).

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
