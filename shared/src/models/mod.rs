//! Data models
//!
//! Shared between lounge-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All instants are `i64` Unix millis; session and seat IDs are TEXT,
//! scoped per branch (`branch_id` + `id`).

pub mod billing;
pub mod seat;
pub mod serde_helpers;
pub mod session;

// Re-exports
pub use billing::*;
pub use seat::*;
pub use session::*;
