//! Session Billing Engine
//!
//! Computes and finalizes a session's bill:
//!
//! 1. [`segments`] rebuilds the seat-occupancy timeline from the session
//!    start and its seat-change log, clamped to the planned end.
//! 2. [`rates`] prices each occupancy segment (flat 30/60 tier or hourly
//!    fallback).
//! 3. [`orders`] sums the ancillary order lines.
//! 4. [`calculator`] combines segments, orders, discount and tax into a
//!    [`shared::models::BillBreakdown`] — pure read path, safe to repeat.
//! 5. [`finalize`] commits the breakdown plus an invoice number exactly
//!    once, guarded by an optimistic status precondition.
//! 6. [`sweeper`] auto-closes overdue active sessions on a timer.
//!
//! All monetary arithmetic runs on `rust_decimal::Decimal`; `f64` appears
//! only at the storage/serialization boundary.

pub mod calculator;
pub mod error;
pub mod finalize;
pub mod orders;
pub mod rates;
pub mod segments;
pub mod sweeper;

#[cfg(test)]
mod tests;

pub use calculator::BillingEngine;
pub use error::BillingError;
pub use segments::{Segment, build_segments};
pub use sweeper::BillingSweeper;
