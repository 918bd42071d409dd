//! Session Model
//!
//! A session is one customer's seated visit at a branch: reserved, then
//! active from `start_time` for `duration_minutes`, then completed once the
//! bill is finalized. Seat changes and order lines hang off the session as
//! append-only sub-collections.

use super::serde_helpers;
use serde::{Deserialize, Serialize};

/// Session lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum SessionStatus {
    Reserved,
    Active,
    Completed,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Reserved
    }
}

/// Payment status of a finalized bill
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Session entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Session {
    pub branch_id: String,
    pub id: String,

    /// Seat occupied at session start (current seat once changes apply)
    pub seat_id: Option<String>,

    #[serde(default)]
    pub status: SessionStatus,

    /// Actual start instant (Unix millis). Reserved sessions have none.
    pub start_time: Option<i64>,

    /// Planned duration in minutes
    #[serde(default)]
    pub duration_minutes: i64,

    // -- Finalized billing fields (written exactly once by the engine) --
    pub played_minutes: Option<i64>,
    pub seat_subtotal: Option<f64>,
    pub orders_total: Option<f64>,
    pub subtotal: Option<f64>,
    pub discount: Option<f64>,
    pub tax_percent: Option<f64>,
    pub tax_amount: Option<f64>,
    pub bill_amount: Option<f64>,
    pub invoice_number: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub closed_at: Option<i64>,
    pub closed_by: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Session {
    /// Planned end instant, if the session has started
    pub fn planned_end_ms(&self) -> Option<i64> {
        self.start_time
            .map(|start| start + self.duration_minutes * 60_000)
    }
}

/// Create session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreate {
    /// Client-supplied ID (a UUID is generated when absent)
    pub id: Option<String>,
    pub seat_id: Option<String>,
    #[serde(default)]
    pub duration_minutes: i64,
    /// Providing a start time creates the session already ACTIVE
    pub start_time: Option<i64>,
}

/// Start session payload (reserved → active)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionStart {
    /// Start instant override; defaults to now
    pub start_time: Option<i64>,
}

/// Seat change event: the session moved to `to_seat_id` at `changed_at`.
/// Append-only; the billing engine reads the log ordered by `changed_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SeatChange {
    pub id: i64,
    pub branch_id: String,
    pub session_id: String,
    /// Target seat (None parks the session unseated, billed at zero rate)
    pub to_seat_id: Option<String>,
    pub changed_at: i64,
}

/// Append seat change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatChangeCreate {
    pub to_seat_id: Option<String>,
    /// Change instant; defaults to now
    pub changed_at: Option<i64>,
}

/// Ancillary order line (food/items) attached to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub branch_id: String,
    pub session_id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub price: f64,
    pub qty: Option<i64>,
    /// Explicit line total overriding price×qty; kept as entered (may be a
    /// numeric string), parsed at billing time
    pub total: Option<String>,
    pub created_at: i64,
}

/// Append order line payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineCreate {
    pub name: Option<String>,
    #[serde(default)]
    pub price: f64,
    pub qty: Option<i64>,
    #[serde(default, deserialize_with = "serde_helpers::numeric_or_string")]
    pub total: Option<String>,
}
