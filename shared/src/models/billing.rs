//! Billing Types
//!
//! Policy selectors and the computed bill breakdown exchanged over the API.

use super::PaymentStatus;
use serde::{Deserialize, Serialize};

/// Rounding mode: bill actual elapsed minutes, or a flat 30/60-minute slab
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundingMode {
    #[serde(rename = "actual")]
    Actual,
    #[serde(rename = "30")]
    Thirty,
    #[serde(rename = "60")]
    Sixty,
}

impl Default for RoundingMode {
    fn default() -> Self {
        Self::Actual
    }
}

impl RoundingMode {
    /// Fixed slab length in minutes, if this is a slab mode
    pub fn slab_minutes(&self) -> Option<i64> {
        match self {
            Self::Actual => None,
            Self::Thirty => Some(30),
            Self::Sixty => Some(60),
        }
    }
}

/// Pax mode: single- vs multi-occupant tiered pricing selector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaxMode {
    Single,
    Multi,
}

impl Default for PaxMode {
    fn default() -> Self {
        Self::Single
    }
}

/// Billing policy knobs for a compute/finalize call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct BillOptions {
    #[serde(default)]
    pub rounding_mode: RoundingMode,
    #[serde(default)]
    pub pax_mode: PaxMode,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub tax_percent: f64,
}

/// Finalize request payload (manual close-and-bill surface)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FinalizeRequest {
    #[serde(flatten)]
    pub options: BillOptions,
    pub payment_status: Option<PaymentStatus>,
    /// Explicit repair intent: re-finalize a session that already carries an
    /// invoice. Never set by the automatic sweep.
    #[serde(default)]
    pub repair: bool,
}

/// Computed bill breakdown. Monetary values are Decimal inside the engine
/// and land here rounded to 2 decimal places for storage/serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillBreakdown {
    /// Sum of per-segment elapsed minutes after flooring and clamping
    pub played_minutes: i64,
    pub seat_subtotal: f64,
    pub orders_total: f64,
    /// max(0, seat_subtotal + orders_total − discount)
    pub subtotal: f64,
    pub discount: f64,
    pub tax_percent: f64,
    pub tax_amount: f64,
    /// subtotal + tax_amount
    pub bill_amount: f64,
}
