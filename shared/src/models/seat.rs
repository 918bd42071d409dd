//! Seat Model
//!
//! Per-seat pricing configuration. `rate_per_hour` is the proportional
//! fallback; the four tiered rates are flat per-slab charges selected by
//! rounding mode (30/60) and pax mode (single/multi) when present.

use super::serde_helpers;
use serde::{Deserialize, Serialize};

/// Seat entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Seat {
    pub branch_id: String,
    pub id: String,
    #[serde(default)]
    pub name: String,

    /// Hourly fallback rate; 0 when the seat is effectively free
    #[serde(default)]
    pub rate_per_hour: f64,

    // -- Tiered flat rates (absent tier falls back to rate_per_hour) --
    pub rate30_single: Option<f64>,
    pub rate30_multi: Option<f64>,
    pub rate60_single: Option<f64>,
    pub rate60_multi: Option<f64>,

    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,

    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Pricing fields only — the read-only rate catalog view consumed by the
/// billing engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SeatPricing {
    #[serde(default)]
    pub rate_per_hour: f64,
    pub rate30_single: Option<f64>,
    pub rate30_multi: Option<f64>,
    pub rate60_single: Option<f64>,
    pub rate60_multi: Option<f64>,
}

/// Create seat payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatCreate {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rate_per_hour: f64,
    pub rate30_single: Option<f64>,
    pub rate30_multi: Option<f64>,
    pub rate60_single: Option<f64>,
    pub rate60_multi: Option<f64>,
}

/// Update seat payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_per_hour: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate30_single: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate30_multi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate60_single: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate60_multi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
