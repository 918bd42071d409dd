//! Segment Rate Resolver
//!
//! Prices one occupancy segment under a rounding/pax policy. Tiered 30/60
//! rates are flat per-slab charges for the whole segment regardless of the
//! minutes actually occupied; the hourly rate is the proportional fallback.
//! Uses rust_decimal for precise calculations, stores as f64.

use rust_decimal::prelude::*;
use shared::models::{PaxMode, RoundingMode, SeatPricing};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Resolve the charge for one segment.
///
/// Resolution order:
/// 1. No pricing record (unseated segment or unknown seat) and no tier —
///    falls through to a zero hourly rate.
/// 2. Slab mode with a matching tier for the pax mode — flat tier charge,
///    independent of `minutes_actual`.
/// 3. Otherwise: `rate_per_hour × billed_minutes / 60`, where billed
///    minutes are the actual elapsed minutes in actual mode and the fixed
///    slab length when a tier was requested but not configured.
pub fn segment_charge(
    pricing: Option<&SeatPricing>,
    minutes_actual: i64,
    rounding: RoundingMode,
    pax: PaxMode,
) -> Decimal {
    if minutes_actual <= 0 {
        return Decimal::ZERO;
    }

    if let (Some(p), Some(slab)) = (pricing, rounding.slab_minutes()) {
        let tier = match (slab, pax) {
            (30, PaxMode::Single) => p.rate30_single,
            (30, PaxMode::Multi) => p.rate30_multi,
            (60, PaxMode::Single) => p.rate60_single,
            (60, PaxMode::Multi) => p.rate60_multi,
            _ => None,
        };
        if let Some(flat) = tier {
            return to_decimal(flat);
        }
    }

    let billed_minutes = rounding.slab_minutes().unwrap_or(minutes_actual);
    let rate_per_hour = to_decimal(pricing.map(|p| p.rate_per_hour).unwrap_or(0.0));
    rate_per_hour * Decimal::from(billed_minutes) / Decimal::from(60)
}
