//! Order Aggregator
//!
//! Sums the ancillary order lines of a session. Per line: quantity floors
//! at 1, a parseable explicit total overrides price×qty, and garbage in the
//! explicit total falls back to price×qty. Negative line totals pass
//! through unmodified — they serve as refund/credit lines; only the final
//! subtotal floors at zero.

use super::rates::to_decimal;
use rust_decimal::Decimal;
use shared::models::OrderLine;

/// Total of one line
pub fn line_total(line: &OrderLine) -> Decimal {
    let qty = line.qty.unwrap_or(1).max(1);
    let fallback = to_decimal(line.price) * Decimal::from(qty);

    match line.total.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw.parse::<Decimal>().unwrap_or(fallback),
        _ => fallback,
    }
}

/// Sum all order lines of a session
pub fn orders_total(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(line_total).sum()
}
