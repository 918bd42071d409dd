//! Bill Calculator
//!
//! The read path of the engine: reconstructs the occupancy timeline, prices
//! it, folds in order charges, discount and tax, and returns the breakdown
//! without touching the session record. Idempotent — this is also the
//! preview used before committing a bill.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::error::BillingError;
use super::orders::orders_total;
use super::rates::{segment_charge, to_decimal, to_f64};
use super::segments::build_segments;
use crate::db::repository::{order_line, seat, seat_change, session};
use shared::models::{BillBreakdown, BillOptions, Session};

/// Session billing engine. Cheap to clone; coordination between concurrent
/// callers happens entirely through the session row, never in memory.
#[derive(Clone)]
pub struct BillingEngine {
    pool: SqlitePool,
    tz: Tz,
}

impl BillingEngine {
    pub fn new(pool: SqlitePool, tz: Tz) -> Self {
        Self { pool, tz }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn tz(&self) -> Tz {
        self.tz
    }

    /// Compute a session's bill as of now. Read-only.
    pub async fn compute_bill(
        &self,
        branch_id: &str,
        session_id: &str,
        opts: &BillOptions,
    ) -> Result<BillBreakdown, BillingError> {
        self.compute_bill_at(branch_id, session_id, opts, shared::util::now_millis())
            .await
    }

    /// Compute a session's bill against an explicit reference instant.
    pub async fn compute_bill_at(
        &self,
        branch_id: &str,
        session_id: &str,
        opts: &BillOptions,
        now_ms: i64,
    ) -> Result<BillBreakdown, BillingError> {
        let session = session::find_by_id(&self.pool, branch_id, session_id)
            .await?
            .ok_or_else(|| BillingError::NotFound(format!("{branch_id}/{session_id}")))?;

        self.compute_for_session(&session, opts, now_ms).await
    }

    /// Compute against an already-loaded session row (sweep path).
    pub(crate) async fn compute_for_session(
        &self,
        session: &Session,
        opts: &BillOptions,
        now_ms: i64,
    ) -> Result<BillBreakdown, BillingError> {
        let start_ms = session
            .start_time
            .ok_or_else(|| BillingError::MissingStartTime(session.id.clone()))?;

        let changes =
            seat_change::find_by_session(&self.pool, &session.branch_id, &session.id).await?;
        let segments = build_segments(
            start_ms,
            session.duration_minutes,
            now_ms,
            session.seat_id.as_deref(),
            &changes,
        );

        let mut played_minutes: i64 = 0;
        let mut seat_subtotal = Decimal::ZERO;

        for segment in &segments {
            let minutes = segment.minutes();
            if minutes <= 0 {
                continue;
            }
            played_minutes += minutes;

            let pricing = match segment.seat_id.as_deref() {
                Some(seat_id) => {
                    seat::find_pricing(&self.pool, &session.branch_id, seat_id).await?
                }
                None => None,
            };
            seat_subtotal += segment_charge(
                pricing.as_ref(),
                minutes,
                opts.rounding_mode,
                opts.pax_mode,
            );
        }

        let lines =
            order_line::find_by_session(&self.pool, &session.branch_id, &session.id).await?;
        let orders = orders_total(&lines);

        let discount = to_decimal(opts.discount);
        let tax_percent = to_decimal(opts.tax_percent);

        let subtotal = (seat_subtotal + orders - discount).max(Decimal::ZERO);
        let tax_amount = subtotal * tax_percent / Decimal::ONE_HUNDRED;
        let bill_amount = subtotal + tax_amount;

        Ok(BillBreakdown {
            played_minutes,
            seat_subtotal: to_f64(seat_subtotal),
            orders_total: to_f64(orders),
            subtotal: to_f64(subtotal),
            discount: to_f64(discount),
            tax_percent: opts.tax_percent,
            tax_amount: to_f64(tax_amount),
            bill_amount: to_f64(bill_amount),
        })
    }
}
