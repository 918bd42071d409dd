//! Bill Finalization
//!
//! Commits a computed breakdown to the session record exactly once. The
//! write is a conditional update on the session's status (see
//! [`session::commit_bill`]); of two racing finalize calls — the periodic
//! sweep and a manual close-and-bill — exactly one wins the transition and
//! the loser receives the winner's stored breakdown.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::calculator::BillingEngine;
use super::error::BillingError;
use crate::db::repository::session::{self, BillCommit};
use shared::models::{BillBreakdown, FinalizeRequest, Session, SessionStatus};

impl BillingEngine {
    /// Compute and durably commit the bill, transitioning the session to
    /// COMPLETED. Safe to retry in full and safe to race: the commit is
    /// guarded by an optimistic status precondition.
    pub async fn finalize_session(
        &self,
        branch_id: &str,
        session_id: &str,
        req: &FinalizeRequest,
        closed_by: Option<&str>,
    ) -> Result<BillBreakdown, BillingError> {
        let now_ms = shared::util::now_millis();
        let totals = self
            .compute_bill_at(branch_id, session_id, &req.options, now_ms)
            .await?;

        let invoice = invoice_number(now_ms, self.tz());
        let won = session::commit_bill(
            self.pool(),
            branch_id,
            session_id,
            BillCommit {
                played_minutes: totals.played_minutes,
                seat_subtotal: totals.seat_subtotal,
                orders_total: totals.orders_total,
                subtotal: totals.subtotal,
                discount: totals.discount,
                tax_percent: totals.tax_percent,
                tax_amount: totals.tax_amount,
                bill_amount: totals.bill_amount,
                invoice_number: &invoice,
                payment_status: req.payment_status.unwrap_or_default(),
                closed_at: now_ms,
                closed_by,
                repair: req.repair,
            },
        )
        .await?;

        if won {
            tracing::info!(
                branch = branch_id,
                session = session_id,
                invoice = %invoice,
                bill = totals.bill_amount,
                "Session finalized"
            );
            return Ok(totals);
        }

        // Lost the race or the status was never eligible. Re-read and decide.
        let current = session::find_by_id(self.pool(), branch_id, session_id)
            .await?
            .ok_or_else(|| BillingError::NotFound(format!("{branch_id}/{session_id}")))?;

        if current.status == SessionStatus::Completed && current.invoice_number.is_some() {
            tracing::debug!(
                branch = branch_id,
                session = session_id,
                "Session already finalized, returning stored bill"
            );
            return Ok(stored_breakdown(&current));
        }

        Err(BillingError::Conflict(format!(
            "Session {session_id} is not eligible for finalize (status {:?})",
            current.status
        )))
    }
}

/// Rebuild the breakdown from the fields persisted at finalize time.
fn stored_breakdown(session: &Session) -> BillBreakdown {
    BillBreakdown {
        played_minutes: session.played_minutes.unwrap_or(0),
        seat_subtotal: session.seat_subtotal.unwrap_or(0.0),
        orders_total: session.orders_total.unwrap_or(0.0),
        subtotal: session.subtotal.unwrap_or(0.0),
        discount: session.discount.unwrap_or(0.0),
        tax_percent: session.tax_percent.unwrap_or(0.0),
        tax_amount: session.tax_amount.unwrap_or(0.0),
        bill_amount: session.bill_amount.unwrap_or(0.0),
    }
}

/// Human-readable invoice identifier: `INV-YYYYMMDD-SSSSS`, with the date
/// in the business timezone and a 5-digit sub-second tail for uniqueness.
pub fn invoice_number(now_ms: i64, tz: Tz) -> String {
    let date = DateTime::<Utc>::from_timestamp_millis(now_ms)
        .unwrap_or_else(Utc::now)
        .with_timezone(&tz);
    format!("INV-{}-{:05}", date.format("%Y%m%d"), now_ms % 100_000)
}
