//! Auto-Close Sweeper
//!
//! Periodic task: finds ACTIVE sessions whose planned end has passed and
//! finalizes each with the default policy (actual minutes, single pax, no
//! discount, no tax, payment pending). A failing session is logged and
//! skipped; it never aborts the sweep.
//!
//! Registered as `TaskKind::Periodic` in `start_background_tasks()`.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::calculator::BillingEngine;
use crate::db::repository::session;
use shared::models::FinalizeRequest;

pub struct BillingSweeper {
    engine: BillingEngine,
    shutdown: CancellationToken,
    interval: Duration,
}

impl BillingSweeper {
    pub fn new(engine: BillingEngine, shutdown: CancellationToken, interval: Duration) -> Self {
        Self {
            engine,
            shutdown,
            interval,
        }
    }

    /// Main loop: sweep once at startup (catch up on sessions that went
    /// overdue while the server was down), then on every tick.
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Billing sweeper started");

        if let Err(e) = self.sweep().await {
            tracing::error!("Billing sweep failed: {e}");
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {
                    if let Err(e) = self.sweep().await {
                        tracing::error!("Billing sweep failed: {e}");
                    }
                }
            }
        }

        tracing::info!("Billing sweeper stopped");
    }

    /// One pass over all overdue active sessions. Returns how many were
    /// finalized in this pass.
    pub async fn sweep(&self) -> Result<usize, crate::db::repository::RepoError> {
        let now = shared::util::now_millis();
        let overdue = session::find_overdue_active(self.engine.pool(), now).await?;
        if overdue.is_empty() {
            return Ok(0);
        }

        tracing::info!(count = overdue.len(), "Sweeping overdue sessions");

        let mut closed = 0;
        for s in overdue {
            match self
                .engine
                .finalize_session(&s.branch_id, &s.id, &FinalizeRequest::default(), None)
                .await
            {
                Ok(totals) => {
                    closed += 1;
                    tracing::info!(
                        branch = %s.branch_id,
                        session = %s.id,
                        bill = totals.bill_amount,
                        "Auto-closed overdue session"
                    );
                }
                Err(e) => {
                    // Log and skip: one bad session must not stall the rest
                    tracing::warn!(
                        branch = %s.branch_id,
                        session = %s.id,
                        "Skipping session in sweep: {e}"
                    );
                }
            }
        }
        Ok(closed)
    }
}
