//! Billing engine tests: pure arithmetic on segments/rates/orders, then
//! end-to-end compute and finalize against an in-memory SQLite pool.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::calculator::BillingEngine;
use super::error::BillingError;
use super::finalize::invoice_number;
use super::orders::{line_total, orders_total};
use super::rates::segment_charge;
use super::segments::build_segments;
use super::sweeper::BillingSweeper;
use crate::db::DbService;
use crate::db::repository::{order_line, seat, seat_change, session};
use shared::models::{
    BillOptions, FinalizeRequest, OrderLine, OrderLineCreate, PaxMode, RoundingMode, SeatChange,
    SeatChangeCreate, SeatCreate, SeatPricing, SessionCreate, SessionStatus,
};

const MIN: i64 = 60_000;

fn change(to_seat: Option<&str>, changed_at: i64) -> SeatChange {
    SeatChange {
        id: 0,
        branch_id: "b1".into(),
        session_id: "s1".into(),
        to_seat_id: to_seat.map(str::to_owned),
        changed_at,
    }
}

fn order(price: f64, qty: Option<i64>, total: Option<&str>) -> OrderLine {
    OrderLine {
        id: 0,
        branch_id: "b1".into(),
        session_id: "s1".into(),
        name: None,
        price,
        qty,
        total: total.map(str::to_owned),
        created_at: 0,
    }
}

fn pricing(hourly: f64) -> SeatPricing {
    SeatPricing {
        rate_per_hour: hourly,
        ..Default::default()
    }
}

// ── Segments ────────────────────────────────────────────────────────

#[test]
fn empty_log_yields_one_clamped_segment() {
    // Scenario A timeline: 60-minute plan, observed 70 minutes in
    let segs = build_segments(0, 60, 70 * MIN, Some("seat1"), &[]);
    assert_eq!(segs.len(), 1);
    assert_eq!(segs[0].seat_id.as_deref(), Some("seat1"));
    assert_eq!(segs[0].from_ms, 0);
    assert_eq!(segs[0].to_ms, 60 * MIN);
    assert_eq!(segs[0].minutes(), 60);
}

#[test]
fn segments_are_contiguous_and_sum_to_clamped_window() {
    let changes = [
        change(Some("seat2"), 20 * MIN),
        change(None, 35 * MIN),
        change(Some("seat3"), 50 * MIN),
    ];
    let segs = build_segments(0, 60, 55 * MIN, Some("seat1"), &changes);

    assert_eq!(segs.len(), 4);
    for pair in segs.windows(2) {
        assert_eq!(pair[0].to_ms, pair[1].from_ms);
    }
    assert_eq!(segs.first().unwrap().from_ms, 0);
    assert_eq!(segs.last().unwrap().to_ms, 55 * MIN);

    let total: i64 = segs.iter().map(|s| s.minutes()).sum();
    assert_eq!(total, 55);
}

#[test]
fn out_of_order_changes_are_sorted_by_instant() {
    let changes = [change(Some("seat3"), 40 * MIN), change(Some("seat2"), 10 * MIN)];
    let segs = build_segments(0, 60, 60 * MIN, Some("seat1"), &changes);

    let seats: Vec<_> = segs.iter().map(|s| s.seat_id.as_deref()).collect();
    assert_eq!(seats, [Some("seat1"), Some("seat2"), Some("seat3")]);
}

#[test]
fn change_after_planned_end_is_clamped_to_zero_length() {
    let changes = [change(Some("seat2"), 90 * MIN)];
    let segs = build_segments(0, 60, 120 * MIN, Some("seat1"), &changes);

    assert_eq!(segs.len(), 2);
    assert_eq!(segs[0].minutes(), 60);
    // Post-plan tail collapses to nothing
    assert_eq!(segs[1].minutes(), 0);
}

#[test]
fn now_before_start_yields_no_billable_minutes() {
    let segs = build_segments(100 * MIN, 60, 50 * MIN, Some("seat1"), &[]);
    assert_eq!(segs.iter().map(|s| s.minutes()).sum::<i64>(), 0);
}

// ── Rates ───────────────────────────────────────────────────────────

#[test]
fn hourly_rate_is_proportional_to_minutes() {
    let p = pricing(100.0);
    let charge = segment_charge(Some(&p), 60, RoundingMode::Actual, PaxMode::Single);
    assert_eq!(charge, Decimal::from(100));

    let charge = segment_charge(Some(&p), 30, RoundingMode::Actual, PaxMode::Single);
    assert_eq!(charge, Decimal::from(50));
}

#[test]
fn flat_tier_ignores_actual_minutes() {
    // Scenario B: 12 elapsed minutes under a 30-minute tier still bill flat
    let p = SeatPricing {
        rate_per_hour: 100.0,
        rate30_single: Some(50.0),
        ..Default::default()
    };
    let charge = segment_charge(Some(&p), 12, RoundingMode::Thirty, PaxMode::Single);
    assert_eq!(charge, Decimal::from(50));
}

#[test]
fn missing_tier_falls_back_to_hourly_over_slab_minutes() {
    // 30-minute slab requested but no rate30_multi configured
    let p = SeatPricing {
        rate_per_hour: 120.0,
        rate30_single: Some(50.0),
        ..Default::default()
    };
    let charge = segment_charge(Some(&p), 12, RoundingMode::Thirty, PaxMode::Multi);
    assert_eq!(charge, Decimal::from(60)); // 120 × 30/60
}

#[test]
fn tier_never_crosses_pax_mode() {
    let p = SeatPricing {
        rate60_multi: Some(80.0),
        ..Default::default()
    };
    // Single-pax must not borrow the multi tier; zero hourly fallback
    let charge = segment_charge(Some(&p), 45, RoundingMode::Sixty, PaxMode::Single);
    assert_eq!(charge, Decimal::ZERO);
}

#[test]
fn unknown_seat_bills_at_zero() {
    assert_eq!(
        segment_charge(None, 60, RoundingMode::Actual, PaxMode::Single),
        Decimal::ZERO
    );
    assert_eq!(
        segment_charge(None, 60, RoundingMode::Thirty, PaxMode::Single),
        Decimal::ZERO
    );
}

#[test]
fn zero_minutes_charge_nothing_even_with_tier() {
    let p = SeatPricing {
        rate30_single: Some(50.0),
        ..Default::default()
    };
    assert_eq!(
        segment_charge(Some(&p), 0, RoundingMode::Thirty, PaxMode::Single),
        Decimal::ZERO
    );
}

// ── Orders ──────────────────────────────────────────────────────────

#[test]
fn order_total_mixes_computed_and_explicit_lines() {
    // Scenario D: price=50 qty=2 plus explicit total "75"
    let lines = [order(50.0, Some(2), None), order(999.0, None, Some("75"))];
    assert_eq!(orders_total(&lines), Decimal::from(175));
}

#[test]
fn qty_floors_at_one() {
    assert_eq!(line_total(&order(40.0, None, None)), Decimal::from(40));
    assert_eq!(line_total(&order(40.0, Some(0), None)), Decimal::from(40));
    assert_eq!(line_total(&order(40.0, Some(-3), None)), Decimal::from(40));
}

#[test]
fn unparseable_total_falls_back_to_price_times_qty() {
    assert_eq!(
        line_total(&order(25.0, Some(2), Some("abc"))),
        Decimal::from(50)
    );
    assert_eq!(line_total(&order(25.0, Some(2), Some("  "))), Decimal::from(50));
}

#[test]
fn explicit_zero_total_is_honored() {
    assert_eq!(line_total(&order(25.0, Some(2), Some("0"))), Decimal::ZERO);
}

#[test]
fn negative_line_totals_pass_through() {
    // Refund/credit lines are not floored per line
    let lines = [order(100.0, None, None), order(0.0, None, Some("-30"))];
    assert_eq!(orders_total(&lines), Decimal::from(70));
}

// ── Invoice numbers ─────────────────────────────────────────────────

#[test]
fn invoice_number_uses_business_timezone_date() {
    // 2024-01-01T00:30:00Z is already Jan 1 in Kolkata (UTC+5:30)
    let now_ms = 1_704_069_000_000i64;
    let inv = invoice_number(now_ms, chrono_tz::Asia::Kolkata);
    assert!(inv.starts_with("INV-20240101-"), "got {inv}");
    assert_eq!(inv.len(), "INV-20240101-".len() + 5);
}

#[test]
fn invoice_tail_is_five_digits_of_millis() {
    let inv = invoice_number(42, chrono_tz::Asia::Kolkata);
    assert!(inv.ends_with("-00042"), "got {inv}");
}

// ── End-to-end against an in-memory pool ────────────────────────────

async fn pool() -> SqlitePool {
    DbService::in_memory().await.unwrap().pool
}

fn engine(pool: &SqlitePool) -> BillingEngine {
    BillingEngine::new(pool.clone(), chrono_tz::Asia::Kolkata)
}

async fn seed_seat(pool: &SqlitePool, id: &str, hourly: f64) {
    seat::create(
        pool,
        "b1",
        SeatCreate {
            id: id.into(),
            name: format!("Seat {id}"),
            rate_per_hour: hourly,
            rate30_single: None,
            rate30_multi: None,
            rate60_single: None,
            rate60_multi: None,
        },
    )
    .await
    .unwrap();
}

async fn seed_session(pool: &SqlitePool, id: &str, seat: Option<&str>, minutes: i64, start: i64) {
    session::create(
        pool,
        "b1",
        SessionCreate {
            id: Some(id.into()),
            seat_id: seat.map(str::to_owned),
            duration_minutes: minutes,
            start_time: Some(start),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn compute_clamps_to_planned_end() {
    // Scenario A: 60-minute plan observed at +70min, hourly 100
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 100.0).await;
    seed_session(&pool, "s1", Some("seat1"), 60, 0).await;

    let bill = engine
        .compute_bill_at("b1", "s1", &BillOptions::default(), 70 * MIN)
        .await
        .unwrap();

    assert_eq!(bill.played_minutes, 60);
    assert_eq!(bill.seat_subtotal, 100.0);
    assert_eq!(bill.bill_amount, 100.0);
}

#[tokio::test]
async fn compute_prices_each_segment_at_its_seat() {
    // Scenario C: change to seat2 at +20min, observed at +40min
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 60.0).await;
    seed_seat(&pool, "seat2", 120.0).await;
    seed_session(&pool, "s1", Some("seat1"), 60, 0).await;
    seat_change::append(
        &pool,
        "b1",
        "s1",
        SeatChangeCreate {
            to_seat_id: Some("seat2".into()),
            changed_at: Some(20 * MIN),
        },
    )
    .await
    .unwrap();

    let bill = engine
        .compute_bill_at("b1", "s1", &BillOptions::default(), 40 * MIN)
        .await
        .unwrap();

    assert_eq!(bill.played_minutes, 40);
    assert_eq!(bill.seat_subtotal, 60.0); // 20 + 40
}

#[tokio::test]
async fn discount_floors_subtotal_and_bill_at_zero() {
    // Scenario E: discount larger than everything billable
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 100.0).await;
    seed_session(&pool, "s1", Some("seat1"), 120, 0).await;
    order_line::append(
        &pool,
        "b1",
        "s1",
        OrderLineCreate {
            name: Some("Snacks".into()),
            price: 100.0,
            qty: Some(1),
            total: None,
        },
    )
    .await
    .unwrap();

    let opts = BillOptions {
        discount: 500.0,
        tax_percent: 18.0,
        ..Default::default()
    };
    let bill = engine.compute_bill_at("b1", "s1", &opts, 120 * MIN).await.unwrap();

    assert_eq!(bill.seat_subtotal + bill.orders_total, 300.0);
    assert_eq!(bill.subtotal, 0.0);
    assert_eq!(bill.tax_amount, 0.0);
    assert_eq!(bill.bill_amount, 0.0);
}

#[tokio::test]
async fn tax_applies_after_discount() {
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 100.0).await;
    seed_session(&pool, "s1", Some("seat1"), 60, 0).await;

    let opts = BillOptions {
        discount: 40.0,
        tax_percent: 10.0,
        ..Default::default()
    };
    let bill = engine.compute_bill_at("b1", "s1", &opts, 60 * MIN).await.unwrap();

    assert_eq!(bill.subtotal, 60.0);
    assert_eq!(bill.tax_amount, 6.0);
    assert_eq!(bill.bill_amount, 66.0);
}

#[tokio::test]
async fn compute_is_idempotent() {
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 75.0).await;
    seed_session(&pool, "s1", Some("seat1"), 90, 0).await;

    let opts = BillOptions {
        tax_percent: 5.0,
        ..Default::default()
    };
    let first = engine.compute_bill_at("b1", "s1", &opts, 45 * MIN).await.unwrap();
    let second = engine.compute_bill_at("b1", "s1", &opts, 45 * MIN).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn compute_rejects_session_without_start_time() {
    let pool = pool().await;
    let engine = engine(&pool);
    session::create(
        &pool,
        "b1",
        SessionCreate {
            id: Some("s1".into()),
            seat_id: None,
            duration_minutes: 60,
            start_time: None,
        },
    )
    .await
    .unwrap();

    let err = engine
        .compute_bill("b1", "s1", &BillOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::MissingStartTime(_)));
}

#[tokio::test]
async fn finalize_completes_session_and_stamps_invoice() {
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 100.0).await;
    seed_session(&pool, "s1", Some("seat1"), 1, 0).await;

    let bill = engine
        .finalize_session("b1", "s1", &FinalizeRequest::default(), Some("op1"))
        .await
        .unwrap();
    assert!(bill.bill_amount >= 0.0);

    let stored = session::find_by_id(&pool, "b1", "s1").await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Completed);
    assert!(stored.invoice_number.as_deref().unwrap().starts_with("INV-"));
    assert_eq!(stored.closed_by.as_deref(), Some("op1"));
    assert_eq!(stored.bill_amount, Some(bill.bill_amount));
}

#[tokio::test]
async fn second_finalize_returns_stored_bill_without_new_invoice() {
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 100.0).await;
    seed_session(&pool, "s1", Some("seat1"), 1, 0).await;

    let first = engine
        .finalize_session("b1", "s1", &FinalizeRequest::default(), None)
        .await
        .unwrap();
    let invoice = session::find_by_id(&pool, "b1", "s1")
        .await
        .unwrap()
        .unwrap()
        .invoice_number;

    let second = engine
        .finalize_session("b1", "s1", &FinalizeRequest::default(), None)
        .await
        .unwrap();
    assert_eq!(first, second);

    let after = session::find_by_id(&pool, "b1", "s1").await.unwrap().unwrap();
    assert_eq!(after.invoice_number, invoice);
}

#[tokio::test]
async fn concurrent_finalize_produces_exactly_one_invoice() {
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 100.0).await;
    seed_session(&pool, "s1", Some("seat1"), 1, 0).await;

    let req_a = FinalizeRequest::default();
    let req_b = FinalizeRequest::default();
    let (a, b) = tokio::join!(
        engine.finalize_session("b1", "s1", &req_a, Some("sweep")),
        engine.finalize_session("b1", "s1", &req_b, Some("manual")),
    );

    // Both callers observe the same committed bill
    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a, b);

    let stored = session::find_by_id(&pool, "b1", "s1").await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Completed);
    assert!(stored.invoice_number.is_some());
}

#[tokio::test]
async fn finalize_on_reserved_session_is_a_business_rule_error() {
    let pool = pool().await;
    let engine = engine(&pool);
    session::create(
        &pool,
        "b1",
        SessionCreate {
            id: Some("s1".into()),
            seat_id: None,
            duration_minutes: 60,
            start_time: None,
        },
    )
    .await
    .unwrap();

    let err = engine
        .finalize_session("b1", "s1", &FinalizeRequest::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::MissingStartTime(_)));
}

#[tokio::test]
async fn repair_refinalizes_an_invoiced_session() {
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 100.0).await;
    seed_session(&pool, "s1", Some("seat1"), 1, 0).await;

    engine
        .finalize_session("b1", "s1", &FinalizeRequest::default(), None)
        .await
        .unwrap();

    // A late order line surfaces; repair recomputes and overwrites
    order_line::append(
        &pool,
        "b1",
        "s1",
        OrderLineCreate {
            name: Some("Late charge".into()),
            price: 30.0,
            qty: Some(1),
            total: None,
        },
    )
    .await
    .unwrap();

    let repaired = engine
        .finalize_session(
            "b1",
            "s1",
            &FinalizeRequest {
                repair: true,
                ..Default::default()
            },
            Some("auditor"),
        )
        .await
        .unwrap();
    assert_eq!(repaired.orders_total, 30.0);

    let stored = session::find_by_id(&pool, "b1", "s1").await.unwrap().unwrap();
    assert_eq!(stored.orders_total, Some(30.0));
}

#[tokio::test]
async fn sweep_closes_only_overdue_sessions() {
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 100.0).await;

    // Overdue: 1-minute plan that started at epoch
    seed_session(&pool, "overdue", Some("seat1"), 1, 0).await;
    // Still running: generous plan starting now
    seed_session(
        &pool,
        "running",
        Some("seat1"),
        24 * 60,
        shared::util::now_millis(),
    )
    .await;

    let sweeper = BillingSweeper::new(
        engine,
        tokio_util::sync::CancellationToken::new(),
        std::time::Duration::from_secs(600),
    );
    let closed = sweeper.sweep().await.unwrap();
    assert_eq!(closed, 1);

    let overdue = session::find_by_id(&pool, "b1", "overdue").await.unwrap().unwrap();
    assert_eq!(overdue.status, SessionStatus::Completed);
    assert!(overdue.invoice_number.is_some());

    let running = session::find_by_id(&pool, "b1", "running").await.unwrap().unwrap();
    assert_eq!(running.status, SessionStatus::Active);
}

#[tokio::test]
async fn repeated_sweeps_are_no_ops_once_caught_up() {
    let pool = pool().await;
    let engine = engine(&pool);
    seed_seat(&pool, "seat1", 100.0).await;
    seed_session(&pool, "s1", Some("seat1"), 1, 0).await;

    let sweeper = BillingSweeper::new(
        engine,
        tokio_util::sync::CancellationToken::new(),
        std::time::Duration::from_secs(600),
    );
    assert_eq!(sweeper.sweep().await.unwrap(), 1);
    assert_eq!(sweeper.sweep().await.unwrap(), 0);
}
