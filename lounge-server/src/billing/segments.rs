//! Occupancy Segment Builder
//!
//! Reconstructs the chronological (seat, interval) timeline of a session
//! from its start instant and the ordered seat-change log, clamped to
//! `min(planned_end, now)`. Pure function of its inputs.

use shared::models::SeatChange;

/// One contiguous interval during which the session occupied one seat
/// (or none — unseated time bills at zero rate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub seat_id: Option<String>,
    pub from_ms: i64,
    pub to_ms: i64,
}

impl Segment {
    /// Elapsed whole minutes, floored, never negative. Out-of-order change
    /// timestamps can produce zero/negative-length segments; they yield 0
    /// here and contribute nothing downstream.
    pub fn minutes(&self) -> i64 {
        ((self.to_ms - self.from_ms) / 60_000).max(0)
    }
}

/// Build the ordered, contiguous segment sequence covering
/// `[start_ms, min(start_ms + duration_minutes, now_ms)]`.
///
/// The change log is re-sorted by `changed_at` defensively; change instants
/// are externally assigned and storage order is not trusted. An empty log
/// yields exactly one segment for the whole clamped interval.
pub fn build_segments(
    start_ms: i64,
    duration_minutes: i64,
    now_ms: i64,
    initial_seat: Option<&str>,
    changes: &[SeatChange],
) -> Vec<Segment> {
    let planned_end_ms = start_ms + duration_minutes * 60_000;
    let clamp = |ms: i64| ms.min(planned_end_ms);

    let mut ordered: Vec<&SeatChange> = changes.iter().collect();
    ordered.sort_by_key(|c| c.changed_at);

    let mut segments = Vec::with_capacity(ordered.len() + 1);
    let mut cursor = start_ms;
    let mut seat_id: Option<String> = initial_seat.map(str::to_owned);

    for change in ordered {
        let change_ms = clamp(change.changed_at);
        segments.push(Segment {
            seat_id: seat_id.clone(),
            from_ms: cursor,
            to_ms: change_ms,
        });
        cursor = change_ms;
        seat_id = change.to_seat_id.clone();
    }

    segments.push(Segment {
        seat_id,
        from_ms: cursor,
        to_ms: clamp(now_ms),
    });

    segments
}
