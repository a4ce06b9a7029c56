use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::period::start_of_day;

/// Whether a sample is still inside the upstream collection lag.
///
/// Samples from the last 24 hours are only pending when they lie in the
/// future; older samples are pending while they are newer than `now - lag`.
pub fn is_pending(point: NaiveDateTime, now: NaiveDateTime, lag: Duration) -> bool {
    if point >= now - Duration::hours(24) {
        return point > now;
    }
    point > now - lag
}

/// Day-granularity samples are evaluated at their start of day.
pub fn is_pending_date(date: NaiveDate, now: NaiveDateTime, lag_days: i64) -> bool {
    is_pending(start_of_day(date), now, Duration::days(lag_days))
}
