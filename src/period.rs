use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;

use crate::models::{DATE_FORMAT, DateRange, MetricDataPoint, PeriodView, ResolvedPeriod};

const THREE_MONTHS_DAYS: i64 = 90;

/// Turns a range symbol into concrete bounds in the local clock.
///
/// `24h` is a rolling window ending at `now`; every other range is widened
/// to whole days.
pub fn resolve(range: DateRange, now: NaiveDateTime) -> ResolvedPeriod {
    let back_days = match range {
        DateRange::Last24Hours => {
            return ResolvedPeriod {
                start: now - Duration::hours(24),
                end: now,
            };
        }
        DateRange::Last7Days => 7,
        DateRange::Last28Days => 28,
        DateRange::Last3Months => THREE_MONTHS_DAYS,
        DateRange::Fallback => 1,
    };

    ResolvedPeriod {
        start: start_of_day((now - Duration::days(back_days)).date()),
        end: end_of_day(now.date()),
    }
}

/// Whole days spanned by the period, rounding any partial day up.
pub fn days_diff(period: &ResolvedPeriod) -> i64 {
    let span = period.end - period.start;
    let day_ms = Duration::days(1).num_milliseconds();
    let ms = span.num_milliseconds();
    if ms <= 0 {
        return 0;
    }
    (ms + day_ms - 1) / day_ms
}

/// The window of identical length immediately before `period`.
///
/// Shifts by a literal day count, so a three month window moves back 91
/// days rather than three calendar months.
pub fn previous_period(period: &ResolvedPeriod) -> ResolvedPeriod {
    let shift = Duration::days(days_diff(period));
    ResolvedPeriod {
        start: period.start - shift,
        end: period.end - shift,
    }
}

/// Matches previous-period samples onto the current period's dates.
///
/// Each previous point is moved forward by the period length and joined on
/// calendar date. Current dates with no counterpart get `None`.
pub fn align_previous(
    period: &ResolvedPeriod,
    current: &[MetricDataPoint],
    previous: &[MetricDataPoint],
) -> Vec<(MetricDataPoint, Option<f64>)> {
    let shift = Duration::days(days_diff(period));
    let shifted: HashMap<NaiveDate, f64> = previous
        .iter()
        .map(|point| (point.date + shift, point.value))
        .collect();

    current
        .iter()
        .map(|point| (point.clone(), shifted.get(&point.date).copied()))
        .collect()
}

pub fn points_within<'a>(
    period: &'a ResolvedPeriod,
    points: &'a [MetricDataPoint],
) -> impl Iterator<Item = &'a MetricDataPoint> + 'a {
    points.iter().filter(move |point| period.contains(point.date))
}

pub fn period_view(period: &ResolvedPeriod) -> PeriodView {
    PeriodView {
        start_date: period.start_date().format(DATE_FORMAT).to_string(),
        end_date: period.end_date().format(DATE_FORMAT).to_string(),
        days: days_diff(period),
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last_ms = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last_ms)
}
