use crate::models::{MetricDataPoint, ResolvedPeriod, TrendResult};
use crate::period::{points_within, previous_period};

/// Signed percentage change from `previous` to `current`.
///
/// A zero baseline has no meaningful ratio, so it yields `None` instead of
/// a placeholder percentage. Callers render that as "no trend".
pub fn trend(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

pub fn trend_result(current: f64, previous: f64) -> TrendResult {
    TrendResult {
        current_value: current,
        previous_value: previous,
        trend_percent: trend(current, previous),
    }
}

/// Arithmetic mean, with an empty input averaging to zero.
pub fn mean<'a>(values: impl IntoIterator<Item = &'a MetricDataPoint>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), point| (sum + point.value, count + 1));
    sum / count.max(1) as f64
}

/// Compares the mean of the samples in `period` with the mean of the samples
/// in the equally long window just before it.
pub fn average_trend(points: &[MetricDataPoint], period: &ResolvedPeriod) -> TrendResult {
    let previous = previous_period(period);
    let current_mean = mean(points_within(period, points));
    let previous_mean = mean(points_within(&previous, points));
    trend_result(current_mean, previous_mean)
}

/// Compares window totals rather than means, for additive metrics like clicks.
pub fn total_trend(points: &[MetricDataPoint], period: &ResolvedPeriod) -> TrendResult {
    let previous = previous_period(period);
    let current: f64 = points_within(period, points).map(|p| p.value).sum();
    let before: f64 = points_within(&previous, points).map(|p| p.value).sum();
    trend_result(current, before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateRange;
    use crate::period::{points_within, previous_period, resolve};
    use chrono::{Duration, NaiveDate};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn trend_of_known_values() {
        assert_eq!(trend(150.0, 100.0), Some(50.0));
        assert!(approx(trend(100.0, 150.0).unwrap(), -33.33));
        assert_eq!(trend(100.0, 0.0), None);
        assert_eq!(trend(0.0, 0.0), None);
    }

    #[test]
    fn equal_values_have_zero_trend() {
        for x in [1.0, -4.0, 0.5, 12345.0] {
            assert_eq!(trend(x, x), Some(0.0));
        }
    }

    #[test]
    fn trend_sign_follows_direction() {
        let cases = [(10.0, 5.0), (5.0, 10.0), (7.0, 7.0), (0.0, 3.0)];
        for (current, previous) in cases {
            let value = trend(current, previous).unwrap();
            assert_eq!(value > 0.0, current > previous);
        }
    }

    #[test]
    fn trend_is_not_clamped() {
        assert_eq!(trend(1000.0, 10.0), Some(9900.0));
        assert_eq!(trend(0.0, 10.0), Some(-100.0));
    }

    #[test]
    fn average_trend_uses_window_means() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let period = resolve(DateRange::Last7Days, now);
        let today = now.date();

        // Current window Jun 8..=15, previous window May 31..=Jun 7.
        let points = vec![
            MetricDataPoint::new(today, 30.0),
            MetricDataPoint::new(today - Duration::days(1), 10.0),
            MetricDataPoint::new(today - Duration::days(9), 10.0),
        ];
        let result = average_trend(&points, &period);
        assert_eq!(result.current_value, 20.0);
        assert_eq!(result.previous_value, 10.0);
        assert_eq!(result.trend_percent, Some(100.0));
    }

    #[test]
    fn rolling_day_windows_do_not_overlap() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let period = resolve(DateRange::Last24Hours, now);
        let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
        let points = vec![
            MetricDataPoint::new(day(13), 10.0),
            MetricDataPoint::new(day(14), 10.0),
            MetricDataPoint::new(day(15), 20.0),
        ];

        let current: Vec<_> = points_within(&period, &points).map(|p| p.date).collect();
        let previous: Vec<_> = points_within(&previous_period(&period), &points)
            .map(|p| p.date)
            .collect();
        assert_eq!(current, vec![day(15)]);
        assert_eq!(previous, vec![day(14)]);

        let result = average_trend(&points, &period);
        assert_eq!(result.current_value, 20.0);
        assert_eq!(result.previous_value, 10.0);
        assert_eq!(result.trend_percent, Some(100.0));
    }

    #[test]
    fn empty_previous_window_has_no_trend() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let period = resolve(DateRange::Last7Days, now);
        let points = vec![MetricDataPoint::new(now.date(), 8.0)];

        let result = average_trend(&points, &period);
        assert_eq!(result.previous_value, 0.0);
        assert_eq!(result.trend_percent, None);
        assert_eq!(mean(&[] as &[MetricDataPoint]), 0.0);
    }

    #[test]
    fn total_trend_sums_windows() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let period = resolve(DateRange::Last7Days, now);
        let points = vec![
            MetricDataPoint::new(now.date(), 30.0),
            MetricDataPoint::new(now.date() - Duration::days(2), 30.0),
            MetricDataPoint::new(now.date() - Duration::days(10), 40.0),
        ];
        let result = total_trend(&points, &period);
        assert_eq!(result.current_value, 60.0);
        assert_eq!(result.previous_value, 40.0);
        assert_eq!(result.trend_percent, Some(50.0));
    }
}
