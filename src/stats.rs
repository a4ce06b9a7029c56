use crate::models::{
    CardsResponse, DATE_FORMAT, DateRange, MetricCard, MetricDataPoint, MetricSeriesResponse,
    MetricsStore, SeriesPoint,
};
use crate::pending::is_pending_date;
use crate::period::{align_previous, period_view, points_within, previous_period, resolve};
use crate::trend::{average_trend, total_trend};
use chrono::{Local, NaiveDateTime};

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn build_series(
    site: &str,
    metric: &str,
    history: &[MetricDataPoint],
    range: DateRange,
    lag_days: i64,
) -> MetricSeriesResponse {
    build_series_at(local_now(), site, metric, history, range, lag_days)
}

/// Chart payload: the samples inside the selected window, each paired with
/// the matching sample from the previous window and flagged when upstream
/// data may still change.
pub fn build_series_at(
    now: NaiveDateTime,
    site: &str,
    metric: &str,
    history: &[MetricDataPoint],
    range: DateRange,
    lag_days: i64,
) -> MetricSeriesResponse {
    let period = resolve(range, now);
    let previous = previous_period(&period);

    let current_points: Vec<MetricDataPoint> = points_within(&period, history).cloned().collect();
    let previous_points: Vec<MetricDataPoint> =
        points_within(&previous, history).cloned().collect();

    let points = align_previous(&period, &current_points, &previous_points)
        .into_iter()
        .map(|(point, previous_value)| SeriesPoint {
            date: point.date.format(DATE_FORMAT).to_string(),
            value: point.value,
            previous_value,
            pending: is_pending_date(point.date, now, lag_days),
        })
        .collect();

    MetricSeriesResponse {
        site: site.to_string(),
        metric: metric.to_string(),
        range,
        current: period_view(&period),
        previous: period_view(&previous),
        points,
        trend: average_trend(history, &period),
    }
}

pub fn build_cards(site: &str, store: &MetricsStore, range: DateRange) -> CardsResponse {
    build_cards_at(local_now(), site, store, range)
}

/// One summary card per stored metric, comparing window totals.
pub fn build_cards_at(
    now: NaiveDateTime,
    site: &str,
    store: &MetricsStore,
    range: DateRange,
) -> CardsResponse {
    let period = resolve(range, now);
    let cards: Vec<MetricCard> = store
        .sites
        .get(site)
        .map(|metrics| {
            metrics
                .iter()
                .map(|(metric, points)| MetricCard {
                    metric: metric.clone(),
                    latest: points_within(&period, points).last().map(|p| p.value),
                    trend: total_trend(points, &period),
                })
                .collect()
        })
        .unwrap_or_default();

    CardsResponse {
        site: site.to_string(),
        range,
        cards,
    }
}
