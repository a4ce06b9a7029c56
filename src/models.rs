use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::popup::{BoundingBox, Placement, Size, Viewport};
use crate::table::{SortDirection, SortField};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Symbolic window picked in the range selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DateRange {
    Last24Hours,
    #[default]
    Last7Days,
    Last28Days,
    Last3Months,
    /// Anything the selector does not know; resolves to a one-day window.
    Fallback,
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::Last24Hours,
        DateRange::Last7Days,
        DateRange::Last28Days,
        DateRange::Last3Months,
    ];

    pub fn parse(symbol: &str) -> Self {
        match symbol.trim() {
            "24h" => Self::Last24Hours,
            "7d" => Self::Last7Days,
            "28d" => Self::Last28Days,
            "3m" => Self::Last3Months,
            other => {
                tracing::debug!(
                    symbol = other,
                    "unrecognized date range, using fallback window"
                );
                Self::Fallback
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Last24Hours => "24h",
            Self::Last7Days => "7d",
            Self::Last28Days => "28d",
            Self::Last3Months => "3m",
            Self::Fallback => "1d",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Last24Hours => "Last 24 hours",
            Self::Last7Days => "Last 7 days",
            Self::Last28Days => "Last 28 days",
            Self::Last3Months => "Last 3 months",
            Self::Fallback => "Last day",
        }
    }
}

impl From<String> for DateRange {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<DateRange> for String {
    fn from(value: DateRange) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete window derived from a [`DateRange`] and the current time.
///
/// Both bounds are kept as local instants because the 24h window is not
/// day aligned; the calendar view is available through `start_date` and
/// `end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ResolvedPeriod {
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    /// Whether a daily sample, taken at its start of day, falls inside the
    /// instant bounds. The rolling 24h window only admits today this way.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let at = date.and_time(NaiveTime::MIN);
        at >= self.start && at <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDataPoint {
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub value: f64,
}

impl MetricDataPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendResult {
    pub current_value: f64,
    pub previous_value: f64,
    /// `None` when the previous value is zero and no ratio exists.
    pub trend_percent: Option<f64>,
}

/// One row of a search analytics report, keyed by its dimension values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchRow {
    pub keys: Vec<String>,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Persisted metric history: site, then metric key, then points in date order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricsStore {
    pub sites: BTreeMap<String, BTreeMap<String, Vec<MetricDataPoint>>>,
}

impl MetricsStore {
    pub fn history(&self, site: &str, metric: &str) -> Option<&[MetricDataPoint]> {
        self.sites
            .get(site)
            .and_then(|metrics| metrics.get(metric))
            .map(Vec::as_slice)
    }

    /// Inserts a point, replacing any existing sample for the same day.
    pub fn upsert(&mut self, site: &str, metric: &str, point: MetricDataPoint) {
        let points = self
            .sites
            .entry(site.to_string())
            .or_default()
            .entry(metric.to_string())
            .or_default();
        match points.binary_search_by(|existing| existing.date.cmp(&point.date)) {
            Ok(index) => points[index] = point,
            Err(index) => points.insert(index, point),
        }
    }

    /// Most recent `limit` points, still in ascending date order.
    pub fn recent(&self, site: &str, metric: &str, limit: usize) -> Vec<MetricDataPoint> {
        let points = self.history(site, metric).unwrap_or_default();
        let skip = points.len().saturating_sub(limit);
        points[skip..].to_vec()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeriodView {
    pub start_date: String,
    pub end_date: String,
    pub days: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeriodResponse {
    pub range: DateRange,
    pub label: String,
    pub current: PeriodView,
    pub previous: PeriodView,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub site: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub current: f64,
    pub previous: f64,
}

#[derive(Debug, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
    pub previous_value: Option<f64>,
    pub pending: bool,
}

#[derive(Debug, Serialize)]
pub struct MetricSeriesResponse {
    pub site: String,
    pub metric: String,
    pub range: DateRange,
    pub current: PeriodView,
    pub previous: PeriodView,
    pub points: Vec<SeriesPoint>,
    pub trend: TrendResult,
}

#[derive(Debug, Serialize)]
pub struct MetricCard {
    pub metric: String,
    pub latest: Option<f64>,
    pub trend: TrendResult,
}

#[derive(Debug, Serialize)]
pub struct CardsResponse {
    pub site: String,
    pub range: DateRange,
    pub cards: Vec<MetricCard>,
}

#[derive(Debug, Deserialize)]
pub struct RecordPointRequest {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct RowsQueryRequest {
    pub rows: Vec<SearchRow>,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: Option<SortField>,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default = "first_page")]
    pub page: usize,
    #[serde(default)]
    pub page_size: Option<usize>,
    /// Defaults to on for table views, off for lists.
    #[serde(default)]
    pub dedupe: Option<bool>,
    #[serde(default)]
    pub view: TableView,
}

/// Which widget the rows feed; decides the default page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableView {
    List,
    #[default]
    Table,
}

fn first_page() -> usize {
    1
}

#[derive(Debug, Deserialize)]
pub struct PlacementRequest {
    #[serde(default)]
    pub trigger: Option<BoundingBox>,
    pub desired: Size,
    pub viewport: Viewport,
    #[serde(default)]
    pub margin: Option<f64>,
}

pub type PlacementResponse = Placement;

mod date_format {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(D::Error::custom)
    }
}
