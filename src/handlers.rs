use crate::errors::AppError;
use crate::models::{
    CardsResponse, DATE_FORMAT, DateRange, MetricDataPoint, MetricSeriesResponse, Page,
    PeriodResponse, PlacementRequest, PlacementResponse, RangeQuery, RecordPointRequest,
    RowsQueryRequest, SearchRow, TableView, TrendQuery, TrendResult,
};
use crate::period::{period_view, previous_period, resolve};
use crate::popup::{PlacementOptions, place};
use crate::state::AppState;
use crate::stats::{build_cards, build_series, local_now};
use crate::storage::persist_store;
use crate::table::{SortState, TableQuery};
use crate::trend::trend_result;
use crate::ui::render_dashboard;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use chrono::NaiveDate;
use tracing::{debug, info};

fn selected_range(query: &RangeQuery) -> DateRange {
    query
        .range
        .as_deref()
        .map(DateRange::parse)
        .unwrap_or_default()
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Html<String> {
    let range = selected_range(&query);
    let store = state.store.lock().await;
    let site = query
        .site
        .clone()
        .filter(|site| !site.trim().is_empty())
        .or_else(|| store.sites.keys().next().cloned());
    let cards = site
        .as_deref()
        .map(|site| build_cards(site.trim(), &store, range));
    Html(render_dashboard(range, cards.as_ref()))
}

pub async fn get_period(Query(query): Query<RangeQuery>) -> Json<PeriodResponse> {
    let range = selected_range(&query);
    let period = resolve(range, local_now());
    let previous = previous_period(&period);
    Json(PeriodResponse {
        range,
        label: range.label().to_string(),
        current: period_view(&period),
        previous: period_view(&previous),
    })
}

pub async fn get_trend(Query(query): Query<TrendQuery>) -> Result<Json<TrendResult>, AppError> {
    if !query.current.is_finite() || !query.previous.is_finite() {
        return Err(AppError::bad_request("current and previous must be finite numbers"));
    }
    Ok(Json(trend_result(query.current, query.previous)))
}

pub async fn get_series(
    State(state): State<AppState>,
    Path((site, metric)): Path<(String, String)>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<MetricSeriesResponse>, AppError> {
    let range = selected_range(&query);
    let history = {
        let store = state.store.lock().await;
        let Some(points) = store.history(&site, &metric) else {
            return Err(AppError::not_found(format!("no history for {site}/{metric}")));
        };
        match query.limit {
            Some(limit) => store.recent(&site, &metric, limit),
            None => points.to_vec(),
        }
    };

    debug!(%site, %metric, %range, points = history.len(), "building metric series");
    Ok(Json(build_series(
        &site,
        &metric,
        &history,
        range,
        state.config.pending_lag_days,
    )))
}

pub async fn record_point(
    State(state): State<AppState>,
    Path((site, metric)): Path<(String, String)>,
    Json(payload): Json<RecordPointRequest>,
) -> Result<Json<MetricDataPoint>, AppError> {
    let site = site.trim();
    let metric = metric.trim();
    if site.is_empty() || metric.is_empty() {
        return Err(AppError::bad_request("site and metric must not be empty"));
    }
    let date = NaiveDate::parse_from_str(payload.date.trim(), DATE_FORMAT)
        .map_err(|_| AppError::bad_request("date must be formatted as YYYY-MM-DD"))?;
    if !payload.value.is_finite() {
        return Err(AppError::bad_request("value must be a finite number"));
    }

    let point = MetricDataPoint::new(date, payload.value);
    let mut store = state.store.lock().await;
    let mut updated = store.clone();
    updated.upsert(site, metric, point.clone());
    persist_store(&state.config.data_path, &updated).await?;
    *store = updated;

    info!(%site, %metric, date = %payload.date, value = payload.value, "recorded metric point");
    Ok(Json(point))
}

pub async fn get_cards(
    State(state): State<AppState>,
    Path(site): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Json<CardsResponse> {
    let range = selected_range(&query);
    let store = state.store.lock().await;
    Json(build_cards(&site, &store, range))
}

pub async fn query_rows(
    State(state): State<AppState>,
    Json(payload): Json<RowsQueryRequest>,
) -> Result<Json<Page<SearchRow>>, AppError> {
    if payload.page_size == Some(0) {
        return Err(AppError::bad_request("page_size must be positive"));
    }
    let query = TableQuery {
        search: &payload.search,
        dedupe: payload.dedupe.unwrap_or(payload.view == TableView::Table),
        sort: SortState {
            field: payload.sort,
            direction: payload.direction,
        },
        page: payload.page,
        page_size: payload.page_size.unwrap_or(match payload.view {
            TableView::List => state.config.list_page_size,
            TableView::Table => state.config.table_page_size,
        }),
    };
    Ok(Json(query.run(&payload.rows)))
}

pub async fn place_popup(
    State(state): State<AppState>,
    Json(payload): Json<PlacementRequest>,
) -> Result<Json<PlacementResponse>, AppError> {
    let viewport = payload.viewport;
    let dimensions = [
        viewport.width,
        viewport.height,
        payload.desired.width,
        payload.desired.height,
    ];
    if dimensions.iter().any(|value| !value.is_finite() || *value < 0.0) {
        return Err(AppError::bad_request("sizes must be non-negative numbers"));
    }

    let options = PlacementOptions {
        margin: payload.margin.unwrap_or(state.config.popup_margin).max(0.0),
        mobile_breakpoint: state.config.mobile_breakpoint,
    };
    Ok(Json(place(payload.trigger, payload.desired, viewport, options)))
}
