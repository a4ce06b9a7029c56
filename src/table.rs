use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Page, SearchRow};

/// A row the dashboard tables can search, rank and sort.
pub trait TableRow {
    /// First dimension value, e.g. the page path or the query text.
    fn key(&self) -> &str;
    fn clicks(&self) -> f64;
    fn sort_value(&self, field: SortField) -> f64;
}

impl TableRow for SearchRow {
    fn key(&self) -> &str {
        self.keys.first().map(String::as_str).unwrap_or_default()
    }

    fn clicks(&self) -> f64 {
        self.clicks
    }

    fn sort_value(&self, field: SortField) -> f64 {
        match field {
            SortField::Volume => self.impressions,
            SortField::Position => self.position,
            SortField::Clicks => self.clicks,
            SortField::Ctr => self.ctr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[serde(alias = "impressions")]
    Volume,
    Position,
    Clicks,
    Ctr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Column header state: clicking the active column flips direction,
/// clicking another column starts it descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == Some(field) {
            Self {
                field: Some(field),
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                field: Some(field),
                direction: SortDirection::Desc,
            }
        }
    }
}

/// Case-insensitive substring match on the row key; an empty term keeps all rows.
pub fn filter_rows<R: TableRow + Clone>(rows: &[R], term: &str) -> Vec<R> {
    if term.is_empty() {
        return rows.to_vec();
    }
    let needle = term.to_lowercase();
    rows.iter()
        .filter(|row| row.key().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Keeps the highest-click row for each key, in order of first appearance.
pub fn dedupe_rows<R: TableRow>(rows: Vec<R>) -> Vec<R> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    let mut kept: Vec<R> = Vec::with_capacity(rows.len());

    for row in rows {
        let existing = slots.get(row.key()).copied();
        match existing {
            Some(index) => {
                if row.clicks() >= kept[index].clicks() {
                    kept[index] = row;
                }
            }
            None => {
                slots.insert(row.key().to_string(), kept.len());
                kept.push(row);
            }
        }
    }
    kept
}

/// Stable single-field sort; equal values keep their relative order.
pub fn sort_rows<R: TableRow>(rows: &mut [R], field: SortField, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = a
            .sort_value(field)
            .partial_cmp(&b.sort_value(field))
            .unwrap_or(Ordering::Equal);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

/// Slices out one 1-indexed page. Out-of-range requests are pulled back to
/// the nearest valid page.
pub fn paginate<R: Clone>(rows: &[R], page: usize, page_size: usize) -> Page<R> {
    let page_size = page_size.max(1);
    let total_items = rows.len();
    let total_pages = total_pages(total_items, page_size);
    let page = page.clamp(1, total_pages.max(1));

    let start = ((page - 1) * page_size).min(total_items);
    let end = (start + page_size).min(total_items);

    Page {
        items: rows[start..end].to_vec(),
        page,
        page_size,
        total_items,
        total_pages,
        has_prev: page > 1,
        has_next: page < total_pages,
    }
}

/// Search, optional dedupe, optional sort and pagination in one pass.
#[derive(Debug, Clone)]
pub struct TableQuery<'a> {
    pub search: &'a str,
    pub dedupe: bool,
    pub sort: SortState,
    pub page: usize,
    pub page_size: usize,
}

impl TableQuery<'_> {
    pub fn run<R: TableRow + Clone>(&self, rows: &[R]) -> Page<R> {
        let mut rows = filter_rows(rows, self.search);
        if self.dedupe {
            rows = dedupe_rows(rows);
        }
        if let Some(field) = self.sort.field {
            sort_rows(&mut rows, field, self.sort.direction);
        }
        paginate(&rows, self.page, self.page_size)
    }
}
