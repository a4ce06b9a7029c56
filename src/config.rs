use std::{env, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/metrics.json";

/// Page size for compact lists (top pages, top queries).
pub const LIST_PAGE_SIZE: usize = 10;
/// Page size for the full keyword / page tables.
pub const TABLE_PAGE_SIZE: usize = 20;
/// Days search analytics data stays provisional upstream.
pub const PENDING_LAG_DAYS: i64 = 3;
/// Viewport widths below this are treated as mobile.
pub const MOBILE_BREAKPOINT: f64 = 768.0;
/// Gap kept between a popup and the viewport edges.
pub const POPUP_MARGIN: f64 = 20.0;
/// Upper bound accepted for the pending lag setting.
pub const MAX_PENDING_LAG_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub list_page_size: usize,
    pub table_page_size: usize,
    pub pending_lag_days: i64,
    pub mobile_breakpoint: f64,
    pub popup_margin: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            list_page_size: LIST_PAGE_SIZE,
            table_page_size: TABLE_PAGE_SIZE,
            pending_lag_days: PENDING_LAG_DAYS,
            mobile_breakpoint: MOBILE_BREAKPOINT,
            popup_margin: POPUP_MARGIN,
        }
    }
}

impl DashboardConfig {
    /// Reads every setting from the environment, keeping the default for
    /// anything missing or unparsable.
    pub fn from_env() -> Self {
        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));

        Self {
            port: parse_env("PORT", DEFAULT_PORT),
            data_path,
            list_page_size: parse_env("DASHBOARD_LIST_PAGE_SIZE", LIST_PAGE_SIZE),
            table_page_size: parse_env("DASHBOARD_TABLE_PAGE_SIZE", TABLE_PAGE_SIZE),
            pending_lag_days: parse_env("DASHBOARD_PENDING_LAG_DAYS", PENDING_LAG_DAYS),
            mobile_breakpoint: parse_env("DASHBOARD_MOBILE_BREAKPOINT", MOBILE_BREAKPOINT),
            popup_margin: parse_env("DASHBOARD_POPUP_MARGIN", POPUP_MARGIN),
        }
        .normalized()
    }

    /// Pulls tunables back into ranges the core functions accept.
    pub fn normalized(self) -> Self {
        Self {
            list_page_size: self.list_page_size.max(1),
            table_page_size: self.table_page_size.max(1),
            pending_lag_days: self.pending_lag_days.clamp(0, MAX_PENDING_LAG_DAYS),
            mobile_breakpoint: finite_or(self.mobile_breakpoint, MOBILE_BREAKPOINT).max(0.0),
            popup_margin: finite_or(self.popup_margin, POPUP_MARGIN).max(0.0),
            ..self
        }
    }
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_named_constants() {
        let config = DashboardConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.list_page_size, 10);
        assert_eq!(config.table_page_size, 20);
        assert_eq!(config.pending_lag_days, 3);
        assert_eq!(config.mobile_breakpoint, 768.0);
        assert_eq!(config.popup_margin, 20.0);
    }

    #[test]
    fn normalized_clamps_out_of_range_settings() {
        let config = DashboardConfig {
            list_page_size: 0,
            table_page_size: 0,
            pending_lag_days: i64::MAX,
            mobile_breakpoint: f64::NAN,
            popup_margin: -5.0,
            ..DashboardConfig::default()
        }
        .normalized();
        assert_eq!(config.list_page_size, 1);
        assert_eq!(config.table_page_size, 1);
        assert_eq!(config.pending_lag_days, 365);
        assert_eq!(config.mobile_breakpoint, 768.0);
        assert_eq!(config.popup_margin, 0.0);

        let negative = DashboardConfig {
            pending_lag_days: -4,
            ..DashboardConfig::default()
        }
        .normalized();
        assert_eq!(negative.pending_lag_days, 0);
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        let value: u16 = parse_env("SEO_DASHBOARD_TEST_UNSET_KEY", 42);
        assert_eq!(value, 42);
    }
}
