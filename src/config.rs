use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub base_path: String,
    pub api_timeout_ms: u32,
    pub video_ready_timeout_ms: u32,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub focus_indicator_ms: u32,
    pub success_close_delay_ms: u32,
    pub default_language: String,
    pub enable_logging: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            base_path: "/connect/".to_string(),
            api_timeout_ms: 15_000,
            video_ready_timeout_ms: 10_000,
            zoom_min: 1.0,
            zoom_max: 3.0,
            focus_indicator_ms: 800,
            success_close_delay_ms: 2_000,
            default_language: "ru".to_string(),
            enable_logging: true,
        }
    }
}

impl ScannerConfig {
    /// Loads the configuration from compile-time environment variables
    /// (see `build.rs`, which forwards a local `.env` file).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let (zoom_min, zoom_max) = parse_zoom_limits(option_env!("ZOOM_MIN"), option_env!("ZOOM_MAX"));
        Self {
            base_path: normalize_base_path(option_env!("BASE_PATH").unwrap_or("/connect/")),
            api_timeout_ms: option_env!("API_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.api_timeout_ms),
            video_ready_timeout_ms: option_env!("VIDEO_READY_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.video_ready_timeout_ms),
            zoom_min,
            zoom_max,
            focus_indicator_ms: option_env!("FOCUS_INDICATOR_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.focus_indicator_ms),
            success_close_delay_ms: option_env!("SUCCESS_CLOSE_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.success_close_delay_ms),
            default_language: option_env!("DEFAULT_LANGUAGE")
                .unwrap_or("ru")
                .to_string(),
            enable_logging: option_env!("ENABLE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_logging),
        }
    }

    /// Zoom limits exposed to the user, whatever the hardware reports.
    /// Unusable limits (non-finite, non-positive or inverted) give the defaults.
    pub fn zoom_limits(&self) -> (f64, f64) {
        if valid_zoom_limits(self.zoom_min, self.zoom_max) {
            (self.zoom_min, self.zoom_max)
        } else {
            let defaults = Self::default();
            (defaults.zoom_min, defaults.zoom_max)
        }
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }
}

fn valid_zoom_limits(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && min > 0.0 && min <= max
}

/// Parses `ZOOM_MIN`/`ZOOM_MAX`. A missing or unparsable value takes its
/// default; an unusable pair falls back to both defaults.
fn parse_zoom_limits(min: Option<&str>, max: Option<&str>) -> (f64, f64) {
    let defaults = ScannerConfig::default();
    let min = min.and_then(|v| v.trim().parse::<f64>().ok()).unwrap_or(defaults.zoom_min);
    let max = max.and_then(|v| v.trim().parse::<f64>().ok()).unwrap_or(defaults.zoom_max);
    if valid_zoom_limits(min, max) {
        (min, max)
    } else {
        log::warn!("⚠️ [CONFIG] Ignoring zoom limits {}..{}, using defaults", min, max);
        (defaults.zoom_min, defaults.zoom_max)
    }
}

/// Base path always starts and ends with `/` (`connect` -> `/connect/`).
pub fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim();
    let mut normalized = String::with_capacity(trimmed.len() + 2);
    if !trimmed.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(trimmed);
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Base path for one scanner opening: the page's override when it passed a
/// non-blank one, the configured path otherwise. Overrides never carry over.
pub fn resolve_base_path(override_path: Option<&str>, configured: &str) -> String {
    match override_path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => normalize_base_path(path),
        None => normalize_base_path(configured),
    }
}

lazy_static::lazy_static! {
    pub static ref CONFIG: ScannerConfig = ScannerConfig::from_env();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_path_gets_slashes() {
        assert_eq!(normalize_base_path("/connect/"), "/connect/");
        assert_eq!(normalize_base_path("/connect"), "/connect/");
        assert_eq!(normalize_base_path("connect"), "/connect/");
        assert_eq!(normalize_base_path(""), "/");
        assert_eq!(normalize_base_path(" /sub/page "), "/sub/page/");
    }

    #[test]
    fn defaults_match_scanner_contract() {
        let config = ScannerConfig::default();
        assert_eq!(config.zoom_limits(), (1.0, 3.0));
        assert_eq!(config.video_ready_timeout_ms, 10_000);
        assert_eq!(config.base_path, "/connect/");
    }

    #[test]
    fn base_path_override_applies_to_one_opening_only() {
        assert_eq!(resolve_base_path(Some("/promo"), "/connect/"), "/promo/");
        assert_eq!(resolve_base_path(None, "/connect/"), "/connect/");
        assert_eq!(resolve_base_path(Some("   "), "/connect/"), "/connect/");
    }

    #[test]
    fn zoom_limits_reject_unusable_values() {
        assert_eq!(parse_zoom_limits(Some("1.5"), Some("4")), (1.5, 4.0));
        assert_eq!(parse_zoom_limits(None, Some("2")), (1.0, 2.0));
        assert_eq!(parse_zoom_limits(Some("NaN"), Some("3")), (1.0, 3.0));
        assert_eq!(parse_zoom_limits(Some("1"), Some("inf")), (1.0, 3.0));
        assert_eq!(parse_zoom_limits(Some("3"), Some("1")), (1.0, 3.0));
        assert_eq!(parse_zoom_limits(Some("0"), Some("2")), (1.0, 3.0));
        assert_eq!(parse_zoom_limits(Some("abc"), None), (1.0, 3.0));

        let config = ScannerConfig { zoom_min: f64::NAN, ..ScannerConfig::default() };
        assert_eq!(config.zoom_limits(), (1.0, 3.0));
        let config = ScannerConfig { zoom_min: 4.0, zoom_max: 2.0, ..ScannerConfig::default() };
        assert_eq!(config.zoom_limits(), (1.0, 3.0));
    }
}
