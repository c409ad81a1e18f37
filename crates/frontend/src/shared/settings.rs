//! Dashboard settings taken from the page URL.
//!
//! `?resize_debounce_ms=500&default_timeout_secs=30` overrides individual
//! fields; anything missing or invalid falls back to the defaults.

use contracts::shared::dashboard_settings::DashboardSettings;
use web_sys::window;

pub fn settings_from_query(query: &str) -> DashboardSettings {
    let query = query.trim_start_matches('?');
    if query.is_empty() {
        return DashboardSettings::default();
    }

    let settings: DashboardSettings = match serde_qs::from_str(query) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Ignoring dashboard settings in URL: {}", e);
            return DashboardSettings::default();
        }
    };

    match settings.validate() {
        Ok(()) => settings,
        Err(e) => {
            log::warn!("Invalid dashboard settings in URL: {}", e);
            DashboardSettings::default()
        }
    }
}

/// Reads settings from `window.location.search`.
pub fn load_settings() -> DashboardSettings {
    let search = window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    let settings = settings_from_query(&search);
    log::debug!("Dashboard settings: {:?}", settings);
    settings
}
