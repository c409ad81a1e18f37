use crate::dashboards::ChartGridDashboard;
use crate::shared::settings::load_settings;
use leptos::prelude::*;
use serde::Deserialize;
use web_sys::window;

const DEFAULT_DASHBOARD_ID: i64 = 1;

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    #[serde(default)]
    dashboard_id: Option<i64>,
}

/// Dashboard to open, from `?dashboard_id=N`.
fn dashboard_id_from_query(query: &str) -> i64 {
    serde_qs::from_str::<PageQuery>(query.trim_start_matches('?'))
        .ok()
        .and_then(|q| q.dashboard_id)
        .unwrap_or(DEFAULT_DASHBOARD_ID)
}

#[component]
pub fn App() -> impl IntoView {
    // Settings are read once per page load and shared with every chart cell.
    provide_context(load_settings());

    let search = window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    let dashboard_id = dashboard_id_from_query(&search);

    view! {
        <ChartGridDashboard dashboard_id=dashboard_id />
    }
}
