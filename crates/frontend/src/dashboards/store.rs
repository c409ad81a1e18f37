//! Dashboard-wide state: chart query states, applied filters, expanded slices.
//!
//! Signal updates go through the pure reducers below so they can be tested
//! without a browser.

use super::api;
use contracts::dashboards::grid_chart::{
    AddFilter, ChartState, ChartStatus, DashboardResponse, Datasource, Filters, FormData,
    QueryResponse, RemoveFilter, SliceMeta,
};
use contracts::shared::dashboard_settings::DashboardSettings;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Grid cell id of the chart for a slice.
pub fn chart_key(slice_id: i64) -> String {
    format!("CHART-{}", slice_id)
}

/// Slice form data with the dashboard filters attached as `extra_filters`.
pub fn query_form_data(form_data: &FormData, filters: &Filters) -> FormData {
    let mut value = match form_data.as_value() {
        Value::Object(map) => Value::Object(map.clone()),
        _ => json!({}),
    };

    let extra: Vec<Value> = filters
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(column, values)| json!({ "col": column, "op": "in", "val": values }))
        .collect();

    if !extra.is_empty() {
        if let Value::Object(map) = &mut value {
            map.insert("extra_filters".to_string(), Value::Array(extra));
        }
    }
    FormData::new(value)
}

/// Marks a chart as loading; returns the id of the new request.
pub fn chart_started(chart: &mut ChartState, form_data: FormData, now: f64) -> u64 {
    chart.query_request_id += 1;
    chart.chart_status = Some(ChartStatus::Loading);
    chart.chart_alert = None;
    chart.chart_update_start_time = Some(now);
    chart.chart_update_end_time = None;
    chart.latest_query_form_data = Some(form_data);
    chart.trigger_query = false;
    chart.query_request_id
}

/// Stores a query result. Results of superseded requests are dropped.
pub fn chart_succeeded(
    chart: &mut ChartState,
    request_id: u64,
    response: QueryResponse,
    now: f64,
) -> bool {
    if chart.query_request_id != request_id {
        return false;
    }
    if let Some(error) = response.error.clone() {
        return chart_failed(chart, request_id, error, now);
    }
    chart.chart_status = Some(ChartStatus::Success);
    chart.chart_alert = None;
    chart.chart_update_end_time = Some(now);
    chart.last_rendered = Some(now);
    chart.query_response = Some(response);
    true
}

pub fn chart_failed(chart: &mut ChartState, request_id: u64, alert: String, now: f64) -> bool {
    if chart.query_request_id != request_id {
        return false;
    }
    chart.chart_status = Some(ChartStatus::Failed);
    chart.chart_alert = Some(alert);
    chart.chart_update_end_time = Some(now);
    true
}

pub fn rename_slice(slices: &mut [SliceMeta], slice_id: i64, name: &str) -> bool {
    match slices.iter_mut().find(|s| s.slice_id == slice_id) {
        Some(slice) if slice.slice_name != name => {
            slice.slice_name = name.to_string();
            true
        }
        _ => false,
    }
}

pub fn toggle_expanded(expanded: &mut HashSet<i64>, slice_id: i64) -> bool {
    if !expanded.remove(&slice_id) {
        expanded.insert(slice_id);
        return true;
    }
    false
}

#[derive(Clone, Copy)]
pub struct DashboardStore {
    pub dashboard_title: RwSignal<String>,
    pub slices: RwSignal<Vec<SliceMeta>>,
    pub datasources: RwSignal<BTreeMap<String, Datasource>>,
    pub charts: RwSignal<HashMap<i64, ChartState>>,
    pub filters: RwSignal<Filters>,
    pub expanded: RwSignal<HashSet<i64>>,
    pub edit_mode: RwSignal<bool>,
    settings: StoredValue<DashboardSettings>,
}

impl DashboardStore {
    pub fn new(settings: DashboardSettings) -> Self {
        Self {
            dashboard_title: RwSignal::new(String::new()),
            slices: RwSignal::new(vec![]),
            datasources: RwSignal::new(BTreeMap::new()),
            charts: RwSignal::new(HashMap::new()),
            filters: RwSignal::new(Filters::default()),
            expanded: RwSignal::new(HashSet::new()),
            edit_mode: RwSignal::new(false),
            settings: StoredValue::new(settings),
        }
    }

    pub fn load(&self, dashboard: DashboardResponse) {
        let charts = dashboard
            .slices
            .iter()
            .map(|s| (s.slice_id, ChartState::new(s.slice_id)))
            .collect();
        self.dashboard_title.set(dashboard.dashboard_title);
        self.datasources.set(dashboard.datasources);
        self.filters.set(dashboard.default_filters);
        self.charts.set(charts);
        self.slices.set(dashboard.slices);
    }

    pub fn default_timeout(&self) -> u32 {
        self.settings.with_value(|s| s.default_timeout_secs)
    }

    pub fn chart(&self, slice_id: i64) -> ChartState {
        self.charts
            .with(|charts| charts.get(&slice_id).cloned())
            .unwrap_or_else(|| ChartState::new(slice_id))
    }

    pub fn slice(&self, slice_id: i64) -> Option<SliceMeta> {
        self.slices
            .with(|slices| slices.iter().find(|s| s.slice_id == slice_id).cloned())
    }

    pub fn datasource_for(&self, slice_id: i64) -> Datasource {
        let key = self.slice(slice_id).and_then(|s| {
            s.form_data
                .as_value()
                .get("datasource")
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        key.and_then(|k| self.datasources.with(|d| d.get(&k).cloned()))
            .unwrap_or_default()
    }

    pub fn is_expanded(&self, slice_id: i64) -> bool {
        self.expanded.with(|e| e.contains(&slice_id))
    }

    pub fn toggle_expand_slice(&self, slice_id: i64) {
        self.expanded.update(|e| {
            toggle_expanded(e, slice_id);
        });
    }

    pub fn refresh_chart(&self, chart_id: i64, force: bool, timeout: u32) {
        let Some(slice) = self.slices.with_untracked(|slices| {
            slices.iter().find(|s| s.slice_id == chart_id).cloned()
        }) else {
            log::warn!("refresh requested for unknown chart {}", chart_id);
            return;
        };

        let form_data = self
            .filters
            .with_untracked(|filters| query_form_data(&slice.form_data, filters));
        let now = js_sys::Date::now();
        let mut request_id = 0;
        self.charts.update(|charts| {
            let chart = charts
                .entry(chart_id)
                .or_insert_with(|| ChartState::new(chart_id));
            request_id = chart_started(chart, form_data.clone(), now);
        });

        let charts = self.charts;
        let api_prefix = self.settings.with_value(|s| s.api_prefix.clone());
        spawn_local(async move {
            let result = api::run_query(&api_prefix, &form_data, force, timeout).await;
            let now = js_sys::Date::now();
            let _ = charts.try_update(|charts| {
                let Some(chart) = charts.get_mut(&chart_id) else {
                    return;
                };
                let applied = match result {
                    Ok(response) => chart_succeeded(chart, request_id, response, now),
                    Err(e) => {
                        log::error!("Chart {} query failed: {}", chart_id, e);
                        chart_failed(chart, request_id, e, now)
                    }
                };
                if !applied {
                    log::debug!("Dropped stale response for chart {}", chart_id);
                }
            });
        });
    }

    /// Re-queries every chart except `skip` (the one whose interaction caused it).
    pub fn refresh_all(&self, force: bool, skip: Option<&str>) {
        let timeout = self.default_timeout();
        let ids: Vec<i64> = self.slices.with_untracked(|slices| {
            slices
                .iter()
                .map(|s| s.slice_id)
                .filter(|id| skip != Some(chart_key(*id).as_str()))
                .collect()
        });
        for id in ids {
            self.refresh_chart(id, force, timeout);
        }
    }

    pub fn add_filter(&self, chart: &ChartState, change: AddFilter) {
        self.filters.update(|f| f.apply_add(&change));
        if change.refresh {
            self.refresh_all(false, Some(&chart_key(chart.id)));
        }
    }

    pub fn remove_filter(&self, cell_id: &str, change: RemoveFilter) {
        self.filters.update(|f| f.apply_remove(&change));
        if change.refresh {
            self.refresh_all(false, Some(cell_id));
        }
    }

    pub fn save_slice_name(&self, slice_id: i64, name: String) {
        let previous = self.slice(slice_id).map(|s| s.slice_name);
        self.slices.update(|slices| {
            rename_slice(slices, slice_id, &name);
        });

        let slices = self.slices;
        let api_prefix = self.settings.with_value(|s| s.api_prefix.clone());
        spawn_local(async move {
            if let Err(e) = api::save_slice_name(&api_prefix, slice_id, &name).await {
                log::error!("Failed to rename slice {}: {}", slice_id, e);
                if let Some(previous) = previous {
                    let _ = slices.try_update(|slices| {
                        rename_slice(slices, slice_id, &previous);
                    });
                }
            }
        });
    }
}
