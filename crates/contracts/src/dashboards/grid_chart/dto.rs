use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Opaque query configuration
// ---------------------------------------------------------------------------

/// Serialized query/visualization configuration driving a render request.
///
/// The grid cell never interprets it beyond a couple of well-known keys; it is
/// passed through to the query API and the export pathway as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(pub Value);

impl FormData {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn slice_id(&self) -> Option<i64> {
        self.0.get("slice_id").and_then(Value::as_i64)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Datasource description, forwarded untouched to the visualization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Datasource(pub Value);

// ---------------------------------------------------------------------------
// Chart runtime state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStatus {
    Loading,
    Success,
    Failed,
    Stopped,
    Rendered,
}

/// Payload returned by the explore_json endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub is_cached: bool,
    /// Server-side timestamp of the cached result, e.g. "2018-03-15T14:02:26".
    #[serde(default)]
    pub cached_dttm: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<String>,
}

/// Runtime query/render status and results for one visualization instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartState {
    pub id: i64,
    #[serde(default)]
    pub chart_status: Option<ChartStatus>,
    #[serde(default)]
    pub query_response: Option<QueryResponse>,
    #[serde(default)]
    pub chart_alert: Option<String>,
    /// Milliseconds since epoch.
    #[serde(default)]
    pub chart_update_start_time: Option<f64>,
    /// Milliseconds since epoch.
    #[serde(default)]
    pub chart_update_end_time: Option<f64>,
    #[serde(default)]
    pub last_rendered: Option<f64>,
    #[serde(default)]
    pub annotation_query: BTreeMap<String, Value>,
    #[serde(default)]
    pub annotation_data: BTreeMap<String, Value>,
    #[serde(default)]
    pub trigger_query: bool,
    #[serde(default)]
    pub latest_query_form_data: Option<FormData>,
    /// Incremented for every issued request; responses for older ids are dropped.
    #[serde(default)]
    pub query_request_id: u64,
}

impl ChartState {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            chart_status: None,
            query_response: None,
            chart_alert: None,
            chart_update_start_time: None,
            chart_update_end_time: None,
            last_rendered: None,
            annotation_query: BTreeMap::new(),
            annotation_data: BTreeMap::new(),
            trigger_query: true,
            latest_query_form_data: None,
            query_request_id: 0,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.query_response
            .as_ref()
            .map(|r| r.is_cached)
            .unwrap_or(false)
    }

    pub fn cached_dttm(&self) -> Option<&str> {
        self.query_response
            .as_ref()
            .and_then(|r| r.cached_dttm.as_deref())
    }

    /// Query duration in milliseconds, if both ends are known.
    pub fn update_duration_ms(&self) -> Option<f64> {
        match (self.chart_update_start_time, self.chart_update_end_time) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Slice metadata
// ---------------------------------------------------------------------------

/// A saved visualization definition shown inside a dashboard cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceMeta {
    pub slice_id: i64,
    pub slice_name: String,
    pub viz_type: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Markdown description already rendered and sanitized upstream.
    #[serde(default)]
    pub description_markeddown: String,
    #[serde(default)]
    pub form_data: FormData,
}

impl SliceMeta {
    pub fn has_description(&self) -> bool {
        !self.description_markeddown.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Applied filter constraints keyed by column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(pub BTreeMap<String, Vec<Value>>);

impl Filters {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Value>)> {
        self.0.iter()
    }

    /// Applies an add-filter change. With `merge` the values are appended
    /// (without duplicates), otherwise they replace the column's values.
    pub fn apply_add(&mut self, change: &AddFilter) {
        let entry = self.0.entry(change.column.clone()).or_default();
        if change.merge {
            for v in &change.values {
                if !entry.contains(v) {
                    entry.push(v.clone());
                }
            }
        } else {
            *entry = change.values.clone();
        }
    }

    /// Applies a remove-filter change. Empty `values` clears the whole column.
    pub fn apply_remove(&mut self, change: &RemoveFilter) {
        if change.values.is_empty() {
            self.0.remove(&change.column);
            return;
        }
        if let Some(entry) = self.0.get_mut(&change.column) {
            entry.retain(|v| !change.values.contains(v));
            if entry.is_empty() {
                self.0.remove(&change.column);
            }
        }
    }
}

/// Arguments a visualization reports when the user adds a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddFilter {
    pub column: String,
    pub values: Vec<Value>,
    #[serde(default = "default_true")]
    pub merge: bool,
    #[serde(default = "default_true")]
    pub refresh: bool,
}

/// Arguments a visualization reports when the user removes a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveFilter {
    pub column: String,
    pub values: Vec<Value>,
    #[serde(default = "default_true")]
    pub refresh: bool,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Dashboard API
// ---------------------------------------------------------------------------

/// Dashboard definition: slices in grid order plus their datasources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub id: i64,
    pub dashboard_title: String,
    pub slices: Vec<SliceMeta>,
    /// Keyed by the `datasource` value of each slice's form data, e.g. "3__table".
    #[serde(default)]
    pub datasources: BTreeMap<String, Datasource>,
    #[serde(default)]
    pub default_filters: Filters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSliceNameRequest {
    pub slice_name: String,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Which explore endpoint a chart export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    Explore,
    Csv,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_filter_merge_and_replace() {
        let mut filters = Filters::default();
        filters.apply_add(&AddFilter {
            column: "country".into(),
            values: vec![json!("FR")],
            merge: true,
            refresh: true,
        });
        filters.apply_add(&AddFilter {
            column: "country".into(),
            values: vec![json!("FR"), json!("DE")],
            merge: true,
            refresh: true,
        });
        assert_eq!(filters.0.get("country"), Some(&vec![json!("FR"), json!("DE")]));

        filters.apply_add(&AddFilter {
            column: "country".into(),
            values: vec![json!("US")],
            merge: false,
            refresh: true,
        });
        assert_eq!(filters.0.get("country"), Some(&vec![json!("US")]));
    }

    #[test]
    fn test_remove_filter() {
        let mut filters = Filters::default();
        filters.apply_add(&AddFilter {
            column: "country".into(),
            values: vec![json!("FR"), json!("DE")],
            merge: false,
            refresh: true,
        });
        filters.apply_remove(&RemoveFilter {
            column: "country".into(),
            values: vec![json!("FR")],
            refresh: true,
        });
        assert_eq!(filters.0.get("country"), Some(&vec![json!("DE")]));

        filters.apply_remove(&RemoveFilter {
            column: "country".into(),
            values: vec![json!("DE")],
            refresh: true,
        });
        assert!(filters.0.is_empty());
    }

    #[test]
    fn test_chart_state_defaults_from_json() {
        let chart: ChartState = serde_json::from_value(json!({
            "id": 7,
            "chart_status": "success",
            "query_response": { "is_cached": true, "cached_dttm": "2018-03-15T14:02:26" },
            "chart_update_start_time": 1000.0,
            "chart_update_end_time": 2500.0
        }))
        .unwrap();
        assert_eq!(chart.chart_status, Some(ChartStatus::Success));
        assert!(chart.is_cached());
        assert_eq!(chart.cached_dttm(), Some("2018-03-15T14:02:26"));
        assert_eq!(chart.update_duration_ms(), Some(1500.0));
        assert!(chart.annotation_query.is_empty());
    }

    #[test]
    fn test_form_data_accessors() {
        let fd = FormData::new(json!({ "slice_id": 42, "viz_type": "table" }));
        assert_eq!(fd.slice_id(), Some(42));
        assert_eq!(FormData::default().slice_id(), None);
    }
}
