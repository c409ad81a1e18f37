//! Visualization host of a grid chart cell.
//!
//! Renders the query payload as a record table (or raw JSON when the payload
//! is not a list of records). Clicking a value adds it as a dashboard filter;
//! active filters are listed as removable chips.

use crate::dashboards::store::query_form_data;
use crate::shared::date_utils::format_duration_ms;
use crate::shared::icons::icon;
use contracts::dashboards::grid_chart::{
    AddFilter, ChartState, ChartStatus, Datasource, Filters, FormData, RemoveFilter,
};
use leptos::prelude::*;
use serde_json::Value;

const PREVIEW_ROWS: usize = 20;

/// Column names and up to `limit` rows when `data` is an array of objects.
pub fn records_preview(data: &Value, limit: usize) -> Option<(Vec<String>, Vec<Vec<Value>>)> {
    let records = data.as_array()?;
    let first = records.first()?.as_object()?;
    let columns: Vec<String> = first.keys().cloned().collect();

    let rows = records
        .iter()
        .take(limit)
        .filter_map(Value::as_object)
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Some((columns, rows))
}

pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The chart was last queried with different parameters than the current ones.
///
/// The last query carried the dashboard filters, so the comparison is against
/// the form data as it would be sent now.
pub fn is_stale(chart: &ChartState, form_data: &FormData, filters: &Filters) -> bool {
    match &chart.latest_query_form_data {
        Some(latest) => latest != &query_form_data(form_data, filters),
        None => false,
    }
}

#[component]
pub fn ChartContainer(
    #[prop(into)] container_id: Signal<String>,
    /// Grid cell id of the owning chart
    #[prop(into)]
    slice_id: Signal<String>,
    #[prop(into)] viz_type: Signal<String>,
    #[prop(into)] width: Signal<f64>,
    #[prop(into)] height: Signal<f64>,
    #[prop(into)] header_height: Signal<f64>,
    #[prop(into)] timeout: Signal<u32>,
    #[prop(into)] chart: Signal<ChartState>,
    #[prop(into)] datasource: Signal<Datasource>,
    #[prop(into)] form_data: Signal<FormData>,
    add_filter: Callback<AddFilter>,
    remove_filter: Callback<RemoveFilter>,
    get_filters: Callback<(), Filters>,
) -> impl IntoView {
    let style = move || {
        format!(
            "width: {}px; height: {}px;",
            width.get().max(0.0).floor(),
            height.get().max(0.0).floor()
        )
    };

    let datasource_name = move || {
        datasource.with(|d| {
            d.0.get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
    };

    let status = move || chart.with(|c| c.chart_status);

    let status_class = move || match status() {
        Some(ChartStatus::Loading) => "chart-container chart-container--loading",
        Some(ChartStatus::Failed) => "chart-container chart-container--failed",
        _ => "chart-container",
    };

    let stale_notice = move || {
        let filters = get_filters.run(());
        let stale = chart.with(|c| form_data.with(|fd| is_stale(c, fd, &filters)));
        stale.then(|| {
            view! {
                <div class="chart-container__notice">
                    "Query parameters changed. Refresh to update."
                </div>
            }
        })
    };

    let filter_chips = move || {
        let filters = get_filters.run(());
        let chips: Vec<_> = filters
            .iter()
            .flat_map(|(column, values)| {
                values.iter().map(move |v| (column.clone(), v.clone()))
            })
            .map(|(column, value)| {
                let label = format!("{}: {}", column, format_cell(&value));
                let change = RemoveFilter {
                    column,
                    values: vec![value],
                    refresh: true,
                };
                view! {
                    <span class="chart-container__chip">
                        {label}
                        <button
                            class="chart-container__chip-remove"
                            title="Remove filter"
                            on:click=move |_| remove_filter.run(change.clone())
                        >
                            {icon("x")}
                        </button>
                    </span>
                }
            })
            .collect();
        (!chips.is_empty()).then(|| view! { <div class="chart-container__filters">{chips}</div> })
    };

    let payload_view = move || {
        let data = chart.with(|c| {
            c.query_response
                .as_ref()
                .map(|r| r.data.clone())
                .unwrap_or(Value::Null)
        });

        match records_preview(&data, PREVIEW_ROWS) {
            Some((columns, rows)) => {
                let head: Vec<_> = columns
                    .iter()
                    .map(|c| view! { <th>{c.clone()}</th> })
                    .collect();
                let body: Vec<_> = rows
                    .into_iter()
                    .map(|row| {
                        let cells: Vec<_> = columns
                            .iter()
                            .cloned()
                            .zip(row)
                            .map(|(column, value)| {
                                let text = format_cell(&value);
                                let change = AddFilter {
                                    column,
                                    values: vec![value],
                                    merge: true,
                                    refresh: true,
                                };
                                view! {
                                    <td
                                        class="chart-container__cell"
                                        title="Filter by this value"
                                        on:click=move |_| add_filter.run(change.clone())
                                    >
                                        {text}
                                    </td>
                                }
                            })
                            .collect();
                        view! { <tr>{cells}</tr> }
                    })
                    .collect();
                view! {
                    <table class="chart-container__table">
                        <thead><tr>{head}</tr></thead>
                        <tbody>{body}</tbody>
                    </table>
                }
                .into_any()
            }
            None if data.is_null() => view! { <div class="chart-container__empty">"No data"</div> }.into_any(),
            None => {
                let pretty = serde_json::to_string_pretty(&data).unwrap_or_default();
                view! { <pre class="chart-container__json">{pretty}</pre> }.into_any()
            }
        }
    };

    let body = move || match status() {
        Some(ChartStatus::Loading) => view! {
            <div class="chart-container__loading">
                {move || format!("Loading... (timeout {}s)", timeout.get())}
            </div>
        }
        .into_any(),
        Some(ChartStatus::Failed) => view! {
            <div class="chart-container__alert">
                {move || chart.with(|c| c.chart_alert.clone().unwrap_or_else(|| "Query failed".to_string()))}
            </div>
        }
        .into_any(),
        _ => view! {
            <div class="chart-container__payload">
                {stale_notice}
                {payload_view}
            </div>
        }
        .into_any(),
    };

    let footer = move || {
        chart.with(|c| c.update_duration_ms()).map(|ms| {
            view! { <div class="chart-container__footer">{format_duration_ms(ms)}</div> }
        })
    };

    view! {
        <div
            id=move || container_id.get()
            class=status_class
            style=style
            data-slice-id=move || slice_id.get()
            data-viz-type=move || viz_type.get()
            data-datasource=datasource_name
            data-header-height=move || header_height.get().to_string()
        >
            {filter_chips}
            {body}
            {footer}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::store::chart_started;
    use serde_json::json;

    #[test]
    fn test_records_preview() {
        let data = json!([
            { "name": "Aaron", "num": 10 },
            { "name": "Abby", "num": 7 },
            { "name": "Adam" }
        ]);
        let (columns, rows) = records_preview(&data, 2).unwrap();
        assert_eq!(columns, vec!["name", "num"]);
        assert_eq!(rows, vec![
            vec![json!("Aaron"), json!(10)],
            vec![json!("Abby"), json!(7)],
        ]);

        let (_, rows) = records_preview(&data, 10).unwrap();
        assert_eq!(rows[2], vec![json!("Adam"), Value::Null]);
    }

    #[test]
    fn test_records_preview_rejects_non_records() {
        assert!(records_preview(&json!({ "a": 1 }), 5).is_none());
        assert!(records_preview(&json!([]), 5).is_none());
        assert!(records_preview(&json!([1, 2]), 5).is_none());
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&json!("CA")), "CA");
        assert_eq!(format_cell(&json!(3.5)), "3.5");
        assert_eq!(format_cell(&Value::Null), "");
    }

    #[test]
    fn test_is_stale() {
        let fd = FormData::new(json!({ "viz_type": "table" }));
        let filters = Filters::default();
        let mut chart = ChartState::new(1);
        assert!(!is_stale(&chart, &fd, &filters));
        chart.latest_query_form_data = Some(fd.clone());
        assert!(!is_stale(&chart, &fd, &filters));
        chart.latest_query_form_data = Some(FormData::new(json!({ "viz_type": "line" })));
        assert!(is_stale(&chart, &fd, &filters));
    }

    #[test]
    fn test_is_stale_after_refresh_with_dashboard_filters() {
        let fd = FormData::new(json!({ "viz_type": "table" }));
        let mut filters = Filters::default();
        filters.0.insert("state".into(), vec![json!("CA")]);
        let mut chart = ChartState::new(1);
        chart_started(&mut chart, query_form_data(&fd, &filters), 0.0);
        assert!(!is_stale(&chart, &fd, &filters));

        filters.0.insert("state".into(), vec![json!("NY")]);
        assert!(is_stale(&chart, &fd, &filters));
    }

    #[test]
    fn test_is_stale_after_refresh_without_form_data() {
        let fd = FormData::default();
        let filters = Filters::default();
        let mut chart = ChartState::new(1);
        chart_started(&mut chart, query_form_data(&fd, &filters), 0.0);
        assert!(!is_stale(&chart, &fd, &filters));
    }

    #[test]
    fn test_is_stale_when_slice_carries_extra_filters() {
        let fd = FormData::new(json!({
            "viz_type": "table",
            "extra_filters": [{ "col": "year", "op": "in", "val": [2018] }]
        }));
        let mut filters = Filters::default();
        let mut chart = ChartState::new(1);
        chart_started(&mut chart, query_form_data(&fd, &filters), 0.0);
        assert!(!is_stale(&chart, &fd, &filters));

        filters.0.insert("state".into(), vec![json!("CA")]);
        chart_started(&mut chart, query_form_data(&fd, &filters), 0.0);
        assert!(!is_stale(&chart, &fd, &filters));
    }
}
