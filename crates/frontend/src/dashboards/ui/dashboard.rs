use crate::dashboards::api;
use crate::dashboards::grid_chart::GridChart;
use crate::dashboards::store::{chart_key, DashboardStore};
use contracts::dashboards::grid_chart::{AddFilter, ChartState, RemoveFilter, SliceMeta};
use contracts::shared::dashboard_settings::DashboardSettings;
use leptos::prelude::*;
use leptos::task::spawn_local;

const ROW_HEIGHT: f64 = 360.0;

/// Dashboard grid: one [`GridChart`] per slice, with a column-width slider
/// that drives the cells' width props.
#[component]
pub fn ChartGridDashboard(dashboard_id: i64) -> impl IntoView {
    let settings = use_context::<DashboardSettings>().unwrap_or_default();
    let api_prefix = settings.api_prefix.clone();
    let store = DashboardStore::new(settings);

    let (column_width, set_column_width) = signal(420.0_f64);
    let (error, set_error) = signal(None::<String>);
    let (loading, set_loading) = signal(false);

    // Load dashboard on mount
    Effect::new(move |_| {
        let api_prefix = api_prefix.clone();
        set_loading.set(true);
        spawn_local(async move {
            match api::get_dashboard(&api_prefix, dashboard_id).await {
                Ok(dashboard) => {
                    log::info!(
                        "Loaded dashboard {} with {} slices",
                        dashboard.id,
                        dashboard.slices.len()
                    );
                    store.load(dashboard);
                    store.refresh_all(false, None);
                }
                Err(e) => {
                    log::error!("Failed to load dashboard {}: {}", dashboard_id, e);
                    set_error.set(Some(e));
                }
            }
            set_loading.set(false);
        });
    });

    let cell = move |slice: SliceMeta| {
        let slice_id = slice.slice_id;
        view! {
            <GridChart
                id=chart_key(slice_id)
                width=column_width
                height=ROW_HEIGHT
                chart=Signal::derive(move || store.chart(slice_id))
                form_data=Signal::derive(move || {
                    store.slice(slice_id).map(|s| s.form_data).unwrap_or_default()
                })
                datasource=Signal::derive(move || store.datasource_for(slice_id))
                slice=Signal::derive(move || {
                    store.slice(slice_id).unwrap_or_else(|| slice.clone())
                })
                timeout=Signal::derive(move || store.default_timeout())
                filters=store.filters
                refresh_chart=move |(chart, force, timeout): (ChartState, bool, u32)| {
                    store.refresh_chart(chart.id, force, timeout)
                }
                save_slice_name=move |(slice, name): (SliceMeta, String)| {
                    store.save_slice_name(slice.slice_id, name)
                }
                toggle_expand_slice=move |slice: SliceMeta| {
                    store.toggle_expand_slice(slice.slice_id)
                }
                add_filter=move |(chart, change): (ChartState, AddFilter)| {
                    store.add_filter(&chart, change)
                }
                remove_filter=move |(cell_id, change): (String, RemoveFilter)| {
                    store.remove_filter(&cell_id, change)
                }
                edit_mode=store.edit_mode
                is_expanded=Signal::derive(move || store.is_expanded(slice_id))
            />
        }
    };

    view! {
        <div class="chart-grid">
            <div class="chart-grid__toolbar">
                <h2 class="chart-grid__title">{move || store.dashboard_title.get()}</h2>
                <label class="chart-grid__control">
                    "Column width"
                    <input
                        type="range"
                        min="240"
                        max="960"
                        step="10"
                        prop:value=move || column_width.get().to_string()
                        on:input=move |ev| {
                            if let Ok(width) = event_target_value(&ev).parse::<f64>() {
                                set_column_width.set(width);
                            }
                        }
                    />
                </label>
                <label class="chart-grid__control">
                    <input
                        type="checkbox"
                        prop:checked=move || store.edit_mode.get()
                        on:change=move |ev| store.edit_mode.set(event_target_checked(&ev))
                    />
                    "Edit mode"
                </label>
                <button
                    class="chart-grid__refresh"
                    disabled=move || loading.get()
                    on:click=move |_| store.refresh_all(true, None)
                >
                    "Refresh all"
                </button>
            </div>
            {move || error.get().map(|e| view! { <div class="chart-grid__error">{e}</div> })}
            <div class="chart-grid__cells">
                <For
                    each=move || store.slices.get()
                    key=|slice| slice.slice_id
                    children=cell
                />
            </div>
        </div>
    }
}
