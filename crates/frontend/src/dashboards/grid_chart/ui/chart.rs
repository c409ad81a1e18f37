use super::chart_container::ChartContainer;
use super::slice_header::SliceHeader;
use crate::dashboards::grid_chart::actions::{CallbackStore, ChartActions};
use crate::dashboards::grid_chart::cell::GridChartCell;
use crate::dashboards::grid_chart::layout::{
    chart_height, description_height, header_height, needs_remeasure, LayoutState,
};
use crate::dashboards::grid_chart::resize_debounce::BrowserTimers;
use crate::dashboards::grid_chart::update_gate::{ChartProps, UpdateDecision};
use crate::shared::export::BrowserExporter;
use contracts::dashboards::grid_chart::{
    AddFilter, ChartState, Datasource, Filters, FormData, RemoveFilter, SliceMeta,
};
use contracts::shared::dashboard_settings::DashboardSettings;
use gloo_timers::callback::Timeout;
use leptos::html::Div;
use leptos::prelude::*;

fn run_action<R>(
    props: &ChartProps,
    store: &CallbackStore,
    exporter: StoredValue<BrowserExporter>,
    f: impl FnOnce(&ChartActions<'_, CallbackStore, BrowserExporter>) -> R,
) -> R {
    exporter.with_value(|exporter| f(&ChartActions::new(props, store, exporter)))
}

/// One chart cell of the dashboard grid.
///
/// Prop updates go through [`GridChartCell`]: watched props re-render at once,
/// width/height are debounced into the local layout.
#[component]
pub fn GridChart(
    #[prop(into)] id: Signal<String>,
    #[prop(into)] width: Signal<f64>,
    #[prop(into)] height: Signal<f64>,
    #[prop(into)] chart: Signal<ChartState>,
    #[prop(into)] form_data: Signal<FormData>,
    #[prop(into)] datasource: Signal<Datasource>,
    #[prop(into)] slice: Signal<SliceMeta>,
    /// Query timeout in seconds
    #[prop(into)]
    timeout: Signal<u32>,
    #[prop(into)] filters: Signal<Filters>,
    #[prop(into)] refresh_chart: Callback<(ChartState, bool, u32)>,
    #[prop(into)] save_slice_name: Callback<(SliceMeta, String)>,
    #[prop(into)] toggle_expand_slice: Callback<SliceMeta>,
    #[prop(into)] add_filter: Callback<(ChartState, AddFilter)>,
    #[prop(into)] remove_filter: Callback<(String, RemoveFilter)>,
    #[prop(into)] edit_mode: Signal<bool>,
    #[prop(into)] is_expanded: Signal<bool>,
) -> impl IntoView {
    let settings = use_context::<DashboardSettings>().unwrap_or_default();
    let header_fallback = settings.header_fallback_height;

    let snapshot = move || ChartProps {
        id: id.get(),
        width: width.get(),
        height: height.get(),
        chart: chart.get(),
        form_data: form_data.get(),
        datasource: datasource.get(),
        slice: slice.get(),
        timeout: timeout.get(),
        filters: filters.get(),
        edit_mode: edit_mode.get(),
        is_expanded: is_expanded.get(),
    };

    let initial = untrack(snapshot);
    let chart_key = initial.id.clone();
    let layout = RwSignal::new(LayoutState::new(initial.dimensions()));
    let rendered = RwSignal::new(initial.clone());

    let cell = StoredValue::new_local(GridChartCell::new(
        BrowserTimers,
        settings.resize_debounce_ms,
        initial,
        move |next: LayoutState| {
            log::debug!("chart cell resized to {}x{}", next.width, next.height);
            let _ = layout.try_set(next);
        },
    ));

    Effect::new(move |_| {
        let next = snapshot();
        let decision = cell.try_with_value(|c| c.receive_props(next.clone()));
        if decision == Some(UpdateDecision::Render) {
            rendered.set(next);
        }
    });

    on_cleanup(move || {
        log::debug!("chart cell '{}' unmounted", chart_key);
        cell.try_with_value(|c| c.teardown());
    });

    // Measurement

    let header_ref = NodeRef::<Div>::new();
    let description_ref = NodeRef::<Div>::new();
    let expanded = Memo::new(move |_| rendered.with(|p| p.is_expanded));

    // Header and description content change in the same pass that updates
    // `rendered`; measure again once the DOM has been patched.
    let remeasure = RwSignal::new(0u32);
    Effect::new(move |prev: Option<ChartProps>| {
        let now = rendered.get();
        if prev.is_some_and(|p| needs_remeasure(&p, &now)) {
            Timeout::new(0, move || {
                let _ = remeasure.try_update(|n| *n += 1);
            })
            .forget();
        }
        now
    });

    let header_px = Signal::derive(move || {
        remeasure.track();
        header_height(&header_ref, header_fallback)
    });
    let chart_px = Signal::derive(move || {
        remeasure.track();
        chart_height(
            layout.get(),
            header_px.get(),
            description_height(expanded.get(), &description_ref),
        )
    });

    // Actions

    let store = CallbackStore {
        refresh_chart,
        save_slice_name,
        toggle_expand_slice,
        add_filter,
        remove_filter,
    };
    let exporter = StoredValue::new(BrowserExporter::new(settings.api_prefix.clone()));

    let on_force_refresh = Callback::new(move |_: ()| {
        run_action(&rendered.get_untracked(), &store, exporter, |a| a.force_refresh())
    });
    let on_explore = Callback::new(move |_: ()| {
        run_action(&rendered.get_untracked(), &store, exporter, |a| a.explore_chart())
    });
    let on_export_csv = Callback::new(move |_: ()| {
        run_action(&rendered.get_untracked(), &store, exporter, |a| a.export_csv())
    });
    let on_toggle_expand = Callback::new(move |_: ()| {
        run_action(&rendered.get_untracked(), &store, exporter, |a| a.toggle_expand())
    });
    let on_update_slice_name = Callback::new(move |name: String| {
        run_action(&rendered.get_untracked(), &store, exporter, |a| {
            a.update_slice_name(name)
        })
    });
    let on_add_filter = Callback::new(move |change: AddFilter| {
        run_action(&rendered.get_untracked(), &store, exporter, |a| a.add_filter(change))
    });
    let on_remove_filter = Callback::new(move |change: RemoveFilter| {
        run_action(&rendered.get_untracked(), &store, exporter, |a| {
            a.remove_filter(change)
        })
    });
    // tracked read: the filter chips re-render when the snapshot changes
    let get_filters = Callback::new(move |_: ()| {
        rendered.with(|p| run_action(p, &store, exporter, |a| a.get_filters()))
    });

    // View inputs

    let slice_sig = Memo::new(move |_| rendered.with(|p| p.slice.clone()));
    let chart_sig = Memo::new(move |_| rendered.with(|p| p.chart.clone()));
    let is_cached = Memo::new(move |_| rendered.with(|p| p.chart.is_cached()));
    let cached_dttm = Memo::new(move |_| {
        rendered.with(|p| p.chart.cached_dttm().map(str::to_string))
    });
    let has_annotations = Memo::new(move |_| {
        rendered.with(|p| !p.chart.annotation_query.is_empty())
    });
    let edit = Memo::new(move |_| rendered.with(|p| p.edit_mode));
    let description_html =
        Memo::new(move |_| rendered.with(|p| p.slice.description_markeddown.clone()));

    view! {
        <div class="dashboard-chart" data-chart-id=move || rendered.with(|p| p.id.clone())>
            <SliceHeader
                node_ref=header_ref
                slice=slice_sig
                is_expanded=expanded
                is_cached=is_cached
                cached_dttm=cached_dttm
                edit_mode=edit
                has_annotations=has_annotations
                update_slice_name=on_update_slice_name
                toggle_expand_slice=on_toggle_expand
                force_refresh=on_force_refresh
                explore_chart=on_explore
                export_csv=on_export_csv
            />
            // Pre-sanitized upstream; rendered verbatim.
            <div
                class="slice_description bs-callout bs-callout-default"
                style=move || if expanded.get() { "" } else { "display: none;" }
                node_ref=description_ref
                inner_html=move || description_html.get()
            ></div>
            <ChartContainer
                container_id=Signal::derive(move || {
                    format!("slice-container-{}", slice_sig.with(|s| s.slice_id))
                })
                slice_id=Signal::derive(move || rendered.with(|p| p.id.clone()))
                viz_type=Signal::derive(move || slice_sig.with(|s| s.viz_type.clone()))
                width=Signal::derive(move || layout.get().width)
                height=chart_px
                header_height=header_px
                timeout=Signal::derive(move || rendered.with(|p| p.timeout))
                chart=chart_sig
                datasource=Signal::derive(move || rendered.with(|p| p.datasource.clone()))
                form_data=Signal::derive(move || rendered.with(|p| p.form_data.clone()))
                add_filter=on_add_filter
                remove_filter=on_remove_filter
                get_filters=get_filters
            />
        </div>
    }
}
