use crate::shared::date_utils::cached_tooltip;
use crate::shared::icons::icon;
use contracts::dashboards::grid_chart::SliceMeta;
use leptos::html::Div;
use leptos::prelude::*;

/// Header bar of a dashboard chart: title, cache/annotation badges, controls.
///
/// The outer element is bound to `node_ref` so the owning cell can measure it.
#[component]
pub fn SliceHeader(
    node_ref: NodeRef<Div>,
    #[prop(into)] slice: Signal<SliceMeta>,
    #[prop(into)] is_expanded: Signal<bool>,
    #[prop(into)] is_cached: Signal<bool>,
    #[prop(into)] cached_dttm: Signal<Option<String>>,
    #[prop(into)] edit_mode: Signal<bool>,
    /// Annotation layers are configured for this chart
    #[prop(into)]
    has_annotations: Signal<bool>,
    update_slice_name: Callback<String>,
    toggle_expand_slice: Callback<()>,
    force_refresh: Callback<()>,
    explore_chart: Callback<()>,
    export_csv: Callback<()>,
) -> impl IntoView {
    let slice_name = move || slice.with(|s| s.slice_name.clone());

    // `change` fires on blur and on Enter
    let commit_name = move |ev: leptos::ev::Event| {
        let name = event_target_value(&ev).trim().to_string();
        let unchanged = slice.with_untracked(|s| s.slice_name == name);
        if !name.is_empty() && !unchanged {
            update_slice_name.run(name);
        }
    };

    let title_view = move || {
        if edit_mode.get() {
            view! {
                <input
                    type="text"
                    class="chart-header__title-input"
                    prop:value=slice_name
                    on:change=commit_name
                />
            }
            .into_any()
        } else {
            view! {
                <span class="chart-header__title-text" title=slice_name>
                    {slice_name}
                </span>
            }
            .into_any()
        }
    };

    let cached_badge = move || {
        is_cached.get().then(|| {
            view! {
                <span
                    class="chart-header__badge chart-header__badge--cached"
                    title=move || cached_tooltip(cached_dttm.get().as_deref())
                    on:click=move |_| force_refresh.run(())
                >
                    {icon("bolt")}
                    "cached"
                </span>
            }
        })
    };

    let annotation_badge = move || {
        has_annotations.get().then(|| {
            view! {
                <span class="chart-header__badge" title="Annotation layers">
                    {icon("annotation")}
                </span>
            }
        })
    };

    let description_toggle = move || {
        slice.with(|s| s.has_description()).then(|| {
            view! {
                <button
                    class="chart-header__control"
                    class=("chart-header__control--active", move || is_expanded.get())
                    title="Toggle chart description"
                    on:click=move |_| toggle_expand_slice.run(())
                >
                    {icon("info")}
                </button>
            }
        })
    };

    view! {
        <div class="chart-header" node_ref=node_ref>
            <div class="chart-header__title">
                {title_view}
                {cached_badge}
                {annotation_badge}
            </div>
            <div class="chart-header__controls">
                {description_toggle}
                <button
                    class="chart-header__control"
                    title="Force refresh data"
                    on:click=move |_| force_refresh.run(())
                >
                    {icon("refresh")}
                </button>
                <button
                    class="chart-header__control"
                    title="Explore chart"
                    on:click=move |_| explore_chart.run(())
                >
                    {icon("explore")}
                </button>
                <button
                    class="chart-header__control"
                    title="Export CSV"
                    on:click=move |_| export_csv.run(())
                >
                    {icon("download")}
                </button>
            </div>
        </div>
    }
}
