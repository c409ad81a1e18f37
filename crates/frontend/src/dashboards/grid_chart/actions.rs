use super::update_gate::ChartProps;
use contracts::dashboards::grid_chart::{
    AddFilter, ChartState, ExportMode, Filters, FormData, RemoveFilter, SliceMeta,
};
use leptos::prelude::*;

/// Dashboard-level actions a chart cell dispatches.
pub trait ChartStore {
    fn refresh_chart(&self, chart: &ChartState, force: bool, timeout: u32);
    fn save_slice_name(&self, slice: &SliceMeta, name: String);
    fn toggle_expand_slice(&self, slice: &SliceMeta);
    fn add_filter(&self, chart: &ChartState, change: AddFilter);
    fn remove_filter(&self, chart_id: &str, change: RemoveFilter);
}

/// Explore / file export pathway.
pub trait ChartExporter {
    fn export_chart(&self, form_data: &FormData, mode: Option<ExportMode>);
}

/// Binds a props snapshot to the collaborators the cell delegates to.
pub struct ChartActions<'a, S: ChartStore, E: ChartExporter> {
    props: &'a ChartProps,
    store: &'a S,
    exporter: &'a E,
}

impl<'a, S: ChartStore, E: ChartExporter> ChartActions<'a, S, E> {
    pub fn new(props: &'a ChartProps, store: &'a S, exporter: &'a E) -> Self {
        Self {
            props,
            store,
            exporter,
        }
    }

    pub fn add_filter(&self, change: AddFilter) {
        self.store.add_filter(&self.props.chart, change);
    }

    pub fn remove_filter(&self, change: RemoveFilter) {
        self.store.remove_filter(&self.props.id, change);
    }

    pub fn get_filters(&self) -> Filters {
        self.props.filters.clone()
    }

    pub fn explore_chart(&self) {
        self.exporter.export_chart(&self.props.form_data, None);
    }

    pub fn export_csv(&self) {
        self.exporter
            .export_chart(&self.props.form_data, Some(ExportMode::Csv));
    }

    pub fn force_refresh(&self) {
        self.store
            .refresh_chart(&self.props.chart, true, self.props.timeout);
    }

    pub fn update_slice_name(&self, name: String) {
        self.store.save_slice_name(&self.props.slice, name);
    }

    pub fn toggle_expand(&self) {
        self.store.toggle_expand_slice(&self.props.slice);
    }
}

/// [`ChartStore`] over the callback props handed to the component.
#[derive(Clone, Copy)]
pub struct CallbackStore {
    pub refresh_chart: Callback<(ChartState, bool, u32)>,
    pub save_slice_name: Callback<(SliceMeta, String)>,
    pub toggle_expand_slice: Callback<SliceMeta>,
    pub add_filter: Callback<(ChartState, AddFilter)>,
    pub remove_filter: Callback<(String, RemoveFilter)>,
}

impl ChartStore for CallbackStore {
    fn refresh_chart(&self, chart: &ChartState, force: bool, timeout: u32) {
        self.refresh_chart.run((chart.clone(), force, timeout));
    }

    fn save_slice_name(&self, slice: &SliceMeta, name: String) {
        self.save_slice_name.run((slice.clone(), name));
    }

    fn toggle_expand_slice(&self, slice: &SliceMeta) {
        self.toggle_expand_slice.run(slice.clone());
    }

    fn add_filter(&self, chart: &ChartState, change: AddFilter) {
        self.add_filter.run((chart.clone(), change));
    }

    fn remove_filter(&self, chart_id: &str, change: RemoveFilter) {
        self.remove_filter.run((chart_id.to_string(), change));
    }
}
