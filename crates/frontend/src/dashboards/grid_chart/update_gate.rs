//! Re-render gating for a grid chart cell.
//!
//! Width/height props are deliberately absent from the watch list: layout
//! changes reach the cell through the resize debouncer, which copies them
//! into [`LayoutState`] once the drag settles.

use super::layout::{Dimensions, LayoutState};
use contracts::dashboards::grid_chart::{ChartState, Datasource, Filters, FormData, SliceMeta};

/// Snapshot of everything the hosting dashboard passes into a chart cell.
///
/// Callbacks are not part of the snapshot: a Leptos component receives them
/// once at construction, so they cannot change between updates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartProps {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub chart: ChartState,
    pub form_data: FormData,
    pub datasource: Datasource,
    pub slice: SliceMeta,
    pub timeout: u32,
    pub filters: Filters,
    pub edit_mode: bool,
    pub is_expanded: bool,
}

impl ChartProps {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// Props whose change forces an immediate re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedProp {
    Id,
    Chart,
    FormData,
    Datasource,
    Slice,
    Timeout,
    Filters,
    EditMode,
    IsExpanded,
}

impl WatchedProp {
    pub const ALL: [WatchedProp; 9] = [
        WatchedProp::Id,
        WatchedProp::Chart,
        WatchedProp::FormData,
        WatchedProp::Datasource,
        WatchedProp::Slice,
        WatchedProp::Timeout,
        WatchedProp::Filters,
        WatchedProp::EditMode,
        WatchedProp::IsExpanded,
    ];

    pub fn differs(self, prev: &ChartProps, next: &ChartProps) -> bool {
        match self {
            WatchedProp::Id => prev.id != next.id,
            WatchedProp::Chart => prev.chart != next.chart,
            WatchedProp::FormData => prev.form_data != next.form_data,
            WatchedProp::Datasource => prev.datasource != next.datasource,
            WatchedProp::Slice => prev.slice != next.slice,
            WatchedProp::Timeout => prev.timeout != next.timeout,
            WatchedProp::Filters => prev.filters != next.filters,
            WatchedProp::EditMode => prev.edit_mode != next.edit_mode,
            WatchedProp::IsExpanded => prev.is_expanded != next.is_expanded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDecision {
    /// Re-render now.
    Render,
    /// Only width/height moved: (re)start the resize debounce, do not render.
    ScheduleResize,
    /// Nothing relevant changed.
    Skip,
}

/// First watched prop that differs between two snapshots, in watch-list order.
pub fn changed_prop(prev: &ChartProps, next: &ChartProps) -> Option<WatchedProp> {
    WatchedProp::ALL
        .into_iter()
        .find(|prop| prop.differs(prev, next))
}

pub fn should_update(
    prev_props: &ChartProps,
    next_props: &ChartProps,
    prev_layout: LayoutState,
    next_layout: LayoutState,
) -> UpdateDecision {
    if prev_layout != next_layout {
        return UpdateDecision::Render;
    }

    if changed_prop(prev_props, next_props).is_some() {
        return UpdateDecision::Render;
    }

    if prev_props.dimensions() != next_props.dimensions() {
        return UpdateDecision::ScheduleResize;
    }

    UpdateDecision::Skip
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::json;

    pub fn props() -> ChartProps {
        ChartProps {
            id: "CHART-1".to_string(),
            width: 400.0,
            height: 300.0,
            chart: ChartState::new(1),
            form_data: FormData::new(json!({ "slice_id": 1, "viz_type": "table" })),
            datasource: Datasource(json!({ "name": "birth_names" })),
            slice: SliceMeta {
                slice_id: 1,
                slice_name: "Births".to_string(),
                viz_type: "table".to_string(),
                description: None,
                description_markeddown: String::new(),
                form_data: FormData::default(),
            },
            timeout: 60,
            filters: Filters::default(),
            edit_mode: false,
            is_expanded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::props;
    use super::*;
    use serde_json::json;

    fn layout() -> LayoutState {
        LayoutState::new(Dimensions {
            width: 400.0,
            height: 300.0,
        })
    }

    #[test]
    fn test_identical_props_skip() {
        let p = props();
        assert_eq!(should_update(&p, &p.clone(), layout(), layout()), UpdateDecision::Skip);
    }

    #[test]
    fn test_layout_change_always_renders() {
        let p = props();
        let resized = layout().resized(Dimensions {
            width: 500.0,
            height: 300.0,
        });
        assert_eq!(should_update(&p, &p, layout(), resized), UpdateDecision::Render);
    }

    #[test]
    fn test_each_watched_prop_renders() {
        let base = props();
        let mut variants = Vec::new();

        let mut p = base.clone();
        p.id = "CHART-2".into();
        variants.push((WatchedProp::Id, p));

        let mut p = base.clone();
        p.chart.chart_alert = Some("boom".into());
        variants.push((WatchedProp::Chart, p));

        let mut p = base.clone();
        p.form_data = FormData::new(json!({ "slice_id": 1, "viz_type": "line" }));
        variants.push((WatchedProp::FormData, p));

        let mut p = base.clone();
        p.datasource = Datasource(json!({ "name": "other" }));
        variants.push((WatchedProp::Datasource, p));

        let mut p = base.clone();
        p.slice.slice_name = "Renamed".into();
        variants.push((WatchedProp::Slice, p));

        let mut p = base.clone();
        p.timeout = 30;
        variants.push((WatchedProp::Timeout, p));

        let mut p = base.clone();
        p.filters.0.insert("gender".into(), vec![json!("girl")]);
        variants.push((WatchedProp::Filters, p));

        let mut p = base.clone();
        p.edit_mode = true;
        variants.push((WatchedProp::EditMode, p));

        let mut p = base.clone();
        p.is_expanded = true;
        variants.push((WatchedProp::IsExpanded, p));

        assert_eq!(variants.len(), WatchedProp::ALL.len());
        for (expected, next) in variants {
            assert_eq!(changed_prop(&base, &next), Some(expected));
            assert_eq!(
                should_update(&base, &next, layout(), layout()),
                UpdateDecision::Render,
                "{:?} should force a render",
                expected
            );
        }
    }

    #[test]
    fn test_dimension_only_change_schedules_resize() {
        let base = props();

        let mut wider = base.clone();
        wider.width = 640.0;
        assert_eq!(changed_prop(&base, &wider), None);
        assert_eq!(
            should_update(&base, &wider, layout(), layout()),
            UpdateDecision::ScheduleResize
        );

        let mut taller = base.clone();
        taller.height = 480.0;
        assert_eq!(
            should_update(&base, &taller, layout(), layout()),
            UpdateDecision::ScheduleResize
        );
    }

    #[test]
    fn test_watched_change_wins_over_dimension_change() {
        let base = props();
        let mut next = base.clone();
        next.width = 640.0;
        next.edit_mode = true;
        assert_eq!(
            should_update(&base, &next, layout(), layout()),
            UpdateDecision::Render
        );
    }
}
