use super::update_gate::ChartProps;
use leptos::html::Div;
use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Width/height the cell actually renders with.
///
/// Only ever written from prop dimensions, via [`LayoutState::resized`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    pub width: f64,
    pub height: f64,
}

impl LayoutState {
    pub fn new(initial: Dimensions) -> Self {
        Self {
            width: initial.width,
            height: initial.height,
        }
    }

    /// Copies the latest prop dimensions into local state.
    pub fn resized(self, dims: Dimensions) -> Self {
        Self {
            width: dims.width,
            height: dims.height,
        }
    }
}

/// Anything whose rendered height can be read. `None` means not mounted.
pub trait Measurable {
    fn height(&self) -> Option<f64>;
}

impl Measurable for NodeRef<Div> {
    fn height(&self) -> Option<f64> {
        self.get().map(|el| el.offset_height() as f64)
    }
}

impl Measurable for Option<f64> {
    fn height(&self) -> Option<f64> {
        *self
    }
}

/// Measured header height, or `fallback` while the header is unmounted or
/// has not been laid out yet (zero height).
pub fn header_height<M: Measurable + ?Sized>(header: &M, fallback: f64) -> f64 {
    match header.height() {
        Some(h) if h > 0.0 => h,
        _ => fallback,
    }
}

/// The description only takes space while expanded; it is not measured otherwise.
pub fn description_height<M: Measurable + ?Sized>(is_expanded: bool, description: &M) -> f64 {
    if !is_expanded {
        return 0.0;
    }
    description.height().unwrap_or(0.0)
}

pub fn chart_height(layout: LayoutState, header_height: f64, description_height: f64) -> f64 {
    layout.height - header_height - description_height
}

/// A render changed what the header or the description shows, so their
/// heights have to be read again once the DOM is patched.
pub fn needs_remeasure(prev: &ChartProps, next: &ChartProps) -> bool {
    prev.edit_mode != next.edit_mode
        || prev.is_expanded != next.is_expanded
        || prev.slice != next.slice
        || prev.chart.is_cached() != next.chart.is_cached()
        || prev.chart.annotation_query.is_empty() != next.chart.annotation_query.is_empty()
}
