//! Dashboard grid chart cell: header, expandable description and visualization.

pub mod actions;
pub mod cell;
pub mod layout;
pub mod resize_debounce;
pub mod ui;
pub mod update_gate;

pub use ui::GridChart;
