pub mod api;
pub mod grid_chart;
pub mod store;
pub mod ui;

pub use ui::ChartGridDashboard;
