pub mod chart;
pub mod chart_container;
pub mod slice_header;

pub use chart::GridChart;
