pub mod grid_chart;
