pub mod dashboard_settings;
