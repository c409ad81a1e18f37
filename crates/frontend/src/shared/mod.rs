pub mod api_utils;
pub mod date_utils;
pub mod export;
pub mod icons;
pub mod settings;
