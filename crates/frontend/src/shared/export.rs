//! Explore / CSV export pathway for dashboard charts.
//!
//! Exports are plain form POSTs into a new tab: the server streams either the
//! explore page or a CSV attachment, so nothing is buffered client-side.

use crate::dashboards::grid_chart::actions::ChartExporter;
use crate::shared::api_utils::api_url;
use contracts::dashboards::grid_chart::{ExportMode, FormData};
use wasm_bindgen::JsCast;
use web_sys::{HtmlFormElement, HtmlInputElement};

/// Path (relative to the API base) for an export of the given mode.
///
/// The slice id, when known, is repeated in the query string so that the
/// resulting URL stays meaningful when copied out of the address bar.
pub fn explore_path(api_prefix: &str, form_data: &FormData, mode: ExportMode) -> String {
    let base = match mode {
        ExportMode::Explore => format!("{}/explore/", api_prefix),
        ExportMode::Csv | ExportMode::Json => format!("{}/explore_json/", api_prefix),
    };

    let mut params = Vec::new();
    if let Some(slice_id) = form_data.slice_id() {
        let slice_ref = format!("{{\"slice_id\":{}}}", slice_id);
        params.push(format!("form_data={}", urlencoding::encode(&slice_ref)));
    }
    if mode == ExportMode::Csv {
        params.push("csv=true".to_string());
    }

    if params.is_empty() {
        base
    } else {
        format!("{}?{}", base, params.join("&"))
    }
}

/// Opens the explore view (`mode = None`) or downloads the export for `form_data`.
pub fn export_chart(
    api_prefix: &str,
    form_data: &FormData,
    mode: Option<ExportMode>,
) -> Result<(), String> {
    let mode = mode.unwrap_or(ExportMode::Explore);
    let url = api_url(&explore_path(api_prefix, form_data, mode));
    let payload = serde_json::to_string(form_data)
        .map_err(|e| format!("Failed to serialize form data: {}", e))?;
    post_form(&url, &payload, "_blank")
}

/// Submits a hidden `<form method="POST">` carrying `form_data` to `url`.
fn post_form(url: &str, payload: &str, target: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;

    let form = document
        .create_element("form")
        .map_err(|e| format!("Failed to create form: {:?}", e))?
        .dyn_into::<HtmlFormElement>()
        .map_err(|e| format!("Failed to cast to form: {:?}", e))?;
    form.set_action(url);
    form.set_method("POST");
    form.set_target(target);
    form.style()
        .set_property("display", "none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    let input = document
        .create_element("input")
        .map_err(|e| format!("Failed to create input: {:?}", e))?
        .dyn_into::<HtmlInputElement>()
        .map_err(|e| format!("Failed to cast to input: {:?}", e))?;
    input.set_type("hidden");
    input.set_name("form_data");
    input.set_value(payload);

    form.append_child(&input)
        .map_err(|e| format!("Failed to append input: {:?}", e))?;

    let body = document.body().ok_or("No body element")?;
    body.append_child(&form)
        .map_err(|e| format!("Failed to append form: {:?}", e))?;

    form.submit()
        .map_err(|e| format!("Failed to submit form: {:?}", e))?;

    body.remove_child(&form)
        .map_err(|e| format!("Failed to remove form: {:?}", e))?;

    Ok(())
}

/// [`ChartExporter`] that posts to the real endpoints and logs failures.
#[derive(Debug, Clone)]
pub struct BrowserExporter {
    api_prefix: String,
}

impl BrowserExporter {
    pub fn new(api_prefix: impl Into<String>) -> Self {
        Self {
            api_prefix: api_prefix.into(),
        }
    }
}

impl ChartExporter for BrowserExporter {
    fn export_chart(&self, form_data: &FormData, mode: Option<ExportMode>) {
        if let Err(e) = export_chart(&self.api_prefix, form_data, mode) {
            log::error!("Chart export ({:?}) failed: {}", mode, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explore_path() {
        let fd = FormData::new(json!({ "slice_id": 5, "viz_type": "table" }));
        assert_eq!(
            explore_path("/api", &fd, ExportMode::Explore),
            "/api/explore/?form_data=%7B%22slice_id%22%3A5%7D"
        );
        assert_eq!(
            explore_path("/api", &fd, ExportMode::Csv),
            "/api/explore_json/?form_data=%7B%22slice_id%22%3A5%7D&csv=true"
        );
    }

    #[test]
    fn test_explore_path_without_slice() {
        let fd = FormData::new(json!({ "viz_type": "table" }));
        assert_eq!(explore_path("", &fd, ExportMode::Explore), "/explore/");
        assert_eq!(explore_path("", &fd, ExportMode::Csv), "/explore_json/?csv=true");
        assert_eq!(explore_path("", &fd, ExportMode::Json), "/explore_json/");
    }
}
